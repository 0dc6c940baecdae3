//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The instruction-level use graph and its evaluation schedule.
//!
//! Everything is integer indices into flat vectors so the graph can model
//! arbitrary (even cyclic) module shapes without owning pointers. `u32::MAX`
//! is the universal "no index" value.

use smallvec::SmallVec;

/// The "no index" value for instruction and list-node indices.
pub(crate) const NONE: u32 = u32::MAX;

/// One parsed instruction. Instructions are identified by their position in
/// parse order and never move; the word index keeps a stable mapping into
/// the module's word stream.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Instruction {
    /// Offset of the instruction's first word in the module.
    pub(crate) word_index: u32,
    /// Head of this instruction's use-list, or [`NONE`].
    pub(crate) use_head: u32,
}

/// A node of a use-list. The node lives on a producer instruction's list and
/// names one consumer of that producer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct UseNode {
    /// The consuming instruction.
    pub(crate) consumer: u32,
    /// Next node of the same producer's list, or [`NONE`].
    pub(crate) next: u32,
}

/// Iterates the consumers recorded on one producer's use-list.
pub(crate) struct UseIter<'a> {
    nodes: &'a [UseNode],
    cursor: u32,
}

impl Iterator for UseIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.cursor == NONE {
            return None;
        }

        let node = self.nodes[self.cursor as usize];
        self.cursor = node.next;

        Some(node.consumer)
    }
}

/// Walks the use-list starting at `head`.
pub(crate) fn use_list(nodes: &[UseNode], head: u32) -> UseIter<'_> {
    UseIter {
        nodes,
        cursor: head,
    }
}

/// Computes the order the optimizer visits instructions in.
///
/// This is a Kahn sort over the use graph followed by a level assignment:
/// each instruction's level is one more than the maximum level of the
/// instructions it consumes, and the final order sorts by
/// `(level, instruction index)`. Visiting in this order guarantees an
/// instruction's operands are always evaluated before the instruction.
///
/// Instructions trapped in a dependency cycle (possible through phi
/// back-edges) never reach in-degree zero and are left out; their results
/// simply stay unevaluated.
pub(crate) fn schedule(instructions: &[Instruction], nodes: &[UseNode]) -> Vec<u32> {
    let len = instructions.len();
    let mut incoming = vec![0u32; len];
    let mut levels = vec![0u32; len];

    for node in nodes {
        incoming[node.consumer as usize] += 1;
    }

    let mut worklist: SmallVec<[u32; 32]> = (0..len as u32)
        .filter(|&i| incoming[i as usize] == 0)
        .collect();
    let mut order = Vec::with_capacity(len);

    while let Some(i) = worklist.pop() {
        order.push(i);

        for consumer in use_list(nodes, instructions[i as usize].use_head) {
            let c = consumer as usize;
            levels[c] = levels[c].max(levels[i as usize] + 1);
            incoming[c] -= 1;

            if incoming[c] == 0 {
                worklist.push(consumer);
            }
        }
    }

    order.sort_unstable_by_key(|&i| (levels[i as usize], i));

    order
}
