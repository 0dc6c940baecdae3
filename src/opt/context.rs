//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The per-run mutable state: a working copy of the word stream, degree
//! copies, the resolution table, and the two deletion cascades.
//!
//! The shader's own tables stay untouched, which is what makes concurrent
//! runs over one parsed shader safe.

use crate::opt::eval::Resolution;
use crate::shader::Shader;
use crate::spv::*;

/// Mutable state for one optimizer run.
pub(crate) struct Context<'s> {
    pub(crate) shader: &'s Shader,
    /// Working copy of the module's words. Deleted words become
    /// [`SENTINEL`]; rewritten instructions shrink their word count in
    /// place and sentinel-fill the slack.
    pub(crate) words: Vec<u32>,
    /// Copy of the shader's result-use counts, decremented as uses die.
    pub(crate) out_degrees: Vec<u32>,
    /// Copy of the shader's label-reference counts.
    pub(crate) in_degrees: Vec<u32>,
    /// Per-result resolution state for the evaluation pass.
    pub(crate) resolutions: Vec<Resolution>,
    /// Results whose use count may have dropped to zero.
    result_stack: Vec<u32>,
    /// Labels that lost an incoming reference.
    label_stack: Vec<u32>,
}

impl<'s> Context<'s> {
    pub(crate) fn new(shader: &'s Shader) -> Self {
        let mut out_degrees = shader.out_degrees.clone();

        // a collapsed switch is rewritten over the default switch constant,
        // so that constant must survive every cascade in the run. Pinning
        // it with an extra use keeps its count from ever reaching zero.
        if let Some(producer) = shader.result_producer(shader.default_switch_constant) {
            out_degrees[producer as usize] += 1;
        }

        Self {
            shader,
            words: shader.words.clone(),
            out_degrees,
            in_degrees: shader.in_degrees.clone(),
            resolutions: vec![Resolution::Unknown; shader.results.len()],
            result_stack: Vec::new(),
            label_stack: Vec::new(),
        }
    }

    /// Opcode of `inst` in the working buffer, which may differ from the
    /// parsed opcode after a terminator rewrite.
    #[inline]
    pub(crate) fn opcode_of(&self, inst: u32) -> u16 {
        opcode(self.words[self.shader.inst_offset(inst)])
    }

    /// Working word count of `inst`.
    #[inline]
    pub(crate) fn count_of(&self, inst: u32) -> usize {
        word_count(self.words[self.shader.inst_offset(inst)]) as usize
    }

    /// Word count the instruction had when it was parsed. Rewrites shrink
    /// the working count but the parse-time slot extent never changes.
    #[inline]
    pub(crate) fn parsed_count_of(&self, inst: u32) -> usize {
        word_count(self.shader.words[self.shader.inst_offset(inst)]) as usize
    }

    #[inline]
    pub(crate) fn is_deleted(&self, inst: u32) -> bool {
        self.words[self.shader.inst_offset(inst)] == SENTINEL
    }

    /// Sentinel-fills the whole parse-time slot of `inst`.
    pub(crate) fn delete(&mut self, inst: u32) {
        let off = self.shader.inst_offset(inst);
        let count = self.parsed_count_of(inst);

        self.words[off..off + count].fill(SENTINEL);
    }

    /// Records that one use of result `id` went away.
    pub(crate) fn push_result(&mut self, id: u32) {
        self.result_stack.push(id);
    }

    /// Records that one reference to label `id` went away.
    pub(crate) fn push_label(&mut self, id: u32) {
        self.label_stack.push(id);
    }

    /// Drains the label stack, deleting every block whose reference count
    /// reaches zero. Deleting a block walks it forward, releasing the
    /// operands of each live instruction (which feeds the result stack and
    /// possibly this stack again) until the block's terminator is gone.
    ///
    /// Call before [`Context::drain_results`]: block deletion pushes
    /// results, but the result cascade never pushes labels.
    pub(crate) fn drain_labels(&mut self) {
        while let Some(id) = self.label_stack.pop() {
            let Some(label) = self.shader.result_producer(id) else {
                continue;
            };

            let degree = &mut self.in_degrees[label as usize];

            // a block may already be detached by the time a second
            // reduction reaches it
            if *degree == 0 {
                continue;
            }

            *degree -= 1;

            if *degree == 0 {
                self.delete_block(label);
            }
        }
    }

    /// Drains the result stack, deleting every producer whose use count
    /// reaches zero and releasing its own operands in turn.
    pub(crate) fn drain_results(&mut self) {
        while let Some(id) = self.result_stack.pop() {
            let Some(producer) = self.shader.result_producer(id) else {
                continue;
            };

            if self.is_deleted(producer) {
                continue;
            }

            let degree = &mut self.out_degrees[producer as usize];

            if *degree == 0 {
                continue;
            }

            *degree -= 1;

            if *degree == 0 {
                self.release_operands(producer);
                self.delete(producer);
            }
        }
    }

    /// Deletes the block starting at `label`: every live instruction from
    /// the label up to and including the block's terminator.
    fn delete_block(&mut self, label: u32) {
        let bound = self.shader.instructions.len() as u32;
        let mut inst = label;

        while inst < bound {
            if !self.is_deleted(inst) {
                let op = self.opcode_of(inst);

                self.release_operands(inst);
                self.delete(inst);

                if is_terminator(op) {
                    break;
                }
            }

            inst += 1;
        }
    }

    /// Pushes everything `inst` references onto the cascade stacks: its
    /// type, its id operands, and any label operands. Uses the working
    /// opcode and word count, so rewritten instructions release exactly the
    /// references they still hold.
    pub(crate) fn release_operands(&mut self, inst: u32) {
        let off = self.shader.inst_offset(inst);
        let count = self.count_of(inst);
        let op = self.opcode_of(inst);

        if result_layout(op) == ResultLayout::TypedResult {
            self.result_stack.push(self.words[off + 1]);
        }

        if let Some(layout) = operand_layout(op) {
            let (words, stack) = (&self.words[off..off + count], &mut self.result_stack);
            for_each_id_operand(words, layout, |rel| stack.push(words[rel as usize]));
        }

        if let Some(layout) = label_layout(op) {
            let (words, stack) = (&self.words[off..off + count], &mut self.label_stack);
            for_each_label_operand(words, layout, |rel| stack.push(words[rel as usize]));
        }
    }
}
