//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Pass 4: compact every surviving `OpPhi`, dropping (value, predecessor)
//! pairs whose predecessor block was deleted or no longer branches to the
//! phi's block. Runs after all terminator folding so each phi is compacted
//! exactly once; a phi that is already compact passes through untouched.

use crate::error::OptimizeError;
use crate::opt::context::Context;
use crate::spv::*;
use smallvec::SmallVec;

/// Compacts all live phis and cascades the use counts of dropped values.
pub(crate) fn compact_phis(ctx: &mut Context<'_>) -> Result<(), OptimizeError> {
    for i in 0..ctx.shader.phis.len() {
        let phi = ctx.shader.phis[i];

        if ctx.is_deleted(phi) {
            continue;
        }

        compact(ctx, phi)?;
        ctx.drain_results();
    }

    Ok(())
}

fn compact(ctx: &mut Context<'_>, phi: u32) -> Result<(), OptimizeError> {
    let off = ctx.shader.inst_offset(phi);
    let count = ctx.count_of(phi);
    let block_label = enclosing_label(ctx, phi)?;

    let mut kept: SmallVec<[(u32, u32); 4]> = SmallVec::new();

    let mut pos = 3;
    while pos + 1 < count {
        let value = ctx.words[off + pos];
        let predecessor = ctx.words[off + pos + 1];

        if edge_survives(ctx, predecessor, block_label) {
            kept.push((value, predecessor));
        } else {
            ctx.push_result(value);
        }

        pos += 2;
    }

    let compacted = 3 + 2 * kept.len();

    if compacted == count {
        return Ok(());
    }

    for (i, (value, predecessor)) in kept.into_iter().enumerate() {
        ctx.words[off + 3 + 2 * i] = value;
        ctx.words[off + 4 + 2 * i] = predecessor;
    }

    ctx.words[off] = header(OP_PHI, compacted as u32);
    ctx.words[off + compacted..off + count].fill(SENTINEL);

    Ok(())
}

/// Finds the result id of the label opening the phi's block by scanning
/// backwards in parse order.
fn enclosing_label(ctx: &Context<'_>, phi: u32) -> Result<u32, OptimizeError> {
    for inst in (0..phi).rev() {
        if ctx.is_deleted(inst) {
            continue;
        }

        if ctx.opcode_of(inst) == OP_LABEL {
            let off = ctx.shader.inst_offset(inst);

            return Ok(ctx.words[off + 1]);
        }
    }

    Err(OptimizeError::PhiWithoutLabel(
        ctx.shader.inst_offset(phi) as u32
    ))
}

/// Whether `predecessor`'s block is still alive and its terminator still
/// names the phi's block.
fn edge_survives(ctx: &Context<'_>, predecessor: u32, block_label: u32) -> bool {
    let Some(label) = ctx.shader.result_producer(predecessor) else {
        return false;
    };

    if ctx.is_deleted(label) {
        return false;
    }

    // walk the predecessor block to its terminator and check its targets
    let bound = ctx.shader.instructions.len() as u32;
    let mut inst = label;

    while inst < bound {
        if !ctx.is_deleted(inst) {
            let op = ctx.opcode_of(inst);

            if is_terminator(op) {
                let Some(layout) = label_layout(op) else {
                    return false;
                };

                let off = ctx.shader.inst_offset(inst);
                let count = ctx.count_of(inst);
                let words = &ctx.words[off..off + count];
                let mut named = false;

                for_each_label_operand(words, layout, |rel| {
                    named |= words[rel as usize] == block_label;
                });

                return named;
            }
        }

        inst += 1;
    }

    false
}
