//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Pass 2: visit every instruction in schedule order, resolving results to
//! constants where possible and collapsing `OpBranchConditional`/`OpSwitch`
//! whose guard turned out constant. Collapsing a terminator drops label
//! references, which can delete whole blocks, which in turn can delete the
//! producers whose only uses lived there.

use crate::opt::context::Context;
use crate::opt::eval;
use crate::spv::*;
use tracing::trace;

/// Runs evaluation and terminator folding over the whole schedule.
pub(crate) fn run(ctx: &mut Context<'_>) {
    for i in 0..ctx.shader.schedule.len() {
        let inst = ctx.shader.schedule[i];

        if ctx.is_deleted(inst) {
            continue;
        }

        match ctx.opcode_of(inst) {
            OP_BRANCH_CONDITIONAL | OP_SWITCH => fold_terminator(ctx, inst),
            op => {
                let off = ctx.shader.inst_offset(inst);

                match result_layout(op) {
                    ResultLayout::None => {}
                    // plain results (labels, types, strings) have nothing
                    // to evaluate
                    ResultLayout::Result => {}
                    ResultLayout::TypedResult => {
                        let result = ctx.words[off + 2];
                        eval::evaluate(ctx, inst, result);
                    }
                }
            }
        }
    }
}

/// Collapses a conditional terminator whose guard is a known constant into
/// an unconditional branch (or a degenerate switch), then cascades the
/// degree reductions for everything the collapse released.
fn fold_terminator(ctx: &mut Context<'_>, inst: u32) {
    let off = ctx.shader.inst_offset(inst);
    let op = ctx.opcode_of(inst);

    // a conditional needs its guard plus both targets, a switch its
    // selector plus the default; anything shorter is left alone
    let required = if op == OP_BRANCH_CONDITIONAL { 4 } else { 3 };
    if ctx.count_of(inst) < required {
        return;
    }

    let guard = ctx.words[off + 1];

    let Some(&eval::Resolution::Constant(value)) = ctx.resolutions.get(guard as usize) else {
        return;
    };

    match op {
        OP_BRANCH_CONDITIONAL => fold_branch_conditional(ctx, inst, off, value),
        OP_SWITCH => fold_switch(ctx, inst, off, value),
        _ => unreachable!(),
    }

    // the guard lost its use in this terminator
    ctx.push_result(guard);
    ctx.drain_labels();
    ctx.drain_results();
}

fn fold_branch_conditional(ctx: &mut Context<'_>, inst: u32, off: usize, value: u32) {
    let (chosen, rejected) = if value != 0 {
        (ctx.words[off + 2], ctx.words[off + 3])
    } else {
        (ctx.words[off + 3], ctx.words[off + 2])
    };

    ctx.push_label(rejected);

    // a structured selection can't keep its merge annotation once the
    // branch is unconditional, so the merge's slot becomes the branch and
    // the conditional's slot goes away entirely
    let merge = inst.checked_sub(1).filter(|&prev| {
        !ctx.is_deleted(prev) && ctx.opcode_of(prev) == OP_SELECTION_MERGE
    });

    match merge {
        Some(prev) => {
            let prev_off = ctx.shader.inst_offset(prev);
            let prev_count = ctx.parsed_count_of(prev);

            ctx.push_label(ctx.words[prev_off + 1]);

            ctx.words[prev_off] = header(OP_BRANCH, 2);
            ctx.words[prev_off + 1] = chosen;
            ctx.words[prev_off + 2..prev_off + prev_count].fill(SENTINEL);

            ctx.delete(inst);
        }
        None => {
            let count = ctx.parsed_count_of(inst);

            ctx.words[off] = header(OP_BRANCH, 2);
            ctx.words[off + 1] = chosen;
            ctx.words[off + 2..off + count].fill(SENTINEL);
        }
    }

    trace!(chosen, "folded OpBranchConditional");
}

fn fold_switch(ctx: &mut Context<'_>, inst: u32, off: usize, value: u32) {
    let count = ctx.parsed_count_of(inst);
    let default_label = ctx.words[off + 2];
    let mut chosen = None;

    // scan (literal, label) case pairs; everything not taken loses its
    // incoming reference
    let mut pos = 3;
    while pos + 1 < count {
        if chosen.is_none() && ctx.words[off + pos] == value {
            chosen = Some(ctx.words[off + pos + 1]);
        } else {
            ctx.push_label(ctx.words[off + pos + 1]);
        }

        pos += 2;
    }

    let chosen = match chosen {
        Some(label) => {
            ctx.push_label(default_label);
            label
        }
        None => default_label,
    };

    // collapse to a degenerate one-target switch over an arbitrary int
    // constant, which sidesteps rewriting any surrounding merge
    let selector = ctx.shader.default_switch_constant;
    let producer = ctx.shader.result_producer(selector).unwrap();

    ctx.words[off] = header(OP_SWITCH, 3);
    ctx.words[off + 1] = selector;
    ctx.words[off + 2] = chosen;
    ctx.words[off + 3..off + count].fill(SENTINEL);

    // the degenerate switch is a brand-new use of the selector constant
    ctx.out_degrees[producer as usize] += 1;

    trace!(chosen, "folded OpSwitch");
}
