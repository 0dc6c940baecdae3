//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Pass 1: substitute override values into the working buffer, turning
//! specialization constants into plain constants and retiring their
//! `SpecId` decorations.

use crate::error::OptimizeError;
use crate::opt::context::Context;
use crate::shader::SpecConstant;
use crate::spv::*;
use tracing::trace;

/// Applies every override that matches a `SpecId` in the module. Overrides
/// for unknown spec ids are ignored; mismatched value counts and malformed
/// targets are errors.
pub(crate) fn patch_spec_constants(
    ctx: &mut Context<'_>,
    overrides: &[SpecConstant],
) -> Result<(), OptimizeError> {
    for constant in overrides {
        let spec_id = constant.spec_id();

        let Some(slot) = ctx.shader.spec_slots.get(&spec_id).copied() else {
            continue;
        };

        // the slot's target id was resolved at parse time
        let target = ctx.shader.result_producer(slot.target_id).unwrap();
        let off = ctx.shader.inst_offset(target);
        let values = constant.values();

        // dispatch on the parsed opcode; the working word may already have
        // been rewritten by a duplicate override
        match opcode(ctx.shader.words[off]) {
            OP_SPEC_CONSTANT_TRUE | OP_SPEC_CONSTANT_FALSE => {
                if values.len() != 1 {
                    return Err(OptimizeError::BadSpecOverride(spec_id));
                }

                let op = if values[0] != 0 {
                    OP_CONSTANT_TRUE
                } else {
                    OP_CONSTANT_FALSE
                };

                ctx.words[off] = (ctx.words[off] & 0xffff_0000) | u32::from(op);
            }
            OP_SPEC_CONSTANT => {
                let count = ctx.parsed_count_of(target);

                if values.len() != count - 3 {
                    return Err(OptimizeError::BadSpecOverride(spec_id));
                }

                ctx.words[off] = (ctx.words[off] & 0xffff_0000) | u32::from(OP_CONSTANT);
                ctx.words[off + 3..off + count].copy_from_slice(values);
            }
            _ => return Err(OptimizeError::BadSpecOverride(spec_id)),
        }

        trace!(spec_id, ?values, "patched specialization constant");

        // the constant is no longer specializable, so the decoration goes
        ctx.delete(slot.decoration);
    }

    Ok(())
}
