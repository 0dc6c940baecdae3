//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Pass 3 and pass 5: decoration cleanup and the final stream compaction.

use crate::opt::context::Context;
use crate::opt::Options;
use crate::spv::*;

/// Deletes every decoration whose target instruction is gone. Runs after
/// terminator folding and before phi compaction and stream compaction.
pub(crate) fn clean_decorations(ctx: &mut Context<'_>) {
    for i in 0..ctx.shader.decorations.len() {
        let decoration = ctx.shader.decorations[i];

        if ctx.is_deleted(decoration) {
            continue;
        }

        let off = ctx.shader.inst_offset(decoration);
        let target = ctx.words[off + 1];

        // parse validated every decoration target, so a missing producer
        // can only mean the instruction was deleted this run
        let dead = match ctx.shader.result_producer(target) {
            Some(producer) => ctx.is_deleted(producer),
            None => true,
        };

        if dead {
            ctx.delete(decoration);
        }
    }
}

/// Copies every surviving instruction into a fresh, contiguous byte buffer
/// behind the verbatim 5-word header.
pub(crate) fn compact_stream(ctx: &Context<'_>, options: Options) -> Vec<u8> {
    let mut out: Vec<u32> = Vec::with_capacity(ctx.words.len());
    out.extend_from_slice(&ctx.words[..HEADER_WORDS as usize]);

    for inst in 0..ctx.shader.instructions.len() as u32 {
        let off = ctx.shader.inst_offset(inst);
        let word = ctx.words[off];

        if word == SENTINEL {
            continue;
        }

        if options.remove_dead_code && is_metadata_droppable(opcode(word)) {
            continue;
        }

        let count = word_count(word) as usize;
        out.extend_from_slice(&ctx.words[off..off + count]);
    }

    out.iter().flat_map(|w| w.to_le_bytes()).collect()
}
