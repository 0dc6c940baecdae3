//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The specialization optimizer.
//!
//! [`Optimizer::run`] is a stateless function over a parsed [`Shader`] and
//! a list of override values. It copies the word stream, patches the
//! overridden specialization constants, propagates constants through the
//! module, collapses conditional control flow whose guard became known,
//! deletes everything that is no longer reachable or referenced, and emits
//! the compacted module. The shader itself is never mutated, so any number
//! of runs (including concurrent ones) can share it.

mod compact;
mod context;
mod eval;
mod fold;
mod patch;
mod phi;

use crate::error::OptimizeError;
use crate::opt::context::Context;
use crate::shader::{Shader, SpecConstant};
use tracing::debug;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// Tunables for an optimizer run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Options {
    /// Strip `OpName` / `OpMemberName` / `OpSource` debug metadata from the
    /// output. On by default; turning it off makes a run with no effective
    /// overrides reproduce its input byte-for-byte.
    pub remove_dead_code: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            remove_dead_code: true,
        }
    }
}

/// Specializes parsed shaders. See [`Optimizer::run`].
pub struct Optimizer;

impl Optimizer {
    /// Runs the optimizer over `shader` with the given overrides.
    ///
    /// Overrides whose spec id does not appear in the module are silently
    /// ignored, matching pipeline-creation semantics. An override whose
    /// value count does not match its constant fails with
    /// [`OptimizeError::BadSpecOverride`] and produces no output.
    ///
    /// The emitted module keeps the input's header verbatim (ids are not
    /// renumbered) and is never larger than the input.
    pub fn run(
        shader: &Shader,
        overrides: &[SpecConstant],
        options: Options,
    ) -> Result<Vec<u8>, OptimizeError> {
        let mut ctx = Context::new(shader);

        patch::patch_spec_constants(&mut ctx, overrides)?;
        fold::run(&mut ctx);
        compact::clean_decorations(&mut ctx);
        phi::compact_phis(&mut ctx)?;

        let out = compact::compact_stream(&ctx, options);

        debug!(
            input_bytes = shader.words.len() * 4,
            output_bytes = out.len(),
            overrides = overrides.len(),
            "specialized module"
        );

        Ok(out)
    }
}
