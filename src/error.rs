//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Error types for parsing and optimization. Errors are fatal to the
//! operation that raised them; partial output is never produced.

use thiserror::Error;

/// Errors raised while parsing a SPIR-V module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The buffer is not a whole number of words, has fewer than the five
    /// header words, contains an instruction with word count zero, or an
    /// instruction runs past the end of the buffer.
    #[error("SPIR-V stream is truncated or an instruction over-runs it")]
    ShortInput,

    /// Word 0 of the header is not the SPIR-V magic number.
    #[error("invalid SPIR-V magic number {0:#010x}")]
    BadMagic(u32),

    /// The module's version is newer than the library supports.
    #[error("SPIR-V version {found:#x} is newer than the supported {max:#x}")]
    UnsupportedVersion {
        /// Version word found in the header.
        found: u32,
        /// Newest version the library accepts.
        max: u32,
    },

    /// An opcode outside the supported closed set.
    #[error("unsupported opcode {0}")]
    UnsupportedOpcode(u16),

    /// An id is out of bounds, never produced, or produced after a consumer
    /// that may not reference forward.
    #[error("id %{0} does not resolve to a defined result")]
    UndefinedId(u32),

    /// Two instructions claim the same result id.
    #[error("result id %{0} is produced twice")]
    DuplicateResult(u32),

    /// The module contains an `OpSwitch` but no 32-bit integer `OpConstant`
    /// is available to keep a collapsed switch well-formed.
    #[error("OpSwitch present but no 32-bit integer OpConstant was found")]
    MissingSwitchConstant,
}

/// Errors raised by an optimizer run. The shader itself is never mutated,
/// so a failed run leaves everything reusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OptimizeError {
    /// An override targets something that is not a specialization constant,
    /// or its value count does not match the constant's literal width.
    #[error("override for spec id {0} does not match the module's specialization constant")]
    BadSpecOverride(u32),

    /// Phi compaction could not locate the label opening the phi's block.
    #[error("OpPhi at word {0} has no enclosing label")]
    PhiWithoutLabel(u32),
}

/// Umbrella error for the [`specialize`](crate::specialize) convenience
/// entry point, which both parses and optimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The input module failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The optimizer rejected the run.
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
}
