//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

#![allow(dead_code)]
#![deny(
    unreachable_pub,
    missing_docs,
    missing_abi,
    rust_2018_idioms,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links
)]

//! # Spinel
//!
//! A load-time specializer for SPIR-V shader binaries. Given a parsed
//! module and override values for its specialization constants, spinel
//! substitutes the constants, propagates them through arithmetic, logical,
//! and comparison instructions, folds conditional control flow whose guard
//! became known, removes the code that is now unreachable, and emits a
//! smaller but semantically-equivalent module.
//!
//! Parse once, specialize many times:
//!
//! ```no_run
//! use spinel::{Optimizer, Options, Shader, SpecConstant};
//!
//! # fn load() -> Vec<u8> { Vec::new() }
//! let bytes = load();
//! let shader = Shader::parse(&bytes)?;
//!
//! for constant in shader.spec_constants() {
//!     println!("spec id {} defaults to {:?}", constant.spec_id(), constant.values());
//! }
//!
//! let specialized = Optimizer::run(
//!     &shader,
//!     &[SpecConstant::new(7, &[0])],
//!     Options::default(),
//! )?;
//! # Ok::<(), spinel::Error>(())
//! ```
//!
//! File I/O, command-line handling, and validation are deliberately out of
//! scope: the library maps an in-memory buffer to an in-memory buffer.

pub mod error;
pub mod opt;
pub mod shader;
pub mod spv;
pub mod utility;

pub use error::{Error, OptimizeError, ParseError};
pub use opt::{Optimizer, Options};
pub use shader::{Shader, SpecConstant};

/// Parses and specializes in one step, with default options.
///
/// A convenience wrapper for callers that do not reuse the parsed
/// [`Shader`]; anything specializing the same module repeatedly should
/// parse once and call [`Optimizer::run`] per override set instead.
pub fn specialize(bytes: &[u8], overrides: &[SpecConstant]) -> Result<Vec<u8>, Error> {
    let shader = Shader::parse(bytes)?;
    let specialized = Optimizer::run(&shader, overrides, Options::default())?;

    Ok(specialized)
}
