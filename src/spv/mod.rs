//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Opcode metadata for the supported SPIR-V subset.
//!
//! Everything here is a pure function of an opcode; no state, no allocation.
//! The rest of the library treats these tables as ground truth for the
//! word-level shape of instructions.

mod grammar;
mod ops;

pub use grammar::*;
pub use ops::*;
