//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The immutable shader model: a parsed SPIR-V module with its instruction
//! graph, degrees, specialization table, and evaluation schedule.
//!
//! Parsing happens once; the resulting [`Shader`] can then feed any number
//! of optimizer runs, including concurrent ones.

pub(crate) mod graph;
mod parse;

use crate::error::ParseError;
use crate::shader::graph::{Instruction, UseNode, NONE};
use crate::utility::SaHashMap;
use smallvec::SmallVec;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// A specialization constant: a `SpecId` paired with its value words.
///
/// The shader reports its defaults through
/// [`Shader::spec_constants`]; callers build the same type to describe
/// overrides for [`Optimizer::run`](crate::Optimizer::run).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct SpecConstant {
    spec_id: u32,
    values: SmallVec<[u32; 2]>,
}

impl SpecConstant {
    /// Creates a specialization constant value.
    ///
    /// For boolean constants `values` is a single word, nonzero meaning
    /// true. For `OpSpecConstant` it must match the constant's literal word
    /// count exactly.
    pub fn new(spec_id: u32, values: &[u32]) -> Self {
        Self {
            spec_id,
            values: SmallVec::from_slice(values),
        }
    }

    /// The `SpecId` this constant is decorated with.
    pub fn spec_id(&self) -> u32 {
        self.spec_id
    }

    /// The constant's value words.
    pub fn values(&self) -> &[u32] {
        &self.values
    }
}

/// Where a spec id points inside the module.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct SpecSlot {
    /// Result id of the decorated constant.
    pub(crate) target_id: u32,
    /// Instruction index of the `SpecId` decoration itself.
    pub(crate) decoration: u32,
}

/// A parsed SPIR-V module, immutable after [`Shader::parse`].
///
/// The shader owns a copy of the word stream plus the index-oriented graph
/// built over it: one entry per instruction, a result table mapping SSA ids
/// to producers, the use-lists, per-instruction degrees, and the evaluation
/// schedule. Optimizer runs borrow all of it read-only, so one shader can
/// be specialized from many threads at once.
#[derive(Debug, PartialEq)]
pub struct Shader {
    pub(crate) words: Vec<u32>,
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) results: Vec<u32>,
    pub(crate) use_nodes: Vec<UseNode>,
    pub(crate) decorations: Vec<u32>,
    pub(crate) phis: Vec<u32>,
    pub(crate) out_degrees: Vec<u32>,
    pub(crate) in_degrees: Vec<u32>,
    pub(crate) schedule: Vec<u32>,
    pub(crate) spec_constants: Vec<SpecConstant>,
    pub(crate) spec_slots: SaHashMap<u32, SpecSlot>,
    pub(crate) default_switch_constant: u32,
}

impl Shader {
    /// Parses a SPIR-V module from its little-endian byte encoding.
    ///
    /// The buffer must be a whole number of 32-bit words and start with a
    /// valid header. Every opcode must be in the supported subset, and all
    /// ids must resolve; see [`ParseError`] for the ways this can fail.
    pub fn parse(bytes: &[u8]) -> Result<Shader, ParseError> {
        parse::parse(bytes)
    }

    /// Whether the module contains no instructions at all.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The specialization constants declared by the module, with their
    /// default values.
    pub fn spec_constants(&self) -> &[SpecConstant] {
        &self.spec_constants
    }

    /// Word offset of instruction `inst`.
    #[inline]
    pub(crate) fn inst_offset(&self, inst: u32) -> usize {
        self.instructions[inst as usize].word_index as usize
    }

    /// The producing instruction of `id`, if the id is defined.
    #[inline]
    pub(crate) fn result_producer(&self, id: u32) -> Option<u32> {
        match self.results.get(id as usize) {
            Some(&producer) if producer != NONE => Some(producer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spv::*;
    use crate::utility::testing::ModuleAsm;

    /// A minimal module: one void function with an empty body.
    fn minimal() -> ModuleAsm {
        let mut m = ModuleAsm::new();
        m.preamble();
        let void = m.ty_void();
        let fn_ty = m.ty_fn(void);
        m.begin_function(void, fn_ty);
        m.label();
        m.ret();
        m.end_function();
        m
    }

    #[test]
    fn parses_minimal_module() {
        let shader = Shader::parse(&minimal().into_bytes()).unwrap();

        assert!(!shader.is_empty());
        assert!(shader.spec_constants().is_empty());
        assert_eq!(shader.instructions.len(), 8);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = minimal().into_bytes();
        bytes[0] = 0x42;

        assert!(matches!(
            Shader::parse(&bytes),
            Err(ParseError::BadMagic(_))
        ));
    }

    #[test]
    fn rejects_short_header() {
        let bytes = MAGIC.to_le_bytes();

        assert_eq!(Shader::parse(&bytes), Err(ParseError::ShortInput));
    }

    #[test]
    fn rejects_misaligned_input() {
        let mut bytes = minimal().into_bytes();
        bytes.pop();

        assert_eq!(Shader::parse(&bytes), Err(ParseError::ShortInput));
    }

    #[test]
    fn rejects_truncated_instruction() {
        let mut bytes = minimal().into_bytes();
        // rewrite the final OpFunctionEnd with a word count that runs past
        // the end of the buffer
        let last = bytes.len() - 4;
        bytes[last..].copy_from_slice(&header(OP_FUNCTION_END, 9).to_le_bytes());

        assert_eq!(Shader::parse(&bytes), Err(ParseError::ShortInput));
    }

    #[test]
    fn rejects_newer_version() {
        let m = ModuleAsm::with_version(0x0001_0700);

        assert!(matches!(
            Shader::parse(&m.into_bytes()),
            Err(ParseError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_unsupported_opcode() {
        let mut m = ModuleAsm::new();
        m.preamble();
        // OpGroupNonUniformBallot
        m.op(339, &[1, 2, 3, 4]);

        assert_eq!(
            Shader::parse(&m.into_bytes()),
            Err(ParseError::UnsupportedOpcode(339))
        );
    }

    #[test]
    fn rejects_duplicate_results() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let void = m.ty_void();
        m.op(OP_TYPE_BOOL, &[void]);

        assert_eq!(
            Shader::parse(&m.into_bytes()),
            Err(ParseError::DuplicateResult(void))
        );
    }

    #[test]
    fn rejects_undefined_operand() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let uint = m.ty_int(32, false);
        let a = m.constant(uint, 1);
        let sum = m.id();
        m.op(OP_I_ADD, &[uint, sum, a, 0xbeef]);

        assert_eq!(
            Shader::parse(&m.into_bytes()),
            Err(ParseError::UndefinedId(0xbeef))
        );
    }

    #[test]
    fn rejects_forward_value_reference() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let uint = m.ty_int(32, false);
        let a = m.constant(uint, 1);
        let later = m.id();
        let sum = m.id();
        m.op(OP_I_ADD, &[uint, sum, a, later]);
        m.op(OP_CONSTANT, &[uint, later, 5]);

        assert_eq!(
            Shader::parse(&m.into_bytes()),
            Err(ParseError::UndefinedId(later))
        );
    }

    #[test]
    fn rejects_switch_without_int_constant() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let void = m.ty_void();
        let bool_ty = m.ty_bool();
        let uint = m.ty_int(32, false);
        let sel = m.spec_constant(uint, &[0]);
        m.decorate_spec_id(sel, 3);
        let fn_ty = m.ty_fn(void);
        // module has a switch but the only scalar constant is a bool
        let _ = m.constant_bool(bool_ty, true);
        m.begin_function(void, fn_ty);
        m.label();
        let merge = m.id();
        let case = m.id();
        m.selection_merge(merge);
        m.switch(sel, merge, &[(4, case)]);
        m.label_with(case);
        m.branch(merge);
        m.label_with(merge);
        m.ret();
        m.end_function();

        assert_eq!(
            Shader::parse(&m.into_bytes()),
            Err(ParseError::MissingSwitchConstant)
        );
    }

    #[test]
    fn collects_spec_constants() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let bool_ty = m.ty_bool();
        let uint = m.ty_int(32, false);
        let flag = m.spec_constant_bool(bool_ty, true);
        let count = m.spec_constant(uint, &[16]);
        m.decorate_spec_id(flag, 7);
        m.decorate_spec_id(count, 3);

        let shader = Shader::parse(&m.into_bytes()).unwrap();
        let constants = shader.spec_constants();

        assert_eq!(constants.len(), 2);
        assert_eq!(constants[0].spec_id(), 7);
        assert_eq!(constants[0].values(), &[1]);
        assert_eq!(constants[1].spec_id(), 3);
        assert_eq!(constants[1].values(), &[16]);
    }

    #[test]
    fn out_degrees_count_every_use() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let uint = m.ty_int(32, false);
        let a = m.constant(uint, 2);
        let b = m.constant(uint, 3);
        let sum = m.binary(OP_I_ADD, uint, a, b);
        let _twice = m.binary(OP_I_MUL, uint, sum, a);

        let shader = Shader::parse(&m.into_bytes()).unwrap();
        let producer = |id| shader.result_producer(id).unwrap() as usize;

        // `a` feeds the add and the mul; `b` only the add
        assert_eq!(shader.out_degrees[producer(a)], 2);
        assert_eq!(shader.out_degrees[producer(b)], 1);
        assert_eq!(shader.out_degrees[producer(sum)], 1);
        // the uint type is used by four constants/results
        assert_eq!(shader.out_degrees[producer(uint)], 4);
    }

    #[test]
    fn label_degrees_count_branches_and_merges() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let void = m.ty_void();
        let bool_ty = m.ty_bool();
        let cond = m.constant_bool(bool_ty, true);
        let fn_ty = m.ty_fn(void);
        m.begin_function(void, fn_ty);
        m.label();
        let then = m.id();
        let otherwise = m.id();
        let merge = m.id();
        m.selection_merge(merge);
        m.branch_cond(cond, then, otherwise);
        m.label_with(then);
        m.branch(merge);
        m.label_with(otherwise);
        m.branch(merge);
        m.label_with(merge);
        m.ret();
        m.end_function();

        let shader = Shader::parse(&m.into_bytes()).unwrap();
        let producer = |id| shader.result_producer(id).unwrap() as usize;

        assert_eq!(shader.in_degrees[producer(then)], 1);
        assert_eq!(shader.in_degrees[producer(otherwise)], 1);
        // two branches plus the selection merge
        assert_eq!(shader.in_degrees[producer(merge)], 3);
    }

    #[test]
    fn schedule_orders_operands_first() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let uint = m.ty_int(32, false);
        let a = m.constant(uint, 2);
        let sum = m.binary(OP_I_ADD, uint, a, a);

        let shader = Shader::parse(&m.into_bytes()).unwrap();
        let position = |id| {
            let inst = shader.result_producer(id).unwrap();
            shader.schedule.iter().position(|&x| x == inst).unwrap()
        };

        assert_eq!(shader.schedule.len(), shader.instructions.len());
        assert!(position(uint) < position(a));
        assert!(position(a) < position(sum));
    }

    #[test]
    fn remembers_first_int32_constant_for_switches() {
        let mut m = ModuleAsm::new();
        m.preamble();
        let uint = m.ty_int(32, false);
        let first = m.constant(uint, 9);
        let _second = m.constant(uint, 10);

        let shader = Shader::parse(&m.into_bytes()).unwrap();

        assert_eq!(shader.default_switch_constant, first);
    }
}
