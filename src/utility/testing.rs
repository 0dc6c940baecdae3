//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! A tiny SPIR-V assembler for unit tests. It emits word-exact modules so
//! tests can state expectations about specific instructions and offsets.

use crate::spv::*;

/// Builds a SPIR-V module word-by-word. Ids are handed out sequentially;
/// targets of forward branches can be reserved with [`ModuleAsm::id`] and
/// attached later with [`ModuleAsm::label_with`].
pub(crate) struct ModuleAsm {
    words: Vec<u32>,
    next_id: u32,
    version: u32,
}

impl ModuleAsm {
    pub(crate) fn new() -> Self {
        Self::with_version(0x0001_0000)
    }

    pub(crate) fn with_version(version: u32) -> Self {
        Self {
            words: Vec::new(),
            next_id: 1,
            version,
        }
    }

    /// Reserves the next result id.
    pub(crate) fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Emits a raw instruction.
    pub(crate) fn op(&mut self, op: u16, operands: &[u32]) {
        self.words.push(header(op, operands.len() as u32 + 1));
        self.words.extend_from_slice(operands);
    }

    /// Emits `OpCapability Shader` and the usual logical/GLSL450 memory
    /// model, which every test module starts with.
    pub(crate) fn preamble(&mut self) {
        self.op(OP_CAPABILITY, &[1]);
        self.op(OP_MEMORY_MODEL, &[0, 1]);
    }

    /// Emits `OpSource GLSL 450`.
    pub(crate) fn source(&mut self) {
        self.op(OP_SOURCE, &[2, 450]);
    }

    /// Emits `OpName target "name"`.
    pub(crate) fn name(&mut self, target: u32, name: &str) {
        let mut operands = vec![target];
        operands.extend(pack_string(name));
        self.op(OP_NAME, &operands);
    }

    pub(crate) fn ty_void(&mut self) -> u32 {
        let id = self.id();
        self.op(OP_TYPE_VOID, &[id]);
        id
    }

    pub(crate) fn ty_bool(&mut self) -> u32 {
        let id = self.id();
        self.op(OP_TYPE_BOOL, &[id]);
        id
    }

    pub(crate) fn ty_int(&mut self, width: u32, signed: bool) -> u32 {
        let id = self.id();
        self.op(OP_TYPE_INT, &[id, width, u32::from(signed)]);
        id
    }

    pub(crate) fn ty_fn(&mut self, ret: u32) -> u32 {
        let id = self.id();
        self.op(OP_TYPE_FUNCTION, &[id, ret]);
        id
    }

    pub(crate) fn constant(&mut self, ty: u32, value: u32) -> u32 {
        let id = self.id();
        self.op(OP_CONSTANT, &[ty, id, value]);
        id
    }

    pub(crate) fn constant_bool(&mut self, ty: u32, value: bool) -> u32 {
        let id = self.id();
        let op = if value { OP_CONSTANT_TRUE } else { OP_CONSTANT_FALSE };
        self.op(op, &[ty, id]);
        id
    }

    pub(crate) fn spec_constant(&mut self, ty: u32, values: &[u32]) -> u32 {
        let id = self.id();
        let mut operands = vec![ty, id];
        operands.extend_from_slice(values);
        self.op(OP_SPEC_CONSTANT, &operands);
        id
    }

    pub(crate) fn spec_constant_bool(&mut self, ty: u32, value: bool) -> u32 {
        let id = self.id();
        let op = if value {
            OP_SPEC_CONSTANT_TRUE
        } else {
            OP_SPEC_CONSTANT_FALSE
        };
        self.op(op, &[ty, id]);
        id
    }

    pub(crate) fn decorate_spec_id(&mut self, target: u32, spec_id: u32) {
        self.op(OP_DECORATE, &[target, DECORATION_SPEC_ID, spec_id]);
    }

    pub(crate) fn unary(&mut self, op: u16, ty: u32, a: u32) -> u32 {
        let id = self.id();
        self.op(op, &[ty, id, a]);
        id
    }

    pub(crate) fn binary(&mut self, op: u16, ty: u32, a: u32, b: u32) -> u32 {
        let id = self.id();
        self.op(op, &[ty, id, a, b]);
        id
    }

    pub(crate) fn select(&mut self, ty: u32, cond: u32, a: u32, b: u32) -> u32 {
        let id = self.id();
        self.op(OP_SELECT, &[ty, id, cond, a, b]);
        id
    }

    /// Emits `OpFunction` with no function control.
    pub(crate) fn begin_function(&mut self, ret_ty: u32, fn_ty: u32) -> u32 {
        let id = self.id();
        self.op(OP_FUNCTION, &[ret_ty, id, 0, fn_ty]);
        id
    }

    pub(crate) fn end_function(&mut self) {
        self.op(OP_FUNCTION_END, &[]);
    }

    /// Emits `OpLabel` with a fresh id.
    pub(crate) fn label(&mut self) -> u32 {
        let id = self.id();
        self.op(OP_LABEL, &[id]);
        id
    }

    /// Emits `OpLabel` with a previously reserved id, for blocks that are
    /// branched to before they appear.
    pub(crate) fn label_with(&mut self, id: u32) {
        self.op(OP_LABEL, &[id]);
    }

    pub(crate) fn branch(&mut self, target: u32) {
        self.op(OP_BRANCH, &[target]);
    }

    pub(crate) fn branch_cond(&mut self, cond: u32, then: u32, otherwise: u32) {
        self.op(OP_BRANCH_CONDITIONAL, &[cond, then, otherwise]);
    }

    pub(crate) fn selection_merge(&mut self, merge: u32) {
        self.op(OP_SELECTION_MERGE, &[merge, 0]);
    }

    pub(crate) fn switch(&mut self, selector: u32, default: u32, cases: &[(u32, u32)]) {
        let mut operands = vec![selector, default];
        for &(literal, label) in cases {
            operands.push(literal);
            operands.push(label);
        }
        self.op(OP_SWITCH, &operands);
    }

    pub(crate) fn phi(&mut self, ty: u32, pairs: &[(u32, u32)]) -> u32 {
        let id = self.id();
        let mut operands = vec![ty, id];
        for &(value, pred) in pairs {
            operands.push(value);
            operands.push(pred);
        }
        self.op(OP_PHI, &operands);
        id
    }

    pub(crate) fn ret(&mut self) {
        self.op(OP_RETURN, &[]);
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        let mut words = vec![MAGIC, self.version, 0, self.next_id, 0];
        words.extend(self.words);

        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

/// Packs a string into null-terminated little-endian words.
pub(crate) fn pack_string(s: &str) -> Vec<u32> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);

    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }

    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
