//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Pure classifiers describing the word-level structure of every supported
//! instruction. These tables are the single source of truth: parsing,
//! use-graph construction, degree bookkeeping during deletion, and stream
//! compaction all consult the same functions, so extending opcode coverage
//! means extending the tables here and nothing else.

use crate::spv::ops::*;

/// Where an instruction's result id lives, if it produces one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResultLayout {
    /// The instruction produces no result.
    None,
    /// The result id is at word 1, with no type operand (`OpLabel`,
    /// `OpString`, every `OpType*`).
    Result,
    /// The type id is at word 1 and the result id at word 2.
    TypedResult,
}

/// A literal slot embedded in an instruction's id-operand sequence that the
/// operand walk must step over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Skip {
    /// Zero-based position of the literal within the operand sequence.
    pub index: u32,
    /// Whether the literal is a null-terminated string (spanning
    /// `⌈(len + 1) / 4⌉` words) rather than a single word.
    pub is_string: bool,
}

/// Layout of an instruction's id operands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OperandLayout {
    /// Word index of the first operand, relative to the instruction.
    pub start: u32,
    /// Number of id operands; `u32::MAX` means "through the end of the
    /// instruction". Always clamped by the actual word count.
    pub count: u32,
    /// Distance between consecutive id operands (2 for `OpPhi`, which
    /// interleaves predecessor labels the walk must not touch).
    pub stride: u32,
    /// Optional literal slot inside the sequence.
    pub skip: Option<Skip>,
}

impl OperandLayout {
    const fn new(start: u32, count: u32) -> Self {
        Self {
            start,
            count,
            stride: 1,
            skip: None,
        }
    }

    const fn strided(start: u32, count: u32, stride: u32) -> Self {
        Self {
            start,
            count,
            stride,
            skip: None,
        }
    }

    const fn skipping(start: u32, count: u32, index: u32, is_string: bool) -> Self {
        Self {
            start,
            count,
            stride: 1,
            skip: Some(Skip { index, is_string }),
        }
    }
}

/// Layout of the label ids carried by a control-flow instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LabelLayout {
    /// Word index of the first label id, relative to the instruction.
    pub start: u32,
    /// Number of label ids; `u32::MAX` means "through the end".
    pub count: u32,
    /// Distance between consecutive label ids (2 for `OpSwitch`, which
    /// interleaves case literals).
    pub stride: u32,
}

/// Whether `op` is in the closed set of instructions the library handles.
/// Anything else aborts parsing.
pub fn is_supported(op: u16) -> bool {
    #[rustfmt::skip]
    const SUPPORTED: &[u16] = &[
        OP_NOP, OP_UNDEF, OP_SOURCE_CONTINUED, OP_SOURCE, OP_SOURCE_EXTENSION,
        OP_NAME, OP_MEMBER_NAME, OP_STRING, OP_LINE,
        OP_EXTENSION, OP_EXT_INST_IMPORT, OP_EXT_INST,
        OP_MEMORY_MODEL, OP_ENTRY_POINT, OP_EXECUTION_MODE, OP_CAPABILITY,
        OP_TYPE_VOID, OP_TYPE_BOOL, OP_TYPE_INT, OP_TYPE_FLOAT, OP_TYPE_VECTOR,
        OP_TYPE_MATRIX, OP_TYPE_IMAGE, OP_TYPE_SAMPLER, OP_TYPE_SAMPLED_IMAGE,
        OP_TYPE_ARRAY, OP_TYPE_RUNTIME_ARRAY, OP_TYPE_STRUCT, OP_TYPE_POINTER,
        OP_TYPE_FUNCTION,
        OP_CONSTANT_TRUE, OP_CONSTANT_FALSE, OP_CONSTANT, OP_CONSTANT_COMPOSITE,
        OP_CONSTANT_NULL,
        OP_SPEC_CONSTANT_TRUE, OP_SPEC_CONSTANT_FALSE, OP_SPEC_CONSTANT,
        OP_FUNCTION, OP_FUNCTION_PARAMETER, OP_FUNCTION_END, OP_FUNCTION_CALL,
        OP_VARIABLE, OP_LOAD, OP_STORE, OP_ACCESS_CHAIN, OP_IN_BOUNDS_ACCESS_CHAIN,
        OP_DECORATE, OP_MEMBER_DECORATE,
        OP_VECTOR_SHUFFLE, OP_COMPOSITE_CONSTRUCT, OP_COMPOSITE_EXTRACT,
        OP_COMPOSITE_INSERT, OP_COPY_OBJECT,
        OP_SAMPLED_IMAGE, OP_IMAGE_SAMPLE_IMPLICIT_LOD, OP_IMAGE_SAMPLE_EXPLICIT_LOD,
        OP_IMAGE_FETCH, OP_IMAGE,
        OP_CONVERT_F_TO_U, OP_CONVERT_F_TO_S, OP_CONVERT_S_TO_F, OP_CONVERT_U_TO_F,
        OP_U_CONVERT, OP_S_CONVERT, OP_F_CONVERT, OP_BITCAST,
        OP_S_NEGATE, OP_F_NEGATE,
        OP_I_ADD, OP_F_ADD, OP_I_SUB, OP_F_SUB, OP_I_MUL, OP_F_MUL,
        OP_U_DIV, OP_S_DIV, OP_F_DIV, OP_U_MOD, OP_S_REM, OP_S_MOD, OP_F_REM,
        OP_F_MOD, OP_VECTOR_TIMES_SCALAR, OP_MATRIX_TIMES_VECTOR, OP_DOT,
        OP_ANY, OP_ALL,
        OP_LOGICAL_EQUAL, OP_LOGICAL_NOT_EQUAL, OP_LOGICAL_OR, OP_LOGICAL_AND,
        OP_LOGICAL_NOT, OP_SELECT,
        OP_I_EQUAL, OP_I_NOT_EQUAL,
        OP_U_GREATER_THAN, OP_S_GREATER_THAN, OP_U_GREATER_THAN_EQUAL,
        OP_S_GREATER_THAN_EQUAL, OP_U_LESS_THAN, OP_S_LESS_THAN,
        OP_U_LESS_THAN_EQUAL, OP_S_LESS_THAN_EQUAL,
        OP_F_ORD_EQUAL, OP_F_UNORD_EQUAL, OP_F_ORD_NOT_EQUAL, OP_F_UNORD_NOT_EQUAL,
        OP_F_ORD_LESS_THAN, OP_F_UNORD_LESS_THAN, OP_F_ORD_GREATER_THAN,
        OP_F_UNORD_GREATER_THAN, OP_F_ORD_LESS_THAN_EQUAL,
        OP_F_UNORD_LESS_THAN_EQUAL, OP_F_ORD_GREATER_THAN_EQUAL,
        OP_F_UNORD_GREATER_THAN_EQUAL,
        OP_SHIFT_RIGHT_LOGICAL, OP_SHIFT_RIGHT_ARITHMETIC, OP_SHIFT_LEFT_LOGICAL,
        OP_BITWISE_OR, OP_BITWISE_XOR, OP_BITWISE_AND, OP_NOT,
        OP_DPDX, OP_DPDY, OP_FWIDTH,
        OP_PHI, OP_SELECTION_MERGE, OP_LABEL, OP_BRANCH, OP_BRANCH_CONDITIONAL,
        OP_SWITCH, OP_KILL, OP_RETURN, OP_RETURN_VALUE, OP_UNREACHABLE,
    ];

    SUPPORTED.contains(&op)
}

/// Whether `op` is debug metadata that compaction strips when dead-code
/// removal is enabled.
pub fn is_metadata_droppable(op: u16) -> bool {
    matches!(op, OP_SOURCE | OP_NAME | OP_MEMBER_NAME)
}

/// Whether `op` ends a basic block.
pub fn is_terminator(op: u16) -> bool {
    matches!(
        op,
        OP_BRANCH
            | OP_BRANCH_CONDITIONAL
            | OP_SWITCH
            | OP_RETURN
            | OP_RETURN_VALUE
            | OP_KILL
            | OP_UNREACHABLE
    )
}

/// Where `op` puts its result id, if anywhere.
pub fn result_layout(op: u16) -> ResultLayout {
    match op {
        OP_STRING | OP_EXT_INST_IMPORT | OP_LABEL => ResultLayout::Result,
        OP_TYPE_VOID
        | OP_TYPE_BOOL
        | OP_TYPE_INT
        | OP_TYPE_FLOAT
        | OP_TYPE_VECTOR
        | OP_TYPE_MATRIX
        | OP_TYPE_IMAGE
        | OP_TYPE_SAMPLER
        | OP_TYPE_SAMPLED_IMAGE
        | OP_TYPE_ARRAY
        | OP_TYPE_RUNTIME_ARRAY
        | OP_TYPE_STRUCT
        | OP_TYPE_POINTER
        | OP_TYPE_FUNCTION => ResultLayout::Result,
        OP_NOP
        | OP_SOURCE_CONTINUED
        | OP_SOURCE
        | OP_SOURCE_EXTENSION
        | OP_NAME
        | OP_MEMBER_NAME
        | OP_LINE
        | OP_EXTENSION
        | OP_MEMORY_MODEL
        | OP_ENTRY_POINT
        | OP_EXECUTION_MODE
        | OP_CAPABILITY
        | OP_FUNCTION_END
        | OP_STORE
        | OP_DECORATE
        | OP_MEMBER_DECORATE
        | OP_SELECTION_MERGE
        | OP_BRANCH
        | OP_BRANCH_CONDITIONAL
        | OP_SWITCH
        | OP_KILL
        | OP_RETURN
        | OP_RETURN_VALUE
        | OP_UNREACHABLE => ResultLayout::None,
        _ => ResultLayout::TypedResult,
    }
}

/// The id-operand layout of `op`, or `None` if it carries no id operands
/// beyond its type.
pub fn operand_layout(op: u16) -> Option<OperandLayout> {
    let layout = match op {
        // annotation / mode-setting
        OP_LINE | OP_EXECUTION_MODE | OP_RETURN_VALUE => OperandLayout::new(1, 1),
        OP_ENTRY_POINT => OperandLayout::skipping(2, u32::MAX, 1, true),
        OP_EXT_INST => OperandLayout::skipping(3, u32::MAX, 1, false),

        // type constructors referencing other ids
        OP_TYPE_VECTOR | OP_TYPE_MATRIX | OP_TYPE_IMAGE | OP_TYPE_SAMPLED_IMAGE
        | OP_TYPE_RUNTIME_ARRAY => OperandLayout::new(2, 1),
        OP_TYPE_ARRAY => OperandLayout::new(2, 2),
        OP_TYPE_STRUCT | OP_TYPE_FUNCTION => OperandLayout::new(2, u32::MAX),
        OP_TYPE_POINTER => OperandLayout::new(3, 1),

        OP_CONSTANT_COMPOSITE | OP_COMPOSITE_CONSTRUCT | OP_ACCESS_CHAIN
        | OP_IN_BOUNDS_ACCESS_CHAIN | OP_FUNCTION_CALL => OperandLayout::new(3, u32::MAX),

        OP_FUNCTION => OperandLayout::new(4, 1),
        // the lone id operand of OpVariable is its optional initializer
        OP_VARIABLE => OperandLayout::new(4, 1),
        OP_LOAD => OperandLayout::new(3, 1),
        OP_STORE => OperandLayout::new(1, 2),

        OP_VECTOR_SHUFFLE | OP_COMPOSITE_INSERT | OP_SAMPLED_IMAGE => OperandLayout::new(3, 2),
        OP_COMPOSITE_EXTRACT | OP_COPY_OBJECT | OP_IMAGE => OperandLayout::new(3, 1),

        OP_IMAGE_SAMPLE_IMPLICIT_LOD | OP_IMAGE_SAMPLE_EXPLICIT_LOD | OP_IMAGE_FETCH => {
            OperandLayout::skipping(3, u32::MAX, 2, false)
        }

        // unary value operations
        OP_CONVERT_F_TO_U | OP_CONVERT_F_TO_S | OP_CONVERT_S_TO_F | OP_CONVERT_U_TO_F
        | OP_U_CONVERT | OP_S_CONVERT | OP_F_CONVERT | OP_BITCAST | OP_S_NEGATE
        | OP_F_NEGATE | OP_ANY | OP_ALL | OP_LOGICAL_NOT | OP_NOT | OP_DPDX | OP_DPDY
        | OP_FWIDTH => OperandLayout::new(3, 1),

        // binary value operations
        OP_I_ADD | OP_F_ADD | OP_I_SUB | OP_F_SUB | OP_I_MUL | OP_F_MUL | OP_U_DIV
        | OP_S_DIV | OP_F_DIV | OP_U_MOD | OP_S_REM | OP_S_MOD | OP_F_REM | OP_F_MOD
        | OP_VECTOR_TIMES_SCALAR | OP_MATRIX_TIMES_VECTOR | OP_DOT | OP_LOGICAL_EQUAL
        | OP_LOGICAL_NOT_EQUAL | OP_LOGICAL_OR | OP_LOGICAL_AND | OP_I_EQUAL
        | OP_I_NOT_EQUAL | OP_U_GREATER_THAN | OP_S_GREATER_THAN
        | OP_U_GREATER_THAN_EQUAL | OP_S_GREATER_THAN_EQUAL | OP_U_LESS_THAN
        | OP_S_LESS_THAN | OP_U_LESS_THAN_EQUAL | OP_S_LESS_THAN_EQUAL | OP_F_ORD_EQUAL
        | OP_F_UNORD_EQUAL | OP_F_ORD_NOT_EQUAL | OP_F_UNORD_NOT_EQUAL
        | OP_F_ORD_LESS_THAN | OP_F_UNORD_LESS_THAN | OP_F_ORD_GREATER_THAN
        | OP_F_UNORD_GREATER_THAN | OP_F_ORD_LESS_THAN_EQUAL
        | OP_F_UNORD_LESS_THAN_EQUAL | OP_F_ORD_GREATER_THAN_EQUAL
        | OP_F_UNORD_GREATER_THAN_EQUAL | OP_SHIFT_RIGHT_LOGICAL
        | OP_SHIFT_RIGHT_ARITHMETIC | OP_SHIFT_LEFT_LOGICAL | OP_BITWISE_OR
        | OP_BITWISE_XOR | OP_BITWISE_AND => OperandLayout::new(3, 2),

        OP_SELECT => OperandLayout::new(3, 3),

        // only the value operands; predecessor labels are interleaved and
        // belong to the phi-compaction pass, not the use graph
        OP_PHI => OperandLayout::strided(3, u32::MAX, 2),

        // the guard; labels are covered by `label_layout`
        OP_BRANCH_CONDITIONAL | OP_SWITCH => OperandLayout::new(1, 1),

        _ => return None,
    };

    Some(layout)
}

/// The label-operand layout of `op`, for the control-flow instructions that
/// reference blocks.
pub fn label_layout(op: u16) -> Option<LabelLayout> {
    let layout = match op {
        OP_BRANCH | OP_SELECTION_MERGE => LabelLayout {
            start: 1,
            count: 1,
            stride: 1,
        },
        OP_BRANCH_CONDITIONAL => LabelLayout {
            start: 2,
            count: 2,
            stride: 1,
        },
        OP_SWITCH => LabelLayout {
            start: 2,
            count: u32::MAX,
            stride: 2,
        },
        _ => return None,
    };

    Some(layout)
}

/// Whether `op` may legally reference ids that are only produced later in
/// the stream. Everything else must consume already-defined results.
pub fn allows_forward_operands(op: u16) -> bool {
    matches!(op, OP_ENTRY_POINT | OP_EXECUTION_MODE | OP_PHI)
}

/// Number of words occupied by a null-terminated string literal starting at
/// `words[0]`. The terminator lives inside the last counted word.
pub fn literal_string_words(words: &[u32]) -> u32 {
    for (i, word) in words.iter().enumerate() {
        if word.to_le_bytes().contains(&0) {
            return (i + 1) as u32;
        }
    }

    words.len() as u32
}

/// Calls `f` with the instruction-relative word index of every id operand of
/// an instruction, honoring the layout's clamping, stride, and literal-skip
/// rules. `inst` must be exactly the instruction's words.
pub fn for_each_id_operand(inst: &[u32], layout: OperandLayout, mut f: impl FnMut(u32)) {
    let len = inst.len() as u32;
    let mut pos = layout.start;
    let mut produced = 0;
    let mut slot = 0;

    while pos < len && produced < layout.count {
        if let Some(skip) = layout.skip {
            if slot == skip.index {
                pos += if skip.is_string {
                    literal_string_words(&inst[pos as usize..])
                } else {
                    1
                };
                slot += 1;
                continue;
            }
        }

        f(pos);
        produced += 1;
        pos += layout.stride;
        slot += 1;
    }
}

/// Calls `f` with the instruction-relative word index of every label operand
/// of a control-flow instruction.
pub fn for_each_label_operand(inst: &[u32], layout: LabelLayout, mut f: impl FnMut(u32)) {
    let len = inst.len() as u32;
    let mut pos = layout.start;
    let mut produced = 0;

    while pos < len && produced < layout.count {
        f(pos);
        produced += 1;
        pos += layout.stride;
    }
}
