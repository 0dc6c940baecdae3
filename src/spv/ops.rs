//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Word-level constants for the SPIR-V binary format: the magic number, the
//! maximum accepted version, the `SpecId` decoration, and the opcode numbers
//! of every instruction the library knows about.
//!
//! Opcode values are assigned by the SPIR-V specification and never change,
//! so they are plain constants rather than a generated table.

/// The SPIR-V magic number, word 0 of every module.
pub const MAGIC: u32 = 0x0723_0203;

/// The newest SPIR-V version this library accepts (1.6).
pub const VERSION_MAX: u32 = 0x0001_0600;

/// Number of words in the module header before the first instruction.
pub const HEADER_WORDS: u32 = 5;

/// Marks a word of the working buffer as deleted. Never a valid opcode
/// header, since it would imply a 0xFFFF-word `OpAccessChain`-era opcode.
pub const SENTINEL: u32 = u32::MAX;

/// The `SpecId` decoration number, identifying specialization constants.
pub const DECORATION_SPEC_ID: u32 = 1;

/// Extracts the opcode from an instruction's first word.
#[inline]
pub fn opcode(word: u32) -> u16 {
    (word & 0xffff) as u16
}

/// Extracts the word count (including the first word) from an instruction's
/// first word.
#[inline]
pub fn word_count(word: u32) -> u32 {
    word >> 16
}

/// Builds an instruction's first word from an opcode and a word count.
#[inline]
pub fn header(op: u16, count: u32) -> u32 {
    debug_assert!(count <= 0xffff);

    (count << 16) | u32::from(op)
}

/// `OpNop`
pub const OP_NOP: u16 = 0;
/// `OpUndef`
pub const OP_UNDEF: u16 = 1;
/// `OpSourceContinued`
pub const OP_SOURCE_CONTINUED: u16 = 2;
/// `OpSource`
pub const OP_SOURCE: u16 = 3;
/// `OpSourceExtension`
pub const OP_SOURCE_EXTENSION: u16 = 4;
/// `OpName`
pub const OP_NAME: u16 = 5;
/// `OpMemberName`
pub const OP_MEMBER_NAME: u16 = 6;
/// `OpString`
pub const OP_STRING: u16 = 7;
/// `OpLine`
pub const OP_LINE: u16 = 8;
/// `OpExtension`
pub const OP_EXTENSION: u16 = 10;
/// `OpExtInstImport`
pub const OP_EXT_INST_IMPORT: u16 = 11;
/// `OpExtInst`
pub const OP_EXT_INST: u16 = 12;
/// `OpMemoryModel`
pub const OP_MEMORY_MODEL: u16 = 14;
/// `OpEntryPoint`
pub const OP_ENTRY_POINT: u16 = 15;
/// `OpExecutionMode`
pub const OP_EXECUTION_MODE: u16 = 16;
/// `OpCapability`
pub const OP_CAPABILITY: u16 = 17;
/// `OpTypeVoid`
pub const OP_TYPE_VOID: u16 = 19;
/// `OpTypeBool`
pub const OP_TYPE_BOOL: u16 = 20;
/// `OpTypeInt`
pub const OP_TYPE_INT: u16 = 21;
/// `OpTypeFloat`
pub const OP_TYPE_FLOAT: u16 = 22;
/// `OpTypeVector`
pub const OP_TYPE_VECTOR: u16 = 23;
/// `OpTypeMatrix`
pub const OP_TYPE_MATRIX: u16 = 24;
/// `OpTypeImage`
pub const OP_TYPE_IMAGE: u16 = 25;
/// `OpTypeSampler`
pub const OP_TYPE_SAMPLER: u16 = 26;
/// `OpTypeSampledImage`
pub const OP_TYPE_SAMPLED_IMAGE: u16 = 27;
/// `OpTypeArray`
pub const OP_TYPE_ARRAY: u16 = 28;
/// `OpTypeRuntimeArray`
pub const OP_TYPE_RUNTIME_ARRAY: u16 = 29;
/// `OpTypeStruct`
pub const OP_TYPE_STRUCT: u16 = 30;
/// `OpTypePointer`
pub const OP_TYPE_POINTER: u16 = 32;
/// `OpTypeFunction`
pub const OP_TYPE_FUNCTION: u16 = 33;
/// `OpConstantTrue`
pub const OP_CONSTANT_TRUE: u16 = 41;
/// `OpConstantFalse`
pub const OP_CONSTANT_FALSE: u16 = 42;
/// `OpConstant`
pub const OP_CONSTANT: u16 = 43;
/// `OpConstantComposite`
pub const OP_CONSTANT_COMPOSITE: u16 = 44;
/// `OpConstantNull`
pub const OP_CONSTANT_NULL: u16 = 46;
/// `OpSpecConstantTrue`
pub const OP_SPEC_CONSTANT_TRUE: u16 = 48;
/// `OpSpecConstantFalse`
pub const OP_SPEC_CONSTANT_FALSE: u16 = 49;
/// `OpSpecConstant`
pub const OP_SPEC_CONSTANT: u16 = 50;
/// `OpFunction`
pub const OP_FUNCTION: u16 = 54;
/// `OpFunctionParameter`
pub const OP_FUNCTION_PARAMETER: u16 = 55;
/// `OpFunctionEnd`
pub const OP_FUNCTION_END: u16 = 56;
/// `OpFunctionCall`
pub const OP_FUNCTION_CALL: u16 = 57;
/// `OpVariable`
pub const OP_VARIABLE: u16 = 59;
/// `OpLoad`
pub const OP_LOAD: u16 = 61;
/// `OpStore`
pub const OP_STORE: u16 = 62;
/// `OpAccessChain`
pub const OP_ACCESS_CHAIN: u16 = 65;
/// `OpInBoundsAccessChain`
pub const OP_IN_BOUNDS_ACCESS_CHAIN: u16 = 66;
/// `OpDecorate`
pub const OP_DECORATE: u16 = 71;
/// `OpMemberDecorate`
pub const OP_MEMBER_DECORATE: u16 = 72;
/// `OpVectorShuffle`
pub const OP_VECTOR_SHUFFLE: u16 = 79;
/// `OpCompositeConstruct`
pub const OP_COMPOSITE_CONSTRUCT: u16 = 80;
/// `OpCompositeExtract`
pub const OP_COMPOSITE_EXTRACT: u16 = 81;
/// `OpCompositeInsert`
pub const OP_COMPOSITE_INSERT: u16 = 82;
/// `OpCopyObject`
pub const OP_COPY_OBJECT: u16 = 83;
/// `OpSampledImage`
pub const OP_SAMPLED_IMAGE: u16 = 86;
/// `OpImageSampleImplicitLod`
pub const OP_IMAGE_SAMPLE_IMPLICIT_LOD: u16 = 87;
/// `OpImageSampleExplicitLod`
pub const OP_IMAGE_SAMPLE_EXPLICIT_LOD: u16 = 88;
/// `OpImageFetch`
pub const OP_IMAGE_FETCH: u16 = 95;
/// `OpImage`
pub const OP_IMAGE: u16 = 100;
/// `OpConvertFToU`
pub const OP_CONVERT_F_TO_U: u16 = 109;
/// `OpConvertFToS`
pub const OP_CONVERT_F_TO_S: u16 = 110;
/// `OpConvertSToF`
pub const OP_CONVERT_S_TO_F: u16 = 111;
/// `OpConvertUToF`
pub const OP_CONVERT_U_TO_F: u16 = 112;
/// `OpUConvert`
pub const OP_U_CONVERT: u16 = 113;
/// `OpSConvert`
pub const OP_S_CONVERT: u16 = 114;
/// `OpFConvert`
pub const OP_F_CONVERT: u16 = 115;
/// `OpBitcast`
pub const OP_BITCAST: u16 = 124;
/// `OpSNegate`
pub const OP_S_NEGATE: u16 = 126;
/// `OpFNegate`
pub const OP_F_NEGATE: u16 = 127;
/// `OpIAdd`
pub const OP_I_ADD: u16 = 128;
/// `OpFAdd`
pub const OP_F_ADD: u16 = 129;
/// `OpISub`
pub const OP_I_SUB: u16 = 130;
/// `OpFSub`
pub const OP_F_SUB: u16 = 131;
/// `OpIMul`
pub const OP_I_MUL: u16 = 132;
/// `OpFMul`
pub const OP_F_MUL: u16 = 133;
/// `OpUDiv`
pub const OP_U_DIV: u16 = 134;
/// `OpSDiv`
pub const OP_S_DIV: u16 = 135;
/// `OpFDiv`
pub const OP_F_DIV: u16 = 136;
/// `OpUMod`
pub const OP_U_MOD: u16 = 137;
/// `OpSRem`
pub const OP_S_REM: u16 = 138;
/// `OpSMod`
pub const OP_S_MOD: u16 = 139;
/// `OpFRem`
pub const OP_F_REM: u16 = 140;
/// `OpFMod`
pub const OP_F_MOD: u16 = 141;
/// `OpVectorTimesScalar`
pub const OP_VECTOR_TIMES_SCALAR: u16 = 142;
/// `OpMatrixTimesVector`
pub const OP_MATRIX_TIMES_VECTOR: u16 = 145;
/// `OpDot`
pub const OP_DOT: u16 = 148;
/// `OpAny`
pub const OP_ANY: u16 = 154;
/// `OpAll`
pub const OP_ALL: u16 = 155;
/// `OpLogicalEqual`
pub const OP_LOGICAL_EQUAL: u16 = 164;
/// `OpLogicalNotEqual`
pub const OP_LOGICAL_NOT_EQUAL: u16 = 165;
/// `OpLogicalOr`
pub const OP_LOGICAL_OR: u16 = 166;
/// `OpLogicalAnd`
pub const OP_LOGICAL_AND: u16 = 167;
/// `OpLogicalNot`
pub const OP_LOGICAL_NOT: u16 = 168;
/// `OpSelect`
pub const OP_SELECT: u16 = 169;
/// `OpIEqual`
pub const OP_I_EQUAL: u16 = 170;
/// `OpINotEqual`
pub const OP_I_NOT_EQUAL: u16 = 171;
/// `OpUGreaterThan`
pub const OP_U_GREATER_THAN: u16 = 172;
/// `OpSGreaterThan`
pub const OP_S_GREATER_THAN: u16 = 173;
/// `OpUGreaterThanEqual`
pub const OP_U_GREATER_THAN_EQUAL: u16 = 174;
/// `OpSGreaterThanEqual`
pub const OP_S_GREATER_THAN_EQUAL: u16 = 175;
/// `OpULessThan`
pub const OP_U_LESS_THAN: u16 = 176;
/// `OpSLessThan`
pub const OP_S_LESS_THAN: u16 = 177;
/// `OpULessThanEqual`
pub const OP_U_LESS_THAN_EQUAL: u16 = 178;
/// `OpSLessThanEqual`
pub const OP_S_LESS_THAN_EQUAL: u16 = 179;
/// `OpFOrdEqual`
pub const OP_F_ORD_EQUAL: u16 = 180;
/// `OpFUnordEqual`
pub const OP_F_UNORD_EQUAL: u16 = 181;
/// `OpFOrdNotEqual`
pub const OP_F_ORD_NOT_EQUAL: u16 = 182;
/// `OpFUnordNotEqual`
pub const OP_F_UNORD_NOT_EQUAL: u16 = 183;
/// `OpFOrdLessThan`
pub const OP_F_ORD_LESS_THAN: u16 = 184;
/// `OpFUnordLessThan`
pub const OP_F_UNORD_LESS_THAN: u16 = 185;
/// `OpFOrdGreaterThan`
pub const OP_F_ORD_GREATER_THAN: u16 = 186;
/// `OpFUnordGreaterThan`
pub const OP_F_UNORD_GREATER_THAN: u16 = 187;
/// `OpFOrdLessThanEqual`
pub const OP_F_ORD_LESS_THAN_EQUAL: u16 = 188;
/// `OpFUnordLessThanEqual`
pub const OP_F_UNORD_LESS_THAN_EQUAL: u16 = 189;
/// `OpFOrdGreaterThanEqual`
pub const OP_F_ORD_GREATER_THAN_EQUAL: u16 = 190;
/// `OpFUnordGreaterThanEqual`
pub const OP_F_UNORD_GREATER_THAN_EQUAL: u16 = 191;
/// `OpShiftRightLogical`
pub const OP_SHIFT_RIGHT_LOGICAL: u16 = 194;
/// `OpShiftRightArithmetic`
pub const OP_SHIFT_RIGHT_ARITHMETIC: u16 = 195;
/// `OpShiftLeftLogical`
pub const OP_SHIFT_LEFT_LOGICAL: u16 = 196;
/// `OpBitwiseOr`
pub const OP_BITWISE_OR: u16 = 197;
/// `OpBitwiseXor`
pub const OP_BITWISE_XOR: u16 = 198;
/// `OpBitwiseAnd`
pub const OP_BITWISE_AND: u16 = 199;
/// `OpNot`
pub const OP_NOT: u16 = 200;
/// `OpDPdx`
pub const OP_DPDX: u16 = 207;
/// `OpDPdy`
pub const OP_DPDY: u16 = 208;
/// `OpFwidth`
pub const OP_FWIDTH: u16 = 209;
/// `OpPhi`
pub const OP_PHI: u16 = 245;
/// `OpLoopMerge`. Recognized so it can be rejected by name; structured
/// loops are outside the supported subset.
pub const OP_LOOP_MERGE: u16 = 246;
/// `OpSelectionMerge`
pub const OP_SELECTION_MERGE: u16 = 247;
/// `OpLabel`
pub const OP_LABEL: u16 = 248;
/// `OpBranch`
pub const OP_BRANCH: u16 = 249;
/// `OpBranchConditional`
pub const OP_BRANCH_CONDITIONAL: u16 = 250;
/// `OpSwitch`
pub const OP_SWITCH: u16 = 251;
/// `OpKill`
pub const OP_KILL: u16 = 252;
/// `OpReturn`
pub const OP_RETURN: u16 = 253;
/// `OpReturnValue`
pub const OP_RETURN_VALUE: u16 = 254;
/// `OpUnreachable`
pub const OP_UNREACHABLE: u16 = 255;
