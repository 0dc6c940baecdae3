//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Constant evaluation over the working word buffer.
//!
//! Every result visited by the evaluation pass ends up either `Constant`
//! (with its 32-bit value) or `Variable`. `Unknown` survives only for
//! results the schedule never reaches, i.e. members of a dependency cycle;
//! reading one of those degrades to `Variable`.

use crate::opt::context::Context;
use crate::spv::*;

/// What the optimizer knows about one result id.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Not evaluated yet.
    #[default]
    Unknown,
    /// Not a compile-time constant.
    Variable,
    /// A known 32-bit value. Signedness is decided by the consuming
    /// opcode, exactly like the underlying words.
    Constant(u32),
}

impl Resolution {
    fn truth(value: bool) -> Resolution {
        Resolution::Constant(u32::from(value))
    }
}

/// Evaluates instruction `inst` (which produces `result`) and stores the
/// outcome in the context's resolution table.
pub(crate) fn evaluate(ctx: &mut Context<'_>, inst: u32, result: u32) {
    let off = ctx.shader.inst_offset(inst);
    let count = ctx.count_of(inst);
    let op = ctx.opcode_of(inst);

    let resolution = match op {
        OP_CONSTANT => constant_value(ctx, off, count),
        OP_CONSTANT_TRUE => Resolution::Constant(1),
        OP_CONSTANT_FALSE => Resolution::Constant(0),
        OP_PHI => degenerate_phi(ctx, off, count),
        OP_BITCAST | OP_NOT => unary(ctx, op, off, count),
        OP_I_ADD | OP_I_SUB | OP_I_MUL | OP_U_DIV | OP_S_DIV | OP_LOGICAL_EQUAL
        | OP_LOGICAL_NOT_EQUAL | OP_LOGICAL_OR | OP_LOGICAL_AND | OP_I_EQUAL
        | OP_I_NOT_EQUAL | OP_U_GREATER_THAN | OP_S_GREATER_THAN
        | OP_U_GREATER_THAN_EQUAL | OP_S_GREATER_THAN_EQUAL | OP_U_LESS_THAN
        | OP_S_LESS_THAN | OP_U_LESS_THAN_EQUAL | OP_S_LESS_THAN_EQUAL
        | OP_SHIFT_RIGHT_LOGICAL | OP_SHIFT_LEFT_LOGICAL | OP_SHIFT_RIGHT_ARITHMETIC
        | OP_BITWISE_OR | OP_BITWISE_AND | OP_BITWISE_XOR => binary(ctx, op, off, count),
        OP_LOGICAL_NOT => match operand(ctx, off, count, 3) {
            Some(a) => Resolution::truth(a == 0),
            None => Resolution::Variable,
        },
        OP_SELECT => select(ctx, off, count),
        _ => Resolution::Variable,
    };

    ctx.resolutions[result as usize] = resolution;
}

/// Reads the resolution of the id at `off + rel`, collapsing `Unknown`,
/// `Variable`, and out-of-slot positions to `None`.
fn operand(ctx: &Context<'_>, off: usize, count: usize, rel: usize) -> Option<u32> {
    if rel >= count {
        return None;
    }

    match ctx.resolutions.get(ctx.words[off + rel] as usize) {
        Some(Resolution::Constant(value)) => Some(*value),
        _ => None,
    }
}

/// `OpConstant` of a 32-bit integer type is a known value; any other type
/// stays opaque.
fn constant_value(ctx: &Context<'_>, off: usize, count: usize) -> Resolution {
    if count < 4 {
        return Resolution::Variable;
    }

    let ty = ctx.words[off + 1];

    let Some(producer) = ctx.shader.result_producer(ty) else {
        return Resolution::Variable;
    };

    let ty_off = ctx.shader.inst_offset(producer);
    let is_int32 = opcode(ctx.words[ty_off]) == OP_TYPE_INT
        && word_count(ctx.words[ty_off]) >= 3
        && ctx.words[ty_off + 2] == 32;

    if is_int32 {
        Resolution::Constant(ctx.words[off + 3])
    } else {
        Resolution::Variable
    }
}

/// A phi that is already down to a single (value, predecessor) pair simply
/// takes that value's resolution. Anything wider is variable here; the
/// compaction pass runs after all terminator folding and does not feed back
/// into evaluation.
fn degenerate_phi(ctx: &Context<'_>, off: usize, count: usize) -> Resolution {
    if count != 5 {
        return Resolution::Variable;
    }

    match operand(ctx, off, count, 3) {
        Some(value) => Resolution::Constant(value),
        None => Resolution::Variable,
    }
}

fn unary(ctx: &Context<'_>, op: u16, off: usize, count: usize) -> Resolution {
    let Some(a) = operand(ctx, off, count, 3) else {
        return Resolution::Variable;
    };

    match op {
        OP_BITCAST => Resolution::Constant(a),
        OP_NOT => Resolution::Constant(!a),
        _ => Resolution::Variable,
    }
}

fn select(ctx: &Context<'_>, off: usize, count: usize) -> Resolution {
    let (Some(cond), Some(a), Some(b)) = (
        operand(ctx, off, count, 3),
        operand(ctx, off, count, 4),
        operand(ctx, off, count, 5),
    ) else {
        return Resolution::Variable;
    };

    Resolution::Constant(if cond != 0 { a } else { b })
}

fn binary(ctx: &Context<'_>, op: u16, off: usize, count: usize) -> Resolution {
    let (Some(a), Some(b)) = (operand(ctx, off, count, 3), operand(ctx, off, count, 4)) else {
        return Resolution::Variable;
    };

    let truth = Resolution::truth;

    match op {
        OP_I_ADD => Resolution::Constant(a.wrapping_add(b)),
        OP_I_SUB => Resolution::Constant(a.wrapping_sub(b)),
        OP_I_MUL => Resolution::Constant(a.wrapping_mul(b)),
        // division by zero is undefined; leave it to the driver
        OP_U_DIV if b == 0 => Resolution::Variable,
        OP_U_DIV => Resolution::Constant(a / b),
        OP_S_DIV if b == 0 => Resolution::Variable,
        OP_S_DIV => Resolution::Constant((a as i32).wrapping_div(b as i32) as u32),
        OP_LOGICAL_EQUAL => truth((a != 0) == (b != 0)),
        OP_LOGICAL_NOT_EQUAL => truth((a != 0) != (b != 0)),
        OP_LOGICAL_OR => truth(a != 0 || b != 0),
        OP_LOGICAL_AND => truth(a != 0 && b != 0),
        OP_I_EQUAL => truth(a == b),
        OP_I_NOT_EQUAL => truth(a != b),
        OP_U_GREATER_THAN => truth(a > b),
        OP_S_GREATER_THAN => truth((a as i32) > (b as i32)),
        OP_U_GREATER_THAN_EQUAL => truth(a >= b),
        OP_S_GREATER_THAN_EQUAL => truth((a as i32) >= (b as i32)),
        OP_U_LESS_THAN => truth(a < b),
        OP_S_LESS_THAN => truth((a as i32) < (b as i32)),
        OP_U_LESS_THAN_EQUAL => truth(a <= b),
        OP_S_LESS_THAN_EQUAL => truth((a as i32) <= (b as i32)),
        // out-of-range shifts are undefined too
        OP_SHIFT_RIGHT_LOGICAL | OP_SHIFT_LEFT_LOGICAL | OP_SHIFT_RIGHT_ARITHMETIC
            if b >= 32 =>
        {
            Resolution::Variable
        }
        OP_SHIFT_RIGHT_LOGICAL => Resolution::Constant(a >> b),
        OP_SHIFT_LEFT_LOGICAL => Resolution::Constant(a << b),
        OP_SHIFT_RIGHT_ARITHMETIC => Resolution::Constant(((a as i32) >> b) as u32),
        OP_BITWISE_OR => Resolution::Constant(a | b),
        OP_BITWISE_AND => Resolution::Constant(a & b),
        OP_BITWISE_XOR => Resolution::Constant(a ^ b),
        _ => Resolution::Variable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::fold;
    use crate::shader::Shader;
    use crate::utility::testing::ModuleAsm;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Resolution, u64);

    /// Builds a module around `build`, runs the evaluation pass, and
    /// returns the resolution of the id `build` handed back.
    fn resolve(build: impl FnOnce(&mut ModuleAsm) -> u32) -> Resolution {
        let mut m = ModuleAsm::new();
        m.preamble();
        let id = build(&mut m);

        let shader = Shader::parse(&m.into_bytes()).unwrap();
        let mut ctx = Context::new(&shader);
        fold::run(&mut ctx);

        ctx.resolutions[id as usize]
    }

    #[test]
    fn integer_arithmetic_wraps() {
        let sum = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, u32::MAX);
            let b = m.constant(uint, 2);
            m.binary(OP_I_ADD, uint, a, b)
        });
        assert_eq!(sum, Resolution::Constant(1));

        let difference = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 1);
            let b = m.constant(uint, 2);
            m.binary(OP_I_SUB, uint, a, b)
        });
        assert_eq!(difference, Resolution::Constant(u32::MAX));

        let product = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 0x8000_0001);
            let b = m.constant(uint, 2);
            m.binary(OP_I_MUL, uint, a, b)
        });
        assert_eq!(product, Resolution::Constant(2));
    }

    #[test]
    fn division_folds_unless_undefined() {
        let unsigned = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 7);
            let b = m.constant(uint, 2);
            m.binary(OP_U_DIV, uint, a, b)
        });
        assert_eq!(unsigned, Resolution::Constant(3));

        let signed = resolve(|m| {
            let sint = m.ty_int(32, true);
            let a = m.constant(sint, (-7i32) as u32);
            let b = m.constant(sint, 2);
            m.binary(OP_S_DIV, sint, a, b)
        });
        assert_eq!(signed, Resolution::Constant((-3i32) as u32));

        let by_zero = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 7);
            let b = m.constant(uint, 0);
            m.binary(OP_U_DIV, uint, a, b)
        });
        assert_eq!(by_zero, Resolution::Variable);
    }

    #[test]
    fn shifts_fold_in_range_only() {
        let left = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 1);
            let b = m.constant(uint, 4);
            m.binary(OP_SHIFT_LEFT_LOGICAL, uint, a, b)
        });
        assert_eq!(left, Resolution::Constant(16));

        let logical = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 0x8000_0000);
            let b = m.constant(uint, 1);
            m.binary(OP_SHIFT_RIGHT_LOGICAL, uint, a, b)
        });
        assert_eq!(logical, Resolution::Constant(0x4000_0000));

        let arithmetic = resolve(|m| {
            let sint = m.ty_int(32, true);
            let a = m.constant(sint, 0x8000_0000);
            let b = m.constant(sint, 1);
            m.binary(OP_SHIFT_RIGHT_ARITHMETIC, sint, a, b)
        });
        assert_eq!(arithmetic, Resolution::Constant(0xc000_0000));

        let out_of_range = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 1);
            let b = m.constant(uint, 32);
            m.binary(OP_SHIFT_LEFT_LOGICAL, uint, a, b)
        });
        assert_eq!(out_of_range, Resolution::Variable);
    }

    #[test]
    fn comparisons_respect_signedness() {
        let unsigned = resolve(|m| {
            let bool_ty = m.ty_bool();
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, u32::MAX);
            let b = m.constant(uint, 1);
            m.binary(OP_U_GREATER_THAN, bool_ty, a, b)
        });
        assert_eq!(unsigned, Resolution::Constant(1));

        let signed = resolve(|m| {
            let bool_ty = m.ty_bool();
            let sint = m.ty_int(32, true);
            let a = m.constant(sint, (-1i32) as u32);
            let b = m.constant(sint, 1);
            m.binary(OP_S_GREATER_THAN, bool_ty, a, b)
        });
        assert_eq!(signed, Resolution::Constant(0));

        let equal = resolve(|m| {
            let bool_ty = m.ty_bool();
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 6);
            let b = m.constant(uint, 6);
            m.binary(OP_I_EQUAL, bool_ty, a, b)
        });
        assert_eq!(equal, Resolution::Constant(1));
    }

    #[test]
    fn logical_operations_treat_nonzero_as_true() {
        let and = resolve(|m| {
            let bool_ty = m.ty_bool();
            let t = m.constant_bool(bool_ty, true);
            let f = m.constant_bool(bool_ty, false);
            m.binary(OP_LOGICAL_AND, bool_ty, t, f)
        });
        assert_eq!(and, Resolution::Constant(0));

        let or = resolve(|m| {
            let bool_ty = m.ty_bool();
            let t = m.constant_bool(bool_ty, true);
            let f = m.constant_bool(bool_ty, false);
            m.binary(OP_LOGICAL_OR, bool_ty, t, f)
        });
        assert_eq!(or, Resolution::Constant(1));

        let negated = resolve(|m| {
            let bool_ty = m.ty_bool();
            let t = m.constant_bool(bool_ty, true);
            m.unary(OP_LOGICAL_NOT, bool_ty, t)
        });
        assert_eq!(negated, Resolution::Constant(0));
    }

    #[test]
    fn select_picks_by_condition() {
        let selected = resolve(|m| {
            let bool_ty = m.ty_bool();
            let uint = m.ty_int(32, false);
            let f = m.constant_bool(bool_ty, false);
            let a = m.constant(uint, 10);
            let b = m.constant(uint, 20);
            m.select(uint, f, a, b)
        });

        assert_eq!(selected, Resolution::Constant(20));
    }

    #[test]
    fn bitwise_operations_fold() {
        let xor = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 0xff00);
            let b = m.constant(uint, 0x0ff0);
            m.binary(OP_BITWISE_XOR, uint, a, b)
        });
        assert_eq!(xor, Resolution::Constant(0xf0f0));

        let complement = resolve(|m| {
            let uint = m.ty_int(32, false);
            let a = m.constant(uint, 0xf0f0_0f0f);
            m.unary(OP_NOT, uint, a)
        });
        assert_eq!(complement, Resolution::Constant(0x0f0f_f0f0));

        let cast = resolve(|m| {
            let uint = m.ty_int(32, false);
            let sint = m.ty_int(32, true);
            let a = m.constant(uint, 0xdead_beef);
            m.unary(OP_BITCAST, sint, a)
        });
        assert_eq!(cast, Resolution::Constant(0xdead_beef));
    }

    #[test]
    fn non_integer_constants_stay_variable() {
        let float = resolve(|m| {
            let float_ty = m.id();
            m.op(OP_TYPE_FLOAT, &[float_ty, 32]);
            let c = m.id();
            m.op(OP_CONSTANT, &[float_ty, c, 0x3f80_0000]);
            c
        });

        assert_eq!(float, Resolution::Variable);
    }

    #[test]
    fn unpatched_spec_constants_poison_their_users() {
        let sum = resolve(|m| {
            let uint = m.ty_int(32, false);
            let s = m.spec_constant(uint, &[4]);
            m.decorate_spec_id(s, 3);
            let a = m.constant(uint, 1);
            m.binary(OP_I_ADD, uint, s, a)
        });

        assert_eq!(sum, Resolution::Variable);
    }
}
