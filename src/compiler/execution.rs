//! Numeric execution of compiled programs.
//!
//! Both targets use the same scalar semantics as the tree evaluator, so the
//! three evaluation paths agree up to floating-point rounding.

use super::instruction::{Instruction, OpCode};
use crate::core::expr::MonadKind;
use crate::core::functions::Builtin;
use crate::evaluator::{evaluate_builtin, evaluate_monad, nan_aware};
use crate::traits::MathScalar;
use num_traits::Float;

#[inline]
pub(crate) fn apply_unary<T: MathScalar>(op: OpCode, x: T) -> T {
    match op {
        OpCode::Ln => evaluate_monad(MonadKind::Ln, x),
        OpCode::Sin => evaluate_monad(MonadKind::Sin, x),
        OpCode::Sign => evaluate_monad(MonadKind::Sign, x),
        OpCode::Arcsin => evaluate_monad(MonadKind::Arcsin, x),
        OpCode::Arctan => evaluate_monad(MonadKind::Arctan, x),
        OpCode::Cos => evaluate_builtin(Builtin::Cos, &[x]),
        OpCode::Tan => evaluate_builtin(Builtin::Tan, &[x]),
        OpCode::Abs => evaluate_builtin(Builtin::Abs, &[x]),
        OpCode::Sqrt => evaluate_builtin(Builtin::Sqrt, &[x]),
        OpCode::Arccos => evaluate_builtin(Builtin::Arccos, &[x]),
        _ => T::nan(),
    }
}

#[inline]
pub(crate) fn apply_binary<T: MathScalar>(op: OpCode, a: T, b: T) -> T {
    match op {
        OpCode::Add => a + b,
        OpCode::Multiply => a * b,
        OpCode::Power => a.powf(b),
        OpCode::Log => evaluate_builtin(Builtin::Log, &[a, b]),
        OpCode::Min => nan_aware(a, b, <T as Float>::min),
        OpCode::Max => nan_aware(a, b, <T as Float>::max),
        _ => T::nan(),
    }
}

#[inline]
fn load<T: MathScalar>(op: OpCode, params: &[T]) -> T {
    match op {
        OpCode::Constant(c) => T::from_constant(c),
        OpCode::Variable(p) => params.get(p).copied().unwrap_or_else(T::nan),
        _ => T::nan(),
    }
}

/// Run a postfix program on a single value stack.
pub(crate) fn run_stack<T: MathScalar>(code: &[OpCode], params: &[T], stack: &mut Vec<T>) -> T {
    stack.clear();
    for &op in code {
        let value = match op.arity() {
            0 => load(op, params),
            1 => {
                let x = stack.pop().unwrap_or_else(T::nan);
                apply_unary(op, x)
            }
            _ => {
                let b = stack.pop().unwrap_or_else(T::nan);
                let a = stack.pop().unwrap_or_else(T::nan);
                apply_binary(op, a, b)
            }
        };
        stack.push(value);
    }
    stack.pop().unwrap_or_else(T::nan)
}

/// Run a heap program: instruction `i` writes cell `indirection[i]`.
pub(crate) fn run_heap<T: MathScalar>(
    instructions: &[Instruction],
    indirection: &[usize],
    output: usize,
    params: &[T],
    cells: &mut [T],
) -> T {
    let read = |cells: &[T], i: usize| {
        indirection
            .get(i)
            .and_then(|&cell| cells.get(cell).copied())
            .unwrap_or_else(T::nan)
    };
    for (i, instruction) in instructions.iter().enumerate() {
        let [a, b] = instruction.operands;
        let value = match instruction.op.arity() {
            0 => load(instruction.op, params),
            1 => apply_unary(instruction.op, read(cells, a)),
            _ => apply_binary(instruction.op, read(cells, a), read(cells, b)),
        };
        if let Some(slot) = indirection.get(i).and_then(|&cell| cells.get_mut(cell)) {
            *slot = value;
        }
    }
    read(cells, output)
}
