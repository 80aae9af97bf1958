//! Instruction set shared by the stack and heap targets.

/// Operation of one compiled instruction.
///
/// `Constant` and `Variable` read no operands; the unary ops read one and
/// the binary ops read two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Embedded literal
    Constant(f64),
    /// Parameter value, by position in the parameter order
    Variable(usize),
    Add,
    Multiply,
    /// `a ^ b`
    Power,
    /// `ln(a) / ln(b)`: logarithm of `a` to base `b`
    Log,
    Min,
    Max,
    Ln,
    Sin,
    Cos,
    Tan,
    Sign,
    Abs,
    Sqrt,
    Arcsin,
    Arccos,
    Arctan,
}

impl OpCode {
    /// Number of operands consumed
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Constant(_) | Self::Variable(_) => 0,
            Self::Add | Self::Multiply | Self::Power | Self::Log | Self::Min | Self::Max => 2,
            Self::Ln
            | Self::Sin
            | Self::Cos
            | Self::Tan
            | Self::Sign
            | Self::Abs
            | Self::Sqrt
            | Self::Arcsin
            | Self::Arccos
            | Self::Arctan => 1,
        }
    }

    /// Net change of the evaluation stack height
    #[must_use]
    pub const fn stack_effect(self) -> isize {
        match self.arity() {
            0 => 1,
            1 => 0,
            _ => -1,
        }
    }
}

/// One heap-form instruction.
///
/// `operands` are indices of earlier instructions (whose values this one
/// reads); only the first [`OpCode::arity`] entries are meaningful.
/// `destination` is the physical cell the value is written to, assigned by
/// the cell allocator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    pub op: OpCode,
    pub operands: [usize; 2],
    pub destination: usize,
}

impl Instruction {
    pub(crate) const fn leaf(op: OpCode) -> Self {
        Self {
            op,
            operands: [0, 0],
            destination: 0,
        }
    }

    pub(crate) const fn unary(op: OpCode, a: usize) -> Self {
        Self {
            op,
            operands: [a, a],
            destination: 0,
        }
    }

    pub(crate) const fn binary(op: OpCode, a: usize, b: usize) -> Self {
        Self {
            op,
            operands: [a, b],
            destination: 0,
        }
    }

    /// The instruction indices this one reads
    #[must_use]
    pub fn inputs(&self) -> &[usize] {
        &self.operands[..self.op.arity()]
    }
}
