//! Compilation of expressions into flat numeric programs.
//!
//! # Pipeline
//!
//! 1. **Simplification**: the cheapest member (by [`Expr::complexity`]) of
//!    the expression's equivalence class within `simplification_depth`
//!    rewrite steps.
//! 2. **Lowering**: one traversal in dependency order. Built-in functions
//!    map to native opcodes; user functions are expanded one level into
//!    their bodies.
//! 3. **Target form**:
//!    - [`Target::Stack`]: postfix code for a single value stack.
//!    - [`Target::Heap`]: a DAG where every distinct subexpression is emitted
//!      once, followed by linear-scan cell allocation
//!      ([`allocator::allocate_cells`]).
//!
//! # Example
//! ```
//! use symb_equiv::{Compile, Expr, Target};
//!
//! let x = Expr::variable("x");
//! let y = Expr::variable("y");
//! let f = Compile::new()
//!     .parameters(&["x", "y"])
//!     .target(Target::Heap)
//!     .compile(&(x.clone() * y + Expr::ln_of(x)))
//!     .expect("compile");
//! let value = f.evaluate(&[2.0_f64, 3.0]).expect("two parameters");
//! assert!((value - (6.0 + 2.0_f64.ln())).abs() < 1e-10);
//! ```

pub mod allocator;
mod execution;
mod instruction;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::error::{EngineError, Result};
use crate::core::expr::{Expr, ExprKind, FunctionCall, MonadKind, substitute_with};
use crate::core::functions::Builtin;
use crate::core::symbol::Symbol;
use crate::ensure_invariant;
use crate::equivalence::EquivalenceSearch;
use crate::evaluator::VariableSet;
use crate::traits::MathScalar;

pub use allocator::{Allocation, allocate_cells, last_uses};
pub use instruction::{Instruction, OpCode};

/// Rewrite depth of the simplification step unless configured otherwise
pub const DEFAULT_SIMPLIFICATION_DEPTH: usize = 3;

/// Maximum allowed stack depth of the stack target.
pub const MAX_STACK_DEPTH: usize = 1024;

/// Batches at least this large are split across threads
#[cfg(feature = "parallel")]
const MIN_PARALLEL_SIZE: usize = 256;

/// Shape of the compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Postfix code on a value stack; shared subexpressions are recomputed
    Stack,
    /// Addressed instructions over a minimal set of cells
    #[default]
    Heap,
}

/// A compiled program in one of the two target forms.
#[derive(Debug, Clone)]
pub enum Program {
    Stack {
        code: Vec<OpCode>,
        max_depth: usize,
    },
    Heap {
        instructions: Vec<Instruction>,
        indirection: Vec<usize>,
        cell_count: usize,
        /// Index of the instruction producing the result
        output: usize,
    },
}

/// Compiler configuration.
#[derive(Debug, Clone)]
pub struct Compile {
    parameters: Option<Vec<String>>,
    simplification_depth: usize,
    target: Target,
}

impl Default for Compile {
    fn default() -> Self {
        Self {
            parameters: None,
            simplification_depth: DEFAULT_SIMPLIFICATION_DEPTH,
            target: Target::default(),
        }
    }
}

impl Compile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameter order of [`CompiledFunction::evaluate`]. Without one, the
    /// parameters are the expression's variables sorted by name.
    #[must_use]
    pub fn parameters(mut self, names: &[&str]) -> Self {
        self.parameters = Some(names.iter().map(|n| (*n).to_string()).collect());
        self
    }

    /// Rewrite depth of the simplification search; 0 compiles the tree as is.
    #[must_use]
    pub const fn simplification_depth(mut self, depth: usize) -> Self {
        self.simplification_depth = depth;
        self
    }

    #[must_use]
    pub const fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Compile `expr`.
    ///
    /// # Errors
    /// - [`EngineError::VariableNotPresent`] if an explicit parameter order
    ///   misses a variable of the expression.
    /// - [`EngineError::StackOverflow`] if the stack form would need more
    ///   than [`MAX_STACK_DEPTH`] slots.
    pub fn compile(&self, expr: &Expr) -> Result<CompiledFunction> {
        let simplified = if self.simplification_depth == 0 {
            expr.clone()
        } else {
            EquivalenceSearch::new()
                .depth(Some(self.simplification_depth))
                .simplest(expr)
        };
        debug!(
            original = expr.complexity(),
            simplified = simplified.complexity(),
            "simplification finished"
        );

        let parameters: Vec<Symbol> = match &self.parameters {
            Some(names) => names.iter().map(|n| Symbol::new(n)).collect(),
            None => simplified.atomic_expression().variables().into_iter().collect(),
        };
        let index: FxHashMap<Symbol, usize> = parameters
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();

        let root = Arc::new(simplified);
        let program = match self.target {
            Target::Stack => {
                let mut lowering = StackLowering {
                    index: &index,
                    code: Vec::new(),
                    depth: 0,
                    max_depth: 0,
                };
                lowering.lower(&root)?;
                debug!(
                    instructions = lowering.code.len(),
                    max_depth = lowering.max_depth,
                    "stack program emitted"
                );
                Program::Stack {
                    code: lowering.code,
                    max_depth: lowering.max_depth,
                }
            }
            Target::Heap => {
                let mut lowering = HeapLowering {
                    index: &index,
                    instructions: Vec::new(),
                    memo: FxHashMap::default(),
                };
                let output = lowering.lower(&root)?;
                let mut instructions = lowering.instructions;
                let Allocation {
                    indirection,
                    cell_count,
                } = allocate_cells(&instructions);
                for (instruction, &cell) in instructions.iter_mut().zip(&indirection) {
                    instruction.destination = cell;
                }
                debug!(
                    instructions = instructions.len(),
                    cells = cell_count,
                    "heap program emitted"
                );
                Program::Heap {
                    instructions,
                    indirection,
                    cell_count,
                    output,
                }
            }
        };

        Ok(CompiledFunction {
            expr: root,
            parameters,
            program,
        })
    }
}

/// Compile with the default target.
///
/// # Errors
/// See [`Compile::compile`].
pub fn compile(
    expr: &Expr,
    parameter_order: Option<&[&str]>,
    simplification_depth: usize,
) -> Result<CompiledFunction> {
    let mut config = Compile::new().simplification_depth(simplification_depth);
    if let Some(order) = parameter_order {
        config = config.parameters(order);
    }
    config.compile(expr)
}

/// Opcode of a built-in function, when it has a native one
const fn builtin_opcode(builtin: Builtin) -> OpCode {
    match builtin {
        Builtin::Cos => OpCode::Cos,
        Builtin::Tan => OpCode::Tan,
        Builtin::Sqrt => OpCode::Sqrt,
        Builtin::Abs => OpCode::Abs,
        Builtin::Min => OpCode::Min,
        Builtin::Max => OpCode::Max,
        Builtin::Log => OpCode::Log,
        Builtin::Arccos => OpCode::Arccos,
    }
}

const fn monad_opcode(kind: MonadKind) -> OpCode {
    match kind {
        MonadKind::Ln => OpCode::Ln,
        MonadKind::Sin => OpCode::Sin,
        MonadKind::Sign => OpCode::Sign,
        MonadKind::Arcsin => OpCode::Arcsin,
        MonadKind::Arctan => OpCode::Arctan,
    }
}

/// The body of a user function with its arguments substituted
fn inline_call(call: &FunctionCall) -> Arc<Expr> {
    let bindings: FxHashMap<&Symbol, &Arc<Expr>> = call.named_args().collect();
    substitute_with(call.def().body(), &|s| bindings.get(s).map(|a| Arc::clone(a)))
}

fn lookup(index: &FxHashMap<Symbol, usize>, symbol: &Symbol) -> Result<usize> {
    index
        .get(symbol)
        .copied()
        .ok_or_else(|| EngineError::variable_not_present(symbol.name()))
}

struct StackLowering<'a> {
    index: &'a FxHashMap<Symbol, usize>,
    code: Vec<OpCode>,
    depth: usize,
    max_depth: usize,
}

impl StackLowering<'_> {
    fn emit(&mut self, op: OpCode) -> Result<()> {
        self.code.push(op);
        match op.arity() {
            0 => {
                self.depth += 1;
                if self.depth > MAX_STACK_DEPTH {
                    return Err(EngineError::StackOverflow {
                        depth: self.depth,
                        limit: MAX_STACK_DEPTH,
                    });
                }
                self.max_depth = self.max_depth.max(self.depth);
            }
            1 => {}
            _ => self.depth = self.depth.saturating_sub(1),
        }
        Ok(())
    }

    /// Push every operand, combining pairwise from the left.
    ///
    /// Canonical Sum and Product nodes always hold at least two operands, so
    /// an empty list is a broken invariant: debug builds panic, release
    /// builds fail the whole compilation with [`EngineError::Internal`] and
    /// no program is produced.
    fn reduce(&mut self, args: &[Arc<Expr>], op: OpCode) -> Result<()> {
        ensure_invariant!(!args.is_empty(), "empty argument list reached reduction");
        self.lower(&args[0])?;
        for arg in &args[1..] {
            self.lower(arg)?;
            self.emit(op)?;
        }
        Ok(())
    }

    fn lower(&mut self, expr: &Arc<Expr>) -> Result<()> {
        match expr.kind() {
            ExprKind::Constant(n) => self.emit(OpCode::Constant(n.to_f64())),
            ExprKind::Variable(s) => {
                let slot = lookup(self.index, s)?;
                self.emit(OpCode::Variable(slot))
            }
            ExprKind::Sum(args) => self.reduce(args, OpCode::Add),
            ExprKind::Product(args) => self.reduce(args, OpCode::Multiply),
            ExprKind::Exponent(base, power) => {
                self.lower(base)?;
                self.lower(power)?;
                self.emit(OpCode::Power)
            }
            ExprKind::Monad(kind, arg) => {
                self.lower(arg)?;
                self.emit(monad_opcode(*kind))
            }
            ExprKind::Function(call) => match Builtin::of(call.def()) {
                Some(builtin) => {
                    for arg in call.args() {
                        self.lower(arg)?;
                    }
                    self.emit(builtin_opcode(builtin))
                }
                None => self.lower(&inline_call(call)),
            },
        }
    }
}

struct HeapLowering<'a> {
    index: &'a FxHashMap<Symbol, usize>,
    instructions: Vec<Instruction>,
    memo: FxHashMap<Arc<Expr>, usize>,
}

impl HeapLowering<'_> {
    fn emit(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    /// Same contract as [`StackLowering::reduce`]
    fn reduce(&mut self, args: &[Arc<Expr>], op: OpCode) -> Result<usize> {
        ensure_invariant!(!args.is_empty(), "empty argument list reached reduction");
        let mut acc = self.lower(&args[0])?;
        for arg in &args[1..] {
            let next = self.lower(arg)?;
            acc = self.emit(Instruction::binary(op, acc, next));
        }
        Ok(acc)
    }

    fn lower(&mut self, expr: &Arc<Expr>) -> Result<usize> {
        if let Some(&done) = self.memo.get(expr) {
            return Ok(done);
        }
        let id = match expr.kind() {
            ExprKind::Constant(n) => self.emit(Instruction::leaf(OpCode::Constant(n.to_f64()))),
            ExprKind::Variable(s) => {
                let slot = lookup(self.index, s)?;
                self.emit(Instruction::leaf(OpCode::Variable(slot)))
            }
            ExprKind::Sum(args) => self.reduce(args, OpCode::Add)?,
            ExprKind::Product(args) => self.reduce(args, OpCode::Multiply)?,
            ExprKind::Exponent(base, power) => {
                let b = self.lower(base)?;
                let p = self.lower(power)?;
                self.emit(Instruction::binary(OpCode::Power, b, p))
            }
            ExprKind::Monad(kind, arg) => {
                let a = self.lower(arg)?;
                self.emit(Instruction::unary(monad_opcode(*kind), a))
            }
            ExprKind::Function(call) => match Builtin::of(call.def()) {
                Some(builtin) => {
                    let op = builtin_opcode(builtin);
                    let args = call
                        .args()
                        .iter()
                        .map(|a| self.lower(a))
                        .collect::<Result<Vec<_>>>()?;
                    match args.as_slice() {
                        [a] => self.emit(Instruction::unary(op, *a)),
                        [a, b] => self.emit(Instruction::binary(op, *a, *b)),
                        _ => {
                            return Err(EngineError::Internal(format!(
                                "built-in '{}' with {} arguments",
                                builtin.name(),
                                args.len()
                            )));
                        }
                    }
                }
                None => self.lower(&inline_call(call))?,
            },
        };
        self.memo.insert(Arc::clone(expr), id);
        Ok(id)
    }
}

/// A compiled expression, evaluable for any [`MathScalar`].
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    expr: Arc<Expr>,
    parameters: Vec<Symbol>,
    program: Program,
}

impl CompiledFunction {
    /// The simplified expression that was lowered
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Parameter order of [`Self::evaluate`]
    #[must_use]
    pub fn parameters(&self) -> &[Symbol] {
        &self.parameters
    }

    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    #[must_use]
    pub const fn target(&self) -> Target {
        match self.program {
            Program::Stack { .. } => Target::Stack,
            Program::Heap { .. } => Target::Heap,
        }
    }

    /// Heap instructions, `None` for the stack target
    #[must_use]
    pub fn instructions(&self) -> Option<&[Instruction]> {
        match &self.program {
            Program::Heap { instructions, .. } => Some(instructions),
            Program::Stack { .. } => None,
        }
    }

    /// Heap instruction index → cell, `None` for the stack target
    #[must_use]
    pub fn indirection(&self) -> Option<&[usize]> {
        match &self.program {
            Program::Heap { indirection, .. } => Some(indirection),
            Program::Stack { .. } => None,
        }
    }

    /// Number of value slots needed: cells of the heap form, maximum stack
    /// height of the stack form.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        match &self.program {
            Program::Stack { max_depth, .. } => *max_depth,
            Program::Heap { cell_count, .. } => *cell_count,
        }
    }

    #[must_use]
    pub fn instruction_count(&self) -> usize {
        match &self.program {
            Program::Stack { code, .. } => code.len(),
            Program::Heap { instructions, .. } => instructions.len(),
        }
    }

    fn scratch<T: MathScalar>(&self) -> Vec<T> {
        match &self.program {
            Program::Stack { max_depth, .. } => Vec::with_capacity(*max_depth),
            Program::Heap { cell_count, .. } => vec![T::zero(); *cell_count],
        }
    }

    fn run<T: MathScalar>(&self, params: &[T], scratch: &mut Vec<T>) -> T {
        match &self.program {
            Program::Stack { code, .. } => execution::run_stack(code, params, scratch),
            Program::Heap {
                instructions,
                indirection,
                output,
                ..
            } => execution::run_heap(instructions, indirection, *output, params, scratch),
        }
    }

    /// Evaluate at one point, values in [`Self::parameters`] order.
    ///
    /// # Errors
    /// [`EngineError::ParameterCountMismatch`] when `params` has the wrong
    /// length.
    pub fn evaluate<T: MathScalar>(&self, params: &[T]) -> Result<T> {
        if params.len() != self.parameters.len() {
            return Err(EngineError::ParameterCountMismatch {
                expected: self.parameters.len(),
                got: params.len(),
            });
        }
        let mut scratch = self.scratch();
        Ok(self.run(params, &mut scratch))
    }

    /// Evaluate with values looked up by name.
    ///
    /// # Errors
    /// [`EngineError::VariableNotPresent`] for a parameter missing from `vars`.
    pub fn evaluate_set<T: MathScalar>(&self, vars: &VariableSet<T>) -> Result<T> {
        let params = self
            .parameters
            .iter()
            .map(|p| vars.require(p))
            .collect::<Result<Vec<T>>>()?;
        self.evaluate(&params)
    }

    /// Evaluate at many points: `columns[k][i]` is parameter `k` at point `i`.
    ///
    /// # Errors
    /// [`EngineError::ParameterCountMismatch`] for the wrong number of
    /// columns, [`EngineError::ColumnLengthMismatch`] when a column's length
    /// differs from `output`'s.
    pub fn evaluate_batch<T: MathScalar>(&self, columns: &[&[T]], output: &mut [T]) -> Result<()> {
        if columns.len() != self.parameters.len() {
            return Err(EngineError::ParameterCountMismatch {
                expected: self.parameters.len(),
                got: columns.len(),
            });
        }
        if columns.iter().any(|c| c.len() != output.len()) {
            return Err(EngineError::ColumnLengthMismatch);
        }
        let mut scratch = self.scratch();
        let mut point = vec![T::zero(); columns.len()];
        for (i, out) in output.iter_mut().enumerate() {
            for (slot, column) in point.iter_mut().zip(columns) {
                *slot = column[i];
            }
            *out = self.run(&point, &mut scratch);
        }
        Ok(())
    }

    /// [`Self::evaluate_batch`] split into chunks across the rayon pool.
    ///
    /// # Errors
    /// Same as [`Self::evaluate_batch`].
    #[cfg(feature = "parallel")]
    pub fn evaluate_batch_parallel<T: MathScalar>(&self, columns: &[&[T]]) -> Result<Vec<T>> {
        use rayon::prelude::*;

        let n_points = columns.first().map_or(1, |c| c.len());
        if columns.iter().any(|c| c.len() != n_points) {
            return Err(EngineError::ColumnLengthMismatch);
        }
        let mut output = vec![T::zero(); n_points];
        if n_points < MIN_PARALLEL_SIZE {
            self.evaluate_batch(columns, &mut output)?;
            return Ok(output);
        }
        if columns.len() != self.parameters.len() {
            return Err(EngineError::ParameterCountMismatch {
                expected: self.parameters.len(),
                got: columns.len(),
            });
        }

        let chunk_starts: Vec<usize> = (0..n_points).step_by(MIN_PARALLEL_SIZE).collect();
        let chunks: Vec<(usize, Vec<T>)> = chunk_starts
            .into_par_iter()
            .map_init(
                || (self.scratch::<T>(), vec![T::zero(); columns.len()]),
                |(scratch, point), start| {
                    let end = (start + MIN_PARALLEL_SIZE).min(n_points);
                    let values = (start..end)
                        .map(|i| {
                            for (slot, column) in point.iter_mut().zip(columns) {
                                *slot = column[i];
                            }
                            self.run(point, scratch)
                        })
                        .collect();
                    (start, values)
                },
            )
            .collect();

        for (start, values) in chunks {
            output[start..start + values.len()].copy_from_slice(&values);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions;

    fn v(name: &str) -> Expr {
        Expr::variable(name)
    }

    fn both(expr: &Expr, params: &[&str]) -> (CompiledFunction, CompiledFunction) {
        let base = Compile::new().parameters(params).simplification_depth(0);
        (
            base.clone().target(Target::Stack).compile(expr).unwrap(),
            base.target(Target::Heap).compile(expr).unwrap(),
        )
    }

    #[test]
    fn test_targets_agree_with_tree() {
        let expr = Expr::sum(vec![
            v("x") * v("y"),
            Expr::sin_of(v("x")),
            Expr::pow(v("y"), Expr::from_i64(3)),
            functions::cos(v("x") + v("y")),
        ]);
        let (stack, heap) = both(&expr, &["x", "y"]);
        let vars = VariableSet::new().with("x", 0.7).with("y", -1.3);
        let tree: f64 = expr.evaluate(&vars).unwrap();
        assert!((stack.evaluate(&[0.7, -1.3]).unwrap() - tree).abs() < 1e-10);
        assert!((heap.evaluate(&[0.7, -1.3]).unwrap() - tree).abs() < 1e-10);
        assert!((heap.evaluate_set(&vars).unwrap() - tree).abs() < 1e-10);
    }

    #[test]
    fn test_heap_shares_subexpressions() {
        // sin(x + y) appears twice but is emitted once
        let s = Expr::sin_of(v("x") + v("y"));
        let expr = Expr::ln_of(s.clone()) + Expr::sign_of(s);
        let (stack, heap) = both(&expr, &["x", "y"]);
        let count = |e: &CompiledFunction, op: OpCode| match e.program() {
            Program::Stack { code, .. } => code.iter().filter(|o| **o == op).count(),
            Program::Heap { instructions, .. } => {
                instructions.iter().filter(|i| i.op == op).count()
            }
        };
        assert_eq!(count(&stack, OpCode::Sin), 2);
        assert_eq!(count(&heap, OpCode::Sin), 1);
    }

    #[test]
    fn test_default_parameters_are_sorted() {
        let f = compile(&(v("z") + v("a") * v("m")), None, 0).unwrap();
        let names: Vec<&str> = f.parameters().iter().map(Symbol::name).collect();
        assert_eq!(names, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_missing_parameter_is_an_error() {
        let err = compile(&(v("x") + v("y")), Some(&["x"][..]), 0).unwrap_err();
        assert_eq!(err, EngineError::variable_not_present("y"));
    }

    #[test]
    fn test_wrong_parameter_count() {
        let f = compile(&(v("x") + v("y")), None, 0).unwrap();
        assert!(matches!(
            f.evaluate(&[1.0_f64]),
            Err(EngineError::ParameterCountMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_constant_expression() {
        let f = compile(&Expr::from_i64(7), None, 0).unwrap();
        assert!(f.parameters().is_empty());
        assert!((f.evaluate::<f64>(&[]).unwrap() - 7.0).abs() < 1e-12);
        assert_eq!(f.cell_count(), 1);
    }

    #[test]
    fn test_user_function_is_inlined() {
        let def = crate::core::expr::FunctionDef::new("twice", &["t"], Expr::from_i64(2) * v("t"));
        let expr = Expr::call(&def, vec![Expr::sin_of(v("x"))]).unwrap() + functions::sqrt(v("x"));
        let (stack, heap) = both(&expr, &["x"]);
        let expected = 2.0 * 0.25_f64.sin() + 0.5;
        assert!((stack.evaluate(&[0.25]).unwrap() - expected).abs() < 1e-10);
        assert!((heap.evaluate(&[0.25]).unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_simplification_shrinks_program() {
        let expr = Expr::sin_of(Expr::arcsin_of(v("x") * v("y")));
        let plain = compile(&expr, None, 0).unwrap();
        let simplified = compile(&expr, None, 1).unwrap();
        assert_eq!(*simplified.expr(), v("x") * v("y"));
        assert!(simplified.instruction_count() < plain.instruction_count());
    }

    #[test]
    fn test_batch_matches_pointwise() {
        let expr = Expr::pow(v("x"), Expr::from_i64(2)) + v("y");
        let f = compile(&expr, Some(&["x", "y"][..]), 0).unwrap();
        let xs: [f64; 4] = [0.0, 1.0, 2.0, 3.0];
        let ys: [f64; 4] = [1.0, 1.0, 0.5, -2.0];
        let mut out = [0.0_f64; 4];
        f.evaluate_batch(&[&xs[..], &ys[..]], &mut out[..]).unwrap();
        for i in 0..4 {
            assert!((out[i] - f.evaluate(&[xs[i], ys[i]]).unwrap()).abs() < 1e-12);
        }
        let mut short = [0.0_f64; 3];
        assert_eq!(
            f.evaluate_batch(&[&xs[..], &ys[..]], &mut short[..]),
            Err(EngineError::ColumnLengthMismatch)
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_batch() {
        let expr = Expr::sin_of(v("x")) * v("x");
        let f = compile(&expr, None, 0).unwrap();
        let xs: Vec<f64> = (0..1000).map(|i| f64::from(i) * 0.01).collect();
        let out = f.evaluate_batch_parallel(&[xs.as_slice()]).unwrap();
        assert_eq!(out.len(), 1000);
        for (x, y) in xs.iter().zip(&out) {
            assert!((x.sin() * x - y).abs() < 1e-10);
        }
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "empty argument list")]
    fn test_empty_reduction_is_fatal() {
        let index = FxHashMap::default();
        let mut lowering = HeapLowering {
            index: &index,
            instructions: Vec::new(),
            memo: FxHashMap::default(),
        };
        let _ = lowering.reduce(&[], OpCode::Add);
    }

    #[test]
    fn test_stack_depth_limit() {
        // Right-nested power tower needs one slot per level
        let mut expr = v("x");
        for _ in 0..(MAX_STACK_DEPTH + 5) {
            expr = Expr::pow(v("x"), expr);
        }
        let err = Compile::new()
            .simplification_depth(0)
            .target(Target::Stack)
            .compile(&expr)
            .unwrap_err();
        assert!(matches!(err, EngineError::StackOverflow { .. }));
    }
}
