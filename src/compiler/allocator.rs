//! Linear-scan cell allocation for the heap target.
//!
//! Instructions form a branch-free DAG in dependency order, so a single
//! forward pass suffices: a value's cell is released at its last reader and
//! may be handed to that reader's own result.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::instruction::Instruction;

/// Result of [`allocate_cells`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Instruction index → physical cell
    pub indirection: Vec<usize>,
    /// Number of cells needed (largest cell index + 1)
    pub cell_count: usize,
}

/// For every instruction, the index of the last instruction reading it.
/// `None` for values nobody reads (the result).
#[must_use]
pub fn last_uses(instructions: &[Instruction]) -> Vec<Option<usize>> {
    let mut last = vec![None; instructions.len()];
    for (i, instruction) in instructions.iter().enumerate() {
        for &input in instruction.inputs() {
            last[input] = Some(i);
        }
    }
    last
}

/// Assign a cell to every instruction so that no two simultaneously live
/// values share one.
///
/// Before instruction `i` gets its cell, every cell whose value is last read
/// by `i` returns to the free pool; the smallest free cell is taken, or a new
/// one when the pool is empty. Values never read are never freed.
#[must_use]
pub fn allocate_cells(instructions: &[Instruction]) -> Allocation {
    let last = last_uses(instructions);
    let mut pending: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    let mut free: BTreeSet<usize> = BTreeSet::new();
    let mut indirection = Vec::with_capacity(instructions.len());
    let mut cell_count = 0;

    for (i, last_use) in last.iter().enumerate() {
        if let Some(released) = pending.remove(&i) {
            free.extend(released);
        }
        let cell = free.pop_first().unwrap_or_else(|| {
            cell_count += 1;
            cell_count - 1
        });
        trace!(instruction = i, cell, last_use = ?last_use, "cell assigned");
        indirection.push(cell);
        if let Some(end) = *last_use {
            pending.entry(end).or_default().push(cell);
        }
    }

    Allocation {
        indirection,
        cell_count,
    }
}
