//! Combinatorial enumeration for commutative matching.
//!
//! Matching `k` pattern arguments against `n` target arguments tries every
//! partition of the targets into exactly `k` non-empty blocks, under every
//! assignment of blocks to pattern positions. There are `S(n, k) · k!` such
//! ordered partitions (the surjections from `n` onto `k`).

/// All partitions of `0..n` into exactly `k` non-empty blocks.
///
/// Generated as restricted growth strings, so every partition appears once.
/// Blocks are listed in order of their smallest element; elements inside a
/// block ascend.
#[must_use]
pub fn set_partitions(n: usize, k: usize) -> Vec<Vec<Vec<usize>>> {
    let mut out = Vec::new();
    if k == 0 || k > n {
        return out;
    }
    let mut labels = Vec::with_capacity(n);
    extend_labels(&mut labels, n, k, 0, &mut out);
    out
}

fn extend_labels(
    labels: &mut Vec<usize>,
    n: usize,
    k: usize,
    used: usize,
    out: &mut Vec<Vec<Vec<usize>>>,
) {
    let i = labels.len();
    if i == n {
        if used == k {
            let mut blocks = vec![Vec::new(); k];
            for (element, &block) in labels.iter().enumerate() {
                blocks[block].push(element);
            }
            out.push(blocks);
        }
        return;
    }
    // Not enough elements left to open the remaining blocks
    if k - used > n - i {
        return;
    }
    for block in 0..used {
        labels.push(block);
        extend_labels(labels, n, k, used, out);
        labels.pop();
    }
    if used < k {
        labels.push(used);
        extend_labels(labels, n, k, used + 1, out);
        labels.pop();
    }
}

/// All permutations of `0..k` (Heap's algorithm, iterative).
#[must_use]
pub fn permutations(k: usize) -> Vec<Vec<usize>> {
    let mut current: Vec<usize> = (0..k).collect();
    let mut out = vec![current.clone()];
    let mut counters = vec![0usize; k];
    let mut i = 1;
    while i < k {
        if counters[i] < i {
            if i % 2 == 0 {
                current.swap(0, i);
            } else {
                current.swap(counters[i], i);
            }
            out.push(current.clone());
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
    out
}

/// Ordered partitions: for each result, entry `i` holds the target indices
/// assigned to pattern position `i`.
#[must_use]
pub fn ordered_partitions(n: usize, k: usize) -> Vec<Vec<Vec<usize>>> {
    let perms = permutations(k);
    set_partitions(n, k)
        .into_iter()
        .flat_map(|blocks| {
            perms
                .iter()
                .map(|perm| perm.iter().map(|&b| blocks[b].clone()).collect())
                .collect::<Vec<Vec<Vec<usize>>>>()
        })
        .collect()
}
