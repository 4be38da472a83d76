//! Enumeration of every arrangement of a grid.

use crate::grid::GridState;

/// Iterator over all `(rows * cols)!` states of a grid, in lexicographic
/// order of their row-major values, starting from the sorted state.
///
/// Created by [`all_permutations`]. Cloning an iterator snapshots its
/// position; calling [`all_permutations`] again starts over.
#[derive(Debug, Clone)]
pub struct Permutations {
    rows: usize,
    cols: usize,
    next: Option<Vec<u32>>,
    remaining: Option<usize>,
}

/// Enumerates every state of a `rows x cols` grid.
///
/// Only small grids are practical: there are `(rows * cols)!` of them.
///
/// # Panics
/// Panics if either dimension is zero.
pub fn all_permutations(rows: usize, cols: usize) -> Permutations {
    let first = GridState::sorted(rows, cols).cells().to_vec();
    Permutations {
        rows,
        cols,
        next: Some(first),
        remaining: permutation_count(rows, cols),
    }
}

/// `(rows * cols)!`, or `None` if it does not fit in a `usize`.
pub fn permutation_count(rows: usize, cols: usize) -> Option<usize> {
    (1..=rows.checked_mul(cols)?).try_fold(1usize, |acc, k| acc.checked_mul(k))
}

impl Iterator for Permutations {
    type Item = GridState;

    fn next(&mut self) -> Option<GridState> {
        let current = self.next.take()?;

        let mut successor = current.clone();
        if next_permutation(&mut successor) {
            self.next = Some(successor);
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }

        Some(GridState::from_cells_unchecked(self.rows, self.cols, current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.remaining, &self.next) {
            (_, None) => (0, Some(0)),
            (Some(remaining), Some(_)) => (remaining, Some(remaining)),
            (None, Some(_)) => (usize::MAX, None),
        }
    }
}

/// Advances `values` to the next lexicographic permutation.
///
/// Returns false, leaving `values` untouched, when it is already the last one.
fn next_permutation(values: &mut [u32]) -> bool {
    let Some(pivot) = values.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        return false;
    };
    // The suffix after `pivot` is non-increasing, so the rightmost larger
    // element is the smallest one above the pivot.
    let Some(successor) = values.iter().rposition(|&v| v > values[pivot]) else {
        return false;
    };
    values.swap(pivot, successor);
    values[pivot + 1..].reverse();
    true
}
