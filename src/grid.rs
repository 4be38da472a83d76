use rand::{seq::SliceRandom, Rng};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{PuzzleError, Result};

/// A cell coordinate, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns true if the two cells share an edge.
    pub fn is_adjacent(&self, other: Cell) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An exchange of the values held by two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swap {
    pub first: Cell,
    pub second: Cell,
}

impl Swap {
    pub fn new(first: impl Into<Cell>, second: impl Into<Cell>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Finds the single adjacent swap turning `from` into `to`, if there is one.
    pub fn between(from: &GridState, to: &GridState) -> Option<Swap> {
        if from.dims() != to.dims() {
            return None;
        }

        let mut diff = from
            .cells
            .iter()
            .zip(&to.cells)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(index, _)| index);

        let (i, j) = (diff.next()?, diff.next()?);
        if diff.next().is_some() || from.cells[i] != to.cells[j] || from.cells[j] != to.cells[i] {
            return None;
        }

        let swap = Swap::new(from.cell_at(i), from.cell_at(j));
        swap.first.is_adjacent(swap.second).then_some(swap)
    }

    /// The same pair of cells; a swap is its own inverse.
    pub fn inverse(&self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }
}

impl fmt::Display for Swap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// Borrowed canonical form of a [`GridState`], usable for ordering and hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey<'a> {
    rows: usize,
    cols: usize,
    cells: &'a [u32],
}

/// One arrangement of the values `1..=rows*cols` on a `rows x cols` grid.
///
/// Values are stored row-major. Equality, ordering and hashing are structural,
/// so a `GridState` is its own canonical key in maps and sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridState {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

impl GridState {
    /// Creates a state from row-major values.
    ///
    /// Fails with [`PuzzleError::MalformedState`] if a dimension is zero, the
    /// length is wrong, or the values are not a permutation of `1..=rows*cols`.
    pub fn new(rows: usize, cols: usize, values: Vec<u32>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PuzzleError::MalformedState(format!(
                "dimensions must be positive, got {rows}x{cols}"
            )));
        }
        let len = rows.checked_mul(cols).ok_or_else(|| {
            PuzzleError::MalformedState(format!("a {rows}x{cols} grid has too many cells"))
        })?;
        if values.len() != len {
            return Err(PuzzleError::MalformedState(format!(
                "expected {len} values for a {rows}x{cols} grid, got {}",
                values.len()
            )));
        }

        let mut seen = vec![false; len];
        for &value in &values {
            let slot = (value as usize)
                .checked_sub(1)
                .filter(|&slot| slot < len)
                .ok_or_else(|| {
                    PuzzleError::MalformedState(format!("value {value} is outside 1..={len}"))
                })?;
            if std::mem::replace(&mut seen[slot], true) {
                return Err(PuzzleError::MalformedState(format!(
                    "value {value} appears more than once"
                )));
            }
        }

        Ok(Self {
            rows,
            cols,
            cells: values,
        })
    }

    /// Creates a state from a list of rows, which must all have the same length.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(PuzzleError::MalformedState(format!(
                "row {bad} has {} values, expected {width}",
                rows[bad].len()
            )));
        }
        Self::new(height, width, rows.into_iter().flatten().collect())
    }

    /// The sorted state: the value at `(i, j)` is `i * cols + j + 1`.
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn sorted(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be positive");
        Self {
            rows,
            cols,
            cells: (1..=(rows * cols) as u32).collect(),
        }
    }

    /// A uniformly random arrangement.
    ///
    /// Every arrangement can be sorted by adjacent swaps, so unlike sliding
    /// puzzles no solvability filter is needed.
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn shuffled<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let mut state = Self::sorted(rows, cols);
        state.cells.shuffle(rng);
        state
    }

    /// Reads a grid in the text format accepted by [`FromStr`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PuzzleError::Parse(format!("cannot read {}: {e}", path.display())))?;
        text.parse()
    }

    pub(crate) fn from_cells_unchecked(rows: usize, cols: usize, cells: Vec<u32>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Values in row-major order.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// The canonical key of this state.
    ///
    /// Two states built along different paths with the same content have
    /// equal keys.
    pub fn key(&self) -> StateKey<'_> {
        StateKey {
            rows: self.rows,
            cols: self.cols,
            cells: &self.cells,
        }
    }

    /// The value at `cell`, or `None` if it is out of bounds.
    pub fn get(&self, cell: impl Into<Cell>) -> Option<u32> {
        let cell = cell.into();
        self.contains(cell)
            .then(|| self.cells[self.index_of(cell)])
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// True if both cells are in bounds and share an edge.
    pub fn is_swap_allowed(&self, first: Cell, second: Cell) -> bool {
        self.contains(first) && self.contains(second) && first.is_adjacent(second)
    }

    /// Returns a copy with the values at the two cells exchanged.
    pub fn swap(&self, first: impl Into<Cell>, second: impl Into<Cell>) -> Result<Self> {
        let mut next = self.clone();
        next.swap_in_place(first, second)?;
        Ok(next)
    }

    /// Exchanges the values at the two cells.
    ///
    /// Diagonal, distant and out-of-bounds pairs are rejected with
    /// [`PuzzleError::InvalidMove`] and leave the state untouched.
    pub fn swap_in_place(&mut self, first: impl Into<Cell>, second: impl Into<Cell>) -> Result<()> {
        let (first, second) = (first.into(), second.into());
        if !self.is_swap_allowed(first, second) {
            return Err(PuzzleError::InvalidMove {
                from: first,
                to: second,
            });
        }
        let (a, b) = (self.index_of(first), self.index_of(second));
        self.cells.swap(a, b);
        Ok(())
    }

    /// Applies the swaps in order and returns the resulting state.
    pub fn apply_swaps(&self, swaps: &[Swap]) -> Result<Self> {
        let mut state = self.clone();
        for swap in swaps {
            state.swap_in_place(swap.first, swap.second)?;
        }
        Ok(state)
    }

    /// Every legal swap: all horizontal pairs row by row, then all vertical
    /// pairs column by column.
    pub fn legal_swaps(&self) -> impl Iterator<Item = Swap> + '_ {
        let horizontal = (0..self.rows).flat_map(move |i| {
            (0..self.cols.saturating_sub(1)).map(move |j| Swap::new((i, j), (i, j + 1)))
        });
        let vertical = (0..self.cols).flat_map(move |j| {
            (0..self.rows.saturating_sub(1)).map(move |i| Swap::new((i, j), (i + 1, j)))
        });
        horizontal.chain(vertical)
    }

    /// One new state per legal swap, in [`legal_swaps`](Self::legal_swaps) order.
    ///
    /// Always `2 * rows * cols - rows - cols` states, all distinct.
    pub fn neighbors(&self) -> Vec<GridState> {
        self.legal_swaps()
            .map(|swap| {
                let mut next = self.clone();
                next.cells
                    .swap(self.index_of(swap.first), self.index_of(swap.second));
                next
            })
            .collect()
    }

    /// Number of neighbors of any `rows x cols` state.
    pub fn neighbor_count(rows: usize, cols: usize) -> usize {
        2 * rows * cols - rows - cols
    }

    /// Sum over all cells of `|value_here - value_there|`.
    ///
    /// This compares values, not tile positions.
    pub fn manhattan_distance(&self, other: &GridState) -> Result<u64> {
        self.check_same_shape(other)?;
        Ok(self
            .cells
            .iter()
            .zip(&other.cells)
            .map(|(&a, &b)| u64::from(a.abs_diff(b)))
            .sum())
    }

    /// Largest value gap between two grid-adjacent cells.
    ///
    /// One swap changes [`manhattan_distance`](Self::manhattan_distance) to
    /// this state by at most twice this amount.
    pub(crate) fn max_adjacent_gap(&self) -> u64 {
        self.legal_swaps()
            .map(|swap| {
                let a = self.cells[self.index_of(swap.first)];
                let b = self.cells[self.index_of(swap.second)];
                u64::from(a.abs_diff(b))
            })
            .max()
            .unwrap_or(0)
    }

    pub fn is_sorted(&self) -> bool {
        self.cells
            .iter()
            .enumerate()
            .all(|(index, &value)| value as usize == index + 1)
    }

    pub(crate) fn check_same_shape(&self, other: &GridState) -> Result<()> {
        if self.dims() == other.dims() {
            Ok(())
        } else {
            Err(PuzzleError::DimensionMismatch {
                expected: self.dims(),
                found: other.dims(),
            })
        }
    }

    fn index_of(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }
}

/// Parses `"m n"` on the first line followed by `m` lines of `n` integers.
impl FromStr for GridState {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self> {
        let mut lines = s.lines().filter(|line| !line.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| PuzzleError::Parse("missing dimension line".to_string()))?;
        let dims = parse_numbers::<usize>(header)?;
        let [rows, cols] = dims[..] else {
            return Err(PuzzleError::Parse(format!(
                "dimension line must hold two integers, got {header:?}"
            )));
        };

        if rows.checked_mul(cols).is_none() {
            return Err(PuzzleError::Parse(format!(
                "a {rows}x{cols} grid has too many cells"
            )));
        }

        // grows with the rows actually present, not the declared size
        let mut values = Vec::new();
        for i in 0..rows {
            let line = lines
                .next()
                .ok_or_else(|| PuzzleError::Parse(format!("missing row {i}")))?;
            let row = parse_numbers::<u32>(line)?;
            if row.len() != cols {
                return Err(PuzzleError::Parse(format!(
                    "row {i} has {} values, expected {cols}",
                    row.len()
                )));
            }
            values.extend(row);
        }

        Self::new(rows, cols, values)
    }
}

fn parse_numbers<T: FromStr>(line: &str) -> Result<Vec<T>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| PuzzleError::Parse(format!("not an integer: {token:?}")))
        })
        .collect()
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.rows * self.cols).to_string().len();
        for row in self.cells.chunks(self.cols) {
            for &val in row {
                write!(f, "{:width$} ", val)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
