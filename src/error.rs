//! Error types for the swap puzzle.

use thiserror::Error;

use crate::grid::Cell;

/// Errors raised by grid construction, swaps and searches.
///
/// A search that simply finds no path is not an error: it returns `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// The two cells are not grid-adjacent or one of them is out of bounds.
    #[error("invalid move: cannot swap {from} with {to}")]
    InvalidMove { from: Cell, to: Cell },

    /// Source and target of a search have different shapes.
    #[error("dimension mismatch: expected {}x{}, found {}x{}", .expected.0, .expected.1, .found.0, .found.1)]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The values are not a permutation of `1..=rows*cols`.
    #[error("malformed state: {0}")]
    MalformedState(String),

    /// A graph search endpoint is not a node of the graph.
    #[error("{0} state is not a node of the graph")]
    NotInGraph(&'static str),

    /// Exhaustive graph construction was requested for too many cells.
    #[error("exhaustive graph over {cells} cells exceeds the limit of {limit}")]
    GraphTooLarge { cells: usize, limit: usize },

    /// The search was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("search cancelled")]
    Cancelled,

    /// The search expanded more states than allowed.
    #[error("search gave up after expanding {0} states")]
    ExpansionLimit(usize),

    /// Grid text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type alias for puzzle operations.
pub type Result<T> = std::result::Result<T, PuzzleError>;
