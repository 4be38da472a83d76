//! Shortest adjacent-swap solutions for the tile swap puzzle.
//!
//! A [`GridState`] holds a permutation of `1..=rows*cols`; one move exchanges
//! the values of two cells sharing an edge. [`PathSearch`] finds a shortest
//! sequence of moves between two states, either over a prebuilt
//! [`StateGraph`] or by generating neighbors on demand.
//!
//! ```
//! use swap_puzzle::{a_star, GridState};
//!
//! let source = GridState::from_rows(vec![vec![1, 2], vec![4, 3]]).unwrap();
//! let target = GridState::sorted(2, 2);
//! let path = a_star(&source, &target).unwrap().expect("always reachable");
//! assert_eq!(path.len_moves(), 1);
//! ```

mod config;
mod error;
mod graph;
mod grid;
mod permutations;
mod search;

pub use config::{ConfigError, SearchConfig};
pub use error::{PuzzleError, Result};
pub use graph::StateGraph;
pub use grid::{Cell, GridState, StateKey, Swap};
pub use permutations::{all_permutations, permutation_count, Permutations};
pub use search::{a_star, bfs, incremental_bfs, CancelToken, Path, PathSearch};
