//! Shortest-path search on a square obstacle grid, with hooks for
//! step-by-step visualization.
//!
//! The caller paints [`CellState::Start`], [`CellState::End`] and
//! [`CellState::Barrier`] cells onto a [`Grid`], calls
//! [`Grid::recompute_adjacency`], and then runs a [`PathSearch`]. The engine
//! mutates cell states in place (`Frontier`/`Visited` while running, `Path`
//! on success) and invokes a step callback once per expanded cell, so a
//! frontend can animate the search at whatever pace it likes. A
//! [`CancelToken`] aborts a run from the outside.
//!
//! The engine itself does no I/O and holds no global state; everything it
//! needs is passed in explicitly.

mod error;
mod grid;
pub mod heuristic;
mod reconstruct;
mod search;

pub use error::{GridError, SearchError};
pub use grid::{Cell, CellState, Grid, Position};
pub use heuristic::manhattan;
pub use search::{CancelToken, PathResult, PathSearch, SearchOutcome};
