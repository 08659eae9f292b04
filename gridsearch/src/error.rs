use thiserror::Error;

use crate::grid::Position;

/// Errors from grid cell access.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// The requested position lies outside the grid. This is a contract
    /// violation on the caller's side, not a recoverable condition.
    #[error("position {position} is outside the {size}x{size} grid")]
    OutOfBounds { position: Position, size: usize },
}

/// Errors reported before a search starts. A search that merely fails to
/// find a path is not an error, see
/// [`SearchOutcome`](crate::SearchOutcome).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("start and end are both {0}")]
    IdenticalEndpoints(Position),

    #[error("endpoint {0} is a barrier")]
    BarrierEndpoint(Position),
}
