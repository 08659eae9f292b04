//! Distance estimates used as the search priority tie to the goal.

use crate::grid::Position;

/// Manhattan distance between two positions.
///
/// With 4-directional movement and unit edge cost this never overestimates
/// the true remaining distance and is consistent, which is what guarantees
/// that the first time the goal is popped its cost is minimal.
pub fn manhattan(a: Position, b: Position) -> usize {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}
