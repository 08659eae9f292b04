//! Walks the came-from map backwards from the end cell to recover and mark
//! the shortest path.

use std::collections::HashMap;

use crate::error::GridError;
use crate::grid::{CellState, Grid, Position};

/// Mark every cell on the found path as [`CellState::Path`], walking from
/// `end` back towards the start, and invoke `on_step` once per marked cell
/// (so the callback order is end-to-start, not path order).
///
/// Neither `end` (the caller re-marks it) nor the start cell is touched;
/// the start never has a came-from entry, which is the loop's exit
/// condition.
pub(crate) fn mark_path<F>(
    grid: &mut Grid,
    came_from: &HashMap<Position, Position>,
    end: Position,
    on_step: &mut F,
) -> Result<(), GridError>
where
    F: FnMut(&Grid),
{
    let mut current = end;
    while let Some(&previous) = came_from.get(&current) {
        current = previous;
        if !came_from.contains_key(&current) {
            // reached the start cell
            break;
        }
        grid.set_state(current, CellState::Path)?;
        on_step(grid);
    }

    Ok(())
}

/// Recover the full position sequence from start to `end`, inclusive.
pub(crate) fn trace(came_from: &HashMap<Position, Position>, end: Position) -> Vec<Position> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
