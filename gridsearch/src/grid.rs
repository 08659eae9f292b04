use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// A (row, column) location on the grid.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// What a cell currently holds, as an explicit tag. The presentation layer
/// decides how each tag is drawn; the engine only ever reads `Barrier` and
/// writes `Frontier`, `Visited`, `Path` and `End`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Empty,
    Start,
    End,
    Barrier,
    /// Discovered but not yet expanded (open set).
    Frontier,
    /// Fully expanded; will not be reconsidered (closed set).
    Visited,
    /// On the reconstructed shortest path.
    Path,
}

impl CellState {
    pub fn is_barrier(self) -> bool {
        matches!(self, CellState::Barrier)
    }

    /// True for the transient marks a search leaves behind.
    pub fn is_search_mark(self) -> bool {
        matches!(
            self,
            CellState::Frontier | CellState::Visited | CellState::Path
        )
    }
}

/// A single grid square.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    position: Position,
    pub state: CellState,
    neighbors: Vec<Position>,
}

impl Cell {
    fn new(position: Position) -> Self {
        Self {
            position,
            state: CellState::Empty,
            neighbors: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Adjacent non-barrier positions, as of the last
    /// [`Grid::recompute_adjacency`] call. Stale after any barrier edit
    /// until adjacency is recomputed.
    pub fn neighbors(&self) -> &[Position] {
        &self.neighbors
    }

    pub fn is_barrier(&self) -> bool {
        self.state.is_barrier()
    }
}

/// A square grid of cells that owns adjacency computation.
///
/// The size is fixed at construction; [`Grid::reset`] empties the cells but
/// never changes the dimensions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create a `size` x `size` grid of empty cells.
    pub fn new(size: usize) -> Self {
        let cells = (0..size)
            .map(|row| {
                (0..size)
                    .map(|col| Cell::new(Position { row, col }))
                    .collect()
            })
            .collect();
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_valid(&self, position: Position) -> bool {
        position.row < self.size && position.col < self.size
    }

    pub fn cell(&self, position: Position) -> Result<&Cell, GridError> {
        if self.is_valid(position) {
            Ok(&self.cells[position.row][position.col])
        } else {
            Err(GridError::OutOfBounds {
                position,
                size: self.size,
            })
        }
    }

    pub fn cell_mut(&mut self, position: Position) -> Result<&mut Cell, GridError> {
        if self.is_valid(position) {
            Ok(&mut self.cells[position.row][position.col])
        } else {
            Err(GridError::OutOfBounds {
                position,
                size: self.size,
            })
        }
    }

    pub fn state(&self, position: Position) -> Result<CellState, GridError> {
        Ok(self.cell(position)?.state)
    }

    pub fn set_state(&mut self, position: Position, state: CellState) -> Result<(), GridError> {
        self.cell_mut(position)?.state = state;
        Ok(())
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Position { row, col }))
    }

    /// Rebuild every cell's neighbor list from the current barrier states.
    ///
    /// Must be called after any barrier change and before running a search;
    /// the engine does not call it implicitly.
    pub fn recompute_adjacency(&mut self) {
        for row in 0..self.size {
            for col in 0..self.size {
                let neighbors = self.open_neighbors(Position { row, col });
                self.cells[row][col].neighbors = neighbors;
            }
        }
    }

    // Up, left, down, right; skips barriers and the grid edge. A barrier
    // cell gets an empty list.
    fn open_neighbors(&self, position: Position) -> Vec<Position> {
        if self.cells[position.row][position.col].is_barrier() {
            return Vec::new();
        }

        let mut points = Vec::with_capacity(4);

        if position.row > 0 {
            points.push(Position {
                row: position.row - 1,
                col: position.col,
            });
        }
        if position.col > 0 {
            points.push(Position {
                col: position.col - 1,
                row: position.row,
            });
        }
        if position.row < self.size - 1 {
            points.push(Position {
                row: position.row + 1,
                col: position.col,
            });
        }
        if position.col < self.size - 1 {
            points.push(Position {
                col: position.col + 1,
                row: position.row,
            });
        }

        points.retain(|p| !self.cells[p.row][p.col].is_barrier());

        points
    }

    /// Put every cell back to `Empty`, keeping the grid size.
    pub fn reset(&mut self) {
        *self = Grid::new(self.size);
    }

    /// Clear `Frontier`/`Visited`/`Path` marks left by a previous search,
    /// keeping start, end and barrier cells.
    pub fn clear_search_marks(&mut self) {
        for row in &mut self.cells {
            for cell in row {
                if cell.state.is_search_mark() {
                    cell.state = CellState::Empty;
                }
            }
        }
    }

    /// Row-major copy of all cell states. Cheap enough to capture once per
    /// search step, which is how the frontend records playback frames.
    pub fn snapshot(&self) -> Vec<CellState> {
        self.cells
            .iter()
            .flat_map(|row| row.iter().map(|cell| cell.state))
            .collect()
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            for cell in row {
                let c = match cell.state {
                    CellState::Empty => ' ',
                    CellState::Start => 'S',
                    CellState::End => 'E',
                    CellState::Barrier => 'X',
                    CellState::Frontier => 'o',
                    CellState::Visited => '.',
                    CellState::Path => '*',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(4);
        assert_eq!(grid.size(), 4);
        for position in grid.positions() {
            let cell = grid.cell(position).unwrap();
            assert_eq!(cell.state, CellState::Empty);
            assert_eq!(cell.position(), position);
        }
    }

    #[test]
    fn out_of_bounds_access_fails() {
        let grid = Grid::new(5);
        let err = grid.cell(Position::new(5, 0)).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds {
                position: Position::new(5, 0),
                size: 5
            }
        );
        assert!(grid.cell(Position::new(0, 17)).is_err());
        assert!(grid.cell(Position::new(4, 4)).is_ok());
    }

    #[test]
    fn adjacency_is_four_directional() {
        let mut grid = Grid::new(3);
        grid.recompute_adjacency();

        // center cell: up, left, down, right
        assert_eq!(
            grid.cell(Position::new(1, 1)).unwrap().neighbors(),
            &[
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(2, 1),
                Position::new(1, 2),
            ]
        );

        // corner cell: only two neighbors
        assert_eq!(
            grid.cell(Position::new(0, 0)).unwrap().neighbors(),
            &[Position::new(1, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn adjacency_excludes_barriers() {
        let mut grid = Grid::new(3);
        grid.set_state(Position::new(0, 1), CellState::Barrier).unwrap();
        grid.recompute_adjacency();

        assert_eq!(
            grid.cell(Position::new(1, 1)).unwrap().neighbors(),
            &[
                Position::new(1, 0),
                Position::new(2, 1),
                Position::new(1, 2),
            ]
        );
        // the barrier itself has no neighbors
        assert!(grid.cell(Position::new(0, 1)).unwrap().neighbors().is_empty());
    }

    #[test]
    fn adjacency_is_stale_until_recomputed() {
        let mut grid = Grid::new(3);
        grid.recompute_adjacency();
        grid.set_state(Position::new(0, 1), CellState::Barrier).unwrap();

        // the old list still contains the barrier
        assert!(grid
            .cell(Position::new(1, 1))
            .unwrap()
            .neighbors()
            .contains(&Position::new(0, 1)));

        grid.recompute_adjacency();
        assert!(!grid
            .cell(Position::new(1, 1))
            .unwrap()
            .neighbors()
            .contains(&Position::new(0, 1)));
    }

    #[test]
    fn reset_empties_all_cells() {
        let mut grid = Grid::new(3);
        grid.set_state(Position::new(0, 0), CellState::Start).unwrap();
        grid.set_state(Position::new(2, 2), CellState::Barrier).unwrap();
        grid.reset();

        assert_eq!(grid.size(), 3);
        assert!(grid
            .positions()
            .all(|p| grid.state(p).unwrap() == CellState::Empty));
    }

    #[test]
    fn clear_search_marks_keeps_endpoints_and_barriers() {
        let mut grid = Grid::new(3);
        grid.set_state(Position::new(0, 0), CellState::Start).unwrap();
        grid.set_state(Position::new(2, 2), CellState::End).unwrap();
        grid.set_state(Position::new(1, 1), CellState::Barrier).unwrap();
        grid.set_state(Position::new(0, 1), CellState::Frontier).unwrap();
        grid.set_state(Position::new(1, 0), CellState::Visited).unwrap();
        grid.set_state(Position::new(2, 1), CellState::Path).unwrap();

        grid.clear_search_marks();

        assert_eq!(grid.state(Position::new(0, 0)).unwrap(), CellState::Start);
        assert_eq!(grid.state(Position::new(2, 2)).unwrap(), CellState::End);
        assert_eq!(grid.state(Position::new(1, 1)).unwrap(), CellState::Barrier);
        assert_eq!(grid.state(Position::new(0, 1)).unwrap(), CellState::Empty);
        assert_eq!(grid.state(Position::new(1, 0)).unwrap(), CellState::Empty);
        assert_eq!(grid.state(Position::new(2, 1)).unwrap(), CellState::Empty);
    }

    #[test]
    fn snapshot_is_row_major() {
        let mut grid = Grid::new(2);
        grid.set_state(Position::new(0, 1), CellState::Barrier).unwrap();
        assert_eq!(
            grid.snapshot(),
            vec![
                CellState::Empty,
                CellState::Barrier,
                CellState::Empty,
                CellState::Empty,
            ]
        );
    }
}
