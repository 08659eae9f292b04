//! Best-first (A*) search over a [`Grid`] with unit edge costs.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use log::debug;

use crate::error::SearchError;
use crate::grid::{CellState, Grid, Position};
use crate::heuristic::manhattan;
use crate::reconstruct;

/// Cloneable abort signal, checked once per expanded cell.
///
/// The engine runs on whatever thread calls [`PathSearch::run`]; a caller
/// that runs it on a worker thread keeps a clone of the token to abort from
/// the UI side.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// The reconstructed shortest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Every position from start to end, inclusive.
    pub path: Vec<Position>,
    /// Number of edges walked; equals the end cell's g-score.
    pub length: usize,
}

/// How a search run ended. `NotFound` and `Cancelled` are legitimate
/// outcomes, not errors; neither is ever retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(PathResult),
    NotFound,
    Cancelled,
}

/// Entry in the open set, ordered by (f-score, insertion sequence).
///
/// The sequence number makes ties FIFO: among equal f-scores the
/// oldest-inserted entry wins, so runs over identical input expand cells in
/// the same order every time.
#[derive(Debug)]
struct OpenEntry {
    f: usize,
    seq: u64,
    position: Position,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse for BinaryHeap to act as a min-heap
        (self.f, self.seq).cmp(&(other.f, other.seq)).reverse()
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        (self.f, self.seq) == (other.f, other.seq)
    }
}

impl Eq for OpenEntry {}

/// Bookkeeping for a single `run` invocation. Created fresh each time and
/// dropped on completion; never reused across runs.
#[derive(Default)]
struct SearchState {
    /// Predecessor on the best known path; the start has no entry.
    came_from: HashMap<Position, Position>,
    /// Best known cost from the start; absent means +infinity.
    g_score: HashMap<Position, usize>,
    /// g-score plus heuristic estimate to the end; absent means +infinity.
    f_score: HashMap<Position, usize>,
    open: BinaryHeap<OpenEntry>,
    /// Mirrors `open` for O(1) membership checks.
    open_membership: HashSet<Position>,
    next_seq: u64,
}

/// A* between two cells of a grid.
///
/// Preconditions: start and end are distinct non-barrier cells, and the
/// grid's adjacency has been recomputed since the last barrier edit — the
/// engine does not call [`Grid::recompute_adjacency`] itself. At most one
/// search may run against a given grid at a time.
#[derive(Debug, Clone, Copy)]
pub struct PathSearch {
    start: Position,
    end: Position,
}

impl PathSearch {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Run the search to completion, exhaustion or cancellation.
    ///
    /// `on_step` is invoked once per expanded cell, after that cell's
    /// neighbors have been relaxed and its own state updated; it is the only
    /// point where the caller observes intermediate state. Cell states are
    /// mutated in place: `Frontier`/`Visited` marks while running, `Path`
    /// marks on success, and the visited trace is deliberately left behind
    /// on `NotFound` and `Cancelled`.
    pub fn run<F>(
        &self,
        grid: &mut Grid,
        cancel: &CancelToken,
        mut on_step: F,
    ) -> Result<SearchOutcome, SearchError>
    where
        F: FnMut(&Grid),
    {
        self.validate(grid)?;

        let mut state = SearchState::default();
        let f_start = manhattan(self.start, self.end);
        state.g_score.insert(self.start, 0);
        state.f_score.insert(self.start, f_start);
        state.open.push(OpenEntry {
            f: f_start,
            seq: 0,
            position: self.start,
        });
        state.next_seq = 1;
        state.open_membership.insert(self.start);

        let mut expanded = 0usize;

        loop {
            if cancel.is_cancelled() {
                debug!("search cancelled after {} expansions", expanded);
                return Ok(SearchOutcome::Cancelled);
            }

            let Some(entry) = state.open.pop() else {
                break;
            };
            let current = entry.position;
            state.open_membership.remove(&current);

            if current == self.end {
                reconstruct::mark_path(grid, &state.came_from, self.end, &mut on_step)?;
                grid.set_state(self.end, CellState::End)?;

                let path = reconstruct::trace(&state.came_from, self.end);
                let length = path.len() - 1;
                debug!("found path of {} steps after {} expansions", length, expanded);
                return Ok(SearchOutcome::Found(PathResult { path, length }));
            }

            let neighbors = grid.cell(current)?.neighbors().to_vec();
            let tentative = state.g_score[&current] + 1;

            for neighbor in neighbors {
                let known = state.g_score.get(&neighbor).copied().unwrap_or(usize::MAX);
                if tentative < known {
                    // strictly better path to this neighbor
                    state.came_from.insert(neighbor, current);
                    state.g_score.insert(neighbor, tentative);
                    let f = tentative + manhattan(neighbor, self.end);
                    state.f_score.insert(neighbor, f);

                    if state.open_membership.insert(neighbor) {
                        state.open.push(OpenEntry {
                            f,
                            seq: state.next_seq,
                            position: neighbor,
                        });
                        state.next_seq += 1;
                        grid.set_state(neighbor, CellState::Frontier)?;
                    }
                }
            }

            if current != self.start {
                grid.set_state(current, CellState::Visited)?;
            }

            on_step(grid);
            expanded += 1;
        }

        debug!("open set exhausted after {} expansions, no path", expanded);
        Ok(SearchOutcome::NotFound)
    }

    fn validate(&self, grid: &Grid) -> Result<(), SearchError> {
        let start = grid.cell(self.start)?;
        let end = grid.cell(self.end)?;

        if self.start == self.end {
            return Err(SearchError::IdenticalEndpoints(self.start));
        }
        if start.is_barrier() {
            return Err(SearchError::BarrierEndpoint(self.start));
        }
        if end.is_barrier() {
            return Err(SearchError::BarrierEndpoint(self.end));
        }

        Ok(())
    }
}
