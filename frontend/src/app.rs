use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use egui::{Color32, Key, PointerButton, Pos2, Rect, Sense, Stroke, Vec2};
use log::{debug, warn};

use gridsearch::{
    CancelToken, CellState, Grid, PathSearch, Position, SearchError, SearchOutcome,
};

const DEFAULT_GRID_SIZE: usize = 25;
const DEFAULT_STEPS_PER_FRAME: usize = 5;

/// Messages sent by the search worker back to the UI thread.
enum SearchUpdate {
    /// One snapshot of all cell states per expanded cell.
    Step(Vec<CellState>),
    /// The search finished; the worker hands the mutated grid back.
    Done {
        grid: Grid,
        result: Result<SearchOutcome, SearchError>,
    },
}

/// A search currently running on a worker thread.
struct RunningSearch {
    updates: Receiver<SearchUpdate>,
    cancel: CancelToken,
    /// Most recent snapshot, drawn instead of the grid while stepping.
    frame: Option<Vec<CellState>>,
}

/// The part of the application state that is persisted across runs.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct State {
    grid: Grid,
    start: Option<Position>,
    end: Option<Position>,
    draw_grid_lines: bool,
    /// How many search steps are consumed per repaint; the animation pace
    /// is entirely the frontend's business, the engine just yields steps.
    steps_per_frame: usize,
    show_instructions: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            grid: Grid::new(DEFAULT_GRID_SIZE),
            start: None,
            end: None,
            draw_grid_lines: true,
            steps_per_frame: DEFAULT_STEPS_PER_FRAME,
            show_instructions: true,
        }
    }
}

pub struct VisualizerApp {
    state: State,
    running: Option<RunningSearch>,
    status: String,
}

impl VisualizerApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous app state (if any); requires the `persistence`
        // feature on eframe.
        let state: State = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        Self {
            state,
            running: None,
            status: String::new(),
        }
    }

    fn start_search(&mut self) {
        if self.running.is_some() {
            return;
        }
        let (Some(start), Some(end)) = (self.state.start, self.state.end) else {
            self.status = "Set a start and an end cell first".to_owned();
            return;
        };

        // old marks would confuse both the viewer and the adjacency pass
        self.state.grid.clear_search_marks();
        self.state.grid.recompute_adjacency();

        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();
        let mut grid = self.state.grid.clone();
        let worker_cancel = cancel.clone();

        debug!("starting search from {} to {}", start, end);
        thread::spawn(move || {
            let step_tx = tx.clone();
            let result = PathSearch::new(start, end).run(&mut grid, &worker_cancel, |g| {
                // send failures just mean the UI has moved on
                let _ = step_tx.send(SearchUpdate::Step(g.snapshot()));
            });
            if let Err(e) = &result {
                warn!("search rejected: {e}");
            }
            let _ = tx.send(SearchUpdate::Done { grid, result });
        });

        self.status = "Searching...".to_owned();
        self.running = Some(RunningSearch {
            updates: rx,
            cancel,
            frame: None,
        });
    }

    /// Drain a bounded number of worker updates, so the animation advances
    /// `steps_per_frame` search steps per repaint.
    fn poll_search(&mut self, ctx: &egui::Context) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let mut done = None;
        let mut disconnected = false;
        for _ in 0..self.state.steps_per_frame.max(1) {
            match running.updates.try_recv() {
                Ok(SearchUpdate::Step(frame)) => running.frame = Some(frame),
                Ok(SearchUpdate::Done { grid, result }) => {
                    done = Some((grid, result));
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if let Some((grid, result)) = done {
            self.state.grid = grid;
            self.status = match result {
                Ok(SearchOutcome::Found(path)) => {
                    format!("Found a path of {} steps", path.length)
                }
                Ok(SearchOutcome::NotFound) => "No path found".to_owned(),
                Ok(SearchOutcome::Cancelled) => "Search cancelled".to_owned(),
                Err(e) => format!("Search failed: {e}"),
            };
            self.running = None;
        } else if disconnected {
            warn!("search worker stopped without a result");
            self.status = "Search worker stopped unexpectedly".to_owned();
            self.running = None;
        } else {
            // keep animating even when no input arrives
            ctx.request_repaint();
        }
    }

    fn clear_grid(&mut self) {
        if self.running.is_some() {
            return;
        }
        self.state.grid.reset();
        self.state.start = None;
        self.state.end = None;
        self.status.clear();
    }

    fn resize_grid(&mut self, size: usize) {
        // the grid size is fixed at construction, so resizing starts over
        self.state.grid = Grid::new(size);
        self.state.start = None;
        self.state.end = None;
    }

    /// First click places the start, the second the end, everything after
    /// that paints barriers.
    fn paint_cell(&mut self, position: Position) {
        let is_start = self.state.start == Some(position);
        let is_end = self.state.end == Some(position);

        if self.state.start.is_none() && !is_end {
            self.state.start = Some(position);
            if let Ok(cell) = self.state.grid.cell_mut(position) {
                cell.state = CellState::Start;
            }
        } else if self.state.end.is_none() && !is_start {
            self.state.end = Some(position);
            if let Ok(cell) = self.state.grid.cell_mut(position) {
                cell.state = CellState::End;
            }
        } else if !is_start && !is_end {
            if let Ok(cell) = self.state.grid.cell_mut(position) {
                cell.state = CellState::Barrier;
            }
        }
    }

    fn erase_cell(&mut self, position: Position) {
        if self.state.start == Some(position) {
            self.state.start = None;
        }
        if self.state.end == Some(position) {
            self.state.end = None;
        }
        if let Ok(cell) = self.state.grid.cell_mut(position) {
            cell.state = CellState::Empty;
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(Key::Space)) {
            self.start_search();
        }
        if ctx.input(|i| i.key_pressed(Key::C)) {
            self.clear_grid();
        }
        if ctx.input(|i| i.key_pressed(Key::M)) {
            self.state.show_instructions = true;
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Grid path search");
        ui.separator();

        let running = self.running.is_some();

        ui.add_enabled_ui(!running, |ui| {
            if ui.button("Run (space)").clicked() {
                self.start_search();
            }
            if ui.button("Clear (c)").clicked() {
                self.clear_grid();
            }
        });

        if running {
            if ui.button("Cancel").clicked() {
                if let Some(running) = &self.running {
                    running.cancel.cancel();
                }
            }
        }

        ui.separator();
        ui.checkbox(&mut self.state.draw_grid_lines, "Draw grid lines");
        ui.add(
            egui::Slider::new(&mut self.state.steps_per_frame, 1..=50).text("Steps per frame"),
        );

        let mut size = self.state.grid.size();
        ui.add_enabled_ui(!running, |ui| {
            if ui
                .add(egui::Slider::new(&mut size, 5..=100).text("Grid size"))
                .changed()
            {
                self.resize_grid(size);
            }
        });

        if ui.button("Instructions (m)").clicked() {
            self.state.show_instructions = true;
        }

        ui.separator();
        ui.label(&self.status);
    }

    fn grid_canvas(&mut self, ui: &mut egui::Ui) {
        let size = self.state.grid.size();
        if size == 0 {
            return;
        }

        let available = ui.available_size();
        let cell_px = (available.x.min(available.y) / size as f32).floor().max(2.0);
        let canvas = Vec2::splat(cell_px * size as f32);
        let (response, painter) = ui.allocate_painter(canvas, Sense::click_and_drag());
        let origin = response.rect.min;

        // draw either the live playback frame or the grid itself
        let frame = self.running.as_ref().and_then(|r| r.frame.as_deref());
        for position in self.state.grid.positions() {
            let state = match frame {
                Some(states) => states[position.row * size + position.col],
                None => self
                    .state
                    .grid
                    .state(position)
                    .unwrap_or(CellState::Empty),
            };
            let rect = Rect::from_min_size(
                origin + Vec2::new(position.col as f32, position.row as f32) * cell_px,
                Vec2::splat(cell_px),
            );
            painter.rect_filled(rect, 0.0, cell_color(state));
        }

        if self.state.draw_grid_lines {
            let stroke = Stroke::new(1.0, Color32::from_gray(60));
            for i in 0..=size {
                let offset = i as f32 * cell_px;
                painter.line_segment(
                    [
                        origin + Vec2::new(0.0, offset),
                        origin + Vec2::new(canvas.x, offset),
                    ],
                    stroke,
                );
                painter.line_segment(
                    [
                        origin + Vec2::new(offset, 0.0),
                        origin + Vec2::new(offset, canvas.y),
                    ],
                    stroke,
                );
            }
        }

        // no editing while a search is running
        if self.running.is_some() {
            return;
        }

        if let Some(pointer) = response.interact_pointer_pos() {
            if let Some(position) = pointer_to_position(pointer, origin, cell_px, size) {
                if response.secondary_clicked() || response.dragged_by(PointerButton::Secondary) {
                    self.erase_cell(position);
                } else if response.clicked() || response.dragged_by(PointerButton::Primary) {
                    self.paint_cell(position);
                }
            }
        }
    }

    fn instructions_window(&mut self, ctx: &egui::Context) {
        let mut open = self.state.show_instructions;
        egui::Window::new("Instructions")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("1. Left-click to place the start cell, then the end cell, then draw barriers.");
                ui.label("2. Right-click to erase a cell.");
                ui.label("3. Press SPACE to run the search and 'c' to clear the grid.");
                ui.label("4. Reopen this window with 'm'.");
            });
        self.state.show_instructions = open;
    }
}

impl eframe::App for VisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_search(ctx);
        self.handle_keys(ctx);

        egui::SidePanel::left("controls").show(ctx, |ui| self.controls(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.grid_canvas(ui));

        if self.state.show_instructions {
            self.instructions_window(ctx);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // a worker search must not outlive the window
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

fn pointer_to_position(
    pointer: Pos2,
    origin: Pos2,
    cell_px: f32,
    size: usize,
) -> Option<Position> {
    let rel = pointer - origin;
    if rel.x < 0.0 || rel.y < 0.0 {
        return None;
    }
    let col = (rel.x / cell_px) as usize;
    let row = (rel.y / cell_px) as usize;
    (row < size && col < size).then_some(Position::new(row, col))
}

fn cell_color(state: CellState) -> Color32 {
    match state {
        CellState::Empty => Color32::WHITE,
        CellState::Start => Color32::from_rgb(255, 165, 0),
        CellState::End => Color32::from_rgb(64, 224, 208),
        CellState::Barrier => Color32::BLACK,
        CellState::Frontier => Color32::from_rgb(139, 69, 19),
        CellState::Visited => Color32::DARK_GRAY,
        CellState::Path => Color32::from_rgb(251, 219, 160),
    }
}
