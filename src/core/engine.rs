//! Engine module - the falling-block state machine
//!
//! Owns the board, the active piece, the next-piece preview, both
//! constrained pickers, and the score/level state. One `update` call is one
//! tick of the timed loop: it either advances the level, spawns the pending
//! piece, or moves the active piece one row down. Hosts drive `move_shape`
//! and `rotate_shape` between ticks; `runtime::GameLoop` serializes both
//! behind a single mutex.

use std::thread;
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use crate::core::board::Board;
use crate::core::picker::NonRepeatingPicker;
use crate::core::piece::ActivePiece;
use crate::core::rng::SimpleRng;
use crate::core::shape::PieceShape;
use crate::types::{
    Color, ConfigError, Coordinate, Direction, EngineState, CLEARS_PER_LEVEL, COLOR_REPEAT_WINDOW,
    DEFAULT_TICK_MS, GRADIENT_LEN, LATE_LEVEL_FROM, LATE_LEVEL_SPEEDUP_MS, LEVEL_RESET_PAUSE_MS,
    LEVEL_RESUME_PAUSE_MS, LEVEL_SPEEDUP_MS, MOVE_DEBOUNCE_MS, PIECE_COLORS, PREVIEW_CELLS,
    SHAPE_KINDS, SHAPE_REPEAT_WINDOW, SPARK_COLOR, SPARK_FADE_IN_MS, SPARK_FADE_OUT_MS,
    SPAWN_COLUMN, START_DELAY_MS,
};

/// Callback invoked on level or clear-counter changes: `(level, progress)`
/// with progress in [0, 1].
pub type ProgressListener = Box<dyn FnMut(u32, f64) + Send>;

/// Tuning knobs for the engine. The defaults are the shipped gameplay
/// cadence; tests zero the delays and the debounce to step ticks
/// synchronously.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base interval between ticks.
    pub tick_ms: u64,
    /// One-shot extra delay before the first tick and after a restart.
    pub start_delay_ms: u64,
    /// Interval reduction per level, before `late_level_from`.
    pub level_speedup_ms: u64,
    /// Interval reduction per level from `late_level_from` on.
    pub late_level_speedup_ms: u64,
    pub late_level_from: u32,
    /// Row clears that complete a level; clears beyond it are dropped.
    pub clears_per_level: u32,
    /// Window within which a second move call is ignored. Zero disables.
    pub move_debounce: Duration,
    /// Blocking pauses around the board reset on a level transition.
    pub level_reset_pause: Duration,
    pub level_resume_pause: Duration,
    /// Row-clear animation: samples per gradient and per-step delays.
    pub gradient_len: usize,
    pub spark_fade_in: Duration,
    pub spark_fade_out: Duration,
    pub spark: Color,
    pub palette: [Color; 5],
    pub color_window: usize,
    pub shape_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            start_delay_ms: START_DELAY_MS,
            level_speedup_ms: LEVEL_SPEEDUP_MS,
            late_level_speedup_ms: LATE_LEVEL_SPEEDUP_MS,
            late_level_from: LATE_LEVEL_FROM,
            clears_per_level: CLEARS_PER_LEVEL,
            move_debounce: Duration::from_millis(MOVE_DEBOUNCE_MS),
            level_reset_pause: Duration::from_millis(LEVEL_RESET_PAUSE_MS),
            level_resume_pause: Duration::from_millis(LEVEL_RESUME_PAUSE_MS),
            gradient_len: GRADIENT_LEN,
            spark_fade_in: Duration::from_millis(SPARK_FADE_IN_MS),
            spark_fade_out: Duration::from_millis(SPARK_FADE_OUT_MS),
            spark: SPARK_COLOR,
            palette: PIECE_COLORS,
            color_window: COLOR_REPEAT_WINDOW,
            shape_window: SHAPE_REPEAT_WINDOW,
        }
    }
}

impl EngineConfig {
    /// A config with every blocking delay and the debounce disabled, so
    /// ticks can be stepped back-to-back. Used by tests and benches.
    pub fn instant() -> Self {
        Self {
            start_delay_ms: 0,
            move_debounce: Duration::ZERO,
            level_reset_pause: Duration::ZERO,
            level_resume_pause: Duration::ZERO,
            spark_fade_in: Duration::ZERO,
            spark_fade_out: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// The falling-block simulation core.
pub struct GameEngine {
    config: EngineConfig,
    board: Board,
    /// Host-provided 8-cell preview store, rewritten on every spawn.
    preview: Vec<Color>,
    /// One shape instance per kind, reset before each reuse.
    shapes: [PieceShape; SHAPE_KINDS],
    shape_picker: NonRepeatingPicker<usize>,
    color_picker: NonRepeatingPicker<Color>,
    piece: Option<ActivePiece>,
    next_kind: usize,
    next_color: Color,
    spawn_pending: bool,
    paused: bool,
    game_over: bool,
    level: u32,
    cleared_this_level: u32,
    tick_interval: Duration,
    /// Consumed once by the loop before the next gameplay tick.
    extra_delay: Duration,
    last_move: Instant,
    listeners: Vec<ProgressListener>,
}

impl GameEngine {
    /// Build an engine over host-provided stores with default tuning.
    ///
    /// `cells` must hold `width * height` colors and `preview` exactly 8;
    /// `seed` drives both piece generators, so equal seeds replay equal
    /// games.
    pub fn new(
        width: usize,
        height: usize,
        cells: Vec<Color>,
        preview: Vec<Color>,
        seed: u32,
    ) -> Result<Self, ConfigError> {
        Self::with_config(width, height, cells, preview, seed, EngineConfig::default())
    }

    pub fn with_config(
        width: usize,
        height: usize,
        cells: Vec<Color>,
        preview: Vec<Color>,
        seed: u32,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        if preview.len() != PREVIEW_CELLS {
            return Err(ConfigError::PreviewStoreSize {
                expected: PREVIEW_CELLS,
                actual: preview.len(),
            });
        }

        let board = Board::new(width, height, cells)?;

        let shapes = [
            PieceShape::new(0)?,
            PieceShape::new(1)?,
            PieceShape::new(2)?,
            PieceShape::new(3)?,
            PieceShape::new(4)?,
            PieceShape::new(5)?,
            PieceShape::new(6)?,
        ];

        let mut seeds = SimpleRng::new(seed);
        let mut shape_picker = NonRepeatingPicker::new(
            (0..SHAPE_KINDS).collect(),
            config.shape_window,
            seeds.next_u32(),
        )?;
        let mut color_picker =
            NonRepeatingPicker::new(config.palette.to_vec(), config.color_window, seeds.next_u32())?;

        let next_kind = shape_picker.next();
        let next_color = color_picker.next();
        let tick_interval = Duration::from_millis(config.tick_ms);
        let extra_delay = Duration::from_millis(config.start_delay_ms);

        Ok(Self {
            config,
            board,
            preview,
            shapes,
            shape_picker,
            color_picker,
            piece: None,
            next_kind,
            next_color,
            spawn_pending: true,
            paused: false,
            game_over: false,
            level: 1,
            cleared_this_level: 0,
            tick_interval,
            extra_delay,
            last_move: Instant::now(),
            listeners: Vec::new(),
        })
    }

    // ---- observable surface ----

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The host owns the cell store; direct writes through here are visible
    /// to subsequent placement and clear checks.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn preview(&self) -> &[Color] {
        &self.preview
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn cleared_this_level(&self) -> u32 {
        self.cleared_this_level
    }

    /// Level progress as `cleared / clears_per_level` in [0, 1].
    pub fn progress(&self) -> f64 {
        self.cleared_this_level as f64 / self.config.clears_per_level as f64
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> EngineState {
        if self.game_over {
            EngineState::GameOver
        } else if self.spawn_pending {
            EngineState::SpawnPending
        } else {
            EngineState::Falling
        }
    }

    /// Whether the timed loop should run the gameplay step this tick.
    pub fn is_gameplay_active(&self) -> bool {
        !self.paused && !self.game_over
    }

    /// Hand the pending one-shot delay to the loop, leaving zero behind.
    pub fn take_extra_delay(&mut self) -> Duration {
        std::mem::take(&mut self.extra_delay)
    }

    /// Register a progress listener. Zero or many listeners are fine; they
    /// are invoked synchronously and their return is ignored.
    pub fn on_progress<F>(&mut self, listener: F)
    where
        F: FnMut(u32, f64) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ---- host-driven signals ----

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Restart after a loss: empty the board, re-arm the start delay, and
    /// let the loop spawn the still-pending next piece.
    pub fn start_new_game(&mut self) {
        self.extra_delay = Duration::from_millis(self.config.start_delay_ms);
        self.board.reset_all();
        self.game_over = false;
        self.paused = false;
    }

    // ---- tick transition ----

    /// One tick of the state machine.
    pub fn update(&mut self) {
        if self.cleared_this_level >= self.config.clears_per_level {
            self.advance_level();
            return;
        }

        if self.spawn_pending {
            self.spawn_next();
            return;
        }

        self.move_shape(Direction::Down);
    }

    /// Level transition: speed up, reset the counter and the board, and
    /// give the player a breather on both sides of the wipe.
    fn advance_level(&mut self) {
        let step = if self.level >= self.config.late_level_from {
            self.config.late_level_speedup_ms
        } else {
            self.config.level_speedup_ms
        };
        self.tick_interval = self
            .tick_interval
            .saturating_sub(Duration::from_millis(step));

        self.cleared_this_level = 0;
        self.level += 1;
        self.notify_progress();

        thread::sleep(self.config.level_reset_pause);
        self.board.reset_all();
        thread::sleep(self.config.level_resume_pause);
    }

    /// Place the previously generated next piece at the spawn location, or
    /// end the game if that location is already occupied.
    fn spawn_next(&mut self) {
        let shape = self.shapes[self.next_kind];
        let piece = ActivePiece::new(shape, Coordinate::new(SPAWN_COLUMN, 0), self.next_color);

        let blocked = piece
            .cells()
            .iter()
            .any(|cell| !self.board.cell(cell.x, cell.y).is_empty());
        if blocked {
            self.game_over = true;
            self.level = 1;
            self.cleared_this_level = 0;
            self.notify_progress();
            self.tick_interval = Duration::from_millis(self.config.tick_ms);
            return;
        }

        self.paint_cells(piece.cells(), piece.color);
        self.piece = Some(piece);
        self.roll_next();
        self.spawn_pending = false;
    }

    /// Draw the upcoming kind and color and publish them to the preview
    /// store.
    fn roll_next(&mut self) {
        self.next_kind = self.shape_picker.next();
        self.next_color = self.color_picker.next();
        self.shapes[self.next_kind].reset();

        let bits = self.shapes[self.next_kind].preview_bits();
        for (slot, bit) in self.preview.iter_mut().zip(bits) {
            *slot = if bit { self.next_color } else { Color::EMPTY };
        }
    }

    // ---- movement and rotation ----

    /// Move the falling piece one cell in `direction`.
    ///
    /// No-op while a spawn is pending. Calls landing inside the debounce
    /// window of the previous call are dropped, which keeps overlapping
    /// input and timer deliveries from double-stepping the piece.
    pub fn move_shape(&mut self, direction: Direction) {
        if self.spawn_pending {
            return;
        }

        let now = Instant::now();
        let span = now.duration_since(self.last_move);
        self.last_move = now;
        if !self.config.move_debounce.is_zero() && span <= self.config.move_debounce {
            return;
        }

        if self.check_for_collision(direction) {
            return;
        }

        let Some(mut piece) = self.piece else {
            return;
        };

        self.paint_cells(piece.cells(), Color::EMPTY);
        match direction {
            Direction::Left => piece.location.x -= 1,
            Direction::Right => piece.location.x += 1,
            Direction::Down => piece.location.y += 1,
        }
        piece.refresh_cells();
        self.paint_cells(piece.cells(), piece.color);
        self.piece = Some(piece);
    }

    /// Whether moving in `direction` would collide. A downward collision is
    /// where the piece locks: every distinct row it touches is evaluated
    /// for clearing and the next tick spawns a fresh piece.
    fn check_for_collision(&mut self, direction: Direction) -> bool {
        let Some(piece) = self.piece else {
            return true;
        };
        let cells = *piece.cells();
        let width = self.board.width() as i32;
        let height = self.board.height() as i32;

        match direction {
            Direction::Left => {
                cells.iter().any(|cell| cell.x == 0)
                    || !self
                        .board
                        .is_placement_free(&shifted(&cells, -1, 0), &cells)
            }
            Direction::Right => {
                cells.iter().any(|cell| cell.x == width - 1)
                    || !self.board.is_placement_free(&shifted(&cells, 1, 0), &cells)
            }
            Direction::Down => {
                let grounded = cells.iter().any(|cell| {
                    cell.y == height - 1
                        || ((cell.x < 2 || cell.x >= width - 2) && cell.y == height - 2)
                }) || !self.board.is_placement_free(&shifted(&cells, 0, 1), &cells);

                if grounded {
                    let mut rows: ArrayVec<i32, 4> = ArrayVec::new();
                    for cell in cells {
                        if !rows.contains(&cell.y) {
                            rows.push(cell.y);
                        }
                    }
                    for row in rows {
                        self.check_clear_row(row);
                    }
                    self.spawn_pending = true;
                }
                grounded
            }
        }
    }

    /// Rotate the falling piece, wall-kicking it back in bounds when the
    /// rotated footprint overflows an edge. A rotation that cannot be
    /// placed leaves the piece untouched.
    pub fn rotate_shape(&mut self, clockwise: bool) {
        if self.spawn_pending {
            return;
        }
        let Some(committed) = self.piece else {
            return;
        };

        let mut candidate = committed;
        if clockwise {
            candidate.shape.rotate_right();
        } else {
            candidate.shape.rotate_left();
        }

        if !self.fit_rotation(&mut candidate, committed.cells()) {
            return;
        }

        self.paint_cells(committed.cells(), Color::EMPTY);
        candidate.refresh_cells();
        self.paint_cells(candidate.cells(), candidate.color);
        self.piece = Some(candidate);
    }

    /// Validate a rotated piece, shifting it horizontally back onto the
    /// board if one edge overflows. Returns false when the rotation must be
    /// rejected.
    fn fit_rotation(&self, candidate: &mut ActivePiece, moving: &[Coordinate; 4]) -> bool {
        let height = self.board.height() as i32;
        let width = self.board.width() as i32;
        let place = candidate.projected_cells();

        if place.iter().any(|cell| cell.y >= height)
            || !self.board.is_placement_free(&place, moving)
        {
            return false;
        }

        let min_x = place.iter().map(|cell| cell.x).min().unwrap_or(0);
        if min_x < 0 {
            let kicked = shifted(&place, -min_x, 0);
            if self.board.is_placement_free(&kicked, moving) {
                candidate.location.x -= min_x;
                return true;
            }
            return false;
        }

        let max_x = place.iter().map(|cell| cell.x).max().unwrap_or(0);
        if max_x > width - 1 {
            let overflow = max_x - (width - 1);
            let kicked = shifted(&place, -overflow, 0);
            if self.board.is_placement_free(&kicked, moving) {
                candidate.location.x -= overflow;
                return true;
            }
            return false;
        }

        true
    }

    // ---- row clear ----

    /// Clear row `y` if it is fully occupied within its span and the level
    /// quota has room: animate the wipe, shift everything above down one
    /// row, bump the counter, and re-check the bottom row after clearing it
    /// (the shift can complete it again).
    fn check_clear_row(&mut self, y: i32) {
        if self.cleared_this_level >= self.config.clears_per_level {
            return;
        }

        let span = self.board.row_span(y);
        for x in span.clone() {
            if self.board.cell(x, y).is_empty() {
                return;
            }
        }

        let steps = self.config.gradient_len.saturating_sub(2);

        // Flash toward the spark color, one gradient per column since each
        // cell starts from its own piece color.
        let columns: Vec<Vec<Color>> = span
            .clone()
            .map(|x| self.board.cell(x, y).gradient_to(self.config.spark, steps))
            .collect();
        for sample in 0..self.config.gradient_len {
            for (offset, x) in span.clone().enumerate() {
                self.board.set_cell(x, y, columns[offset][sample]);
            }
            thread::sleep(self.config.spark_fade_in);
        }

        // Fade the spark out to empty; one shared gradient suffices now.
        let fade = self.config.spark.gradient_to(Color::EMPTY, steps);
        for sample in 0..self.config.gradient_len {
            for x in span.clone() {
                self.board.set_cell(x, y, fade[sample]);
            }
            thread::sleep(self.config.spark_fade_out);
        }

        // Shift everything above down by one row, within the same span.
        for row in (1..=y).rev() {
            for x in span.clone() {
                let above = self.board.cell(x, row - 1);
                self.board.set_cell(x, row, above);
            }
        }

        self.cleared_this_level += 1;
        self.notify_progress();

        if y == (self.board.height() - 1) as i32 {
            self.check_clear_row(y);
        }
    }

    // ---- helpers ----

    fn paint_cells(&mut self, cells: &[Coordinate; 4], color: Color) {
        for cell in cells {
            self.board.set_cell(cell.x, cell.y, color);
        }
    }

    fn notify_progress(&mut self) {
        let level = self.level;
        let progress = self.cleared_this_level as f64 / self.config.clears_per_level as f64;
        for listener in &mut self.listeners {
            listener(level, progress);
        }
    }
}

fn shifted(cells: &[Coordinate; 4], dx: i32, dy: i32) -> [Coordinate; 4] {
    cells.map(|cell| Coordinate::new(cell.x + dx, cell.y + dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn instant_engine(seed: u32) -> GameEngine {
        GameEngine::with_config(
            10,
            16,
            vec![Color::EMPTY; 160],
            vec![Color::EMPTY; 8],
            seed,
            EngineConfig::instant(),
        )
        .expect("valid engine")
    }

    fn fill_row(engine: &mut GameEngine, y: i32, color: Color) {
        for x in 0..10 {
            engine.board_mut().set_cell(x, y, color);
        }
    }

    fn recorded_events(engine: &mut GameEngine) -> Arc<Mutex<Vec<(u32, f64)>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        engine.on_progress(move |level, progress| {
            if let Ok(mut log) = sink.lock() {
                log.push((level, progress));
            }
        });
        events
    }

    #[test]
    fn test_clear_row_shifts_rows_down() {
        let mut engine = instant_engine(1);
        let color = PIECE_COLORS[0];
        let marker = PIECE_COLORS[1];

        fill_row(&mut engine, 10, color);
        engine.board_mut().set_cell(4, 9, marker);

        engine.check_clear_row(10);

        assert_eq!(engine.cleared_this_level(), 1);
        // Row 10 took over row 9's content; the marker came down with it.
        assert_eq!(engine.board().cell(4, 10), marker);
        assert!(engine.board().cell(0, 10).is_empty());
        assert!(engine.board().cell(4, 9).is_empty());
    }

    #[test]
    fn test_clear_requires_full_span() {
        let mut engine = instant_engine(1);
        fill_row(&mut engine, 10, PIECE_COLORS[0]);
        engine.board_mut().set_cell(7, 10, Color::EMPTY);

        engine.check_clear_row(10);

        assert_eq!(engine.cleared_this_level(), 0);
        assert_eq!(engine.board().cell(0, 10), PIECE_COLORS[0]);
    }

    #[test]
    fn test_clear_skipped_at_level_cap() {
        let mut engine = instant_engine(1);
        engine.cleared_this_level = 3;
        fill_row(&mut engine, 10, PIECE_COLORS[0]);

        engine.check_clear_row(10);

        assert_eq!(engine.cleared_this_level(), 3);
        assert_eq!(engine.board().cell(5, 10), PIECE_COLORS[0]);
    }

    #[test]
    fn test_bottom_row_cascade() {
        let mut engine = instant_engine(1);
        let color = PIECE_COLORS[2];
        // Bottom row full within its narrowed span, the row above full
        // across the whole width.
        fill_row(&mut engine, 15, color);
        fill_row(&mut engine, 14, color);

        engine.check_clear_row(15);

        // Clearing the bottom pulled row 14 down and completed it again.
        assert_eq!(engine.cleared_this_level(), 2);
        for x in engine.board().row_span(15) {
            assert!(engine.board().cell(x, 15).is_empty());
        }
        // Columns outside the narrowed span never shift.
        assert_eq!(engine.board().cell(0, 14), color);
        assert!(engine.board().cell(4, 14).is_empty());
    }

    #[test]
    fn test_progress_listener_fires_on_clear() {
        let mut engine = instant_engine(1);
        let events = recorded_events(&mut engine);
        fill_row(&mut engine, 5, PIECE_COLORS[0]);

        engine.check_clear_row(5);

        let log = events.lock().expect("event log");
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, 1);
        assert!((log[0].1 - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_level_advance_resets_board_and_speeds_up() {
        let mut engine = instant_engine(1);
        let events = recorded_events(&mut engine);
        engine.cleared_this_level = 3;
        engine.board_mut().set_cell(4, 8, PIECE_COLORS[3]);

        engine.update();

        assert_eq!(engine.level(), 2);
        assert_eq!(engine.cleared_this_level(), 0);
        assert_eq!(engine.tick_interval(), Duration::from_millis(400));
        assert!(engine.board().cell(4, 8).is_empty());
        assert_eq!(
            events.lock().expect("event log").as_slice(),
            &[(2, 0.0)]
        );
    }

    #[test]
    fn test_late_levels_use_smaller_speedup() {
        let mut engine = instant_engine(1);
        engine.level = 4;
        engine.cleared_this_level = 3;

        engine.update();

        assert_eq!(engine.level(), 5);
        assert_eq!(engine.tick_interval(), Duration::from_millis(465));
    }

    #[test]
    fn test_spawn_collision_is_game_over() {
        let mut engine = instant_engine(1);
        let events = recorded_events(&mut engine);
        engine.level = 3;
        engine.cleared_this_level = 2;
        engine.tick_interval = Duration::from_millis(300);
        // Cover the whole 4x4 spawn frame so every kind collides.
        for x in SPAWN_COLUMN..SPAWN_COLUMN + 4 {
            for y in 0..4 {
                engine.board_mut().set_cell(x, y, PIECE_COLORS[0]);
            }
        }

        engine.update();

        assert_eq!(engine.state(), EngineState::GameOver);
        assert_eq!(engine.level(), 1);
        assert_eq!(engine.cleared_this_level(), 0);
        assert_eq!(engine.tick_interval(), Duration::from_millis(DEFAULT_TICK_MS));
        assert_eq!(events.lock().expect("event log").as_slice(), &[(1, 0.0)]);

        engine.start_new_game();
        assert_eq!(engine.state(), EngineState::SpawnPending);
        engine.update();
        assert_eq!(engine.state(), EngineState::Falling);
    }

    #[test]
    fn test_wall_kick_shifts_rotation_back_in_bounds() {
        let mut engine = instant_engine(1);
        engine.update();
        engine.board_mut().reset_all();

        // Standing I hugging the left wall: its only column is x = 0.
        let shape = PieceShape::new(0).expect("valid kind");
        engine.piece = Some(ActivePiece::new(
            shape,
            Coordinate::new(-2, 5),
            PIECE_COLORS[0],
        ));

        engine.rotate_shape(true);

        let piece = engine.piece.expect("active piece");
        assert_eq!(piece.location, Coordinate::new(0, 5));
        assert_eq!(
            *piece.cells(),
            [
                Coordinate::new(0, 7),
                Coordinate::new(1, 7),
                Coordinate::new(2, 7),
                Coordinate::new(3, 7),
            ]
        );
        assert_eq!(engine.board().cell(3, 7), PIECE_COLORS[0]);
    }

    #[test]
    fn test_blocked_wall_kick_reverts_rotation() {
        let mut engine = instant_engine(1);
        engine.update();
        engine.board_mut().reset_all();

        let shape = PieceShape::new(0).expect("valid kind");
        engine.piece = Some(ActivePiece::new(
            shape,
            Coordinate::new(-2, 5),
            PIECE_COLORS[0],
        ));
        // Sits in the kicked footprint but outside the pre-kick one, so only
        // the kick revalidation can see it.
        engine.board_mut().set_cell(3, 7, PIECE_COLORS[1]);

        engine.rotate_shape(true);

        let piece = engine.piece.expect("active piece");
        assert_eq!(piece.shape, shape);
        assert_eq!(piece.location, Coordinate::new(-2, 5));
        assert_eq!(
            *piece.cells(),
            [
                Coordinate::new(0, 5),
                Coordinate::new(0, 6),
                Coordinate::new(0, 7),
                Coordinate::new(0, 8),
            ]
        );
    }

    #[test]
    fn test_move_debounce_drops_rapid_calls() {
        let mut engine = GameEngine::with_config(
            10,
            16,
            vec![Color::EMPTY; 160],
            vec![Color::EMPTY; 8],
            1,
            EngineConfig {
                move_debounce: Duration::from_millis(30),
                ..EngineConfig::instant()
            },
        )
        .expect("valid engine");

        engine.update();
        let start_x = engine.piece.expect("active piece").location.x;

        thread::sleep(Duration::from_millis(40));
        engine.move_shape(Direction::Right);
        engine.move_shape(Direction::Right);

        assert_eq!(engine.piece.expect("active piece").location.x, start_x + 1);
    }

    #[test]
    fn test_down_collision_locks_and_flags_spawn() {
        let mut engine = instant_engine(7);
        engine.update();

        let mut guard = 0;
        while engine.state() == EngineState::Falling {
            engine.update();
            guard += 1;
            assert!(guard < 32, "piece never locked");
        }

        assert_eq!(engine.state(), EngineState::SpawnPending);
        // The spawn columns are clear of the shoulders, so the piece rests
        // on the bottom row.
        let bottom_filled = engine
            .board()
            .row_span(15)
            .any(|x| !engine.board().cell(x, 15).is_empty());
        assert!(bottom_filled);
    }
}
