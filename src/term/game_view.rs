//! GameView: maps engine state into a terminal frame.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameEngine;
use crate::term::frame::{Frame, Rgb, Styled};
use crate::types::EngineState;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

const BORDER_FG: Rgb = Rgb::new(200, 200, 200);
const WELL_BG: Rgb = Rgb::new(24, 24, 32);
const TEXT_FG: Rgb = Rgb::new(220, 220, 220);
const BLACK: Rgb = Rgb::new(0, 0, 0);

/// Renders the board, the next-piece preview, and the level readout.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // Two columns per cell compensates for terminal glyph aspect ratio.
        Self { cell_w: 2 }
    }
}

impl GameView {
    pub fn new(cell_w: u16) -> Self {
        Self { cell_w }
    }

    /// Render the current engine state into a frame.
    ///
    /// `banner` overrides the status line, letting the host flash level
    /// transitions reported through the progress listener.
    pub fn render(&self, engine: &GameEngine, viewport: Viewport, banner: Option<&str>) -> Frame {
        let mut frame = Frame::new(viewport.width, viewport.height);

        let board = engine.board();
        let board_cols = (board.width() as u16) * self.cell_w;
        let board_rows = board.height() as u16;
        let frame_w = board_cols + 2;
        let frame_h = board_rows + 2;

        // Leave room for the side panel when centering.
        let panel_w: u16 = 12;
        let start_x = viewport.width.saturating_sub(frame_w + panel_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        self.draw_border(&mut frame, start_x, start_y, frame_w, frame_h);

        // Board cells.
        for y in 0..board_rows {
            for x in 0..board.width() as u16 {
                let color = board.cell(x as i32, y as i32);
                let bg = if color.is_empty() {
                    WELL_BG
                } else {
                    Rgb::from(color)
                };
                frame.fill_bg(
                    start_x + 1 + x * self.cell_w,
                    start_y + 1 + y,
                    self.cell_w,
                    bg,
                );
            }
        }

        // Side panel: preview window, level, progress.
        let panel_x = start_x + frame_w + 2;
        frame.put_str(panel_x, start_y + 1, "NEXT", TEXT_FG, BLACK);
        for (slot, &color) in engine.preview().iter().enumerate() {
            let px = (slot % 2) as u16;
            let py = (slot / 2) as u16;
            let bg = if color.is_empty() {
                WELL_BG
            } else {
                Rgb::from(color)
            };
            frame.fill_bg(
                panel_x + px * self.cell_w,
                start_y + 3 + py,
                self.cell_w,
                bg,
            );
        }

        let level_line = format!("LEVEL {}", engine.level());
        frame.put_str(panel_x, start_y + 8, &level_line, TEXT_FG, BLACK);
        self.draw_progress(&mut frame, panel_x, start_y + 9, engine.progress());

        // Status line under the board.
        let status = match (banner, engine.state(), engine.is_paused()) {
            (Some(text), _, _) => text,
            (None, EngineState::GameOver, _) => "GAME OVER - r restarts",
            (None, _, true) => "PAUSED",
            _ => "",
        };
        if !status.is_empty() {
            let sx = start_x + frame_w.saturating_sub(status.len() as u16) / 2;
            frame.put_str(sx, start_y + frame_h, status, TEXT_FG, BLACK);
        }

        frame
    }

    fn draw_border(&self, frame: &mut Frame, x: u16, y: u16, w: u16, h: u16) {
        let style = |ch| Styled {
            ch,
            fg: BORDER_FG,
            bg: BLACK,
        };

        for dx in 1..w.saturating_sub(1) {
            frame.set(x + dx, y, style('─'));
            frame.set(x + dx, y + h - 1, style('─'));
        }
        for dy in 1..h.saturating_sub(1) {
            frame.set(x, y + dy, style('│'));
            frame.set(x + w - 1, y + dy, style('│'));
        }
        frame.set(x, y, style('┌'));
        frame.set(x + w - 1, y, style('┐'));
        frame.set(x, y + h - 1, style('└'));
        frame.set(x + w - 1, y + h - 1, style('┘'));
    }

    fn draw_progress(&self, frame: &mut Frame, x: u16, y: u16, progress: f64) {
        const WIDTH: usize = 9;
        let filled = ((progress * WIDTH as f64).round() as usize).min(WIDTH);
        let bar: String = "█".repeat(filled) + &"░".repeat(WIDTH - filled);
        frame.put_str(x, y, &bar, TEXT_FG, BLACK);
    }
}
