//! TerminalRenderer: flushes a frame to a real terminal.
//!
//! Draws are diffed cell-by-cell against the previously flushed frame, so a
//! steady board costs almost nothing per redraw.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::term::frame::{Frame, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<Frame>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Flush a frame, emitting only the cells that changed since last time.
    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let full_redraw = match &self.last {
            Some(last) => {
                last.width() != frame.width() || last.height() != frame.height()
            }
            None => true,
        };
        if full_redraw {
            self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
        }

        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let Some(cell) = frame.get(x, y) else {
                    continue;
                };
                if !full_redraw {
                    if let Some(last) = &self.last {
                        if last.get(x, y) == Some(cell) {
                            continue;
                        }
                    }
                }

                self.stdout.queue(cursor::MoveTo(x, y))?;
                self.stdout.queue(SetForegroundColor(to_term(cell.fg)))?;
                self.stdout.queue(SetBackgroundColor(to_term(cell.bg)))?;
                self.stdout.queue(Print(cell.ch))?;
            }
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        self.last = Some(frame.clone());
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_term(rgb: Rgb) -> TermColor {
    TermColor::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
