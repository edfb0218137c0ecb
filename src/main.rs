//! Terminal blockfall runner (default binary).
//!
//! Builds a 10x16 engine over host-owned cell stores, spawns the tick
//! thread, and drives input + rendering from this thread. Every engine
//! mutation goes through the shared mutex.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use blockfall::core::GameEngine;
use blockfall::input::{map_key_event, should_quit};
use blockfall::runtime::{lock_engine, GameLoop};
use blockfall::term::{GameView, TerminalRenderer, Viewport};
use blockfall::types::{Color, Direction, GameAction, BOARD_HEIGHT, BOARD_WIDTH, PREVIEW_CELLS};

/// How long a level banner stays on screen.
const BANNER_MS: u64 = 2500;

fn main() -> Result<()> {
    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer) -> Result<()> {
    let cells = vec![Color::EMPTY; BOARD_WIDTH * BOARD_HEIGHT];
    let preview = vec![Color::EMPTY; PREVIEW_CELLS];
    let mut engine = GameEngine::new(BOARD_WIDTH, BOARD_HEIGHT, cells, preview, clock_seed())?;

    // Flash "LEVEL n" whenever the progress listener reports a level change.
    let banner: Arc<Mutex<Option<(String, Instant)>>> = Arc::new(Mutex::new(None));
    let banner_writer = Arc::clone(&banner);
    let mut last_level = engine.level();
    engine.on_progress(move |level, _progress| {
        if level != last_level {
            last_level = level;
            if let Ok(mut slot) = banner_writer.lock() {
                *slot = Some((format!("LEVEL {level}"), Instant::now()));
            }
        }
    });

    let engine = Arc::new(Mutex::new(engine));
    let game_loop = GameLoop::spawn(Arc::clone(&engine));

    let view = GameView::default();
    let result = input_loop(term, &engine, &view, &banner);

    game_loop.stop();
    result
}

fn input_loop(
    term: &mut TerminalRenderer,
    engine: &Arc<Mutex<GameEngine>>,
    view: &GameView,
    banner: &Arc<Mutex<Option<(String, Instant)>>>,
) -> Result<()> {
    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let banner_text = current_banner(banner);
        {
            let guard = lock_engine(engine);
            let frame = view.render(&guard, Viewport::new(w, h), banner_text.as_deref());
            drop(guard);
            term.draw(&frame)?;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(action) = map_key_event(key) {
                    apply_action(engine, action);
                }
            }
            Event::Resize(..) => term.invalidate(),
            _ => {}
        }
    }
}

fn apply_action(engine: &Arc<Mutex<GameEngine>>, action: GameAction) {
    let mut guard = lock_engine(engine);
    match action {
        GameAction::MoveLeft => guard.move_shape(Direction::Left),
        GameAction::MoveRight => guard.move_shape(Direction::Right),
        GameAction::MoveDown => guard.move_shape(Direction::Down),
        GameAction::RotateCw => guard.rotate_shape(true),
        GameAction::RotateCcw => guard.rotate_shape(false),
        GameAction::Pause => {
            if guard.is_paused() {
                guard.resume();
            } else {
                guard.pause();
            }
        }
        GameAction::Restart => guard.start_new_game(),
    }
}

fn current_banner(banner: &Arc<Mutex<Option<(String, Instant)>>>) -> Option<String> {
    let mut slot = match banner.lock() {
        Ok(slot) => slot,
        Err(_) => return None,
    };
    let expired = slot
        .as_ref()
        .is_some_and(|(_, since)| since.elapsed() >= Duration::from_millis(BANNER_MS));
    if expired {
        *slot = None;
    }
    slot.as_ref().map(|(text, _)| text.clone())
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() ^ elapsed.as_secs() as u32)
        .unwrap_or(1)
}
