//! Core module - pure simulation logic with no terminal dependencies
//!
//! Everything the timed loop and the host mutate lives here: the board, the
//! falling piece, the constrained generators, and the engine state machine.

pub mod board;
pub mod engine;
pub mod picker;
pub mod piece;
pub mod rng;
pub mod shape;

// Re-export commonly used types
pub use board::Board;
pub use engine::{EngineConfig, GameEngine};
pub use picker::NonRepeatingPicker;
pub use piece::ActivePiece;
pub use shape::PieceShape;
