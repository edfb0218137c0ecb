//! blockfall: a falling-block puzzle built around an embeddable simulation
//! core.
//!
//! The `core` module is the whole game: board, pieces, constrained
//! generators, and the tick state machine. `runtime` wraps it in the mutex
//! plus timer thread that serializes gameplay, and `term`/`input` are the
//! bundled terminal host. Embedders that bring their own surface only need
//! `core` and `runtime`.

pub mod core;
pub mod input;
pub mod runtime;
pub mod term;
pub mod types;
