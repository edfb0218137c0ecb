//! Terminal module - frame composition and rendering for the bundled host

pub mod frame;
pub mod game_view;
pub mod renderer;

pub use frame::{Frame, Rgb, Styled};
pub use game_view::{GameView, Viewport};
pub use renderer::TerminalRenderer;
