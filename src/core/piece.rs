//! Piece module - the falling piece and its footprint on the grid

use crate::core::shape::PieceShape;
use crate::types::{Color, Coordinate};

/// The piece currently falling: shape matrix, grid offset of the 4x4 frame,
/// color, and the derived absolute cells.
///
/// `cells` is a cache of `shape.shifted_cells(location)`; it must be
/// refreshed whenever the location or the matrix changes before anyone
/// paints or collides against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub shape: PieceShape,
    pub location: Coordinate,
    pub color: Color,
    cells: [Coordinate; 4],
}

impl ActivePiece {
    pub fn new(shape: PieceShape, location: Coordinate, color: Color) -> Self {
        Self {
            shape,
            location,
            color,
            cells: shape.shifted_cells(location),
        }
    }

    /// The committed absolute cells, as of the last refresh.
    pub fn cells(&self) -> &[Coordinate; 4] {
        &self.cells
    }

    /// Recompute the committed cells from the current shape and location.
    pub fn refresh_cells(&mut self) {
        self.cells = self.shape.shifted_cells(self.location);
    }

    /// The cells the piece would occupy with its current shape and location,
    /// without committing them. Used to validate rotations before refresh.
    pub fn projected_cells(&self) -> [Coordinate; 4] {
        self.shape.shifted_cells(self.location)
    }
}
