//! Shape module - piece layouts on a 4x4 occupancy matrix
//!
//! Each of the 7 kinds paints exactly 4 cells onto the matrix. Rotation is
//! the in-place transpose-and-reverse rule; kind 1 (the square) happens to
//! be rotation-invariant by symmetry, not by special casing.
//!
//! The matrix is addressed `[x][y]`: first index is the column inside the
//! 4x4 frame, second the row. Cell enumeration scans x outer, y inner; the
//! row-clear and preview logic depend on that order.

use crate::types::{ConfigError, Coordinate, SHAPE_KINDS};

/// A piece layout on a 4x4 frame, rotatable in 90 degree steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    kind: usize,
    matrix: [[bool; 4]; 4],
}

impl PieceShape {
    /// Create the canonical layout for `kind`; fails outside 0..7.
    pub fn new(kind: usize) -> Result<Self, ConfigError> {
        if kind >= SHAPE_KINDS {
            return Err(ConfigError::InvalidShapeKind(kind));
        }

        let mut shape = Self {
            kind,
            matrix: [[false; 4]; 4],
        };
        shape.reset();
        Ok(shape)
    }

    pub fn kind(&self) -> usize {
        self.kind
    }

    /// Clear the matrix and repaint the fixed layout for this kind.
    pub fn reset(&mut self) {
        self.matrix = [[false; 4]; 4];

        match self.kind {
            // I, standing in column 2
            0 => {
                for y in 0..4 {
                    self.matrix[2][y] = true;
                }
            }
            // O, centered square
            1 => {
                for x in 1..=2 {
                    for y in 1..=2 {
                        self.matrix[x][y] = true;
                    }
                }
            }
            // S, standing
            2 => {
                self.matrix[2][0] = true;
                self.matrix[1][1] = true;
                self.matrix[2][1] = true;
                self.matrix[1][2] = true;
            }
            // Z, standing
            3 => {
                self.matrix[1][0] = true;
                self.matrix[1][1] = true;
                self.matrix[2][1] = true;
                self.matrix[2][2] = true;
            }
            // T
            4 => {
                self.matrix[1][0] = true;
                self.matrix[1][1] = true;
                self.matrix[1][2] = true;
                self.matrix[2][1] = true;
            }
            // J
            5 => {
                self.matrix[1][1] = true;
                self.matrix[2][1] = true;
                self.matrix[2][2] = true;
                self.matrix[2][3] = true;
            }
            // L
            6 => {
                self.matrix[1][1] = true;
                self.matrix[1][2] = true;
                self.matrix[1][3] = true;
                self.matrix[2][1] = true;
            }
            _ => unreachable!("kind validated at construction"),
        }
    }

    /// Rotate clockwise in place: (x, y) -> (3 - y, x).
    pub fn rotate_right(&mut self) {
        let mut rotated = [[false; 4]; 4];
        for x in 0..4 {
            for y in 0..4 {
                rotated[3 - y][x] = self.matrix[x][y];
            }
        }
        self.matrix = rotated;
    }

    /// Rotate counter-clockwise in place: (x, y) -> (y, 3 - x).
    pub fn rotate_left(&mut self) {
        let mut rotated = [[false; 4]; 4];
        for x in 0..4 {
            for y in 0..4 {
                rotated[y][3 - x] = self.matrix[x][y];
            }
        }
        self.matrix = rotated;
    }

    /// Absolute coordinates of the 4 occupied cells, offset by `origin`.
    ///
    /// Scan order is x outer, y inner.
    pub fn shifted_cells(&self, origin: Coordinate) -> [Coordinate; 4] {
        let mut cells = [Coordinate::default(); 4];
        let mut filled = 0;
        for x in 0..4 {
            for y in 0..4 {
                if self.matrix[x][y] && filled < cells.len() {
                    cells[filled] = Coordinate::new(origin.x + x as i32, origin.y + y as i32);
                    filled += 1;
                }
            }
        }
        debug_assert_eq!(filled, 4, "shape must occupy exactly 4 cells");
        cells
    }

    /// The 8 occupancy bits of the 2x4 preview window: columns 1-2 of every
    /// row, two bits per row from top to bottom.
    pub fn preview_bits(&self) -> [bool; 8] {
        let mut bits = [false; 8];
        let mut slot = 0;
        for y in 0..4 {
            for x in 1..3 {
                bits[slot] = self.matrix[x][y];
                slot += 1;
            }
        }
        bits
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.matrix[x][y]
    }

    /// Number of occupied matrix cells; 4 for every kind and rotation.
    pub fn occupied_count(&self) -> usize {
        self.matrix
            .iter()
            .map(|column| column.iter().filter(|&&set| set).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_kind_rejected() {
        assert_eq!(
            PieceShape::new(SHAPE_KINDS),
            Err(ConfigError::InvalidShapeKind(SHAPE_KINDS))
        );
        assert!(PieceShape::new(99).is_err());
    }

    #[test]
    fn test_every_kind_occupies_four_cells() {
        for kind in 0..SHAPE_KINDS {
            let shape = PieceShape::new(kind).expect("valid kind");
            assert_eq!(shape.occupied_count(), 4, "kind {kind}");
        }
    }

    #[test]
    fn test_reset_restores_canonical_layout() {
        let mut shape = PieceShape::new(4).expect("valid kind");
        let canonical = shape;

        shape.rotate_right();
        assert_ne!(shape, canonical);

        shape.reset();
        assert_eq!(shape, canonical);
    }

    #[test]
    fn test_square_is_rotation_invariant() {
        let mut shape = PieceShape::new(1).expect("valid kind");
        let canonical = shape;

        shape.rotate_right();
        assert_eq!(shape, canonical);
        shape.rotate_left();
        assert_eq!(shape, canonical);
    }
}
