//! Pieces module - the shape catalog
//!
//! Implements the TetriNet rotation system: each kind is a cyclic list of
//! rotation states, each state a fixed set of four offsets from the anchor.
//! Reference: https://tetris.wiki/TetriNet_Rotation_System

use crate::types::PieceKind;

/// Offset of a single cell relative to the piece anchor
pub type CellOffset = (i8, i8);

/// One rotation state - four offsets from the anchor
pub type Shape = [CellOffset; 4];

/// A piece kind's rotation states and default color
#[derive(Debug, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub shapes: &'static [Shape],
    pub color: u8,
}

impl Piece {
    /// Shape for an orientation index, taken modulo the number of states
    pub fn shape(&self, orientation: usize) -> &'static Shape {
        &self.shapes[orientation % self.shapes.len()]
    }

    /// Number of distinct rotation states
    pub fn rotation_count(&self) -> usize {
        self.shapes.len()
    }
}

const I_SHAPES: [Shape; 2] = [
    [(-2, 0), (-1, 0), (0, 0), (1, 0)],
    [(0, 0), (0, 1), (0, 2), (0, 3)],
];

const O_SHAPES: [Shape; 1] = [[(0, 0), (0, 1), (1, 0), (1, 1)]];

const J_SHAPES: [Shape; 4] = [
    [(-1, 0), (-1, 1), (0, 1), (1, 1)],
    [(-1, 0), (0, 0), (-1, 1), (-1, 2)],
    [(-1, 0), (0, 0), (1, 0), (1, 1)],
    [(0, 0), (0, 1), (0, 2), (-1, 2)],
];

const L_SHAPES: [Shape; 4] = [
    [(1, 0), (-1, 1), (0, 1), (1, 1)],
    [(-1, 0), (0, 2), (-1, 1), (-1, 2)],
    [(-1, 0), (0, 0), (1, 0), (-1, 1)],
    [(-1, 0), (0, 0), (0, 1), (0, 2)],
];

const Z_SHAPES: [Shape; 2] = [
    [(-1, 0), (0, 0), (0, 1), (1, 1)],
    [(0, 0), (-1, 1), (0, 1), (-1, 2)],
];

const S_SHAPES: [Shape; 2] = [
    [(0, 0), (1, 0), (-1, 1), (0, 1)],
    [(-1, 0), (-1, 1), (0, 1), (0, 2)],
];

const T_SHAPES: [Shape; 4] = [
    [(-1, 1), (0, 0), (0, 1), (1, 1)],
    [(-1, 0), (-1, 1), (-1, 2), (0, 1)],
    [(-1, 0), (0, 0), (1, 0), (0, 1)],
    [(0, 0), (0, 1), (0, 2), (-1, 1)],
];

/// The catalog, indexed by [`PieceKind::index`]
pub static PIECES: [Piece; 7] = [
    Piece {
        kind: PieceKind::I,
        shapes: &I_SHAPES,
        color: 1,
    },
    Piece {
        kind: PieceKind::O,
        shapes: &O_SHAPES,
        color: 2,
    },
    Piece {
        kind: PieceKind::J,
        shapes: &J_SHAPES,
        color: 3,
    },
    Piece {
        kind: PieceKind::L,
        shapes: &L_SHAPES,
        color: 4,
    },
    Piece {
        kind: PieceKind::Z,
        shapes: &Z_SHAPES,
        color: 5,
    },
    Piece {
        kind: PieceKind::S,
        shapes: &S_SHAPES,
        color: 1,
    },
    Piece {
        kind: PieceKind::T,
        shapes: &T_SHAPES,
        color: 2,
    },
];

/// Look up a kind in the catalog
pub fn piece(kind: PieceKind) -> &'static Piece {
    &PIECES[kind.index()]
}

/// Shape for a kind and orientation (orientation taken modulo the state count)
pub fn get_shape(kind: PieceKind, orientation: usize) -> &'static Shape {
    piece(kind).shape(orientation)
}
