//! Grid module - one player's board and falling piece
//!
//! The grid is a 12x22 array of optional cells plus the active piece.
//! Uses a flat array for cache locality and zero-allocation row shifts.
//! Coordinates: (x, y) where x ranges 0..11 (left to right), y ranges 0..21
//! (top to bottom); row 21 is the floor. Pieces spawn with their anchor at (5, 0).
//!
//! Collision rules:
//! - a cell left or right of the board is a [`Intersection::Wall`]
//! - a settled cell or anything below the floor is an [`Intersection::Regular`] collision
//! - cells above row 0 are open

use arrayvec::ArrayVec;

use crate::pieces::{piece, Shape};
use crate::rng::Randomness;
use crate::snapshot::FieldSnapshot;
use crate::types::{
    Cell, Intersection, PieceKind, SpecialKind, BOARD_HEIGHT, BOARD_WIDTH, SPAWN_X,
};

/// Cells in one row
pub const ROW_LEN: usize = BOARD_WIDTH as usize;

/// Number of rows
pub const ROW_COUNT: usize = BOARD_HEIGHT as usize;

/// Total number of cells on the grid
const GRID_SIZE: usize = ROW_LEN * ROW_COUNT;

/// Specials recovered from a single row, left to right
pub type RowSpecials = ArrayVec<SpecialKind, ROW_LEN>;

/// The live piece: kind, rotation state and anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Index into the kind's rotation states, always reduced modulo their count
    pub orientation: usize,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Offsets of the current rotation state
    pub fn shape(&self) -> &'static Shape {
        piece(self.kind).shape(self.orientation)
    }

    /// Color written into the grid on freeze
    pub fn color(&self) -> u8 {
        piece(self.kind).color
    }

    /// Absolute positions of the piece's cells
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.shape()
            .iter()
            .map(|&(dx, dy)| (self.x as i16 + dx as i16, self.y as i16 + dy as i16))
    }
}

/// Lines removed by [`Grid::remove_lines`] and the specials they carried
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearedLines {
    pub count: u32,
    /// Row by row in increasing row index, left to right within a row
    pub specials: Vec<SpecialKind>,
}

/// A player's board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Option<Cell>; GRID_SIZE],
    active: Option<ActivePiece>,
}

impl Grid {
    /// Create a new empty grid with no piece
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_SIZE],
            active: None,
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i16, y: i16) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i16 || y < 0 || y >= BOARD_HEIGHT as i16 {
            return None;
        }
        Some((y as usize) * ROW_LEN + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Settled cell at (x, y); `None` when empty or out of bounds
    pub fn cell(&self, x: i16, y: i16) -> Option<&Cell> {
        Self::index(x, y).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn cell_mut(&mut self, x: i16, y: i16) -> Option<&mut Cell> {
        Self::index(x, y).and_then(move |idx| self.cells[idx].as_mut())
    }

    /// Overwrite the cell at (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i16, y: i16, cell: Option<Cell>) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    pub fn is_occupied(&self, x: i16, y: i16) -> bool {
        self.cell(x, y).is_some()
    }

    /// Check if a row has no empty cell
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= ROW_COUNT {
            return false;
        }
        self.cells[y * ROW_LEN..(y + 1) * ROW_LEN]
            .iter()
            .all(|cell| cell.is_some())
    }

    /// Check if a column has no settled cell in any row
    pub fn is_column_empty(&self, x: usize) -> bool {
        x < ROW_LEN && (0..ROW_COUNT).all(|y| self.cells[y * ROW_LEN + x].is_none())
    }

    /// Number of settled cells without a special
    pub fn block_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Some(Cell { special: None, .. })))
            .count()
    }

    /// The live piece, if any
    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    /// End the live phase without writing the piece into the grid
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Test a shape anchored at (x, y) against walls, floor and settled cells.
    ///
    /// A wall hit is reported as soon as it is seen and wins over block collisions.
    pub fn intersects(&self, shape: &Shape, x: i8, y: i8) -> Intersection {
        let mut collides = false;
        for &(dx, dy) in shape {
            let nx = x as i16 + dx as i16;
            let ny = y as i16 + dy as i16;

            if nx < 0 || nx >= BOARD_WIDTH as i16 {
                return Intersection::Wall;
            }
            if ny >= BOARD_HEIGHT as i16 {
                collides = true;
                continue;
            }
            if ny < 0 {
                continue;
            }

            let idx = Self::index(nx, ny)
                .unwrap_or_else(|| unreachable!("({nx}, {ny}) passed the wall check"));
            if self.cells[idx].is_some() {
                collides = true;
            }
        }

        if collides {
            Intersection::Regular
        } else {
            Intersection::None
        }
    }

    /// Try to move the live piece; walls and blocks both refuse the move
    pub fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let (Some(x), Some(y)) = (active.x.checked_add(dx), active.y.checked_add(dy)) else {
            return false;
        };
        if !self.intersects(active.shape(), x, y).is_none() {
            return false;
        }

        self.active = Some(ActivePiece { x, y, ..active });
        true
    }

    /// Advance to the next rotation state.
    ///
    /// A block collision cancels the rotation. A wall hit tries a kick one
    /// column left, then two columns right, whatever the piece kind; the first
    /// position that is completely free wins.
    pub fn rotate(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let p = piece(active.kind);
        let orientation = (active.orientation + 1) % p.rotation_count();
        let shape = p.shape(orientation);

        let x = match self.intersects(shape, active.x, active.y) {
            Intersection::None => active.x,
            Intersection::Regular => return false,
            Intersection::Wall => {
                if self.intersects(shape, active.x - 1, active.y).is_none() {
                    active.x - 1
                } else if self.intersects(shape, active.x + 2, active.y).is_none() {
                    active.x + 2
                } else {
                    return false;
                }
            }
        };

        self.active = Some(ActivePiece {
            orientation,
            x,
            ..active
        });
        true
    }

    /// Move the live piece down until it rests; returns rows fallen
    pub fn hard_drop(&mut self) -> u32 {
        let mut rows = 0;
        while self.try_move(0, 1) {
            rows += 1;
        }
        rows
    }

    /// Place a new piece at the spawn anchor.
    ///
    /// Returns false if the spawn position already collides: the seat has topped out.
    pub fn spawn_piece(&mut self, kind: PieceKind, orientation: usize) -> bool {
        self.active = Some(ActivePiece {
            kind,
            orientation: orientation % piece(kind).rotation_count(),
            x: SPAWN_X,
            y: 0,
        });
        self.try_move(0, 0)
    }

    /// Write the live piece into the grid and end its live phase.
    ///
    /// No validation: the caller knows the piece can rest where it is.
    pub fn freeze(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let color = active.color();
        for (x, y) in active.cells() {
            self.set(x, y, Some(Cell::block(color)));
        }
    }

    /// Lowest anchor row the live piece could fall to (preview only)
    pub fn ghost_y(&self) -> Option<i8> {
        let active = self.active?;
        let shape = active.shape();

        let mut y = active.y;
        while (y as i16) < BOARD_HEIGHT as i16 && self.intersects(shape, active.x, y).is_none() {
            y += 1;
        }
        Some(y - 1)
    }

    /// Remove one row, shifting everything above it down; row 0 becomes empty.
    /// Returns the specials that were in the row, left to right.
    pub fn remove_line(&mut self, row: usize) -> RowSpecials {
        let mut specials = RowSpecials::new();
        if row >= ROW_COUNT {
            return specials;
        }

        for cell in self.cells[row * ROW_LEN..(row + 1) * ROW_LEN].iter().flatten() {
            if let Some(special) = cell.special {
                specials.push(special);
            }
        }

        // copy_within handles the overlapping ranges
        for r in (1..=row).rev() {
            let src = (r - 1) * ROW_LEN;
            self.cells.copy_within(src..src + ROW_LEN, r * ROW_LEN);
        }
        for cell in &mut self.cells[..ROW_LEN] {
            *cell = None;
        }

        specials
    }

    /// Remove every full row, top to bottom
    pub fn remove_lines(&mut self) -> ClearedLines {
        let mut cleared = ClearedLines::default();
        for row in 0..ROW_COUNT {
            if self.is_row_full(row) {
                cleared.specials.extend(self.remove_line(row));
                cleared.count += 1;
            }
        }
        cleared
    }

    /// Push a row in at the floor, shifting everything up one.
    /// Returns true if a settled cell was pushed off the top.
    pub fn insert_bottom_row(&mut self, row: &[Option<Cell>; ROW_LEN]) -> bool {
        let overflow = self.cells[..ROW_LEN].iter().any(|c| c.is_some());
        self.cells.copy_within(ROW_LEN.., 0);
        self.cells[GRID_SIZE - ROW_LEN..].copy_from_slice(row);
        overflow
    }

    /// Overwrite every cell with a fresh plain block (a topped-out board)
    pub fn fill_random(&mut self, rng: &mut dyn Randomness) {
        for cell in &mut self.cells {
            *cell = Some(Cell::block(rng.random_color()));
        }
    }

    /// Empty every cell; the live piece is untouched
    pub fn clear_cells(&mut self) {
        self.cells = [None; GRID_SIZE];
    }

    /// Exchange settled cells with another grid; live pieces stay where they are
    pub fn swap_cells(&mut self, other: &mut Grid) {
        std::mem::swap(&mut self.cells, &mut other.cells);
    }

    /// Row-major view of all cells
    pub fn cells(&self) -> &[Option<Cell>] {
        &self.cells
    }

    /// One row, left to right
    pub fn row(&self, y: usize) -> &[Option<Cell>] {
        &self.cells[y * ROW_LEN..(y + 1) * ROW_LEN]
    }

    /// Settled cells as a field snapshot
    pub fn snapshot(&self) -> FieldSnapshot {
        let mut snap = FieldSnapshot::empty();
        for y in 0..ROW_COUNT {
            for x in 0..ROW_LEN {
                snap.set(x, y, self.cells[y * ROW_LEN + x]);
            }
        }
        snap
    }

    /// Replace the settled cells with a snapshot's; the live piece is untouched
    pub fn restore(&mut self, snap: &FieldSnapshot) {
        for y in 0..ROW_COUNT {
            for x in 0..ROW_LEN {
                self.cells[y * ROW_LEN + x] = snap.get(x, y);
            }
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
