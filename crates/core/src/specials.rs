//! Specials module - row-clear propagation, special injection and the inventory
//!
//! A freeze (or an applied effect) runs [`clear_and_propagate`]: full rows are
//! removed, the specials they carried go to the [`Inventory`], and every
//! `lines_per_special` cleared lines inject fresh specials into the grid with
//! [`add_specials`]. Injection can complete a row on its own, so the cycle
//! repeats until a pass clears nothing.

use arrayvec::ArrayVec;

use crate::grid::{ClearedLines, Grid, ROW_COUNT, ROW_LEN};
use crate::params::GameParams;
use crate::rng::{FrequencyTable, Randomness};
use crate::types::{Cell, SpecialKind, EMPTY_COLUMN_ATTEMPTS, MAX_SPECIAL_CAPACITY};

/// Upper bound on clear passes per cycle; each productive pass removes at least one row
pub const MAX_CLEAR_PASSES: usize = ROW_COUNT + 1;

/// Tag random settled blocks with specials; returns how many were placed.
///
/// Targets are sampled without replacement from the cells that carry no
/// special, scanning column by column, each column top to bottom. When the
/// grid runs out of such cells the rest go to the floor of a random empty
/// column; after [`EMPTY_COLUMN_ATTEMPTS`] misses the remainder is dropped.
pub fn add_specials(
    grid: &mut Grid,
    count: u32,
    table: &FrequencyTable<SpecialKind>,
    rng: &mut dyn Randomness,
) -> u32 {
    let mut remaining = count;
    let mut block_count = grid.block_count();

    while block_count > 0 && remaining > 0 {
        let mut idx = rng.rand_int(block_count as u32) as usize;

        'scan: for x in 0..ROW_LEN as i16 {
            for y in 0..ROW_COUNT as i16 {
                let Some(cell) = grid.cell_mut(x, y) else {
                    continue;
                };
                if cell.special.is_some() {
                    continue;
                }
                if idx == 0 {
                    cell.special = Some(rng.random_special(table));
                    break 'scan;
                }
                idx -= 1;
            }
        }

        block_count -= 1;
        remaining -= 1;
    }

    while remaining > 0 {
        let mut found = false;
        for _ in 0..EMPTY_COLUMN_ATTEMPTS {
            let column = rng.rand_int(ROW_LEN as u32) as usize;
            if grid.is_column_empty(column) {
                let cell = Cell::special(rng.random_color(), rng.random_special(table));
                grid.set(column as i16, ROW_COUNT as i16 - 1, Some(cell));
                remaining -= 1;
                found = true;
                break;
            }
        }
        if !found {
            break;
        }
    }

    count - remaining
}

/// The acting seat's queue of collected specials, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    items: ArrayVec<SpecialKind, MAX_SPECIAL_CAPACITY>,
    capacity: usize,
}

impl Inventory {
    /// Empty inventory; capacity is clamped to [`MAX_SPECIAL_CAPACITY`]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: ArrayVec::new(),
            capacity: capacity.min(MAX_SPECIAL_CAPACITY),
        }
    }

    /// Queue a special; returns false (and drops it) when full
    pub fn push(&mut self, kind: SpecialKind) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(kind);
        true
    }

    /// Take the oldest special
    pub fn pop_front(&mut self) -> Option<SpecialKind> {
        self.items.pop_at(0)
    }

    pub fn front(&self) -> Option<SpecialKind> {
        self.items.first().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[SpecialKind] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Queue `copies` of each special in order, stopping once full
    fn collect(&mut self, specials: &[SpecialKind], copies: u32) {
        for &kind in specials {
            for _ in 0..copies {
                if !self.push(kind) {
                    return;
                }
            }
        }
    }
}

/// What one clear/propagate cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Passes that removed at least one row
    pub passes: u32,
    /// Rows removed by the first pass, the one the player caused
    pub first_pass_lines: u32,
    /// Rows removed over every pass
    pub total_lines: u32,
    /// Specials injected into the grid
    pub specials_added: u32,
}

/// Remove full rows and inject specials until a pass clears nothing.
///
/// `lines_since_special` carries the remainder below `lines_per_special`
/// between cycles. Recovered specials are queued once the loop ends, latest
/// pass first, each once per row its pass removed.
pub fn clear_and_propagate(
    grid: &mut Grid,
    lines_since_special: &mut u32,
    inventory: &mut Inventory,
    params: &GameParams,
    rng: &mut dyn Randomness,
) -> ClearReport {
    let mut report = ClearReport::default();
    let per_special = params.lines_per_special.max(1);
    let mut recovered: Vec<ClearedLines> = Vec::new();

    for _ in 0..MAX_CLEAR_PASSES {
        let cleared = grid.remove_lines();
        if cleared.count == 0 {
            break;
        }

        if report.passes == 0 {
            report.first_pass_lines = cleared.count;
        }
        report.passes += 1;
        report.total_lines += cleared.count;

        *lines_since_special += cleared.count;
        let to_add = (*lines_since_special / per_special).saturating_mul(params.specials_added);
        *lines_since_special %= per_special;
        recovered.push(cleared);
        if to_add == 0 {
            break;
        }
        report.specials_added = report
            .specials_added
            .saturating_add(add_specials(grid, to_add, &params.special_frequencies, rng));
    }

    for pass in recovered.iter().rev() {
        inventory.collect(&pass.specials, pass.count);
    }

    report
}
