//! Effects module - what each special does to the grids
//!
//! [`EffectTable`] is a dispatch table from [`SpecialKind`] to a plain
//! function. The session builds an [`EffectContext`] for the seat a special
//! lands on and then re-validates that seat's piece itself, so an effect only
//! has to leave every grid structurally valid.

use crate::grid::{Grid, ROW_COUNT, ROW_LEN};
use crate::rng::Randomness;
use crate::types::{Cell, Seat, SpecialKind, EMPTY_COLUMN_ATTEMPTS, MAX_SEATS};

/// Chance (1 in N) that a garbage cell is left empty
const GARBAGE_HOLE_ODDS: u32 = 6;

/// Cells emptied by a random clear
const RANDOM_CLEAR_CELLS: u32 = 10;

/// Maximum horizontal shift of a row during a quake
const QUAKE_MAX_SHIFT: u32 = 2;

/// Rows above this stay clear of block bomb debris
const BOMB_SCATTER_TOP: u32 = 6;

const KIND_COUNT: usize = SpecialKind::ALL.len();

/// Everything an effect may touch
pub struct EffectContext<'a> {
    /// Every seat's grid; seat `n` is index `n - 1`
    pub grids: &'a mut [Grid; MAX_SEATS],
    /// Seat the special lands on
    pub target: Seat,
    /// Seat that sent it, if any
    pub from: Option<Seat>,
    pub rng: &'a mut dyn Randomness,
}

impl EffectContext<'_> {
    pub fn target_grid(&mut self) -> &mut Grid {
        &mut self.grids[self.target as usize - 1]
    }
}

pub type EffectFn = fn(&mut EffectContext<'_>);

/// Special kind -> effect
#[derive(Clone, Copy)]
pub struct EffectTable {
    effects: [EffectFn; KIND_COUNT],
}

impl std::fmt::Debug for EffectTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectTable").finish_non_exhaustive()
    }
}

impl EffectTable {
    /// The classic TetriNet effects
    pub fn standard() -> Self {
        let mut effects: [EffectFn; KIND_COUNT] = [add_line; KIND_COUNT];
        for kind in SpecialKind::ALL {
            effects[kind.index()] = match kind {
                SpecialKind::AddLine => add_line,
                SpecialKind::ClearLine => clear_line,
                SpecialKind::NukeField => nuke_field,
                SpecialKind::RandomClear => random_clear,
                SpecialKind::SwitchField => switch_field,
                SpecialKind::ClearSpecials => clear_specials,
                SpecialKind::Gravity => gravity,
                SpecialKind::QuakeField => quake_field,
                SpecialKind::BlockBomb => block_bomb,
            };
        }
        Self { effects }
    }

    /// Replace the effect for one kind
    pub fn with(mut self, kind: SpecialKind, effect: EffectFn) -> Self {
        self.effects[kind.index()] = effect;
        self
    }

    pub fn apply(&self, kind: SpecialKind, ctx: &mut EffectContext<'_>) {
        (self.effects[kind.index()])(ctx)
    }
}

impl Default for EffectTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// A garbage row: each cell empty with 1/6 odds, plus one guaranteed hole
pub fn garbage_row(rng: &mut dyn Randomness) -> [Option<Cell>; ROW_LEN] {
    let mut row = [None; ROW_LEN];
    for cell in &mut row {
        if rng.rand_int(GARBAGE_HOLE_ODDS) != 0 {
            *cell = Some(Cell::block(rng.random_color()));
        }
    }
    row[rng.rand_int(ROW_LEN as u32) as usize] = None;
    row
}

fn add_line(ctx: &mut EffectContext<'_>) {
    let row = garbage_row(ctx.rng);
    ctx.target_grid().insert_bottom_row(&row);
}

fn clear_line(ctx: &mut EffectContext<'_>) {
    // specials in the removed row are lost
    ctx.target_grid().remove_line(ROW_COUNT - 1);
}

fn nuke_field(ctx: &mut EffectContext<'_>) {
    ctx.target_grid().clear_cells();
}

fn random_clear(ctx: &mut EffectContext<'_>) {
    for _ in 0..RANDOM_CLEAR_CELLS {
        let x = ctx.rng.rand_int(ROW_LEN as u32) as i16;
        let y = ctx.rng.rand_int(ROW_COUNT as u32) as i16;
        ctx.target_grid().set(x, y, None);
    }
}

fn switch_field(ctx: &mut EffectContext<'_>) {
    let Some(from) = ctx.from else {
        return;
    };
    let (a, b) = (ctx.target as usize, from as usize);
    if a == b || a == 0 || b == 0 || a > MAX_SEATS || b > MAX_SEATS {
        return;
    }

    let (lo, hi) = (a.min(b) - 1, a.max(b) - 1);
    let (left, right) = ctx.grids.split_at_mut(hi);
    left[lo].swap_cells(&mut right[0]);
}

fn clear_specials(ctx: &mut EffectContext<'_>) {
    let grid = ctx.target_grid();
    for y in 0..ROW_COUNT as i16 {
        for x in 0..ROW_LEN as i16 {
            if let Some(cell) = grid.cell_mut(x, y) {
                cell.clear_special();
            }
        }
    }
}

fn gravity(ctx: &mut EffectContext<'_>) {
    let grid = ctx.target_grid();
    for x in 0..ROW_LEN as i16 {
        let mut write = ROW_COUNT as i16 - 1;
        for y in (0..ROW_COUNT as i16).rev() {
            let Some(cell) = grid.cell(x, y).copied() else {
                continue;
            };
            if y != write {
                grid.set(x, write, Some(cell));
                grid.set(x, y, None);
            }
            write -= 1;
        }
    }
}

fn quake_field(ctx: &mut EffectContext<'_>) {
    for y in 0..ROW_COUNT {
        let shift = ctx.rng.rand_int(QUAKE_MAX_SHIFT + 1) as usize;
        let right = ctx.rng.rand_int(2) == 1;
        if shift == 0 {
            continue;
        }

        let grid = ctx.target_grid();
        let mut row = [None; ROW_LEN];
        row.copy_from_slice(grid.row(y));
        if right {
            row.rotate_right(shift);
        } else {
            row.rotate_left(shift);
        }
        for (x, cell) in row.into_iter().enumerate() {
            grid.set(x as i16, y as i16, cell);
        }
    }
}

fn block_bomb(ctx: &mut EffectContext<'_>) {
    let bombs: Vec<(i16, i16)> = {
        let grid = ctx.target_grid();
        (0..ROW_COUNT as i16)
            .flat_map(|y| (0..ROW_LEN as i16).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                grid.cell(x, y).and_then(|c| c.special) == Some(SpecialKind::BlockBomb)
            })
            .collect()
    };

    for (bx, by) in bombs {
        let grid = ctx.target_grid();
        // an earlier blast may have moved or removed this bomb
        if grid.cell(bx, by).and_then(|c| c.special) != Some(SpecialKind::BlockBomb) {
            continue;
        }
        grid.set(bx, by, None);

        let mut debris = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some(cell) = grid.cell(bx + dx, by + dy).copied() {
                    debris.push(cell);
                    grid.set(bx + dx, by + dy, None);
                }
            }
        }

        for cell in debris {
            for _ in 0..EMPTY_COLUMN_ATTEMPTS {
                let x = ctx.rng.rand_int(ROW_LEN as u32) as i16;
                let y = (BOMB_SCATTER_TOP + ctx.rng.rand_int(ROW_COUNT as u32 - BOMB_SCATTER_TOP))
                    as i16;
                let grid = ctx.target_grid();
                if !grid.is_occupied(x, y) {
                    grid.set(x, y, Some(cell));
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SimpleRng};

    fn grids() -> [Grid; MAX_SEATS] {
        std::array::from_fn(|_| Grid::new())
    }

    fn run(kind: SpecialKind, grids: &mut [Grid; MAX_SEATS], from: Option<Seat>, rng: &mut dyn Randomness) {
        let mut ctx = EffectContext {
            grids,
            target: 1,
            from,
            rng,
        };
        EffectTable::standard().apply(kind, &mut ctx);
    }

    fn count(grid: &Grid) -> usize {
        grid.cells().iter().flatten().count()
    }

    #[test]
    fn garbage_row_always_has_a_hole() {
        let mut rng = SimpleRng::new(21);
        for _ in 0..100 {
            let row = garbage_row(&mut rng);
            assert!(row.iter().any(|c| c.is_none()));
            assert!(row.iter().flatten().all(|c| c.special.is_none()));
        }
    }

    #[test]
    fn add_line_pushes_rows_up() {
        let mut g = grids();
        g[0].set(2, 21, Some(Cell::block(4)));
        let mut rng = SimpleRng::new(8);
        run(SpecialKind::AddLine, &mut g, None, &mut rng);
        assert_eq!(g[0].cell(2, 20), Some(&Cell::block(4)));
        assert!(g[0].row(21).iter().any(|c| c.is_none()));
    }

    #[test]
    fn clear_line_drops_floor_row() {
        let mut g = grids();
        g[0].set(0, 21, Some(Cell::special(1, SpecialKind::Gravity)));
        g[0].set(0, 20, Some(Cell::block(2)));
        let mut rng = SimpleRng::new(1);
        run(SpecialKind::ClearLine, &mut g, None, &mut rng);
        assert_eq!(g[0].cell(0, 21), Some(&Cell::block(2)));
        assert_eq!(count(&g[0]), 1);
    }

    #[test]
    fn nuke_empties_only_target() {
        let mut g = grids();
        g[0].set(1, 1, Some(Cell::block(1)));
        g[1].set(1, 1, Some(Cell::block(1)));
        let mut rng = SimpleRng::new(1);
        run(SpecialKind::NukeField, &mut g, Some(2), &mut rng);
        assert_eq!(count(&g[0]), 0);
        assert_eq!(count(&g[1]), 1);
    }

    #[test]
    fn switch_swaps_with_sender() {
        let mut g = grids();
        g[0].set(0, 21, Some(Cell::block(1)));
        g[3].set(5, 21, Some(Cell::block(5)));
        g[3].set(6, 21, Some(Cell::block(5)));
        let mut rng = SimpleRng::new(1);

        run(SpecialKind::SwitchField, &mut g, Some(4), &mut rng);
        assert_eq!(count(&g[0]), 2);
        assert_eq!(g[3].cell(0, 21), Some(&Cell::block(1)));

        // no sender: nothing to swap with
        run(SpecialKind::SwitchField, &mut g, None, &mut rng);
        assert_eq!(count(&g[0]), 2);
    }

    #[test]
    fn clear_specials_keeps_colors() {
        let mut g = grids();
        g[0].set(3, 10, Some(Cell::special(4, SpecialKind::QuakeField)));
        let mut rng = SimpleRng::new(1);
        run(SpecialKind::ClearSpecials, &mut g, None, &mut rng);
        assert_eq!(g[0].cell(3, 10), Some(&Cell::block(4)));
    }

    #[test]
    fn gravity_compacts_columns_in_order() {
        let mut g = grids();
        g[0].set(4, 3, Some(Cell::block(1)));
        g[0].set(4, 10, Some(Cell::block(2)));
        g[0].set(4, 21, Some(Cell::block(3)));
        let mut rng = SimpleRng::new(1);
        run(SpecialKind::Gravity, &mut g, None, &mut rng);
        assert_eq!(g[0].cell(4, 21), Some(&Cell::block(3)));
        assert_eq!(g[0].cell(4, 20), Some(&Cell::block(2)));
        assert_eq!(g[0].cell(4, 19), Some(&Cell::block(1)));
        assert_eq!(count(&g[0]), 3);
    }

    #[test]
    fn quake_rotates_rows_with_wraparound() {
        let mut g = grids();
        g[0].set(11, 21, Some(Cell::block(5)));
        // rows 0..=20: no shift; row 21: shift 1 to the right
        let mut script = vec![0; 2 * 21];
        script.extend([1, 1]);
        let mut rng = ScriptedRng::new(script);
        run(SpecialKind::QuakeField, &mut g, None, &mut rng);
        assert_eq!(g[0].cell(0, 21), Some(&Cell::block(5)));
        assert_eq!(count(&g[0]), 1);
    }

    #[test]
    fn block_bomb_scatters_neighbours() {
        let mut g = grids();
        g[0].set(5, 21, Some(Cell::special(1, SpecialKind::BlockBomb)));
        g[0].set(4, 21, Some(Cell::block(2)));
        g[0].set(6, 20, Some(Cell::block(3)));
        let mut rng = SimpleRng::new(33);
        run(SpecialKind::BlockBomb, &mut g, None, &mut rng);

        assert!(g[0].cell(5, 21).is_none());
        assert_eq!(count(&g[0]), 2);
        for y in 0..BOMB_SCATTER_TOP as usize {
            assert!(g[0].row(y).iter().all(|c| c.is_none()));
        }
    }

    #[test]
    fn table_entries_can_be_replaced() {
        fn fill_top_left(ctx: &mut EffectContext<'_>) {
            ctx.target_grid().set(0, 0, Some(Cell::block(1)));
        }
        let table = EffectTable::standard().with(SpecialKind::NukeField, fill_top_left);
        let mut g = grids();
        let mut rng = SimpleRng::new(1);
        let mut ctx = EffectContext {
            grids: &mut g,
            target: 1,
            from: None,
            rng: &mut rng,
        };
        table.apply(SpecialKind::NukeField, &mut ctx);
        assert!(g[0].is_occupied(0, 0));
    }
}
