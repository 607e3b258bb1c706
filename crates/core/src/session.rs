//! Session module - the controller that sequences one local seat's game
//!
//! The session owns a grid for every seat, the local special inventory, the
//! preview piece and level counters. It is driven from outside by exactly two
//! event sources, both run to completion on the host's single thread:
//!
//! - gravity ticks, delivered through [`Session::on_timer`] with the
//!   [`TimerId`] the session scheduled on its [`EventLoop`]
//! - discrete player actions, delivered through [`Session::handle_action`]
//!
//! Every lock runs the same sequence: freeze, clear/propagate, one field
//! update, then the next spawn. A failed spawn tops the local seat out.

use thiserror::Error;

use crate::effects::{garbage_row, EffectContext, EffectTable};
use crate::grid::Grid;
use crate::host::{EventLoop, NetworkSink, RenderSink, TimerId};
use crate::params::{GameParams, ParamsError};
use crate::rng::Randomness;
use crate::snapshot::FieldSnapshot;
use crate::specials::{clear_and_propagate, ClearReport, Inventory};
use crate::types::{
    is_valid_seat, tick_ms_for_level, GameAction, PieceKind, Seat, SeatStatus, SpecialCode,
    SpecialKind, SpecialTarget, MAX_LEVEL, MAX_SEATS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("seat {0} is outside 1..=6")]
    InvalidSeat(Seat),
    #[error("invalid game parameters: {0}")]
    Params(#[from] ParamsError),
}

/// One player's view of a multiplayer game
pub struct Session<L: EventLoop, N: NetworkSink> {
    me: Seat,
    params: GameParams,
    effects: EffectTable,
    rng: Box<dyn Randomness>,
    event_loop: L,
    network: N,

    grids: [Grid; MAX_SEATS],
    statuses: [SeatStatus; MAX_SEATS],
    specials: Inventory,

    next_kind: PieceKind,
    next_orientation: usize,

    level: u32,
    lines_since_level: u32,
    lines_since_special: u32,
    lines_cleared: u32,
    tick_ms: u32,

    playing: bool,
    clock: Option<TimerId>,
    redraw_pending: bool,
}

impl<L: EventLoop, N: NetworkSink> Session<L, N> {
    /// Create a session for local seat `me`; no game runs until [`Session::new_game`]
    pub fn new(
        me: Seat,
        params: GameParams,
        rng: impl Randomness + 'static,
        event_loop: L,
        network: N,
    ) -> Result<Self, SessionError> {
        if !is_valid_seat(me) {
            return Err(SessionError::InvalidSeat(me));
        }
        params.validate()?;

        let level = params.starting_level;
        Ok(Self {
            me,
            specials: Inventory::new(params.special_capacity),
            params,
            effects: EffectTable::standard(),
            rng: Box::new(rng),
            event_loop,
            network,
            grids: std::array::from_fn(|_| Grid::new()),
            statuses: [SeatStatus::Playing; MAX_SEATS],
            next_kind: PieceKind::I,
            next_orientation: 0,
            level,
            lines_since_level: 0,
            lines_since_special: 0,
            lines_cleared: 0,
            tick_ms: tick_ms_for_level(level),
            playing: false,
            clock: None,
            redraw_pending: false,
        })
    }

    /// Swap in a custom effect table
    pub fn with_effects(mut self, effects: EffectTable) -> Self {
        self.effects = effects;
        self
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Reset every grid and counter, draw the preview and spawn the first piece.
    ///
    /// Stops the clock; call [`Session::start`] to run gravity.
    pub fn new_game(&mut self) {
        self.stop_clock();
        self.playing = false;

        self.level = self.params.starting_level;
        self.tick_ms = tick_ms_for_level(self.level);
        self.lines_since_level = 0;
        self.lines_since_special = 0;
        self.lines_cleared = 0;

        self.grids = std::array::from_fn(|_| Grid::new());
        self.statuses = [SeatStatus::Playing; MAX_SEATS];
        self.specials = Inventory::new(self.params.special_capacity);

        self.draw_preview();

        for _ in 0..self.params.starting_height {
            let row = garbage_row(&mut *self.rng);
            self.local_mut().insert_bottom_row(&row);
        }

        let first = self.rng.random_piece(&self.params.piece_frequencies);
        if !self.local_mut().spawn_piece(first, 0) {
            self.top_out();
        }
        self.request_draw();
    }

    /// Run the gravity clock
    pub fn start(&mut self) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.reset_clock();
        self.request_draw();
    }

    /// Stop the gravity clock; actions become no-ops
    pub fn pause(&mut self) {
        self.stop_clock();
        self.playing = false;
    }

    /// A scheduled tick fired; ids other than the live clock are stale and ignored
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.clock != Some(id) {
            return false;
        }
        self.clock = None;
        self.tick();
        true
    }

    /// One gravity step: move down, or lock and respawn when blocked
    pub fn tick(&mut self) {
        if !self.can_act() {
            return;
        }

        if !self.local_mut().try_move(0, 1) {
            self.lock_and_respawn();
        }

        self.reset_clock();
        self.request_draw();
    }

    // ========================================================================
    // Player actions
    // ========================================================================

    /// Apply a player action; returns false when it was refused or had no effect
    pub fn handle_action(&mut self, action: GameAction) -> bool {
        if !self.can_act() {
            return false;
        }

        let changed = match action {
            GameAction::Rotate => self.local_mut().rotate(),
            GameAction::MoveLeft => self.local_mut().try_move(-1, 0),
            GameAction::MoveRight => self.local_mut().try_move(1, 0),
            GameAction::SoftDrop => {
                if !self.local_mut().try_move(0, 1) {
                    self.lock_and_respawn();
                }
                self.reset_clock();
                true
            }
            GameAction::HardDrop => {
                self.local_mut().hard_drop();
                self.lock_and_respawn();
                self.reset_clock();
                true
            }
            GameAction::UseSpecial(target) => self.use_special(target),
            GameAction::DiscardSpecial => self.discard_special(),
        };

        self.request_draw();
        changed
    }

    /// Spend the oldest special on `target`.
    ///
    /// The local seat applies it directly; any other playing seat gets it over
    /// the network. Lost or unknown targets leave the inventory untouched.
    pub fn use_special(&mut self, target: Seat) -> bool {
        if !self.can_act() || !is_valid_seat(target) || self.status(target) != SeatStatus::Playing {
            return false;
        }
        let Some(kind) = self.specials.pop_front() else {
            return false;
        };

        if target == self.me {
            self.apply_special(kind, Some(self.me));
        } else {
            self.network
                .send_special(self.me, SpecialTarget::Seat(target), SpecialCode::Effect(kind));
        }
        self.request_draw();
        true
    }

    /// Throw away the oldest special
    pub fn discard_special(&mut self) -> bool {
        let discarded = self.specials.pop_front().is_some();
        if discarded {
            self.request_draw();
        }
        discarded
    }

    // ========================================================================
    // Specials and remote state
    // ========================================================================

    /// Apply a special to the local grid, then re-validate the piece and clear.
    pub fn apply_special(&mut self, kind: SpecialKind, from: Option<Seat>) {
        self.apply_effects(kind, 1, from);
    }

    /// A special arrived from `from` addressed to `target`
    pub fn receive_special(&mut self, code: SpecialCode, from: Seat, target: SpecialTarget) {
        if from == self.me || !target.includes(self.me) {
            return;
        }
        match code {
            SpecialCode::Effect(kind) => self.apply_effects(kind, 1, Some(from)),
            SpecialCode::ClassicAdd(lines) => {
                self.apply_effects(SpecialKind::AddLine, lines as u32, Some(from))
            }
        }
    }

    /// Overwrite a remote seat's settled cells; the local seat is never overwritten
    pub fn apply_field_update(&mut self, seat: Seat, field: &FieldSnapshot) -> bool {
        if seat == self.me || !is_valid_seat(seat) {
            return false;
        }
        self.grids[seat as usize - 1].restore(field);
        self.request_draw();
        true
    }

    /// Record that a remote seat topped out
    pub fn mark_lost(&mut self, seat: Seat) -> bool {
        if seat == self.me || !is_valid_seat(seat) {
            return false;
        }
        self.statuses[seat as usize - 1] = SeatStatus::Lost;
        self.request_draw();
        true
    }

    fn apply_effects(&mut self, kind: SpecialKind, times: u32, from: Option<Seat>) {
        if self.status(self.me) == SeatStatus::Lost {
            return;
        }

        let mut ctx = EffectContext {
            grids: &mut self.grids,
            target: self.me,
            from,
            rng: &mut *self.rng,
        };
        for _ in 0..times {
            self.effects.apply(kind, &mut ctx);
        }

        // the board may have moved under the live piece
        let displaced = {
            let grid = self.local_mut();
            grid.active().is_some() && !grid.try_move(0, 0)
        };
        if displaced {
            self.local_mut().freeze();
        }
        self.clear_cycle();
        if displaced {
            self.spawn_next();
        }
        self.request_draw();
    }

    // ========================================================================
    // Lock sequence
    // ========================================================================

    fn lock_and_respawn(&mut self) {
        self.local_mut().freeze();
        self.clear_cycle();
        self.spawn_next();
    }

    /// Clear/propagate, then publish the field once
    fn clear_cycle(&mut self) -> ClearReport {
        let me = self.me as usize - 1;
        let report = clear_and_propagate(
            &mut self.grids[me],
            &mut self.lines_since_special,
            &mut self.specials,
            &self.params,
            &mut *self.rng,
        );
        self.add_lines(report.total_lines);

        let field = self.grids[me].snapshot();
        self.network.send_field_update(self.me, &field);

        if self.params.classic_mode {
            if let Some(combo) = SpecialCode::combo_for_lines(report.first_pass_lines) {
                self.network.send_special(self.me, SpecialTarget::All, combo);
            }
        }
        report
    }

    fn add_lines(&mut self, lines: u32) {
        self.lines_cleared = self.lines_cleared.saturating_add(lines);
        self.lines_since_level += lines;
        while self.lines_since_level >= self.params.lines_per_level {
            self.lines_since_level -= self.params.lines_per_level;
            self.level = self
                .level
                .saturating_add(self.params.level_increment)
                .min(MAX_LEVEL);
        }
        self.tick_ms = tick_ms_for_level(self.level);
    }

    fn draw_preview(&mut self) {
        self.next_kind = self.rng.random_piece(&self.params.piece_frequencies);
        self.next_orientation = self.rng.random_orientation(self.next_kind);
    }

    fn spawn_next(&mut self) {
        let (kind, orientation) = (self.next_kind, self.next_orientation);
        self.draw_preview();
        if !self.local_mut().spawn_piece(kind, orientation) {
            self.top_out();
        }
    }

    fn top_out(&mut self) {
        let me = self.me as usize - 1;
        self.grids[me].clear_active();
        self.grids[me].fill_random(&mut *self.rng);
        self.statuses[me] = SeatStatus::Lost;
        self.stop_clock();

        let field = self.grids[me].snapshot();
        self.network.send_field_update(self.me, &field);
        self.network.send_player_lost(self.me);
    }

    // ========================================================================
    // Clock and redraw
    // ========================================================================

    fn stop_clock(&mut self) {
        if let Some(id) = self.clock.take() {
            self.event_loop.cancel(id);
        }
    }

    /// Restart the gravity phase from now
    fn reset_clock(&mut self) {
        self.stop_clock();
        if self.playing && self.status(self.me) == SeatStatus::Playing {
            self.clock = Some(self.event_loop.schedule(self.tick_ms));
        }
    }

    /// Ask the host for a frame unless one is already pending
    pub fn request_draw(&mut self) {
        if self.redraw_pending {
            return;
        }
        self.redraw_pending = true;
        self.event_loop.request_frame();
    }

    /// Render every seat, the preview and the inventory
    pub fn on_frame(&mut self, renderer: &mut dyn RenderSink) {
        for (i, grid) in self.grids.iter().enumerate() {
            let seat = i as Seat + 1;
            renderer.draw_field(seat, grid, seat == self.me);
        }
        renderer.draw_preview(self.next_kind, self.next_orientation);
        renderer.draw_specials(self.specials.as_slice());
        self.redraw_pending = false;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    fn can_act(&self) -> bool {
        self.playing && self.status(self.me) == SeatStatus::Playing
    }

    fn local_mut(&mut self) -> &mut Grid {
        &mut self.grids[self.me as usize - 1]
    }

    pub fn me(&self) -> Seat {
        self.me
    }

    pub fn params(&self) -> &GameParams {
        &self.params
    }

    pub fn grid(&self, seat: Seat) -> Option<&Grid> {
        is_valid_seat(seat).then(|| &self.grids[seat as usize - 1])
    }

    pub fn local_grid(&self) -> &Grid {
        &self.grids[self.me as usize - 1]
    }

    /// Seat status; out-of-range seats read as lost
    pub fn status(&self, seat: Seat) -> SeatStatus {
        if is_valid_seat(seat) {
            self.statuses[seat as usize - 1]
        } else {
            SeatStatus::Lost
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_lost(&self) -> bool {
        self.status(self.me) == SeatStatus::Lost
    }

    pub fn specials(&self) -> &[SpecialKind] {
        self.specials.as_slice()
    }

    pub fn next_piece(&self) -> (PieceKind, usize) {
        (self.next_kind, self.next_orientation)
    }

    /// Replace the preview piece
    pub fn set_next_piece(&mut self, kind: PieceKind, orientation: usize) {
        self.next_kind = kind;
        self.next_orientation = orientation;
        self.request_draw();
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    /// Live gravity timer, if the clock is running
    pub fn clock(&self) -> Option<TimerId> {
        self.clock
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    pub fn event_loop(&self) -> &L {
        &self.event_loop
    }

    pub fn event_loop_mut(&mut self) -> &mut L {
        &mut self.event_loop
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }
}
