//! Host seams - the interfaces a session drives but does not implement
//!
//! A host supplies an [`EventLoop`] (gravity timers and frame requests) and a
//! [`NetworkSink`] (outbound field updates and specials) at construction, and
//! hands a [`RenderSink`] to [`Session::on_frame`](crate::Session::on_frame).
//! The session never touches a socket, clock or canvas directly.
//!
//! [`ManualLoop`] and [`RecordingNetwork`] are in-memory implementations for
//! tests and headless runs.

use crate::grid::Grid;
use crate::snapshot::FieldSnapshot;
use crate::types::{PieceKind, Seat, SpecialCode, SpecialKind, SpecialTarget};

/// Handle of a scheduled gravity tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Timer and frame scheduling owned by the host
pub trait EventLoop {
    /// Schedule a single gravity tick after `delay_ms`; the host later calls
    /// [`Session::on_timer`](crate::Session::on_timer) with the returned id
    fn schedule(&mut self, delay_ms: u32) -> TimerId;

    /// Cancel a scheduled tick; unknown or already-fired ids are ignored
    fn cancel(&mut self, id: TimerId);

    /// Ask for one [`Session::on_frame`](crate::Session::on_frame) call
    fn request_frame(&mut self);
}

/// Outbound notifications to the other seats
pub trait NetworkSink {
    /// Authoritative settled cells after a freeze/clear cycle
    fn send_field_update(&mut self, seat: Seat, field: &FieldSnapshot);

    fn send_special(&mut self, from: Seat, target: SpecialTarget, code: SpecialCode);

    /// The local seat topped out
    fn send_player_lost(&mut self, _seat: Seat) {}
}

/// Drawing surface; reads model state, never mutates it
pub trait RenderSink {
    fn draw_field(&mut self, seat: Seat, grid: &Grid, is_local: bool);
    fn draw_preview(&mut self, kind: PieceKind, orientation: usize);
    fn draw_specials(&mut self, specials: &[SpecialKind]);
}

/// Event loop that only records what was asked of it
#[derive(Debug, Clone, Default)]
pub struct ManualLoop {
    next_id: u64,
    /// Live timers as `(id, delay_ms)`, oldest first
    pub scheduled: Vec<(TimerId, u32)>,
    pub cancelled: Vec<TimerId>,
    pub frame_requests: u32,
}

impl ManualLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently scheduled timer that is still live
    pub fn pending(&self) -> Option<(TimerId, u32)> {
        self.scheduled.last().copied()
    }
}

impl EventLoop for ManualLoop {
    fn schedule(&mut self, delay_ms: u32) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.scheduled.push((id, delay_ms));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.scheduled.retain(|&(t, _)| t != id);
        self.cancelled.push(id);
    }

    fn request_frame(&mut self) {
        self.frame_requests += 1;
    }
}

/// Something a [`RecordingNetwork`] was asked to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    FieldUpdate { seat: Seat, field: FieldSnapshot },
    Special {
        from: Seat,
        target: SpecialTarget,
        code: SpecialCode,
    },
    PlayerLost { seat: Seat },
}

/// Network sink that keeps every message in order
#[derive(Debug, Clone, Default)]
pub struct RecordingNetwork {
    pub sent: Vec<SentMessage>,
}

impl RecordingNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_updates(&self) -> usize {
        self.sent
            .iter()
            .filter(|m| matches!(m, SentMessage::FieldUpdate { .. }))
            .count()
    }

    pub fn specials(&self) -> Vec<(SpecialTarget, SpecialCode)> {
        self.sent
            .iter()
            .filter_map(|m| match m {
                SentMessage::Special { target, code, .. } => Some((*target, *code)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl NetworkSink for RecordingNetwork {
    fn send_field_update(&mut self, seat: Seat, field: &FieldSnapshot) {
        self.sent.push(SentMessage::FieldUpdate {
            seat,
            field: *field,
        });
    }

    fn send_special(&mut self, from: Seat, target: SpecialTarget, code: SpecialCode) {
        self.sent.push(SentMessage::Special { from, target, code });
    }

    fn send_player_lost(&mut self, seat: Seat) {
        self.sent.push(SentMessage::PlayerLost { seat });
    }
}

/// Network sink for solo play
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNetwork;

impl NetworkSink for NullNetwork {
    fn send_field_update(&mut self, _seat: Seat, _field: &FieldSnapshot) {}
    fn send_special(&mut self, _from: Seat, _target: SpecialTarget, _code: SpecialCode) {}
}
