//! Tokio event loop for a session.
//!
//! Timers and frame requests become [`HostEvent`]s on one unbounded channel;
//! the driver drains that channel on a single task, so every session call runs
//! to completion before the next event is looked at.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tetrinet_core::{EventLoop, TimerId};
use tetrinet_types::{GameAction, FRAME_MS};

use crate::protocol::PeerMessage;

/// Everything the driver reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A scheduled gravity tick fired
    Gravity(TimerId),
    /// A requested frame is due
    Frame,
    /// Local player input
    Action(GameAction),
    /// A message from another seat
    Peer(PeerMessage),
    Quit,
}

/// [`EventLoop`] backed by tokio sleep tasks
pub struct TokioLoop {
    events: mpsc::UnboundedSender<HostEvent>,
    next_id: u64,
    timers: HashMap<TimerId, JoinHandle<()>>,
    frame_ms: u64,
}

impl TokioLoop {
    pub fn new(events: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self {
            events,
            next_id: 0,
            timers: HashMap::new(),
            frame_ms: FRAME_MS as u64,
        }
    }

    /// Timers still waiting to fire
    pub fn live_timers(&self) -> usize {
        self.timers.values().filter(|h| !h.is_finished()).count()
    }
}

impl EventLoop for TokioLoop {
    fn schedule(&mut self, delay_ms: u32) -> TimerId {
        self.timers.retain(|_, handle| !handle.is_finished());

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
            let _ = events.send(HostEvent::Gravity(id));
        });
        self.timers.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.abort();
        }
    }

    fn request_frame(&mut self) {
        let events = self.events.clone();
        let delay = Duration::from_millis(self.frame_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(HostEvent::Frame);
        });
    }
}

impl Drop for TokioLoop {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}
