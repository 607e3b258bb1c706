//! Session driver.
//!
//! Drains [`HostEvent`]s one at a time and feeds them to the session until the
//! local seat tops out, a `Quit` arrives, or every sender is gone.

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use tetrinet_core::{EventLoop, Grid, NetworkSink, RenderSink, Session, SimpleRng};
use tetrinet_types::{PieceKind, Seat, SpecialKind};

use crate::config::HostConfig;
use crate::network::ChannelNetwork;
use crate::protocol::PeerMessage;
use crate::runtime::{HostEvent, TokioLoop};

/// Counters reported when a driver run ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub events: u64,
    pub actions: u64,
    pub ticks: u64,
    pub frames: u64,
    pub lines_cleared: u32,
    pub level: u32,
    pub lost: bool,
}

/// Renderer for headless hosts: tracks frames and the local stack height
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRenderer {
    pub frames: u64,
    pub stack_height: u8,
}

impl RenderSink for HeadlessRenderer {
    fn draw_field(&mut self, _seat: Seat, grid: &Grid, is_local: bool) {
        if !is_local {
            return;
        }
        let top = (0..grid.height() as usize)
            .find(|&y| grid.row(y).iter().any(|c| c.is_some()))
            .unwrap_or(grid.height() as usize);
        self.stack_height = grid.height() - top as u8;
    }

    fn draw_preview(&mut self, _kind: PieceKind, _orientation: usize) {
        self.frames += 1;
    }

    fn draw_specials(&mut self, _specials: &[SpecialKind]) {}
}

/// Build a tokio-hosted session from host settings
pub fn build_session(
    config: &HostConfig,
    events: mpsc::UnboundedSender<HostEvent>,
    out: mpsc::UnboundedSender<PeerMessage>,
) -> Result<Session<TokioLoop, ChannelNetwork>> {
    let params = config.game_params()?;
    Session::new(
        config.seat,
        params,
        SimpleRng::new(config.seed),
        TokioLoop::new(events),
        ChannelNetwork::new(out).verbose(config.verbose),
    )
    .with_context(|| format!("cannot seat player {}", config.seat))
}

/// Run the event loop for one session
pub async fn run_session<L: EventLoop, N: NetworkSink>(
    session: &mut Session<L, N>,
    events: &mut mpsc::UnboundedReceiver<HostEvent>,
    renderer: &mut dyn RenderSink,
) -> SessionSummary {
    let me = session.me();
    let mut summary = SessionSummary::default();
    eprintln!("[Host] Seat {} session started", me);

    while let Some(event) = events.recv().await {
        summary.events += 1;
        match event {
            HostEvent::Gravity(id) => {
                if session.on_timer(id) {
                    summary.ticks += 1;
                }
            }
            HostEvent::Frame => {
                session.on_frame(renderer);
                summary.frames += 1;
            }
            HostEvent::Action(action) => {
                session.handle_action(action);
                summary.actions += 1;
            }
            HostEvent::Peer(msg) => apply_peer_message(session, &msg),
            HostEvent::Quit => {
                eprintln!("[Host] Seat {} quit requested", me);
                break;
            }
        }

        if session.is_lost() {
            eprintln!("[Host] Seat {} topped out", me);
            break;
        }
    }

    session.pause();
    summary.lines_cleared = session.lines_cleared();
    summary.level = session.level();
    summary.lost = session.is_lost();
    eprintln!(
        "[Host] Seat {} session ended: {} lines, level {}, {} events",
        me, summary.lines_cleared, summary.level, summary.events
    );
    summary
}

fn apply_peer_message<L: EventLoop, N: NetworkSink>(session: &mut Session<L, N>, msg: &PeerMessage) {
    match msg {
        PeerMessage::FieldUpdate { seat, field } => {
            if !session.apply_field_update(*seat, field) {
                eprintln!("[Host] Ignored field update for seat {}", seat);
            }
        }
        PeerMessage::Special { code, .. } => match msg.special_parts() {
            Some((from, target, code)) => session.receive_special(code, from, target),
            None => eprintln!("[Host] Ignored unknown special {:?}", code),
        },
        PeerMessage::PlayerLost { seat } => {
            if session.mark_lost(*seat) {
                eprintln!("[Host] Seat {} lost", seat);
            }
        }
    }
}
