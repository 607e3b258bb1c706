//! Headless soak runner (default binary).
//!
//! Plays one seat on the tokio host with random input until it tops out or
//! drops `TETRINET_MAX_PIECES` pieces, then prints a JSON summary on stdout.
//! Outbound peer messages are counted, and logged when `TETRINET_VERBOSE` is set.

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use tetrinet::adapter::{
    build_session, run_session, HeadlessRenderer, HostConfig, HostEvent, PeerMessage,
};
use tetrinet::core::{Randomness, SimpleRng};
use tetrinet::types::{GameAction, Seat};

/// Most moves tried before each hard drop
const MAX_MOVES_PER_PIECE: u32 = 6;

fn main() -> Result<()> {
    let config = HostConfig::from_env();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(soak(config))
}

async fn soak(config: HostConfig) -> Result<()> {
    eprintln!(
        "[Soak] Seat {}, seed {}, up to {} pieces",
        config.seat, config.seed, config.max_pieces
    );

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();

    let mut session = build_session(&config, events_tx.clone(), out_tx)?;
    session.new_game();
    session.start();

    let input = tokio::spawn(random_input(
        events_tx,
        config.seat,
        config.seed,
        config.max_pieces,
    ));

    let mut renderer = HeadlessRenderer::default();
    let summary = run_session(&mut session, &mut events_rx, &mut renderer).await;
    input.abort();

    let mut field_updates = 0u64;
    let mut specials = 0u64;
    while let Ok(msg) = out_rx.try_recv() {
        match msg {
            PeerMessage::FieldUpdate { .. } => field_updates += 1,
            PeerMessage::Special { .. } => specials += 1,
            PeerMessage::PlayerLost { .. } => {}
        }
    }

    let report = serde_json::json!({
        "seat": config.seat,
        "seed": config.seed,
        "lost": summary.lost,
        "lines_cleared": summary.lines_cleared,
        "level": summary.level,
        "actions": summary.actions,
        "ticks": summary.ticks,
        "frames": summary.frames,
        "stack_height": renderer.stack_height,
        "field_updates": field_updates,
        "specials_sent": specials,
        "inventory": session.specials().len(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to encode summary")?
    );
    Ok(())
}

/// Random moves, then a hard drop, once per piece; `Quit` after the last piece
async fn random_input(
    events: mpsc::UnboundedSender<HostEvent>,
    seat: Seat,
    seed: u32,
    max_pieces: u32,
) {
    let mut rng = SimpleRng::new(seed.wrapping_mul(31).wrapping_add(7));

    for _ in 0..max_pieces {
        for _ in 0..rng.rand_int(MAX_MOVES_PER_PIECE + 1) {
            let action = match rng.rand_int(10) {
                0..=2 => GameAction::MoveLeft,
                3..=5 => GameAction::MoveRight,
                6..=7 => GameAction::Rotate,
                8 => GameAction::SoftDrop,
                _ if rng.rand_int(2) == 0 => GameAction::UseSpecial(seat),
                _ => GameAction::DiscardSpecial,
            };
            if events.send(HostEvent::Action(action)).is_err() {
                return;
            }
            tokio::task::yield_now().await;
        }

        if events.send(HostEvent::Action(GameAction::HardDrop)).is_err() {
            return;
        }
        tokio::task::yield_now().await;
    }

    let _ = events.send(HostEvent::Quit);
}
