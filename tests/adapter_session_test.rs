//! Tokio host end to end: JSON peer lines in, JSON peer lines out

use tokio::sync::mpsc;

use tetrinet::adapter::{
    build_session, run_session, HeadlessRenderer, HostConfig, HostEvent, PeerMessage,
};
use tetrinet::core::FieldSnapshot;
use tetrinet::types::{GameAction, SeatStatus};

#[tokio::test]
async fn test_peer_lines_drive_the_local_seat() {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let config = HostConfig {
        seat: 2,
        seed: 11,
        ..HostConfig::default()
    };

    let mut session = build_session(&config, events_tx.clone(), out_tx).unwrap();
    session.new_game();
    session.start();

    let inbound = [
        r#"{"type":"special","from":1,"target":2,"code":"a"}"#,
        r#"{"type":"special","from":5,"target":0,"code":"cs2"}"#,
        r#"{"type":"playerLost","seat":6}"#,
    ];
    for line in inbound {
        let msg = PeerMessage::from_json(line).unwrap();
        events_tx.send(HostEvent::Peer(msg)).unwrap();
    }
    events_tx.send(HostEvent::Action(GameAction::MoveLeft)).unwrap();
    events_tx.send(HostEvent::Quit).unwrap();

    let mut renderer = HeadlessRenderer::default();
    let summary = run_session(&mut session, &mut events_rx, &mut renderer).await;

    assert_eq!(summary.events, 5);
    assert!(!summary.lost);
    assert_eq!(session.status(6), SeatStatus::Lost);

    // one garbage row from "a", two from "cs2"
    let grid = session.local_grid();
    for y in 19..22 {
        assert!(grid.row(y).iter().any(|c| c.is_some()), "row {y} is empty");
    }
    assert!(grid.row(18).iter().all(|c| c.is_none()));

    // each special published the field once; the last one matches the board
    let mut last_field = None;
    while let Ok(msg) = out_rx.try_recv() {
        let line = msg.to_json().unwrap();
        if let PeerMessage::FieldUpdate { seat, field } = PeerMessage::from_json(&line).unwrap() {
            assert_eq!(seat, 2);
            last_field = Some(field);
        }
    }
    let expected: FieldSnapshot = grid.snapshot();
    assert_eq!(last_field, Some(expected));
}

#[tokio::test]
async fn test_bad_rules_string_fails_to_build() {
    let (events_tx, _events_rx) = mpsc::unbounded_channel();
    let (out_tx, _out_rx) = mpsc::unbounded_channel();
    let config = HostConfig {
        rules: Some("not a rules string".to_string()),
        ..HostConfig::default()
    };

    let err = build_session(&config, events_tx, out_tx).err().unwrap();
    assert!(format!("{err:#}").contains("TETRINET_RULES"));
}
