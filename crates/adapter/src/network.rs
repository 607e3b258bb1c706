//! Outbound network sink.
//!
//! Session notifications become [`PeerMessage`]s on an mpsc channel; whatever
//! owns the receiving end (a socket writer, a test) decides how to deliver them.

use tokio::sync::mpsc;

use tetrinet_core::{FieldSnapshot, NetworkSink};
use tetrinet_types::{Seat, SpecialCode, SpecialTarget};

use crate::protocol::PeerMessage;

pub struct ChannelNetwork {
    out: mpsc::UnboundedSender<PeerMessage>,
    verbose: bool,
    sent: u64,
}

impl ChannelNetwork {
    pub fn new(out: mpsc::UnboundedSender<PeerMessage>) -> Self {
        Self {
            out,
            verbose: false,
            sent: 0,
        }
    }

    /// Log every outbound message as JSON on stderr
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Messages handed to the channel so far
    pub fn sent(&self) -> u64 {
        self.sent
    }

    fn send(&mut self, msg: PeerMessage) {
        if self.verbose {
            match msg.to_json() {
                Ok(line) => eprintln!("[Host] -> {}", line),
                Err(e) => eprintln!("[Host] failed to encode {:?}: {}", msg, e),
            }
        }
        if self.out.send(msg).is_ok() {
            self.sent += 1;
        }
    }
}

impl NetworkSink for ChannelNetwork {
    fn send_field_update(&mut self, seat: Seat, field: &FieldSnapshot) {
        self.send(PeerMessage::FieldUpdate {
            seat,
            field: *field,
        });
    }

    fn send_special(&mut self, from: Seat, target: SpecialTarget, code: SpecialCode) {
        self.send(PeerMessage::special(from, target, code));
    }

    fn send_player_lost(&mut self, seat: Seat) {
        self.send(PeerMessage::PlayerLost { seat });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetrinet_types::SpecialKind;

    #[test]
    fn forwards_messages_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut net = ChannelNetwork::new(tx);

        net.send_field_update(2, &FieldSnapshot::empty());
        net.send_special(
            2,
            SpecialTarget::Seat(5),
            SpecialCode::Effect(SpecialKind::SwitchField),
        );
        net.send_player_lost(2);
        assert_eq!(net.sent(), 3);

        assert!(matches!(
            rx.try_recv(),
            Ok(PeerMessage::FieldUpdate { seat: 2, .. })
        ));
        assert_eq!(
            rx.try_recv().ok(),
            Some(PeerMessage::Special {
                from: 2,
                target: 5,
                code: "s".to_string()
            })
        );
        assert_eq!(rx.try_recv().ok(), Some(PeerMessage::PlayerLost { seat: 2 }));
    }

    #[test]
    fn closed_channel_is_not_counted() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut net = ChannelNetwork::new(tx);
        net.send_player_lost(1);
        assert_eq!(net.sent(), 0);
    }
}
