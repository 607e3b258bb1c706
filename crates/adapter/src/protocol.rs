//! Peer messages exchanged between seats
//!
//! One JSON object per message, tagged by `type`:
//!
//! ```text
//! {"type":"fieldUpdate","seat":2,"field":"000...0"}
//! {"type":"special","from":2,"target":0,"code":"cs4"}
//! {"type":"playerLost","seat":2}
//! ```
//!
//! `target` 0 addresses every seat but the sender.

use serde::{Deserialize, Serialize};

use tetrinet_core::FieldSnapshot;
use tetrinet_types::{Seat, SpecialCode, SpecialTarget};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PeerMessage {
    FieldUpdate { seat: Seat, field: FieldSnapshot },
    Special { from: Seat, target: u8, code: String },
    PlayerLost { seat: Seat },
}

impl PeerMessage {
    pub fn special(from: Seat, target: SpecialTarget, code: SpecialCode) -> Self {
        PeerMessage::Special {
            from,
            target: target.number(),
            code: code.as_code(),
        }
    }

    /// Decode the target and code of a `special` message
    pub fn special_parts(&self) -> Option<(Seat, SpecialTarget, SpecialCode)> {
        match self {
            PeerMessage::Special { from, target, code } => Some((
                *from,
                SpecialTarget::from_number(*target),
                SpecialCode::parse(code)?,
            )),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetrinet_types::SpecialKind;

    #[test]
    fn special_message_uses_tetrinet_codes() {
        let msg = PeerMessage::special(3, SpecialTarget::All, SpecialCode::ClassicAdd(2));
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"special\""));
        assert!(json.contains("\"code\":\"cs2\""));
        assert!(json.contains("\"target\":0"));

        let parsed = PeerMessage::from_json(&json).unwrap();
        assert_eq!(
            parsed.special_parts(),
            Some((3, SpecialTarget::All, SpecialCode::ClassicAdd(2)))
        );
    }

    #[test]
    fn field_update_carries_field_string() {
        let msg = PeerMessage::FieldUpdate {
            seat: 1,
            field: FieldSnapshot::empty(),
        };
        let json = msg.to_json().unwrap();
        assert!(json.starts_with("{\"type\":\"fieldUpdate\""));
        assert!(json.contains(&"0".repeat(264)));
    }

    #[test]
    fn rejects_malformed_messages() {
        assert!(PeerMessage::from_json(r#"{"type":"fieldUpdate","seat":1,"field":"01"}"#).is_err());
        assert!(PeerMessage::from_json(r#"{"type":"teleport"}"#).is_err());

        let unknown_code = PeerMessage::Special {
            from: 1,
            target: 2,
            code: "zz".to_string(),
        };
        assert_eq!(unknown_code.special_parts(), None);

        let known = PeerMessage::Special {
            from: 1,
            target: 2,
            code: "o".to_string(),
        };
        assert_eq!(
            known.special_parts(),
            Some((
                1,
                SpecialTarget::Seat(2),
                SpecialCode::Effect(SpecialKind::BlockBomb)
            ))
        );
    }
}
