//! Turn-level progress events.
//!
//! `TurnEvent` is the multi-value progress stream a caller can attach to a
//! turn. Every event carries the turn's request identifier, so callers
//! watching several concurrent turns over one channel can tell the streams
//! apart — there is no shared "current text" field anywhere.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events emitted by the agent while a turn is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// The running assembled text so far — the full buffer, not a delta.
    /// Successive `Partial`s for one turn are prefix-extensions.
    Partial { turn_id: Uuid, text: String },

    /// A tool invocation finished.
    ToolResult {
        turn_id: Uuid,
        name: String,
        success: bool,
        output: String,
    },

    /// The turn completed; `reply` is the final assistant text (which is an
    /// in-band error description when the endpoint call failed).
    Done { turn_id: Uuid, reply: String },
}

impl TurnEvent {
    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Partial { .. } => "partial",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
        }
    }

    /// The turn this event belongs to.
    pub fn turn_id(&self) -> Uuid {
        match self {
            Self::Partial { turn_id, .. }
            | Self::ToolResult { turn_id, .. }
            | Self::Done { turn_id, .. } => *turn_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_partial() {
        let id = Uuid::new_v4();
        let event = TurnEvent::Partial {
            turn_id: id,
            text: "Hello".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"partial""#));
        assert!(json.contains(r#""text":"Hello""#));
        assert!(json.contains(&id.to_string()));
    }

    #[test]
    fn event_type_names() {
        let id = Uuid::new_v4();
        assert_eq!(
            TurnEvent::Partial {
                turn_id: id,
                text: "x".into()
            }
            .event_type(),
            "partial"
        );
        assert_eq!(
            TurnEvent::ToolResult {
                turn_id: id,
                name: "file_operations".into(),
                success: true,
                output: "ok".into()
            }
            .event_type(),
            "tool_result"
        );
        assert_eq!(
            TurnEvent::Done {
                turn_id: id,
                reply: "done".into()
            }
            .event_type(),
            "done"
        );
    }

    #[test]
    fn turn_id_accessor() {
        let id = Uuid::new_v4();
        let event = TurnEvent::Done {
            turn_id: id,
            reply: "x".into(),
        };
        assert_eq!(event.turn_id(), id);
    }

    #[test]
    fn event_deserialization() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"type":"done","turn_id":"{id}","reply":"hi"}}"#);
        let event: TurnEvent = serde_json::from_str(&json).unwrap();
        match event {
            TurnEvent::Done { turn_id, reply } => {
                assert_eq!(turn_id, id);
                assert_eq!(reply, "hi");
            }
            _ => panic!("Wrong variant"),
        }
    }
}
