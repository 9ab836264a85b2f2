//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between feed
//! clients and the GameVerse server. Both sides use the same types, so they
//! serialize and deserialize.

use serde::{Deserialize, Serialize};

use crate::feed::FeedEntry;

/// Topic carrying every inserted feed entry
pub const ENTRIES_TOPIC: &str = "entries";

/// Topic carrying server notices
pub const SYSTEM_TOPIC: &str = "system";

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for real-time updates
    Subscribe {
        /// List of topics to subscribe to (e.g., "entries")
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe {
        /// List of topics to unsubscribe from
        topics: Vec<String>,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A new entry was inserted into the feed table
    EntryCreated { entry: FeedEntry },
    /// Subscription confirmed
    Subscribed {
        /// Topics successfully subscribed to
        topics: Vec<String>,
    },
    /// Unsubscription confirmed
    Unsubscribed {
        /// Topics successfully unsubscribed from
        topics: Vec<String>,
    },
    /// Server notice
    Notice { message: String },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    /// An entry was inserted
    pub fn entry_created(entry: FeedEntry) -> Self {
        Self {
            topic: ENTRIES_TOPIC.to_string(),
            message: ServerMessage::EntryCreated { entry },
        }
    }

    /// A server notice
    pub fn system(message: &str) -> Self {
        Self {
            topic: SYSTEM_TOPIC.to_string(),
            message: ServerMessage::Notice {
                message: message.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_entry() -> FeedEntry {
        FeedEntry {
            id: Uuid::new_v4(),
            content: "gg".to_string(),
            author: "anon".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_client_message_deserialize_subscribe() {
        let json = r#"{"type": "subscribe", "topics": ["entries"]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Subscribe { topics } => {
                assert_eq!(topics, vec!["entries"]);
            }
            _ => panic!("Expected Subscribe"),
        }
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_server_message_serialize_entry_created() {
        let msg = ServerMessage::EntryCreated {
            entry: sample_entry(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"entry_created\""));
        assert!(json.contains("\"content\":\"gg\""));
    }

    #[test]
    fn test_server_message_parse_connected() {
        let json = r#"{"type": "connected", "connection_id": "abc-123"}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ServerMessage::Connected { connection_id } if connection_id == "abc-123"));
    }

    #[test]
    fn test_ws_event_entry_created() {
        let entry = sample_entry();
        let event = WsEvent::entry_created(entry.clone());
        assert_eq!(event.topic, "entries");
        match event.message {
            ServerMessage::EntryCreated { entry: e } => assert_eq!(e, entry),
            _ => panic!("Expected EntryCreated"),
        }
    }
}
