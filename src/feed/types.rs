//! Feed data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored community message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Assigned by the store
    pub id: Uuid,
    pub content: String,
    pub author: String,
    /// Assigned by the store
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an entry; the store fills in id and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub content: String,
    pub author: String,
}

impl NewEntry {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
        }
    }
}
