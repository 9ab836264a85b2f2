//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::assistant::ChatTurn;
use crate::catalog::Game;
use crate::feed::FeedEntry;

// ============================================
// ASSISTANT DTOs
// ============================================

/// `POST /api/ai` request
#[derive(Debug, Serialize, Deserialize)]
pub struct AiRequest {
    /// Whole conversation so far, oldest first
    pub messages: Vec<ChatTurn>,
}

/// `POST /api/ai` response (success and failure)
#[derive(Debug, Serialize, Deserialize)]
pub struct AiResponse {
    pub reply: String,
}

// ============================================
// ENTRY DTOs
// ============================================

/// Query string for listing entries
#[derive(Debug, Default, Deserialize)]
pub struct EntriesQuery {
    /// Maximum number of entries (default 50, max 200)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Entry list, newest first
#[derive(Debug, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<FeedEntry>,
    pub count: usize,
}

/// Create-entry request
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub content: String,
    /// Display name; blank or missing posts as "anon"
    #[serde(default)]
    pub author: Option<String>,
}

// ============================================
// CATALOGUE DTOs
// ============================================

/// A featured game
#[derive(Debug, Serialize)]
pub struct GameDto {
    pub name: String,
    pub slug: String,
    pub blurb: String,
}

impl From<Game> for GameDto {
    fn from(game: Game) -> Self {
        let blurb = game.blurb();
        Self {
            name: game.name,
            slug: game.slug,
            blurb,
        }
    }
}

/// Featured games, in display order
#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub games: Vec<GameDto>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded, unhealthy
    pub status: String,
    /// Entry table status
    pub store: String,
    /// Number of stored entries, when the table is readable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
    /// Open push-channel connections
    pub connections: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
