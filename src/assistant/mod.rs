//! AI Assistant
//!
//! Conversational assistant backed by a hosted chat-completion API.
//!
//! ## Architecture
//!
//! - **Types**: `ChatTurn` and `Role`, the in-memory transcript
//! - **Backends**: `ChatBackend` trait with two implementations
//!   - `OpenAiClient` talks to the hosted chat-completion endpoint (server side)
//!   - `ProxyBackend` talks to a GameVerse server's `/api/ai` route (client side)
//! - **Panel**: `AssistantPanel`, the transcript + busy state machine
//!
//! ## Data Flow
//!
//! 1. Panel appends the user turn and marks itself busy
//! 2. The whole transcript goes to the backend in one call
//! 3. The reply (or a fixed fallback) is appended as the assistant turn
//! 4. Busy is cleared by a drop guard, whatever happened in between

mod backend;
mod error;
mod panel;
mod types;

pub use backend::{ChatBackend, OpenAiClient, OpenAiConfig, ProxyBackend};
pub use error::AssistantError;
pub use panel::{AssistantPanel, FALLBACK_REPLY};
pub use types::{ChatTurn, Role};
