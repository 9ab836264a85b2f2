//! WebSocket Push Channel
//!
//! Delivers "entry created" notifications to feed subscribers.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Manages all active connections and subscriptions
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! ## Usage
//!
//! Clients connect to `/ws` and subscribe to topics:
//! - `entries` - Every entry inserted into the feed table
//! - `system` - Server notices, such as the shutdown notice
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8083/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'subscribe', topics: ['entries']}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'entry_created') console.log(msg.entry);
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{spawn_change_bridge, ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage, WsEvent, ENTRIES_TOPIC, SYSTEM_TOPIC};
