//! Community Feed
//!
//! Realtime community chat: a historical page of entries merged with a
//! live stream of inserts.
//!
//! ## Architecture
//!
//! - **Types**: `FeedEntry` (store-assigned id and timestamp) and `NewEntry`
//! - **Store**: `EntryStore` trait plus the cancellable `Subscription` handle
//! - **Table**: `EntryTable`, the SQLite-backed table with an insert change feed
//! - **Remote**: `RemoteEntryStore`, HTTP + WebSocket client for a GameVerse server
//! - **Panel**: `FeedPanel` and `FeedView`, the reconciliation state machine
//!
//! ## Reconciliation
//!
//! ```text
//! activate:  subscribe ──► fetch newest 50 ──► load_history (one batch)
//! live:      Subscription::next ──► FeedView::push_live (front, deduped by id)
//! deactivate: Subscription::close (buffered events discarded)
//! ```
//!
//! Subscribing before the fetch means an entry created while the fetch is
//! in flight shows up on both paths; id dedup keeps exactly one copy.

mod error;
mod panel;
mod remote;
mod store;
mod table;
mod types;

pub use error::{StoreError, StoreResult};
pub use panel::{FeedConfig, FeedPanel, FeedView, SubscriptionState, DEFAULT_HISTORY_LIMIT};
pub use remote::{RemoteEntryStore, RemoteStoreConfig, API_KEY_HEADER};
pub use store::{EntryStore, Subscription, SUBSCRIPTION_BUFFER};
pub use table::{EntryTable, LocalEntryStore};
pub use types::{FeedEntry, NewEntry};
