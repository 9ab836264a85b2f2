//! Feed Panel
//!
//! Reconciles one historical fetch with the live insert stream into a single
//! newest-first, duplicate-free view.
//!
//! Lifecycle: `Unsubscribed → Subscribing → Active → Closed`. Closing happens
//! on `deactivate`, on drop, or when the store stops delivering. A closed
//! panel never reconnects.

use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

use super::error::StoreResult;
use super::store::{EntryStore, Subscription};
use super::types::{FeedEntry, NewEntry};

/// Entries fetched on activation
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Feed panel settings
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub history_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Where the panel's push subscription is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribing,
    Active,
    Closed,
}

/// The visible list: newest first, at most one copy of each id
#[derive(Debug, Default)]
pub struct FeedView {
    entries: VecDeque<FeedEntry>,
    ids: HashSet<Uuid>,
}

impl FeedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a historical batch, newest first by `created_at`.
    ///
    /// Ties keep the order the store returned them in. Returns how many
    /// entries became visible.
    pub fn load_history(&mut self, mut history: Vec<FeedEntry>) -> usize {
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut added = 0;
        for entry in history {
            if self.ids.insert(entry.id) {
                self.entries.push_back(entry);
                added += 1;
            }
        }
        added
    }

    /// Put a live entry at the front. Returns false if it was already shown.
    pub fn push_live(&mut self, entry: FeedEntry) -> bool {
        if !self.ids.insert(entry.id) {
            return false;
        }
        self.entries.push_front(entry);
        true
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<FeedEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Community feed state machine over any `EntryStore`
pub struct FeedPanel<S> {
    store: S,
    author: String,
    config: FeedConfig,
    view: FeedView,
    subscription: Option<Subscription>,
    state: SubscriptionState,
}

impl<S: EntryStore> FeedPanel<S> {
    /// `author` is resolved once by the caller and used for every submit
    pub fn new(store: S, author: impl Into<String>, config: FeedConfig) -> Self {
        Self {
            store,
            author: author.into(),
            config,
            view: FeedView::new(),
            subscription: None,
            state: SubscriptionState::Unsubscribed,
        }
    }

    /// Subscribe, then load history in one batch.
    ///
    /// Returns the number of historical entries shown. A failed fetch shows
    /// nothing; a failed subscribe leaves the panel `Closed` but still loads
    /// history. Calling this on a panel that was already activated is a no-op.
    pub async fn activate(&mut self) -> usize {
        if self.state != SubscriptionState::Unsubscribed {
            tracing::debug!(state = ?self.state, "Feed panel already activated");
            return 0;
        }
        self.state = SubscriptionState::Subscribing;

        // Subscribing first buffers anything inserted while the fetch runs
        match self.store.subscribe().await {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(e) => {
                tracing::warn!(error = %e, "Feed subscription failed, live updates disabled");
            }
        }

        let history = match self.store.recent(self.config.history_limit).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(error = %e, "Historical fetch failed, showing empty feed");
                Vec::new()
            }
        };
        let shown = self.view.load_history(history);

        self.state = if self.subscription.is_some() {
            SubscriptionState::Active
        } else {
            SubscriptionState::Closed
        };

        tracing::info!(
            entries = shown,
            state = ?self.state,
            author = %self.author,
            "Feed panel activated"
        );
        shown
    }

    /// Wait for the next live entry and show it.
    ///
    /// Returns the entry once it is at the front of the view. Duplicates are
    /// skipped. Returns `None` when the panel is not active or the store
    /// stops delivering, in which case the panel closes.
    pub async fn next_live(&mut self) -> Option<FeedEntry> {
        loop {
            if self.state != SubscriptionState::Active {
                return None;
            }
            let next = self.subscription.as_mut()?.next().await;

            match next {
                Some(entry) => {
                    if self.view.push_live(entry.clone()) {
                        return Some(entry);
                    }
                    tracing::debug!(id = %entry.id, "Duplicate feed entry skipped");
                }
                None => {
                    tracing::warn!("Feed subscription stopped delivering");
                    self.deactivate();
                    return None;
                }
            }
        }
    }

    /// Close the subscription. Nothing delivered afterwards reaches the view.
    pub fn deactivate(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
        if self.state != SubscriptionState::Closed {
            tracing::debug!("Feed panel deactivated");
        }
        self.state = SubscriptionState::Closed;
    }

    /// Post a message as this panel's author.
    ///
    /// Blank text is ignored. The created entry is returned but not added
    /// to the view; it arrives through the subscription like everyone
    /// else's.
    pub async fn submit(&self, text: &str) -> StoreResult<Option<FeedEntry>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let created = self
            .store
            .insert(NewEntry::new(text, self.author.as_str()))
            .await?;
        Ok(Some(created))
    }

    pub fn view(&self) -> &FeedView {
        &self.view
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

impl<S> Drop for FeedPanel<S> {
    fn drop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{EntryTable, LocalEntryStore, StoreError};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::{Arc, Mutex};

    fn local_store() -> LocalEntryStore {
        LocalEntryStore::new(Arc::new(EntryTable::in_memory().unwrap()))
    }

    fn entry_at(content: &str, created_at: DateTime<Utc>) -> FeedEntry {
        FeedEntry {
            id: Uuid::new_v4(),
            content: content.to_string(),
            author: "anon".to_string(),
            created_at,
        }
    }

    fn contents<S: EntryStore>(panel: &FeedPanel<S>) -> Vec<String> {
        panel.view().iter().map(|e| e.content.clone()).collect()
    }

    /// Store whose calls are scripted per test
    #[derive(Default)]
    struct ScriptedStore {
        history: Vec<FeedEntry>,
        fail_fetch: bool,
        fail_subscribe: bool,
        live: Mutex<Vec<FeedEntry>>,
        inserts: Mutex<Vec<NewEntry>>,
    }

    #[async_trait]
    impl EntryStore for ScriptedStore {
        async fn recent(&self, limit: usize) -> StoreResult<Vec<FeedEntry>> {
            if self.fail_fetch {
                return Err(StoreError::NotConfigured);
            }
            Ok(self.history.iter().take(limit).cloned().collect())
        }

        async fn insert(&self, entry: NewEntry) -> StoreResult<FeedEntry> {
            self.inserts.lock().unwrap().push(entry.clone());
            Ok(FeedEntry {
                id: Uuid::new_v4(),
                content: entry.content,
                author: entry.author,
                created_at: Utc::now(),
            })
        }

        async fn subscribe(&self) -> StoreResult<Subscription> {
            if self.fail_subscribe {
                return Err(StoreError::WebSocket("refused".to_string()));
            }
            let live = std::mem::take(&mut *self.live.lock().unwrap());
            Ok(Subscription::spawn(|tx| async move {
                for entry in live {
                    if tx.send(entry).await.is_err() {
                        return;
                    }
                }
            }))
        }
    }

    #[test]
    fn test_view_history_sorted_newest_first() {
        let now = Utc::now();
        let mut view = FeedView::new();

        let shown = view.load_history(vec![
            entry_at("t-3", now - Duration::seconds(3)),
            entry_at("t-1", now - Duration::seconds(1)),
            entry_at("t-2", now - Duration::seconds(2)),
        ]);

        assert_eq!(shown, 3);
        let order: Vec<_> = view.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(order, vec!["t-1", "t-2", "t-3"]);
    }

    #[test]
    fn test_view_dedupes_by_id() {
        let mut view = FeedView::new();
        let entry = entry_at("once", Utc::now());

        assert_eq!(view.load_history(vec![entry.clone(), entry.clone()]), 1);
        assert!(!view.push_live(entry.clone()));
        assert_eq!(view.len(), 1);
        assert!(view.contains(&entry.id));
    }

    #[tokio::test]
    async fn test_history_then_live_scenario() {
        let store = local_store();
        let now = Utc::now();
        for (content, secs) in [("t-3", 3), ("t-2", 2), ("t-1", 1)] {
            store
                .table()
                .insert_at(NewEntry::new(content, "anon"), now - Duration::seconds(secs))
                .unwrap();
        }

        let mut panel = FeedPanel::new(store.clone(), "anon", FeedConfig::default());
        assert_eq!(panel.activate().await, 3);
        assert_eq!(panel.state(), SubscriptionState::Active);
        assert_eq!(contents(&panel), vec!["t-1", "t-2", "t-3"]);

        store.table().insert_at(NewEntry::new("t", "anon"), now).unwrap();
        let live = panel.next_live().await.unwrap();

        assert_eq!(live.content, "t");
        assert_eq!(contents(&panel), vec!["t", "t-1", "t-2", "t-3"]);
    }

    #[tokio::test]
    async fn test_history_capped_at_limit() {
        let store = local_store();
        for i in 0..60 {
            store.table().insert(NewEntry::new(format!("m{}", i), "anon")).unwrap();
        }

        let mut panel = FeedPanel::new(store, "anon", FeedConfig::default());

        assert_eq!(panel.activate().await, 50);
        assert_eq!(panel.view().len(), 50);
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_empty_feed() {
        let store = ScriptedStore {
            fail_fetch: true,
            ..Default::default()
        };
        let mut panel = FeedPanel::new(store, "anon", FeedConfig::default());

        assert_eq!(panel.activate().await, 0);
        assert!(panel.view().is_empty());
        assert_eq!(panel.state(), SubscriptionState::Active);
    }

    #[tokio::test]
    async fn test_failed_subscribe_still_loads_history() {
        let store = ScriptedStore {
            history: vec![entry_at("old", Utc::now())],
            fail_subscribe: true,
            ..Default::default()
        };
        let mut panel = FeedPanel::new(store, "anon", FeedConfig::default());

        assert_eq!(panel.activate().await, 1);
        assert_eq!(panel.state(), SubscriptionState::Closed);
        assert!(panel.next_live().await.is_none());
    }

    #[tokio::test]
    async fn test_replayed_live_event_shown_once() {
        let first = entry_at("hello", Utc::now());
        let store = ScriptedStore {
            live: Mutex::new(vec![first.clone(), first.clone(), entry_at("next", Utc::now())]),
            ..Default::default()
        };
        let mut panel = FeedPanel::new(store, "anon", FeedConfig::default());
        panel.activate().await;

        assert_eq!(panel.next_live().await.unwrap().id, first.id);
        assert_eq!(panel.next_live().await.unwrap().content, "next");
        assert_eq!(contents(&panel), vec!["next", "hello"]);
    }

    #[tokio::test]
    async fn test_entry_created_during_fetch_not_duplicated() {
        /// Inserts an entry while the historical fetch is in flight
        struct RacingStore(LocalEntryStore);

        #[async_trait]
        impl EntryStore for RacingStore {
            async fn recent(&self, limit: usize) -> StoreResult<Vec<FeedEntry>> {
                self.0.insert(NewEntry::new("racer", "anon")).await?;
                self.0.recent(limit).await
            }

            async fn insert(&self, entry: NewEntry) -> StoreResult<FeedEntry> {
                self.0.insert(entry).await
            }

            async fn subscribe(&self) -> StoreResult<Subscription> {
                self.0.subscribe().await
            }
        }

        let mut panel = FeedPanel::new(RacingStore(local_store()), "anon", FeedConfig::default());
        panel.activate().await;
        assert_eq!(contents(&panel), vec!["racer"]);

        // The same insert is waiting in the subscription; it must be skipped
        panel.store.0.insert(NewEntry::new("after", "anon")).await.unwrap();
        assert_eq!(panel.next_live().await.unwrap().content, "after");
        assert_eq!(contents(&panel), vec!["after", "racer"]);
    }

    #[tokio::test]
    async fn test_no_mutation_after_deactivate() {
        let store = local_store();
        let mut panel = FeedPanel::new(store.clone(), "anon", FeedConfig::default());
        panel.activate().await;

        // In flight: inserted before deactivation, never consumed
        store.insert(NewEntry::new("in flight", "anon")).await.unwrap();
        panel.deactivate();
        store.insert(NewEntry::new("late", "anon")).await.unwrap();

        assert_eq!(panel.state(), SubscriptionState::Closed);
        assert!(panel.next_live().await.is_none());
        assert!(panel.view().is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_is_idempotent() {
        let mut panel = FeedPanel::new(local_store(), "anon", FeedConfig::default());
        panel.activate().await;

        panel.deactivate();
        panel.deactivate();

        assert_eq!(panel.state(), SubscriptionState::Closed);
    }

    #[tokio::test]
    async fn test_dropped_stream_closes_panel() {
        let mut panel = FeedPanel::new(ScriptedStore::default(), "anon", FeedConfig::default());
        panel.activate().await;

        assert!(panel.next_live().await.is_none());
        assert_eq!(panel.state(), SubscriptionState::Closed);
    }

    #[tokio::test]
    async fn test_submit_issues_one_create_without_local_insert() {
        let store = Arc::new(ScriptedStore::default());
        let mut panel = FeedPanel::new(Arc::clone(&store), "anon", FeedConfig::default());
        panel.activate().await;

        let created = panel.submit("gg").await.unwrap();

        assert!(created.is_some());
        assert_eq!(
            *store.inserts.lock().unwrap(),
            vec![NewEntry::new("gg", "anon")]
        );
        assert!(panel.view().is_empty());
    }

    #[tokio::test]
    async fn test_blank_submit_is_noop() {
        let store = Arc::new(ScriptedStore::default());
        let panel = FeedPanel::new(Arc::clone(&store), "anon", FeedConfig::default());

        assert!(panel.submit("  ").await.unwrap().is_none());
        assert!(store.inserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_originated_entry_arrives_via_subscription() {
        let store = local_store();
        let mut panel = FeedPanel::new(store, "ace", FeedConfig::default());
        panel.activate().await;

        let created = panel.submit("gg").await.unwrap().unwrap();
        assert!(!panel.view().contains(&created.id));

        let live = panel.next_live().await.unwrap();
        assert_eq!(live.id, created.id);
        assert_eq!(live.author, "ace");
        assert_eq!(panel.view().len(), 1);
    }

    #[tokio::test]
    async fn test_second_activate_is_noop() {
        let mut panel = FeedPanel::new(local_store(), "anon", FeedConfig::default());
        panel.activate().await;

        assert_eq!(panel.activate().await, 0);
        assert_eq!(panel.state(), SubscriptionState::Active);
    }
}
