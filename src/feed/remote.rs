//! Remote Entry Store
//!
//! `EntryStore` backed by a GameVerse server: REST for reads and writes,
//! the `/ws` push channel for insert notifications.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, RequestBuilder};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::error::{StoreError, StoreResult};
use super::store::{EntryStore, Subscription};
use super::types::{FeedEntry, NewEntry};
use crate::api::dto::EntriesResponse;
use crate::websocket::{ClientMessage, ServerMessage, ENTRIES_TOPIC, SYSTEM_TOPIC};

/// Header (and `/ws` query parameter) carrying the public key
pub const API_KEY_HEADER: &str = "apikey";

/// Where the remote store lives
#[derive(Debug, Clone, Default)]
pub struct RemoteStoreConfig {
    /// Base URL of the server (e.g. "http://localhost:8083")
    pub endpoint: Option<String>,
    /// Shared public key, if the server requires one
    pub public_key: Option<String>,
}

/// Client for a GameVerse server's entry routes
pub struct RemoteEntryStore {
    client: Client,
    config: RemoteStoreConfig,
}

impl RemoteEntryStore {
    pub fn new(config: RemoteStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> StoreResult<&str> {
        self.config
            .endpoint
            .as_deref()
            .map(|e| e.trim_end_matches('/'))
            .filter(|e| !e.is_empty())
            .ok_or(StoreError::NotConfigured)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.public_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// `/ws` URL derived from the HTTP endpoint
    fn socket_url(&self) -> StoreResult<String> {
        let endpoint = self.endpoint()?;
        let base = if let Some(rest) = endpoint.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = endpoint.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            endpoint.to_string()
        };

        let socket = format!("{}/ws", base);
        let url = match &self.config.public_key {
            Some(key) => reqwest::Url::parse_with_params(&socket, &[(API_KEY_HEADER, key.as_str())]),
            None => reqwest::Url::parse(&socket),
        }
        .map_err(|e| StoreError::WebSocket(format!("invalid endpoint {}: {}", endpoint, e)))?;

        Ok(url.to_string())
    }

    async fn check(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(StoreError::ApiError {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl EntryStore for RemoteEntryStore {
    async fn recent(&self, limit: usize) -> StoreResult<Vec<FeedEntry>> {
        let url = format!("{}/api/v1/entries", self.endpoint()?);

        let response = self
            .with_key(self.client.get(&url).query(&[("limit", limit)]))
            .send()
            .await?;
        let body: EntriesResponse = Self::check(response).await?.json().await?;

        Ok(body.entries)
    }

    async fn insert(&self, entry: NewEntry) -> StoreResult<FeedEntry> {
        let url = format!("{}/api/v1/entries", self.endpoint()?);

        let response = self
            .with_key(self.client.post(&url).json(&entry))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn subscribe(&self) -> StoreResult<Subscription> {
        let url = self.socket_url()?;
        let (socket, _) = connect_async(url.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        let request = serde_json::to_string(&ClientMessage::Subscribe {
            topics: vec![ENTRIES_TOPIC.to_string(), SYSTEM_TOPIC.to_string()],
        })
        .map_err(|e| StoreError::WebSocket(e.to_string()))?;
        sink.send(Message::Text(request)).await?;

        // Wait for the acknowledgement so the subscription is live on return
        loop {
            let frame = stream
                .next()
                .await
                .ok_or_else(|| StoreError::WebSocket("closed before subscribing".to_string()))??;

            let Message::Text(text) = frame else {
                continue;
            };

            match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::Subscribed { topics }) if topics.iter().any(|t| t == ENTRIES_TOPIC) => {
                    break;
                }
                Ok(ServerMessage::Subscribed { .. }) => {
                    return Err(StoreError::SubscriptionRejected(
                        "entries topic not accepted".to_string(),
                    ));
                }
                Ok(ServerMessage::Error { message }) => {
                    return Err(StoreError::SubscriptionRejected(message));
                }
                _ => continue,
            }
        }

        tracing::info!(endpoint = %self.endpoint()?, "Remote feed subscription active");

        Ok(Subscription::spawn(|tx| async move {
            // Keep the write half alive so the server sees an open socket
            let _sink = sink;

            while let Some(frame) = stream.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "Remote feed subscription dropped");
                        break;
                    }
                };

                match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(ServerMessage::EntryCreated { entry }) => {
                        if tx.send(entry).await.is_err() {
                            break;
                        }
                    }
                    Ok(ServerMessage::Notice { message }) => {
                        tracing::info!(notice = %message, "Server notice");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(error = %e, "Ignoring unrecognised push message");
                    }
                }
            }
        }))
    }
}
