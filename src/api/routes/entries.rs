//! Entry Routes
//!
//! The community feed table over HTTP.
//!
//! - GET /api/v1/entries?limit=N - Newest entries first
//! - POST /api/v1/entries - Insert an entry
//!
//! Inserts reach WebSocket subscribers through the table's change feed, not
//! from here.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CreateEntryRequest, EntriesQuery, EntriesResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::feed::{FeedEntry, NewEntry, API_KEY_HEADER, DEFAULT_HISTORY_LIMIT};
use crate::identity::ANONYMOUS;

/// Upper bound on `limit`
pub const MAX_LIMIT: usize = 200;

/// Upper bound on entry content length, in characters
pub const MAX_CONTENT_CHARS: usize = 2000;

/// GET /api/v1/entries
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<EntriesQuery>,
) -> ApiResult<Json<EntriesResponse>> {
    authorize(&state, &headers)?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_LIMIT);
    let entries = state.table.recent(limit)?;

    Ok(Json(EntriesResponse {
        count: entries.len(),
        entries,
    }))
}

/// POST /api/v1/entries
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<FeedEntry>)> {
    authorize(&state, &headers)?;
    let entry = validate_create_request(req)?;

    let stored = state.table.insert(entry)?;

    tracing::info!(id = %stored.id, author = %stored.author, "Entry created");
    Ok((StatusCode::CREATED, Json(stored)))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if state.key_matches(presented) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn validate_create_request(req: CreateEntryRequest) -> ApiResult<NewEntry> {
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("content cannot be empty".to_string()));
    }

    if req.content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::Validation(format!(
            "content exceeds maximum length of {} characters",
            MAX_CONTENT_CHARS
        )));
    }

    let author = match req.author.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS.to_string(),
    };

    Ok(NewEntry::new(req.content, author))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str, author: Option<&str>) -> CreateEntryRequest {
        CreateEntryRequest {
            content: content.to_string(),
            author: author.map(str::to_string),
        }
    }

    #[test]
    fn test_blank_author_becomes_anon() {
        let entry = validate_create_request(request("gg", Some("  "))).unwrap();
        assert_eq!(entry.author, "anon");

        let entry = validate_create_request(request("gg", None)).unwrap();
        assert_eq!(entry.author, "anon");
    }

    #[test]
    fn test_content_kept_verbatim() {
        let entry = validate_create_request(request(" gg wp ", Some("ace"))).unwrap();
        assert_eq!(entry, NewEntry::new(" gg wp ", "ace"));
    }

    #[test]
    fn test_rejects_blank_and_oversized_content() {
        assert!(validate_create_request(request(" \n", None)).is_err());

        let long = "x".repeat(MAX_CONTENT_CHARS + 1);
        assert!(validate_create_request(request(&long, None)).is_err());
    }
}
