//! Catalogue Route
//!
//! - GET /api/v1/games - Featured games with anchor slugs

use axum::Json;

use crate::api::dto::{GameDto, GamesResponse};
use crate::catalog;

/// GET /api/v1/games
pub async fn list_games() -> Json<GamesResponse> {
    Json(GamesResponse {
        games: catalog::games().into_iter().map(GameDto::from).collect(),
    })
}
