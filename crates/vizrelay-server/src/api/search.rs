//! Dashboard search endpoint.
//!
//! Provides:
//! - POST /api/search - Search views and return dashboards only

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Deserialize;

use vizrelay_core::SearchHit;

use crate::AppState;
use crate::api::error::{ApiError, require};

/// Create the search API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/search", post(search))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub tableau_url: Option<String>,
    pub token: Option<String>,
    pub search_term: Option<String>,
}

/// POST /api/search
async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let Json(request) = payload?;

    let tableau_url = require(request.tableau_url.as_deref(), "tableauUrl")?;
    let token = require(request.token.as_deref(), "token")?;
    let search_term = require(request.search_term.as_deref(), "searchTerm")?;

    let hits = state.tableau.search(tableau_url, token, search_term).await?;
    Ok(Json(hits))
}
