//! Dashboard image endpoint.
//!
//! Provides:
//! - POST /api/getDashboard - Render a view as PNG and return it as a data URI

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;

use crate::AppState;
use crate::api::error::{ApiError, require};

/// Create the dashboard API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/getDashboard", post(get_dashboard))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRequest {
    pub tableau_url: Option<String>,
    pub token: Option<String>,
    pub site_id: Option<String>,
    pub dashboard_id: Option<String>,
}

/// POST /api/getDashboard
///
/// On success the body is the `data:image/png;base64,...` string itself, sent
/// with an `image/png` content type so the browser can drop it into an `<img>`.
async fn get_dashboard(
    State(state): State<AppState>,
    payload: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    let tableau_url = require(request.tableau_url.as_deref(), "tableauUrl")?;
    let token = require(request.token.as_deref(), "token")?;
    let site_id = require(request.site_id.as_deref(), "siteId")?;
    let dashboard_id = require(request.dashboard_id.as_deref(), "dashboardId")?;

    let data_uri = state
        .tableau
        .fetch_dashboard_image(tableau_url, token, site_id, dashboard_id)
        .await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], data_uri).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_bytes, json_body, state};
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{header as header_matcher, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn call(body: serde_json::Value) -> Response {
        let request = serde_json::from_value(body).expect("valid request");
        get_dashboard(State(state()), Ok(Json(request)))
            .await
            .into_response()
    }

    #[tokio::test]
    async fn validation_order_is_url_token_site_dashboard() {
        let cases = [
            (json!({}), "tableauUrl"),
            (json!({ "tableauUrl": "https://tableau.example.com" }), "token"),
            (
                json!({ "tableauUrl": "https://tableau.example.com", "token": "T" }),
                "siteId",
            ),
            (
                json!({ "tableauUrl": "https://tableau.example.com", "token": "T", "siteId": "S" }),
                "dashboardId",
            ),
        ];

        for (body, field) in cases {
            let response = call(body).await;
            assert_eq!(
                json_body(response).await,
                json!({ "error": format!("Error: parameter '{field}' not provided") })
            );
        }
    }

    #[tokio::test]
    async fn image_is_returned_as_png_data_uri() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/3.15/sites/S/views/D/image"))
            .and(query_param("resolution", "high"))
            .and(header_matcher("x-tableau-auth", "T"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let response = call(json!({
            "tableauUrl": server.uri(),
            "token": "T",
            "siteId": "S",
            "dashboardId": "D"
        }))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let body = String::from_utf8(body_bytes(response).await).expect("utf8 body");
        assert_eq!(body, "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn upstream_error_comes_back_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/3.15/sites/S/views/gone/image"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "summary": "Resource Not Found", "detail": "View not found" }
            })))
            .mount(&server)
            .await;

        let response = call(json!({
            "tableauUrl": server.uri(),
            "token": "T",
            "siteId": "S",
            "dashboardId": "gone"
        }))
        .await;

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Resource Not Found: View not found" })
        );
    }
}
