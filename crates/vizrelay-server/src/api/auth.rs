//! Sign-in endpoint.
//!
//! Provides:
//! - POST /api/auth - Exchange a personal access token for `{token, siteId}`

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Deserialize;

use vizrelay_core::Session;

use crate::AppState;
use crate::api::error::{ApiError, require};

/// Create the auth API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth", post(sign_in))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub tableau_url: Option<String>,
    pub site_name: Option<String>,
    pub pat: Option<PatInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatInput {
    pub name: Option<String>,
    pub secret: Option<String>,
}

/// POST /api/auth
///
/// An omitted or empty `siteName` signs in to the default site.
async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let Json(request) = payload?;

    let tableau_url = require(request.tableau_url.as_deref(), "tableauUrl")?;
    let pat = request.pat.unwrap_or_default();
    let pat_name = require(pat.name.as_deref(), "pat.name")?;
    let pat_secret = require(pat.secret.as_deref(), "pat.secret")?;
    let site_name = request.site_name.as_deref().unwrap_or_default();

    let session = state
        .tableau
        .sign_in(tableau_url, site_name, pat_name, pat_secret)
        .await?;

    Ok(Json(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{json_body, state};
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(body: serde_json::Value) -> Result<Json<AuthRequest>, JsonRejection> {
        Ok(Json(serde_json::from_value(body).expect("valid request")))
    }

    async fn call(body: serde_json::Value) -> serde_json::Value {
        let response = sign_in(State(state()), request(body)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    #[tokio::test]
    async fn missing_fields_are_reported_in_order_without_calling_tableau() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let cases = [
            (json!({}), "tableauUrl"),
            (json!({ "tableauUrl": "", "pat": { "name": "n", "secret": "s" } }), "tableauUrl"),
            (json!({ "tableauUrl": server.uri() }), "pat.name"),
            (json!({ "tableauUrl": server.uri(), "pat": { "secret": "s" } }), "pat.name"),
            (json!({ "tableauUrl": server.uri(), "pat": { "name": "n" } }), "pat.secret"),
            (
                json!({ "tableauUrl": server.uri(), "pat": { "name": "n", "secret": "" } }),
                "pat.secret",
            ),
        ];

        for (body, field) in cases {
            let result = call(body).await;
            assert_eq!(
                result,
                json!({ "error": format!("Error: parameter '{field}' not provided") })
            );
        }
    }

    #[tokio::test]
    async fn successful_sign_in_returns_token_and_site_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/3.15/auth/signin"))
            .and(body_json(json!({
                "credentials": {
                    "personalAccessTokenName": "wizard",
                    "personalAccessTokenSecret": "s3cret",
                    "site": { "contentUrl": "" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "credentials": { "token": "T", "site": { "id": "S" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = call(json!({
            "tableauUrl": server.uri(),
            "pat": { "name": "wizard", "secret": "s3cret" }
        }))
        .await;

        assert_eq!(result, json!({ "token": "T", "siteId": "S" }));
    }

    #[tokio::test]
    async fn upstream_failure_is_wrapped_in_error_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/3.15/auth/signin"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "summary": "A", "detail": "B", "code": "401001" }
            })))
            .mount(&server)
            .await;

        let result = call(json!({
            "tableauUrl": server.uri(),
            "siteName": "finance",
            "pat": { "name": "wizard", "secret": "wrong" }
        }))
        .await;

        let message = result["error"].as_str().expect("error message");
        assert!(message.contains('A') && message.contains('B'), "{message}");
    }
}
