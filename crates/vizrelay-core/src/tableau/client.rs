use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::DEFAULT_API_VERSION;
use crate::tableau::{
    error::{TableauError, normalize_failure},
    types::{
        DASHBOARD_SHEET_TYPE, PatCredentials, SearchHit, SearchResponse, Session, SignInRequest,
        SignInResponse, SiteSelector,
    },
};

const AUTH_HEADER: HeaderName = HeaderName::from_static("x-tableau-auth");
const JSON_MIME: HeaderValue = HeaderValue::from_static("application/json");
const VIEW_FILTER: &str = "type:eq:view";
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Stateless adapter over the Tableau REST API.
///
/// The server URL and credentials arrive with every call; the client only owns
/// the HTTP connection pool and the API version it speaks.
#[derive(Debug, Clone)]
pub struct TableauClient {
    http: Client,
    api_version: String,
}

impl TableauClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Exchange a personal access token for an auth token and the resolved site id.
    #[tracing::instrument(
        name = "tableau.sign_in",
        skip_all,
        fields(server = %server_url, site = %site_name)
    )]
    pub async fn sign_in(
        &self,
        server_url: &str,
        site_name: &str,
        token_name: &str,
        token_secret: &str,
    ) -> Result<Session, TableauError> {
        let url = endpoint(server_url, ["api", self.api_version.as_str(), "auth", "signin"])?;
        let payload = SignInRequest {
            credentials: PatCredentials {
                personal_access_token_name: token_name,
                personal_access_token_secret: token_secret,
                site: SiteSelector {
                    content_url: site_name,
                },
            },
        };

        let response = self.send(self.http.post(url).json(&payload), None).await?;
        let signed_in: SignInResponse = decode(response).await?;
        tracing::info!(site_id = %signed_in.credentials.site.id, "signed in to tableau");
        Ok(signed_in.into())
    }

    /// Search the site's views and keep only dashboards.
    ///
    /// A response without `hits.items` is treated as "no results".
    #[tracing::instrument(name = "tableau.search", skip_all, fields(server = %server_url, term = %term))]
    pub async fn search(
        &self,
        server_url: &str,
        auth_token: &str,
        term: &str,
    ) -> Result<Vec<SearchHit>, TableauError> {
        let url = endpoint(server_url, ["api", "-", "search"])?;
        let request = self
            .http
            .get(url)
            .query(&[("terms", term), ("filter", VIEW_FILTER)]);

        let response = self.send(request, Some(auth_token)).await?;
        let body = response.text().await?;
        let dashboards = dashboards_from_search_body(&body);
        tracing::debug!(count = dashboards.len(), "search returned dashboards");
        Ok(dashboards)
    }

    /// Download a high-resolution PNG of a view and return it as a data URI.
    #[tracing::instrument(
        name = "tableau.fetch_dashboard_image",
        skip_all,
        fields(server = %server_url, site_id = %site_id, view = %dashboard_id)
    )]
    pub async fn fetch_dashboard_image(
        &self,
        server_url: &str,
        auth_token: &str,
        site_id: &str,
        dashboard_id: &str,
    ) -> Result<String, TableauError> {
        let url = endpoint(
            server_url,
            [
                "api",
                self.api_version.as_str(),
                "sites",
                site_id,
                "views",
                dashboard_id,
                "image",
            ],
        )?;
        let request = self.http.get(url).query(&[("resolution", "high")]);

        let response = self.send(request, Some(auth_token)).await?;
        let bytes = response.bytes().await?;
        tracing::debug!(bytes = bytes.len(), "downloaded dashboard image");
        Ok(png_data_uri(&bytes))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        auth_token: Option<&str>,
    ) -> Result<Response, TableauError> {
        let response = request
            .headers(request_headers(auth_token)?)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "tableau request failed");
                TableauError::from_send(err)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = normalize_failure(status, &body);
        tracing::warn!(status = status.as_u16(), error = %err, "tableau rejected request");
        Err(err)
    }
}

fn request_headers(auth_token: Option<&str>) -> Result<HeaderMap, TableauError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, JSON_MIME);
    headers.insert(ACCEPT, JSON_MIME);
    if let Some(token) = auth_token {
        let value = HeaderValue::from_str(token).map_err(|_| {
            TableauError::InvalidRequest("auth token is not a valid header value".to_string())
        })?;
        headers.insert(AUTH_HEADER, value);
    }
    Ok(headers)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TableauError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| {
        tracing::error!(error = %err, body = %body, "tableau response did not match expected shape");
        TableauError::UnexpectedShape(err.to_string())
    })
}

/// Join path segments onto the caller's server URL, percent-encoding each one
/// so ids from the request body cannot add segments or a query string.
fn endpoint<'a>(
    server_url: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, TableauError> {
    let mut url = Url::parse(server_url.trim_end_matches('/'))
        .map_err(|err| TableauError::InvalidRequest(format!("invalid server url: {err}")))?;
    url.path_segments_mut()
        .map_err(|_| TableauError::InvalidRequest(format!("invalid server url: {server_url}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Filter a raw search body down to dashboard hits.
pub fn dashboards_from_search_body(body: &str) -> Vec<SearchHit> {
    let parsed: SearchResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, "search response missing hits.items; returning no results");
            return Vec::new();
        }
    };

    parsed
        .hits
        .items
        .into_iter()
        .filter(|item| {
            item.pointer("/content/sheetType").and_then(Value::as_str) == Some(DASHBOARD_SHEET_TYPE)
        })
        .filter_map(|item| match serde_json::from_value::<SearchHit>(item) {
            Ok(hit) => Some(hit),
            Err(err) => {
                tracing::warn!(error = %err, "skipping dashboard hit with unexpected field types");
                None
            }
        })
        .collect()
}

pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(bytes))
}
