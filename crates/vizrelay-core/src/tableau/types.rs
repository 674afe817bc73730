use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DASHBOARD_SHEET_TYPE: &str = "dashboard";

#[derive(Debug, Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub credentials: PatCredentials<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PatCredentials<'a> {
    pub personal_access_token_name: &'a str,
    pub personal_access_token_secret: &'a str,
    pub site: SiteSelector<'a>,
}

/// An empty `content_url` selects the server's default site.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SiteSelector<'a> {
    pub content_url: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub credentials: IssuedCredentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuedCredentials {
    pub token: String,
    pub site: SiteInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteInfo {
    pub id: String,
    #[serde(rename = "contentUrl")]
    pub content_url: Option<String>,
}

/// What the browser keeps after signing in and sends back on later calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub site_id: String,
}

impl From<SignInResponse> for Session {
    fn from(response: SignInResponse) -> Self {
        Self {
            token: response.credentials.token,
            site_id: response.credentials.site.id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub hits: SearchHits,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHits {
    pub items: Vec<Value>,
}

/// One item of the content search API. Fields this service does not inspect
/// are kept so the frontend receives the item as Tableau sent it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub content: ViewContent,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchHit {
    pub fn is_dashboard(&self) -> bool {
        self.content.sheet_type.as_deref() == Some(DASHBOARD_SHEET_TYPE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
