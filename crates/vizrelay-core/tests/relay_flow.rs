use base64::Engine;
use serde_json::json;
use vizrelay_core::tableau::PNG_DATA_URI_PREFIX;
use vizrelay_core::{Session, TableauClient};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_tableau(server: &MockServer, png: &[u8]) {
    Mock::given(method("POST"))
        .and(path("/api/3.15/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "credentials": {
                "token": "token-abc",
                "site": { "id": "site-123", "contentUrl": "marketing" },
                "user": { "id": "user-1" }
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/-/search"))
        .and(query_param("terms", "campaign"))
        .and(header("x-tableau-auth", "token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": 2,
                "items": [
                    {
                        "content": {
                            "title": "Campaign Performance",
                            "containerName": "Marketing",
                            "ownerName": "Riley",
                            "luid": "view-dash",
                            "sheetType": "dashboard",
                            "path": "Campaigns/Performance"
                        }
                    },
                    {
                        "content": {
                            "title": "Campaign Raw Data",
                            "containerName": "Marketing",
                            "ownerName": "Riley",
                            "luid": "view-sheet",
                            "sheetType": "worksheet"
                        }
                    }
                ]
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/3.15/sites/site-123/views/view-dash/image"))
        .and(query_param("resolution", "high"))
        .and(header("x-tableau-auth", "token-abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png.to_vec()),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_in_search_and_fetch_image() {
    let server = MockServer::start().await;
    let png = b"\x89PNG\r\n\x1a\nfake-image-bytes";
    mount_tableau(&server, png).await;

    let client = TableauClient::new(reqwest::Client::new());

    let session = client
        .sign_in(&server.uri(), "marketing", "wizard", "s3cret")
        .await
        .expect("sign in");
    assert_eq!(
        session,
        Session {
            token: "token-abc".into(),
            site_id: "site-123".into(),
        }
    );

    let hits = client
        .search(&server.uri(), &session.token, "campaign")
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    let dashboard_id = hits[0].content.luid.clone().expect("dashboard luid");
    assert_eq!(dashboard_id, "view-dash");

    let data_uri = client
        .fetch_dashboard_image(&server.uri(), &session.token, &session.site_id, &dashboard_id)
        .await
        .expect("image");

    assert!(data_uri.starts_with("data:image/png;base64,"));
    let encoded = &data_uri[PNG_DATA_URI_PREFIX.len()..];
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .expect("valid base64");
    assert_eq!(decoded, png);
}
