// API client module: a small blocking HTTP client for one ChartMuseum
// server. Every call is synchronous; the sync loop runs one request at a
// time and there is nothing to gain from an async runtime here.

use crate::error::ApiError;
use crate::index::ChartIndex;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Path of the server information endpoint.
pub const INFO_PATH: &str = "/info";
/// Path used both to list charts (GET) and to upload archives (POST).
pub const CHARTS_API_PATH: &str = "/api/charts";
/// Media type sent with uploaded chart archives.
pub const CHART_CONTENT_TYPE: &str = "application/gzip";

/// Holds a reqwest blocking client and the base URL of one server.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// What the info probe learned about a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: String,
}

// Only the presence of `version` is checked; its type is not.
#[derive(Deserialize)]
struct InfoBody {
    version: Option<serde_json::Value>,
}

impl ApiClient {
    /// Build a client for `base_url`. Trailing slashes are dropped so
    /// paths can be appended directly.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("cm-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Network {
                url: base_url.clone(),
                source,
            })?;
        Ok(ApiClient { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn info_url(&self) -> String {
        format!("{}{}", self.base_url, INFO_PATH)
    }

    pub fn charts_url(&self) -> String {
        format!("{}{}", self.base_url, CHARTS_API_PATH)
    }

    /// Where a packaged chart version is served from.
    pub fn archive_url(&self, chart: &str, version: &str) -> String {
        format!("{}/charts/{}-{}.tgz", self.base_url, chart, version)
    }

    /// Check that this server speaks the ChartMuseum API.
    pub fn probe(&self) -> Result<ServerInfo, ApiError> {
        probe(&self.client, &self.info_url())
    }

    /// Fetch the complete chart index of this server.
    pub fn list_charts(&self) -> Result<ChartIndex, ApiError> {
        let url = self.charts_url();
        let res = self.get(&url)?;
        expect_status(&url, &res, StatusCode::OK)?;
        let body = read_body(&url, res)?;
        let index: ChartIndex =
            serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })?;
        debug!(server = %self.base_url, charts = index.len(), "Fetched chart index");
        Ok(index)
    }

    /// Download the `.tgz` archive for one chart version into memory.
    pub fn fetch_archive(&self, chart: &str, version: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.archive_url(chart, version);
        let res = self.get(&url)?;
        expect_status(&url, &res, StatusCode::OK)?;
        read_body(&url, res)
    }

    /// Upload a chart archive. ChartMuseum answers 201 Created on success.
    pub fn upload_archive(&self, archive: Vec<u8>) -> Result<(), ApiError> {
        let url = self.charts_url();
        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, CHART_CONTENT_TYPE)
            .body(archive)
            .send()
            .map_err(|source| ApiError::Network {
                url: url.clone(),
                source,
            })?;
        expect_status(&url, &res, StatusCode::CREATED)?;
        // Drain the acknowledgement so the connection can be reused.
        read_body(&url, res)?;
        Ok(())
    }

    fn get(&self, url: &str) -> Result<Response, ApiError> {
        self.client.get(url).send().map_err(|source| ApiError::Network {
            url: url.to_string(),
            source,
        })
    }
}

/// Probe `url` (an info endpoint such as `http://host:8080/info`): it must
/// answer 200 with a JSON object carrying a `version` key.
pub fn probe(client: &Client, url: &str) -> Result<ServerInfo, ApiError> {
    let res = client.get(url).send().map_err(|source| ApiError::Network {
        url: url.to_string(),
        source,
    })?;
    expect_status(url, &res, StatusCode::OK)?;
    let body = read_body(url, res)?;

    let info: InfoBody = serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })?;
    let version = match info.version {
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => {
            return Err(ApiError::Schema {
                url: url.to_string(),
                field: "version",
            })
        }
    };
    Ok(ServerInfo { version })
}

// The response is dropped (and its connection closed) when this returns
// an error.
fn expect_status(url: &str, res: &Response, expected: StatusCode) -> Result<(), ApiError> {
    if res.status() != expected {
        return Err(ApiError::UnexpectedStatus {
            url: url.to_string(),
            status: res.status(),
        });
    }
    Ok(())
}

fn read_body(url: &str, res: Response) -> Result<Vec<u8>, ApiError> {
    res.bytes()
        .map(|b| b.to_vec())
        .map_err(|source| ApiError::Body {
            url: url.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let api = ApiClient::new("http://cm.example:8080//").unwrap();
        assert_eq!(api.base_url(), "http://cm.example:8080");
        assert_eq!(api.info_url(), "http://cm.example:8080/info");
        assert_eq!(api.charts_url(), "http://cm.example:8080/api/charts");
        assert_eq!(
            api.archive_url("app", "1.1.0"),
            "http://cm.example:8080/charts/app-1.1.0.tgz"
        );
    }

    #[test]
    fn probe_accepts_info_with_version() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/info")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"version":"v0.16.2"}"#)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        let info = api.probe().unwrap();

        assert_eq!(info.version, "v0.16.2");
        mock.assert();
    }

    #[test]
    fn probe_rejects_missing_version_key() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/info")
            .with_status(200)
            .with_body(r#"{"name":"not-chartmuseum"}"#)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        let err = api.probe().unwrap_err();

        assert!(matches!(err, ApiError::Schema { field: "version", .. }));
    }

    #[test]
    fn probe_rejects_non_200_status() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/info").with_status(503).create();

        let api = ApiClient::new(&server.url()).unwrap();
        let err = api.probe().unwrap_err();

        match err {
            ApiError::UnexpectedStatus { status, .. } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn probe_rejects_malformed_json() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/info")
            .with_status(200)
            .with_body("<html>hello</html>")
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        assert!(matches!(api.probe().unwrap_err(), ApiError::Decode { .. }));
    }

    #[test]
    fn probe_reports_network_error_when_unreachable() {
        // Nothing listens on port 1.
        let api = ApiClient::new("http://127.0.0.1:1").unwrap();
        assert!(matches!(api.probe().unwrap_err(), ApiError::Network { .. }));
    }

    #[test]
    fn list_charts_decodes_index() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/charts")
            .with_status(200)
            .with_body(
                r#"{"app":[{"name":"app","version":"1.0.0"},{"name":"app","version":"1.1.0"}],"db":[]}"#,
            )
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        let index = api.list_charts().unwrap();

        assert_eq!(index.len(), 2);
        let versions: Vec<&str> = index["app"].iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["1.0.0", "1.1.0"]);
        assert!(index["db"].is_empty());
    }

    #[test]
    fn list_charts_checks_status_before_decoding() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/charts")
            .with_status(500)
            .with_body("<html>internal error</html>")
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        match api.list_charts().unwrap_err() {
            ApiError::UnexpectedStatus { status, url } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(url.ends_with("/api/charts"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_charts_reports_malformed_json() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/charts")
            .with_status(200)
            .with_body(r#"{"app": "not-a-list"}"#)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        assert!(matches!(api.list_charts().unwrap_err(), ApiError::Decode { .. }));
    }

    #[test]
    fn fetch_archive_returns_body_bytes() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/charts/app-1.1.0.tgz")
            .with_status(200)
            .with_body(b"\x1f\x8barchive")
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        let bytes = api.fetch_archive("app", "1.1.0").unwrap();

        assert_eq!(bytes, b"\x1f\x8barchive".to_vec());
        mock.assert();
    }

    #[test]
    fn fetch_archive_rejects_missing_archive() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/charts/app-9.9.9.tgz").with_status(404).create();

        let api = ApiClient::new(&server.url()).unwrap();
        let err = api.fetch_archive("app", "9.9.9").unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[test]
    fn upload_archive_posts_gzip_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/charts")
            .match_header("content-type", "application/gzip")
            .match_body("archive-bytes")
            .with_status(201)
            .with_body(r#"{"saved":true}"#)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        api.upload_archive(b"archive-bytes".to_vec()).unwrap();

        mock.assert();
    }

    #[test]
    fn upload_archive_requires_created_status() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/charts")
            .with_status(200)
            .with_body(r#"{"saved":true}"#)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        let err = api.upload_archive(b"archive-bytes".to_vec()).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status, .. } if status == StatusCode::OK));
    }
}
