//! TigerTag catalog client.
//!
//! The TigerTag API publishes a Swagger description; the catalog is the
//! subset of read endpoints that return a full list (`/get/all` paths,
//! excluding the `/by_page` paginated variants). Endpoints are fetched
//! sequentially to respect the API's implicit rate limits.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::credentials::Credentials;
use crate::error::ScrapeError;

const SWAGGER_URL: &str = "https://api.tigertag.io/apispec:tigertag";
const API_BASE_URL: &str = "https://api.tigertag.io/api:tigertag";

/// Marker segment identifying "list all records" endpoints.
const MARKER_ALL: &str = "/get/all";
/// Marker segment identifying paginated variants, which are excluded.
const MARKER_PAGED: &str = "/by_page";

/// Pause between endpoint fetches. The API documents no rate limit; the
/// sequential fetch plus this small gap stays well under any plausible one.
const REQUEST_DELAY: Duration = Duration::from_millis(250);

/// Output keys per endpoint path. Consulted before the derived key so the
/// mapping is auditable in one place; currently empty because every derived
/// key is fine for the live description. Add entries here when a path's
/// derived key is unsuitable.
const KEY_OVERRIDES: &[(&str, &str)] = &[];

/// One resolved catalog endpoint: its API path and its key in the output
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub key: String,
}

/// Select the full-list catalog endpoints from a Swagger description.
///
/// Keeps the description's own path order (no extra sorting). A description
/// with no paths at all yields an empty set with a warning; that is not
/// fatal.
pub fn resolve_catalog_endpoints(description: &Value) -> Vec<Endpoint> {
    let Some(paths) = description.get("paths").and_then(Value::as_object) else {
        log::warn!("No paths found in API description");
        return Vec::new();
    };

    paths
        .keys()
        .filter(|path| path.contains(MARKER_ALL))
        .filter(|path| !path.contains(MARKER_PAGED))
        .map(|path| Endpoint {
            path: path.clone(),
            key: key_for_path(path),
        })
        .collect()
}

fn key_for_path(path: &str) -> String {
    KEY_OVERRIDES
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, key)| (*key).to_string())
        .unwrap_or_else(|| endpoint_key(path))
}

/// Derive a stable camel-case document key from an endpoint path:
/// strip the `/get/all` marker, capitalize the remaining segments, join,
/// and lower-case the first letter. `/filament/type/get/all` →
/// `filamentType`.
pub fn endpoint_key(path: &str) -> String {
    let stripped = path.replacen(MARKER_ALL, "", 1);
    let mut joined = String::new();
    for segment in stripped.split(['/', '_']).filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            joined.extend(first.to_uppercase());
            joined.push_str(chars.as_str());
        }
    }
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => joined,
    }
}

/// Order one endpoint's records by `label` when the sample record has one,
/// else by `name`, else leave the list as received. Case-sensitive
/// lexicographic on the raw string; the sort is stable, so output is
/// reproducible.
pub fn sort_catalog_list(list: &mut [Value]) {
    let Some(sample) = list.first() else {
        return;
    };
    let field = if sample.get("label").is_some() {
        "label"
    } else if sample.get("name").is_some() {
        "name"
    } else {
        return;
    };
    list.sort_by(|a, b| {
        let a = a.get(field).and_then(Value::as_str).unwrap_or("");
        let b = b.get(field).and_then(Value::as_str).unwrap_or("");
        a.cmp(b)
    });
}

/// HTTP client for the TigerTag API.
pub struct TigerTagClient {
    http: reqwest::Client,
    creds: Credentials,
    swagger_url: String,
    base_url: String,
}

impl TigerTagClient {
    pub fn new(creds: Credentials) -> Result<Self, ScrapeError> {
        Self::with_urls(creds, SWAGGER_URL, API_BASE_URL)
    }

    pub fn with_urls(
        creds: Credentials,
        swagger_url: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            creds,
            swagger_url: swagger_url.into(),
            base_url: base_url.into(),
        })
    }

    /// Fetch the Swagger description. Unreachable or malformed descriptions
    /// are fatal for the TigerTag run; there is nothing to fall back to.
    pub async fn fetch_api_description(&self) -> Result<Value, ScrapeError> {
        let token = self.creds.tigertag_token.clone().unwrap_or_default();
        let resp = self
            .http
            .get(&self.swagger_url)
            .query(&[("type", "json"), ("token", token.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Api(format!(
                "API description returned HTTP {status}"
            )));
        }
        Ok(resp.json().await?)
    }

    /// Fetch one catalog endpoint's payload.
    pub async fn fetch_endpoint(&self, path: &str) -> Result<Value, ScrapeError> {
        let mut request = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("Accept", "application/json");
        if let Some(token) = &self.creds.tigertag_token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Api(format!("{path} returned HTTP {status}")));
        }
        Ok(resp.json().await?)
    }

    /// Fetch the whole catalog: resolve endpoints, fetch each sequentially,
    /// sort each list, and assemble the keyed document. A failed endpoint
    /// is logged and absent from the document; it never aborts the rest.
    pub async fn fetch_catalog(&self) -> Result<Map<String, Value>, ScrapeError> {
        let description = self.fetch_api_description().await?;
        let endpoints = resolve_catalog_endpoints(&description);
        if endpoints.is_empty() {
            log::warn!("API description resolved to zero catalog endpoints");
        }

        let mut document = Map::new();
        let mut first = true;
        for endpoint in endpoints {
            if !first {
                tokio::time::sleep(REQUEST_DELAY).await;
            }
            first = false;
            log::debug!("Fetching {}", endpoint.path);
            match self.fetch_endpoint(&endpoint.path).await {
                Ok(mut payload) => {
                    if let Value::Array(list) = &mut payload {
                        sort_catalog_list(list);
                    }
                    document.insert(endpoint.key, payload);
                }
                Err(e) => {
                    log::warn!("Failed to fetch {}: {e}", endpoint.path);
                }
            }
        }
        Ok(document)
    }
}
