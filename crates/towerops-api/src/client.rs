// Hand-crafted async HTTP client for the TowerOps REST API.
//
// Base path: /api/v1/
// Auth: `Authorization: Bearer <token>`
//
// One call is one HTTP exchange. No retries, no caching; a 404 comes back as
// the distinguished `Error::NotFound` so callers can branch on it.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{
    DeviceKind, DeviceObject, DevicePayload, Envelope, RemoteKind, SiteKind, SiteObject,
    SitePayload,
};

/// Production endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://towerops.net";

const API_PREFIX: &str = "/api/v1";

/// Longest slice of a non-JSON error body kept in [`Error::Remote`].
const BODY_EXCERPT_CHARS: usize = 512;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, ErrorDetail>>,
}

/// Validation messages arrive as either `"msg"` or `["msg", ...]` per field.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    One(String),
    Many(Vec<String>),
}

impl ErrorDetail {
    fn into_message(self) -> String {
        match self {
            Self::One(message) => message,
            Self::Many(messages) => messages.join(", "),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the TowerOps site and device endpoints.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` owns the
/// connection pool.
#[derive(Debug, Clone)]
pub struct ToweropsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ToweropsClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, bearer token and transport config.
    ///
    /// An empty `base_url` selects [`DEFAULT_BASE_URL`]. The token is
    /// injected as a sensitive default header on every request.
    pub fn new(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken {
                message: format!("invalid authorization header value: {e}"),
            })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The normalized API root, always ending in `/api/v1/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `https://host` and `https://host/api/v1` both become `https://host/api/v1/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let raw = raw.trim();
        let raw = if raw.is_empty() { DEFAULT_BASE_URL } else { raw };

        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with(API_PREFIX) {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}{API_PREFIX}/"));
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the API root.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        envelope: &str,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            decode_body(&body, envelope)
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: StatusCode, resp: reqwest::Response) -> Error {
        if status == StatusCode::NOT_FOUND {
            return Error::NotFound {
                path: resp.url().path().to_owned(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(body) if body.error.is_some() || body.errors.is_some() => Error::Remote {
                status: status.as_u16(),
                message: body.error,
                field_errors: body
                    .errors
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(field, detail)| (field, detail.into_message()))
                    .collect(),
            },
            _ => Error::Remote {
                status: status.as_u16(),
                message: Some(if raw.trim().is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(BODY_EXCERPT_CHARS).collect()
                }),
                field_errors: BTreeMap::new(),
            },
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Generic CRUD ─────────────────────────────────────────────────

    /// `POST /api/v1/{collection}` with the payload in its kind envelope.
    pub async fn create<K: RemoteKind>(&self, payload: &K::Payload) -> Result<K::Object, Error> {
        let url = self.url(&[K::COLLECTION])?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(&Envelope::new(K::ENVELOPE, payload))
            .send()
            .await?;
        self.handle_response(resp, K::ENVELOPE).await
    }

    /// `GET /api/v1/{collection}/{id}`.
    pub async fn read<K: RemoteKind>(&self, id: &str) -> Result<K::Object, Error> {
        let url = self.url(&[K::COLLECTION, id])?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp, K::ENVELOPE).await
    }

    /// `PATCH /api/v1/{collection}/{id}` with the payload in its kind envelope.
    pub async fn update<K: RemoteKind>(
        &self,
        id: &str,
        payload: &K::Payload,
    ) -> Result<K::Object, Error> {
        let url = self.url(&[K::COLLECTION, id])?;
        debug!("PATCH {url}");

        let resp = self
            .http
            .patch(url)
            .json(&Envelope::new(K::ENVELOPE, payload))
            .send()
            .await?;
        self.handle_response(resp, K::ENVELOPE).await
    }

    /// `DELETE /api/v1/{collection}/{id}`. Any 2xx (normally 204) is success.
    pub async fn delete<K: RemoteKind>(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&[K::COLLECTION, id])?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Sites ────────────────────────────────────────────────────────

    pub async fn create_site(&self, site: &SitePayload) -> Result<SiteObject, Error> {
        self.create::<SiteKind>(site).await
    }

    pub async fn get_site(&self, id: &str) -> Result<SiteObject, Error> {
        self.read::<SiteKind>(id).await
    }

    pub async fn update_site(&self, id: &str, site: &SitePayload) -> Result<SiteObject, Error> {
        self.update::<SiteKind>(id, site).await
    }

    pub async fn delete_site(&self, id: &str) -> Result<(), Error> {
        self.delete::<SiteKind>(id).await
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn create_device(&self, device: &DevicePayload) -> Result<DeviceObject, Error> {
        self.create::<DeviceKind>(device).await
    }

    pub async fn get_device(&self, id: &str) -> Result<DeviceObject, Error> {
        self.read::<DeviceKind>(id).await
    }

    pub async fn update_device(
        &self,
        id: &str,
        device: &DevicePayload,
    ) -> Result<DeviceObject, Error> {
        self.update::<DeviceKind>(id, device).await
    }

    pub async fn delete_device(&self, id: &str) -> Result<(), Error> {
        self.delete::<DeviceKind>(id).await
    }
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Decode a success body, accepting the object bare or inside its envelope.
fn decode_body<T: DeserializeOwned>(body: &str, envelope: &str) -> Result<T, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| decode_error(&e, body))?;
    serde_json::from_value(unwrap_envelope(value, envelope)).map_err(|e| decode_error(&e, body))
}

fn unwrap_envelope(value: Value, envelope: &str) -> Value {
    match value {
        Value::Object(mut map)
            if map.len() == 1 && map.get(envelope).is_some_and(Value::is_object) =>
        {
            map.remove(envelope).unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode_error(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Decode {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}
