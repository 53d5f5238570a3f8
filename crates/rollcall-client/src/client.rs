//! HTTP client for the Rollcall API.

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use rollcall_core::{Contact, ContactInput, DuplicateField};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::api::{ContactsApi, Health, Submission};
use crate::{Error, Result};

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Rollcall API client over `reqwest`.
#[derive(Debug, Clone)]
pub struct RollcallClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Any JSON body the API sends. Fields absent from a body stay `None`.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    data: Option<Contact>,
    #[serde(default)]
    duplicate: bool,
    field: Option<DuplicateField>,
    count: Option<u64>,
    url: Option<String>,
}

impl RollcallClient {
    /// Creates a client for the API at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Creates a client that sends requests through `http`.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let envelope = read_envelope(response).await;
            return Err(Error::Status {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
            });
        }
        response
            .json()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }
}

async fn read_envelope(response: Response) -> Envelope {
    match response.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read response body");
            Envelope::default()
        }
    }
}

/// Maps a create response onto a [`Submission`].
fn classify(status: StatusCode, envelope: Envelope) -> Submission {
    match envelope {
        Envelope {
            success: true,
            data: Some(contact),
            ..
        } if status.is_success() => Submission::Created(contact),
        Envelope {
            duplicate: true,
            field,
            message,
            ..
        } if status == StatusCode::CONFLICT => Submission::Duplicate { field, message },
        Envelope { message, .. } => Submission::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl ContactsApi for RollcallClient {
    async fn submit(&self, input: &ContactInput) -> Result<Submission> {
        let url = self.endpoint(&["api", "contacts"]);
        tracing::debug!(%url, "POST");
        let response = self.http.post(url).json(input).send().await?;
        let status = response.status();
        let envelope = read_envelope(response).await;
        Ok(classify(status, envelope))
    }

    async fn count(&self) -> Result<u64> {
        let envelope: Envelope = self.get(&["api", "contacts", "count"]).await?;
        envelope
            .count
            .filter(|_| envelope.success)
            .ok_or_else(|| Error::Decode("count missing from response".to_string()))
    }

    async fn sheet_url(&self) -> Result<String> {
        let envelope: Envelope = self.get(&["api", "contacts", "sheet-url"]).await?;
        envelope
            .url
            .filter(|_| envelope.success)
            .ok_or_else(|| Error::Decode("url missing from response".to_string()))
    }

    async fn health(&self) -> Result<Health> {
        self.get(&["health"]).await
    }
}
