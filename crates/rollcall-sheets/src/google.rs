//! Google Sheets API v4 store.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::{Credentials, TokenSource};
use crate::store::{Rows, SheetStore};
use crate::{Result, SheetError, SheetRange};

/// Base URL of the Sheets API.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/";

/// Values are stored exactly as sent, never parsed as formulas or numbers.
const VALUE_INPUT_OPTION: (&str, &str) = ("valueInputOption", "RAW");

/// Body of a `values.get` response.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<Value>>>,
}

/// Body of a `values.append` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendValuesResponse {
    #[serde(default)]
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    #[serde(default)]
    updated_range: Option<String>,
}

enum Authorizer {
    Bearer(TokenSource),
    ApiKey(String),
}

/// A [`SheetStore`] backed by one Google spreadsheet.
pub struct GoogleSheetsStore {
    http_client: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    auth: Authorizer,
}

impl GoogleSheetsStore {
    /// Create a store for `spreadsheet_id`.
    pub fn new(spreadsheet_id: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let http_client = reqwest::Client::new();
        let auth = match credentials {
            Credentials::ServiceAccount(key) => {
                Authorizer::Bearer(TokenSource::new(key, http_client.clone()))
            }
            Credentials::ApiKey(key) => Authorizer::ApiKey(key),
        };
        Ok(Self {
            http_client,
            base_url: parse_base_url(SHEETS_API_BASE)?,
            spreadsheet_id: spreadsheet_id.into(),
            auth,
        })
    }

    /// Point the store at a different API root.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Exchange service-account assertions at a different token endpoint.
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.auth = match self.auth {
            Authorizer::Bearer(source) => Authorizer::Bearer(source.with_token_url(token_url)),
            other => other,
        };
        self
    }

    /// The spreadsheet this store writes to.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Check that the spreadsheet is reachable with the configured credentials.
    ///
    /// Fetches only the spreadsheet id from the metadata endpoint.
    pub async fn verify_access(&self) -> Result<()> {
        let url = self.endpoint(&["spreadsheets", &self.spreadsheet_id])?;
        let request = self
            .http_client
            .get(url)
            .query(&[("fields", "spreadsheetId")]);
        self.execute(request).await?;
        log::info!("Connected to spreadsheet {}", self.spreadsheet_id);
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SheetError::Malformed(format!("base URL {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, range: &SheetRange, action: Option<&str>) -> Result<Url> {
        let target = match action {
            Some(action) => format!("{range}:{action}"),
            None => range.to_string(),
        };
        self.endpoint(&["spreadsheets", &self.spreadsheet_id, "values", &target])
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match &self.auth {
            Authorizer::Bearer(source) => Ok(request.bearer_auth(source.access_token().await?)),
            Authorizer::ApiKey(key) => Ok(request.query(&[("key", key.as_str())])),
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).await?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::warn!("Sheets API returned HTTP {status}");
        Err(SheetError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn read_range(&self, range: &SheetRange) -> Result<Rows> {
        log::debug!("Reading {range}");
        let url = self.values_url(range, None)?;
        let response = self.execute(self.http_client.get(url)).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetError::Malformed(format!("values response parse failed: {e}")))?;

        Ok(body
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn append_rows(&self, range: &SheetRange, rows: Rows) -> Result<()> {
        log::debug!("Appending {} row(s) to {range}", rows.len());
        let url = self.values_url(range, Some("append"))?;
        let request = self
            .http_client
            .post(url)
            .query(&[VALUE_INPUT_OPTION])
            .json(&json!({ "values": rows }));
        let response = self.execute(request).await?;

        // The rows are written by now; an unreadable body only costs the log line.
        match response.json::<AppendValuesResponse>().await {
            Ok(body) => match appended_range(&body) {
                Some(written) => log::debug!(
                    "Appended to {written} (row {})",
                    written.start().row.unwrap_or_default()
                ),
                None => log::debug!("Append response carried no updated range"),
            },
            Err(e) => log::warn!("Append response parse failed: {e}"),
        }
        Ok(())
    }

    async fn update_range(&self, range: &SheetRange, rows: Rows) -> Result<()> {
        log::debug!("Updating {range}");
        let url = self.values_url(range, None)?;
        let request = self
            .http_client
            .put(url)
            .query(&[VALUE_INPUT_OPTION])
            .json(&json!({
                "range": range.to_string(),
                "majorDimension": "ROWS",
                "values": rows,
            }));
        self.execute(request).await?;
        Ok(())
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| SheetError::Malformed(format!("invalid base URL {base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(SheetError::Malformed(format!(
            "base URL {base_url} cannot hold a path"
        )));
    }
    Ok(url)
}

/// Where an append landed, from the response's `updatedRange`.
fn appended_range(body: &AppendValuesResponse) -> Option<SheetRange> {
    let updated = body.updates.as_ref()?.updated_range.as_deref()?;
    match SheetRange::parse(updated) {
        Ok(range) => Some(range),
        Err(e) => {
            log::warn!("Ignoring updated range: {e}");
            None
        }
    }
}

/// Render a cell as the string a formatted read would show.
fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
