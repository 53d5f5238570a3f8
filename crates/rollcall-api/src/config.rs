//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line flags (applied by the binary).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rollcall_core::{Error, Result};
use rollcall_service::DEFAULT_SHEET_NAME;
use rollcall_sheets::Credentials;
use serde::{Deserialize, Serialize};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

/// Origin of the local development front end.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Preview and production deployments on Vercel.
pub const DEFAULT_CORS_PATTERN: &str = "*.vercel.app";

/// Which spreadsheet store the server writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google Sheets API v4.
    #[default]
    Google,
    /// In-process grid; contents are lost on exit.
    Memory,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "memory" => Ok(Self::Memory),
            other => Err(Error::config(format!(
                "Unknown backend '{other}' (expected 'google' or 'memory')"
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Google => "google",
            Self::Memory => "memory",
        })
    }
}

/// Google Sheets connection settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Spreadsheet identifier from the sheet's URL.
    pub spreadsheet_id: Option<String>,
    /// Service account email.
    pub service_account_email: Option<String>,
    /// Service account PEM key; literal `\n` sequences are accepted.
    pub private_key: Option<String>,
    /// API key, used when no service account is configured.
    pub api_key: Option<String>,
}

impl GoogleConfig {
    /// Resolves the configured credentials.
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::resolve(
            self.service_account_email.as_deref(),
            self.private_key.as_deref(),
            self.api_key.as_deref(),
        )
        .map_err(|e| Error::config(e.to_string()))
    }

    fn has_credentials(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        (set(&self.service_account_email) && set(&self.private_key)) || set(&self.api_key)
    }
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("GoogleConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("service_account_email", &self.service_account_email)
            .field("private_key", &redact(&self.private_key))
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Spreadsheet store.
    pub backend: Backend,
    /// Tab holding contacts.
    pub sheet_name: String,
    /// Origins allowed by CORS: exact origins or `*.domain` patterns.
    pub cors_origins: Vec<String>,
    /// Serialize the duplicate check and append across requests.
    pub serialize_writes: bool,
    /// Google Sheets settings.
    pub google: GoogleConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend: Backend::default(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            cors_origins: vec![
                DEFAULT_CORS_ORIGIN.to_string(),
                DEFAULT_CORS_PATTERN.to_string(),
            ],
            serialize_writes: false,
            google: GoogleConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads defaults, the optional file at `path`, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parses TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Overrides fields from environment variables looked up through `lookup`.
    ///
    /// Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("Invalid PORT '{port}'")))?;
        }
        if let Some(backend) = get("ROLLCALL_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(sheet) = get("ROLLCALL_SHEET_NAME") {
            self.sheet_name = sheet;
        }
        if let Some(origins) = get("ROLLCALL_CORS_ORIGINS") {
            self.cors_origins = parse_list(&origins);
        }
        if let Some(flag) = get("ROLLCALL_SERIALIZE_WRITES") {
            self.serialize_writes = parse_bool(&flag).ok_or_else(|| {
                Error::config(format!("Invalid ROLLCALL_SERIALIZE_WRITES '{flag}'"))
            })?;
        }
        if let Some(id) = get("GOOGLE_SPREADSHEET_ID") {
            self.google.spreadsheet_id = Some(id);
        }
        if let Some(email) = get("GOOGLE_SERVICE_ACCOUNT_EMAIL") {
            self.google.service_account_email = Some(email);
        }
        if let Some(key) = get("GOOGLE_PRIVATE_KEY") {
            self.google.private_key = Some(key);
        }
        if let Some(key) = get("GOOGLE_API_KEY") {
            self.google.api_key = Some(key);
        }
        Ok(())
    }

    /// Checks that the configuration can start a server.
    pub fn validate(&self) -> Result<()> {
        if self.sheet_name.trim().is_empty() {
            return Err(Error::config("sheet_name must not be empty"));
        }
        crate::cors::parse_origins(&self.cors_origins)?;
        if self.backend == Backend::Google {
            if self
                .google
                .spreadsheet_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
            {
                return Err(Error::config(
                    "GOOGLE_SPREADSHEET_ID is required for the google backend",
                ));
            }
            if !self.google.has_credentials() {
                return Err(Error::config(
                    "No Google Sheets credentials found. Set GOOGLE_SERVICE_ACCOUNT_EMAIL and \
                     GOOGLE_PRIVATE_KEY, or GOOGLE_API_KEY.",
                ));
            }
        }
        Ok(())
    }

    /// Spreadsheet id, or a placeholder for the memory backend.
    pub fn spreadsheet_id(&self) -> &str {
        self.google.spreadsheet_id.as_deref().unwrap_or("local")
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
