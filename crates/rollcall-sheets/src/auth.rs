//! Google credentials for the Sheets API.
//!
//! Two modes are supported:
//! - Service account: an RS256-signed JWT assertion is exchanged for a
//!   bearer token, which is cached until shortly before it expires.
//! - API key: passed as the `key` query parameter. Read-only, public sheets.

use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::{Result, SheetError};

/// OAuth scope granting read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion (Google's maximum).
const ASSERTION_LIFETIME: Duration = Duration::from_secs(3600);

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// A service account's identity and signing key.
#[derive(Clone)]
pub struct ServiceAccountKey {
    client_email: String,
    encoding_key: EncodingKey,
}

impl ServiceAccountKey {
    /// Parse a PEM-encoded RSA private key.
    ///
    /// Literal `\n` sequences (as found in single-line environment
    /// variables) are turned into newlines first.
    pub fn from_pem(client_email: impl Into<String>, private_key: &str) -> Result<Self> {
        let pem = private_key.replace("\\n", "\n");
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| SheetError::Credentials(format!("invalid private key: {e}")))?;
        Ok(Self {
            client_email: client_email.into(),
            encoding_key,
        })
    }

    /// The service account's email address.
    pub fn client_email(&self) -> &str {
        &self.client_email
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("encoding_key", &"<redacted>")
            .finish()
    }
}

/// How requests to the Sheets API are authorized.
#[derive(Clone)]
pub enum Credentials {
    /// OAuth bearer tokens minted from a service account key.
    ServiceAccount(ServiceAccountKey),
    /// A plain API key.
    ApiKey(String),
}

impl Credentials {
    /// Pick credentials from whatever is configured.
    ///
    /// A service account (email and key both present) wins over an API key.
    pub fn resolve(
        service_account_email: Option<&str>,
        private_key: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        if let (Some(email), Some(key)) = (present(service_account_email), present(private_key)) {
            return Ok(Self::ServiceAccount(ServiceAccountKey::from_pem(email, key)?));
        }
        if let Some(key) = present(api_key) {
            return Ok(Self::ApiKey(key.to_string()));
        }
        Err(SheetError::Credentials(
            "No Google Sheets credentials found. Set GOOGLE_SERVICE_ACCOUNT_EMAIL and \
             GOOGLE_PRIVATE_KEY, or GOOGLE_API_KEY."
                .to_string(),
        ))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "service account",
            Self::ApiKey(_) => "API key",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount(key) => f.debug_tuple("ServiceAccount").field(key).finish(),
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
        }
    }
}

/// Claims of the JWT bearer assertion.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

impl AssertionClaims {
    pub(crate) fn new(client_email: &str, token_url: &str, issued_at: u64) -> Self {
        Self {
            iss: client_email.to_string(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: token_url.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME.as_secs(),
        }
    }
}

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Cached access token with its expiry.
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Mints and caches access tokens for a service account.
pub struct TokenSource {
    key: ServiceAccountKey,
    token_url: String,
    http_client: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenSource {
    /// Create a token source that exchanges assertions at Google's endpoint.
    pub fn new(key: ServiceAccountKey, http_client: reqwest::Client) -> Self {
        Self {
            key,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            http_client,
            cached: RwLock::new(None),
        }
    }

    /// Use a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Return a valid access token, fetching a new one if needed.
    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.lookup_cached() {
            return Ok(token);
        }
        self.refresh().await
    }

    fn lookup_cached(&self) -> Option<String> {
        let cache = self.cached.read().ok()?;
        let cached = cache.as_ref()?;
        if cached.expires_at <= Instant::now() + EXPIRY_MARGIN {
            return None;
        }
        Some(cached.token.clone())
    }

    async fn refresh(&self) -> Result<String> {
        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SheetError::Token(format!("system clock before epoch: {e}")))?
            .as_secs();
        let claims = AssertionClaims::new(self.key.client_email(), &self.token_url, issued_at);
        let assertion = encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.key.encoding_key,
        )
        .map_err(|e| SheetError::Token(format!("failed to sign assertion: {e}")))?;

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetError::Token(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Token(format!("HTTP {status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Token(format!("token response parse failed: {e}")))?;

        let lifetime = Duration::from_secs(
            token
                .expires_in
                .unwrap_or_else(|| ASSERTION_LIFETIME.as_secs()),
        );
        let mut cache = self
            .cached
            .write()
            .map_err(|e| SheetError::Token(e.to_string()))?;
        *cache = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        log::debug!(
            "Obtained access token for {} (expires in {}s)",
            self.key.client_email(),
            lifetime.as_secs()
        );
        Ok(token.access_token)
    }
}
