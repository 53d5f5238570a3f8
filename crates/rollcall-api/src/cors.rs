//! CORS origin rules.
//!
//! An entry in `cors_origins` is either an exact origin
//! (`https://rollcall.example.com`) or a subdomain pattern: `*.vercel.app`
//! accepts any origin whose host ends in `.vercel.app`, and
//! `https://*.vercel.app` additionally pins the scheme. A bare `*` is
//! rejected because credentials are allowed.

use std::str::FromStr;

use http::{HeaderValue, Method, header};
use rollcall_core::{Error, Result};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// One allowed-origin rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginRule {
    /// Matches one origin byte for byte.
    Exact(HeaderValue),
    /// Matches any origin with a non-empty host label before `suffix`.
    Subdomain {
        /// Required scheme prefix such as `https://`, if any.
        scheme: Option<String>,
        /// Host suffix including the leading dot, e.g. `.vercel.app`.
        suffix: String,
    },
}

impl OriginRule {
    /// Whether `origin` is allowed by this rule.
    pub fn matches(&self, origin: &HeaderValue) -> bool {
        match self {
            Self::Exact(allowed) => allowed == origin,
            Self::Subdomain { scheme, suffix } => {
                let Ok(origin) = origin.to_str() else {
                    return false;
                };
                let host = match scheme {
                    Some(scheme) => match origin.strip_prefix(scheme.as_str()) {
                        Some(host) => host,
                        None => return false,
                    },
                    None => match origin.split_once("://") {
                        Some((_, host)) => host,
                        None => return false,
                    },
                };
                host.strip_suffix(suffix.as_str())
                    .is_some_and(|label| !label.is_empty() && !label.contains('/'))
            }
        }
    }
}

impl FromStr for OriginRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "*" {
            return Err(Error::config(
                "CORS origin '*' cannot be combined with credentials; \
                 list origins or use a pattern like '*.vercel.app'",
            ));
        }
        if !s.contains('*') {
            return HeaderValue::from_str(s)
                .map(Self::Exact)
                .map_err(|_| Error::config(format!("Invalid CORS origin '{s}'")));
        }

        let invalid = || {
            Error::config(format!(
                "Invalid CORS pattern '{s}' (expected '*.domain' or 'scheme://*.domain')"
            ))
        };
        let (scheme, pattern) = match s.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() => (Some(format!("{scheme}://")), rest),
            Some(_) => return Err(invalid()),
            None => (None, s),
        };
        let suffix = pattern.strip_prefix('*').ok_or_else(invalid)?;
        if !suffix.starts_with('.')
            || suffix.len() < 2
            || suffix.contains(['*', '/'])
            || scheme.as_deref().is_some_and(|s| s.contains('*'))
        {
            return Err(invalid());
        }
        Ok(Self::Subdomain {
            scheme,
            suffix: suffix.to_string(),
        })
    }
}

/// Parses every configured origin, failing on the first bad entry.
pub fn parse_origins(origins: &[String]) -> Result<Vec<OriginRule>> {
    origins.iter().map(|o| o.parse()).collect()
}

/// CORS for the configured origins, with credentials allowed.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let rules = parse_origins(origins)?;

    let allow_origin = if rules.iter().all(|r| matches!(r, OriginRule::Exact(_))) {
        AllowOrigin::list(rules.into_iter().filter_map(|r| match r {
            OriginRule::Exact(value) => Some(value),
            OriginRule::Subdomain { .. } => None,
        }))
    } else {
        AllowOrigin::predicate(move |origin, _| rules.iter().any(|r| r.matches(origin)))
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
