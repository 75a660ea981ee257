//! HMAC-SHA1 request signing for the SinglePlatform publishing API.
//!
//! The canonical string is the upper-case method, a newline, then the path
//! and form-encoded query exactly as they will be sent:
//!
//! ```text
//! GET\n/locations/haru-sushi/menus/?client=demo-client&format=short&timestamp=1700000000
//! ```
//!
//! The query always starts with `client`, carries the caller's parameters in
//! the order given, and ends with `timestamp`. The base64 HMAC-SHA1 of that
//! string, keyed with the shared secret, is appended as `signature`.
//!
//! This is not the legacy vendor scheme, which signs only `path?query` with
//! no method line and no timestamp. Signatures from the two schemes never
//! match, so this client is not a drop-in replacement for callers or servers
//! that verify the legacy form.
//!
//! Paths must already be in wire form: `/`, unreserved ASCII
//! (`A-Z a-z 0-9 - . _ ~`) and `%XX` escapes. Anything else is rejected so
//! the signed path is byte-for-byte the path that is sent.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::form_urlencoded;

use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::HttpMethod;

type HmacSha1 = Hmac<Sha1>;

/// Query parameter carrying the client id.
pub const CLIENT_PARAM: &str = "client";
/// Query parameter carrying the unix timestamp in seconds.
pub const TIMESTAMP_PARAM: &str = "timestamp";
/// Query parameter carrying the base64 signature. Always last.
pub const SIGNATURE_PARAM: &str = "signature";

/// Path segment of the listing endpoint that returns every organization's
/// locations. Never signed.
const EXCLUDED_SEGMENT: &str = "updated_since";

/// Signs outbound requests with a fixed set of credentials.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

/// A request path and query with its signature attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub timestamp: u64,
    pub signature: String,
    /// The exact string the signature was computed over.
    pub canonical: String,
    query: Vec<(String, String)>,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign `method path?params` at `timestamp` (unix seconds).
    ///
    /// # Errors
    /// - `Configuration` if the client id or secret is empty, or the id is padded
    /// - `InvalidPath` / `ExcludedEndpoint` if the path is unusable or not in wire form
    /// - `ReservedParameter` if `params` names a signing parameter
    pub fn sign(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, &str)],
        timestamp: u64,
    ) -> Result<SignedRequest, ApiError> {
        self.credentials.validate()?;
        validate_path(path)?;
        if let Some((name, _)) = params
            .iter()
            .find(|(name, _)| [CLIENT_PARAM, TIMESTAMP_PARAM, SIGNATURE_PARAM].contains(name))
        {
            return Err(ApiError::ReservedParameter((*name).to_string()));
        }

        let mut query = Vec::with_capacity(params.len() + 3);
        query.push((CLIENT_PARAM.to_string(), self.credentials.client_id().to_string()));
        query.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        query.push((TIMESTAMP_PARAM.to_string(), timestamp.to_string()));

        let canonical = canonical_string(method, path, &encode_query(&query));
        let signature = compute_signature(self.credentials.expose_secret().as_bytes(), &canonical)?;
        query.push((SIGNATURE_PARAM.to_string(), signature.clone()));

        let signed = SignedRequest {
            method,
            path: path.to_string(),
            timestamp,
            signature,
            canonical,
            query,
        };
        tracing::debug!(method = %method, uri = %signed.uri(), "signed request");
        Ok(signed)
    }

    /// Like [`Signer::sign`] but takes the method as a string.
    ///
    /// # Errors
    /// `InvalidMethod` for anything outside GET, POST, PUT and DELETE, plus
    /// everything [`Signer::sign`] can return.
    pub fn sign_str(
        &self,
        method: &str,
        path: &str,
        params: &[(&str, &str)],
        timestamp: u64,
    ) -> Result<SignedRequest, ApiError> {
        self.sign(method.parse()?, path, params, timestamp)
    }

    /// Sign with the current system time.
    ///
    /// # Errors
    /// `Configuration` if the system clock reads before the unix epoch, plus
    /// everything [`Signer::sign`] can return.
    pub fn sign_now(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<SignedRequest, ApiError> {
        self.sign(method, path, params, unix_timestamp()?)
    }
}

impl SignedRequest {
    /// All query parameters in wire order, `signature` last.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Form-encoded query string including the signature.
    pub fn query_string(&self) -> String {
        encode_query(&self.query)
    }

    /// Path plus query, ready to append to a base URL.
    pub fn uri(&self) -> String {
        format!("{}?{}", self.path, self.query_string())
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.uri())
    }
}

/// Build the string the HMAC is computed over.
pub fn canonical_string(method: HttpMethod, path: &str, query: &str) -> String {
    format!("{method}\n{path}?{query}")
}

/// Base64 (standard alphabet, padded) HMAC-SHA1 of `message` keyed by `secret`.
pub fn compute_signature(secret: &[u8], message: &str) -> Result<String, ApiError> {
    let mut mac = HmacSha1::new_from_slice(secret)
        .map_err(|e| ApiError::Configuration(format!("unusable signing key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Current unix time in whole seconds.
pub fn unix_timestamp() -> Result<u64, ApiError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| ApiError::Configuration("system clock is before the unix epoch".into()))
}

fn encode_query(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

fn validate_path(path: &str) -> Result<(), ApiError> {
    if !path.starts_with('/') {
        return Err(ApiError::InvalidPath(format!("`{path}` must start with `/`")));
    }
    if path.contains(|c: char| c == '?' || c == '#') {
        return Err(ApiError::InvalidPath(format!(
            "`{path}` must not carry a query or fragment"
        )));
    }
    if !is_wire_path(path.as_bytes()) {
        return Err(ApiError::InvalidPath(format!(
            "`{path}` must contain only unreserved ASCII and %XX escapes"
        )));
    }
    if path
        .split('/')
        .any(|segment| segment.eq_ignore_ascii_case(EXCLUDED_SEGMENT))
    {
        return Err(ApiError::ExcludedEndpoint(path.to_string()));
    }
    Ok(())
}

fn is_wire_path(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' | b'-' | b'.' | b'_' | b'~' => i += 1,
            b if b.is_ascii_alphanumeric() => i += 1,
            b'%' if bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                i += 3
            }
            _ => return false,
        }
    }
    true
}
