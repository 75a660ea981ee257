//! Stateless request builder and response parser for the publishing API.
//!
//! # Design
//! `SinglePlatformClient` holds only configuration and a `Signer`. Each
//! endpoint is split into a `build_*` method that produces a signed
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the HTTP round-trip in between.
//!
//! The `/updated_since/` listing is not offered: it returns locations for
//! every organization on the platform rather than the caller's own.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::signer::{unix_timestamp, Signer};
use crate::types::{collect_locations, PhotoFilter};

#[derive(Debug, Clone)]
pub struct SinglePlatformClient {
    base_url: String,
    dashboard_url: String,
    signer: Signer,
    fixed_timestamp: Option<u64>,
}

impl SinglePlatformClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dashboard_url: config.dashboard_url.trim_end_matches('/').to_string(),
            signer: Signer::new(config.credentials),
            fixed_timestamp: None,
        }
    }

    /// Sign every request at `timestamp` instead of the current time.
    pub fn with_fixed_timestamp(mut self, timestamp: u64) -> Self {
        self.fixed_timestamp = Some(timestamp);
        self
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Summary of a location; `complete` adds location, product and photo details.
    pub fn build_summary(&self, location_id: &str, complete: bool) -> Result<HttpRequest, ApiError> {
        let id = path_segment(location_id)?;
        let path = if complete {
            format!("/locations/{id}/all/")
        } else {
            format!("/locations/{id}/")
        };
        self.build_signed(&path, &[])
    }

    /// Menus of a location; `short` limits each section to a few sample items.
    pub fn build_menu(&self, location_id: &str, short: bool) -> Result<HttpRequest, ApiError> {
        let id = path_segment(location_id)?;
        let path = format!("/locations/{id}/menus/");
        if short {
            self.build_signed(&path, &[("format", "short")])
        } else {
            self.build_signed(&path, &[])
        }
    }

    pub fn build_photos(&self, location_id: &str, filter: PhotoFilter) -> Result<HttpRequest, ApiError> {
        let id = path_segment(location_id)?;
        let path = format!("/locations/{id}/photos/");
        let owned = filter.to_params();
        let params: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.build_signed(&path, &params)
    }

    /// Locations managed by a business, read from the dashboard hierarchy.
    ///
    /// This endpoint is undocumented and authenticated by the dashboard
    /// session cookie (`csrftoken=...; sessionid=...`) rather than a signature.
    pub fn build_managed_locations(&self, business_id: &str, cookie: &str) -> Result<HttpRequest, ApiError> {
        let id = path_segment(business_id)?;
        if cookie.trim().is_empty() {
            return Err(ApiError::Configuration("dashboard cookie is empty".into()));
        }
        let url = format!("{}/hierarchy/list/business/{id}/", self.dashboard_url);
        tracing::debug!(url = %url, "built hierarchy request");
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("cookie".to_string(), cookie.to_string())],
            body: None,
        })
    }

    pub fn parse_summary(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, 200)?;
        parse_json(&response)
    }

    pub fn parse_menu(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, 200)?;
        parse_json(&response)
    }

    pub fn parse_photos(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, 200)?;
        parse_json(&response)
    }

    pub fn parse_managed_locations(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        check_status(&response, 200)?;
        let body = parse_json(&response)?;
        Ok(body
            .get("root_tier")
            .map(collect_locations)
            .unwrap_or_default())
    }

    fn build_signed(&self, path: &str, params: &[(&str, &str)]) -> Result<HttpRequest, ApiError> {
        let timestamp = match self.fixed_timestamp {
            Some(ts) => ts,
            None => unix_timestamp()?,
        };
        let signed = self.signer.sign(HttpMethod::Get, path, params, timestamp)?;
        Ok(HttpRequest {
            method: signed.method,
            url: signed.url(&self.base_url),
            headers: Vec::new(),
            body: None,
        })
    }
}

/// Identifiers must be plain URL path segments.
fn path_segment(id: &str) -> Result<&str, ApiError> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~'));
    if !valid || id == "." || id == ".." {
        return Err(ApiError::InvalidPath(format!("invalid identifier `{id}`")));
    }
    Ok(id)
}

/// Map any other status to `ApiError::Upstream`, keeping the vendor's body.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    tracing::warn!(status = response.status, "unexpected upstream status");
    Err(ApiError::Upstream {
        status: response.status,
        body: response.body.clone(),
    })
}

fn parse_json(response: &HttpResponse) -> Result<Value, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| {
        tracing::warn!(error = %e, "response body is not valid JSON");
        ApiError::Deserialization(e.to_string())
    })
}
