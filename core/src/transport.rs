//! Blocking HTTP execution with `ureq`.
//!
//! Status codes are returned as data rather than `Err`, so the client's
//! `parse_*` methods decide what a 4xx/5xx means. Nothing is retried.

use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Agent with status-as-error disabled.
pub fn agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Execute `request` on a fresh agent.
pub fn execute(request: &HttpRequest) -> Result<HttpResponse, ApiError> {
    execute_with(&agent(), request)
}

/// Execute `request` on a caller-provided agent, reusing its connection pool.
pub fn execute_with(agent: &Agent, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
    tracing::debug!(method = %request.method, url = %request.url, "sending request");
    let headers = &request.headers;

    let result = match (request.method, request.body.as_deref()) {
        (HttpMethod::Get, _) => with_headers(agent.get(&request.url), headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&request.url), headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&request.url), headers)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(&request.url), headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(&request.url), headers)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(&request.url), headers).send_empty(),
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
