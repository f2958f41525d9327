//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! health probes and dispatch to the redirect endpoint.

use crate::config::{AppState, HealthConfig};
use crate::handler::redirect;
use crate::http;
use crate::logger::{self, AccessLogEntry, ServerLog};
use crate::platform::PLATFORM_HEADER;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    let mut response = route_request(&req, &state);

    if let Ok(name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, name);
    }

    if state.access_log_enabled() {
        let entry = access_log_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Pick the response for a request; never fails
fn route_request<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let method = req.method();

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return resp;
    }
    let is_head = *method == Method::HEAD;

    // 2. Health check endpoints
    if let Some(resp) = check_health(req.uri().path(), &state.config.health, is_head) {
        return resp;
    }

    // 3. Every other path is the redirect endpoint
    redirect::redirect_response(req.headers(), is_head, &ServerLog)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn check_health(
    path: &str,
    health: &HealthConfig,
    is_head: bool,
) -> Option<Response<Full<Bytes>>> {
    if !health.enabled {
        return None;
    }
    if path == health.liveness_path || path == health.readiness_path {
        return Some(http::build_health_response("ok", is_head));
    }
    None
}

fn access_log_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_string(req.headers(), "referer");
    entry.user_agent = header_string(req.headers(), "user-agent");
    entry.platform = header_string(req.headers(), PLATFORM_HEADER);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
