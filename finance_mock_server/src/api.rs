//! HTTP surface.
//!
//! Two routers:
//! - [`app_router`] answers every method and path through the `StubServer`; the route
//!   table, not axum, decides what exists.
//! - [`config_router`] accepts `POST` with a form field `state` and switches the shared
//!   market session.
//!
//! Both write JSON through the common formatter, pretty-printed for curl, and stamp the
//! correlation and version headers on every response.
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{CONTENT_TYPE, USER_AGENT},
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Router,
};
use finance_mock_common::request::QueryParams;
use finance_mock_common::response::{
    is_curl, render, DEFAULT_REQUEST_ID, REQUEST_ID_HEADER, VERSION_HEADER,
};
use finance_mock_common::{MarketSession, MarketState, Reply, RequestError, StubServer};
use log::{debug, info, log_enabled, Level};

/// Version reported in the version header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Form field carrying the new market state.
const STATE_FIELD: &str = "state";

/// Router serving the simulated API.
pub fn app_router(stub: Arc<StubServer>) -> Router {
    Router::new().fallback(handle_stub_request).with_state(stub)
}

/// Router serving the market-state config endpoint.
pub fn config_router(market: Arc<MarketSession>) -> Router {
    Router::new().fallback(handle_config_request).with_state(market)
}

async fn handle_stub_request(
    State(stub): State<Arc<StubServer>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    info!("Request: {} {}", method, uri.path());

    let reply = stub.handle(method.as_str(), uri.path(), uri.query());

    if log_enabled!(Level::Debug) {
        if let Some(body) = &reply.body {
            if let Ok(text) = serde_json::to_string_pretty(body) {
                debug!("Response data: {}", text);
            }
        }
    }

    write_response(&headers, start, &reply)
}

async fn handle_config_request(
    State(market): State<Arc<MarketSession>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    info!("Config request: {}", method);

    let reply = match requested_state(&method, &body).and_then(|value| market.set_from_str(&value)) {
        Ok(_) => Reply::status(StatusCode::OK),
        Err(e) => {
            info!("Couldn't parse config request: {}", e);
            e.into_reply()
        }
    };

    write_response(&headers, start, &reply)
}

/// Raw `state` value of a config form. Anything but a `POST` carries none.
fn requested_state(method: &Method, body: &[u8]) -> Result<String, RequestError> {
    if *method != Method::POST {
        return Err(RequestError::InvalidConfigValue(String::new()));
    }
    let form = QueryParams::parse(&String::from_utf8_lossy(body))
        .map_err(|_| RequestError::InvalidConfigValue(String::new()))?;
    Ok(form.first(STATE_FIELD).unwrap_or_default().to_string())
}

fn write_response(request_headers: &HeaderMap, start: Instant, reply: &Reply) -> Response {
    let user_agent = request_headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let rendered = render(reply, is_curl(user_agent));

    let request_id = request_headers
        .get(REQUEST_ID_HEADER)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_REQUEST_ID));

    let status = rendered.status;
    let mut response = (status, rendered.bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), request_id);
    headers.insert(HeaderName::from_static(VERSION_HEADER), HeaderValue::from_static(VERSION));

    info!("Response: elapsed={:?} status={}", start.elapsed(), status.as_u16());
    response
}

/// Names of the accepted market states, for help and log output.
pub fn market_states() -> String {
    MarketState::ALL
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
