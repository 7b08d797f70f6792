//! Response envelopes and JSON rendering.
//!
//! Every payload leaves the server wrapped the way the real API wraps it:
//!
//! ```json
//! {"quoteResponse": {"result": [...], "error": null}}
//! {"error": {"result": null, "error": {"code": "...", "description": "..."}}}
//! ```
//!
//! Rendering is compact by default and pretty-printed (with a trailing newline) for
//! command-line clients such as curl.
use http::StatusCode;
use log::error;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{INTERNAL_ERROR_DESCRIPTION, INVALID_REQUEST_CODE};
use crate::fixture::ResourceKind;

/// Header carrying the request correlation id (lowercase, as sent on the wire).
pub const REQUEST_ID_HEADER: &str = "request-id";
/// Correlation id used when the client did not send one.
pub const DEFAULT_REQUEST_ID: &str = "req_123";
/// Header carrying the server version.
pub const VERSION_HEADER: &str = "finance-mock-version";

/// Outer key used for generic errors.
const ERROR_KEY: &str = "error";

/// Body written when even the fallback reply cannot be serialized.
const LAST_RESORT_BODY: &[u8] = br#""Internal Server Error""#;

/// `code`/`description` pair sent inside error envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub description: String,
}

impl ErrorInfo {
    /// Build an error from its parts.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// The generic internal error.
    pub fn internal() -> Self {
        Self::new(INVALID_REQUEST_CODE, INTERNAL_ERROR_DESCRIPTION)
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    result: Option<&'a [Value]>,
    error: Option<&'a ErrorInfo>,
}

/// A wrapped response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Successful resource payload.
    Resource {
        /// Resource the result belongs to; selects the outer key.
        kind: ResourceKind,
        /// Result list.
        result: Vec<Value>,
    },
    /// Error payload.
    Error {
        /// Outer key.
        key: &'static str,
        /// Error details.
        info: ErrorInfo,
    },
}

impl ResponseBody {
    /// Wrap `result` under the outer key of `kind`.
    pub fn resource(kind: ResourceKind, result: Vec<Value>) -> Self {
        ResponseBody::Resource { kind, result }
    }

    /// Generic error envelope under the `error` key.
    pub fn error(info: ErrorInfo) -> Self {
        ResponseBody::Error {
            key: ERROR_KEY,
            info,
        }
    }

    /// Error envelope under the outer key of `kind`.
    pub fn resource_error(kind: ResourceKind, info: ErrorInfo) -> Self {
        ResponseBody::Error {
            key: kind.envelope_key(),
            info,
        }
    }
}

impl Serialize for ResponseBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            ResponseBody::Resource { kind, result } => map.serialize_entry(
                kind.envelope_key(),
                &Envelope {
                    result: Some(result.as_slice()),
                    error: None,
                },
            )?,
            ResponseBody::Error { key, info } => map.serialize_entry(
                key,
                &Envelope {
                    result: None,
                    error: Some(info),
                },
            )?,
        }
        map.end()
    }
}

/// Status plus optional body produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// HTTP status.
    pub status: StatusCode,
    /// Payload; `None` renders as the status text.
    pub body: Option<ResponseBody>,
}

impl Reply {
    /// 200 with a payload.
    pub fn ok(body: ResponseBody) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
        }
    }

    /// A reply carrying only a status.
    pub fn status(status: StatusCode) -> Self {
        Self { status, body: None }
    }
}

/// Serialized reply ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Status to send; may differ from the reply's when serialization failed.
    pub status: StatusCode,
    /// JSON bytes.
    pub bytes: Vec<u8>,
}

/// Whether a `User-Agent` value identifies curl.
pub fn is_curl(user_agent: &str) -> bool {
    user_agent.starts_with("curl/")
}

/// Serialize `reply` as compact or pretty JSON.
pub fn render(reply: &Reply, pretty: bool) -> Rendered {
    render_body(reply.status, reply.body.as_ref(), pretty, true)
}

fn render_body<T: Serialize + ?Sized>(
    status: StatusCode,
    body: Option<&T>,
    pretty: bool,
    allow_retry: bool,
) -> Rendered {
    let encoded = match body {
        Some(body) => encode(body, pretty),
        None => encode(&status.canonical_reason().unwrap_or_default(), pretty),
    };

    match encoded {
        Ok(bytes) => Rendered { status, bytes },
        Err(e) if allow_retry => {
            error!("Error serializing response: {}", e);
            render_body::<ResponseBody>(StatusCode::INTERNAL_SERVER_ERROR, None, pretty, false)
        }
        Err(e) => {
            error!("Error serializing fallback response: {}", e);
            Rendered {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                bytes: LAST_RESORT_BODY.to_vec(),
            }
        }
    }
}

fn encode<T: Serialize + ?Sized>(value: &T, pretty: bool) -> serde_json::Result<Vec<u8>> {
    if pretty {
        let mut bytes = serde_json::to_vec_pretty(value)?;
        bytes.push(b'\n');
        Ok(bytes)
    } else {
        serde_json::to_vec(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_curl_by_prefix() {
        assert!(is_curl("curl/7.51.0"));
        assert!(!is_curl("curl"));
        assert!(!is_curl("Mozilla/5.0"));
        assert!(!is_curl(""));
    }

    #[test]
    fn resource_envelopes_use_type_specific_keys() {
        let quote = ResponseBody::resource(ResourceKind::Quote, vec![json!({"symbol": "AAPL"}), Value::Null]);
        assert_eq!(
            serde_json::to_value(&quote).unwrap(),
            json!({"quoteResponse": {"result": [{"symbol": "AAPL"}, null], "error": null}})
        );

        let chart = ResponseBody::resource(ResourceKind::Chart, vec![json!({"meta": {}})]);
        assert_eq!(
            serde_json::to_value(&chart).unwrap(),
            json!({"chart": {"result": [{"meta": {}}], "error": null}})
        );

        let options = ResponseBody::resource(ResourceKind::Options, vec![]);
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"optionChain": {"result": [], "error": null}})
        );
    }

    #[test]
    fn error_envelope_has_null_result() {
        let body = ResponseBody::error(ErrorInfo::internal());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"error": {"result": null, "error": {
                "code": "invalid-request",
                "description": "An internal error occurred."
            }}})
        );
    }

    #[test]
    fn compact_rendering_is_single_line() {
        let reply = Reply::ok(ResponseBody::resource(ResourceKind::Chart, vec![json!({"a": 1})]));
        let rendered = render(&reply, false);
        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(
            String::from_utf8(rendered.bytes).unwrap(),
            r#"{"chart":{"result":[{"a":1}],"error":null}}"#
        );
    }

    #[test]
    fn pretty_rendering_is_indented_and_newline_terminated() {
        let reply = Reply::ok(ResponseBody::resource(ResourceKind::Chart, vec![json!({"a": 1})]));
        let text = String::from_utf8(render(&reply, true).bytes).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"chart\": {"));
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            json!({"chart": {"result": [{"a": 1}], "error": null}})
        );
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn serialization_failure_becomes_bodyless_500() {
        for pretty in [false, true] {
            let rendered = render_body(StatusCode::OK, Some(&Unserializable), pretty, true);
            assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
            let text = String::from_utf8(rendered.bytes).unwrap();
            assert_eq!(text.trim_end(), r#""Internal Server Error""#);
        }
    }

    #[test]
    fn second_failure_uses_static_body() {
        let rendered = render_body(StatusCode::OK, Some(&Unserializable), true, false);
        assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rendered.bytes, LAST_RESORT_BODY);
    }

    #[test]
    fn missing_body_falls_back_to_status_text() {
        let ok = render(&Reply::status(StatusCode::OK), false);
        assert_eq!(ok.bytes, br#""OK""#);

        let bad = render(&Reply::status(StatusCode::BAD_REQUEST), true);
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.bytes, b"\"Bad Request\"\n");
    }
}
