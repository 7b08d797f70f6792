//! Per-request data handed to resolvers.
use indexmap::IndexMap;

use crate::error::RequestError;

/// Decoded query string: name → values, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    /// Decode a raw (still percent-encoded) query string.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
            .map_err(|e| RequestError::MalformedQuery(e.to_string()))?;

        let mut values: IndexMap<String, Vec<String>> = IndexMap::new();
        for (name, value) in pairs {
            values.entry(name).or_default().push(value);
        }
        Ok(Self { values })
    }

    /// First value of `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values.get(name)?.first().map(String::as_str)
    }

    /// Every value of `name`.
    pub fn all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `name` carries at least one non-empty value.
    pub fn has_value(&self, name: &str) -> bool {
        self.all(name).iter().any(|v| !v.is_empty())
    }
}

/// Everything a resolver may look at for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Raw request path.
    pub path: String,
    /// Values bound to the route's placeholders.
    pub path_vars: IndexMap<String, String>,
    /// Decoded query parameters.
    pub query: QueryParams,
}

impl RequestContext {
    /// Final path segment, percent-decoded.
    pub fn last_segment(&self) -> Result<String, RequestError> {
        let raw = self.path.rsplit('/').next().unwrap_or_default();
        urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .map_err(|e| RequestError::UnresolvedResource(format!("bad path segment {:?}: {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_repeated_parameters_in_order() {
        let q = QueryParams::parse("symbols=AAPL,MSFT&straddle=true&symbols=TSLA").unwrap();
        assert_eq!(q.first("symbols"), Some("AAPL,MSFT"));
        assert_eq!(q.all("symbols"), ["AAPL,MSFT", "TSLA"]);
        assert_eq!(q.first("straddle"), Some("true"));
        assert_eq!(q.first("missing"), None);
        assert!(q.all("missing").is_empty());
    }

    #[test]
    fn decodes_percent_escapes() {
        let q = QueryParams::parse("symbols=%5EGSPC%2CAAPL").unwrap();
        assert_eq!(q.first("symbols"), Some("^GSPC,AAPL"));
    }

    #[test]
    fn empty_values_do_not_count() {
        let q = QueryParams::parse("symbols=").unwrap();
        assert!(!q.has_value("symbols"));
        assert!(QueryParams::parse("").unwrap().all("symbols").is_empty());
    }

    #[test]
    fn last_segment_is_unescaped() {
        let ctx = RequestContext {
            path: "/v8/finance/chart/BRK%2DB".into(),
            ..Default::default()
        };
        assert_eq!(ctx.last_segment().unwrap(), "BRK-B");
    }

    #[test]
    fn invalid_utf8_segment_is_unresolvable() {
        let ctx = RequestContext {
            path: "/v8/finance/chart/%FF".into(),
            ..Default::default()
        };
        assert!(matches!(ctx.last_segment(), Err(RequestError::UnresolvedResource(_))));
    }
}
