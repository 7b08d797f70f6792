//! Canned response fixtures.
//!
//! On disk the fixtures are one JSON document: service → resource → free-form tree.
//! At startup each resource tree is converted into a typed shape chosen by its
//! `ResourceKind`:
//!
//! - quote: symbol → session key (`PRE`/`REGULAR`/`POST`) → quote object;
//! - chart: symbol → chart object, with `error` as the fallback symbol;
//! - options: symbol → `{ "chain": ..., "straddle": ... }`.
//!
//! Anything that does not fit its shape is reported here and never navigated at request
//! time.
use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use crate::spec::{ResourceId, ServiceId};
use crate::Result;

/// Fixture symbol served when a chart symbol is unknown.
pub const CHART_FALLBACK_SYMBOL: &str = "error";

/// All fixtures, keyed by service then resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    /// Raw resource trees.
    #[serde(default)]
    pub resources: IndexMap<ServiceId, IndexMap<ResourceId, Value>>,
}

impl Fixtures {
    /// Raw tree for `resource` of `service`, if present.
    pub fn resource(&self, service: &str, resource: &str) -> Option<&Value> {
        self.resources.get(service)?.get(resource)
    }
}

/// Resource types the server knows how to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    /// Multi-symbol quote snapshots.
    Quote,
    /// Single-symbol chart.
    Chart,
    /// Single-symbol option chain.
    Options,
}

impl ResourceKind {
    /// Outer key wrapping this resource's envelope.
    pub fn envelope_key(self) -> &'static str {
        match self {
            ResourceKind::Quote => "quoteResponse",
            ResourceKind::Chart => "chart",
            ResourceKind::Options => "optionChain",
        }
    }
}

/// symbol → session key → quote object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct QuoteTree {
    symbols: HashMap<String, HashMap<String, Value>>,
}

/// Result of looking a symbol up in a `QuoteTree`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteLookup<'a> {
    /// The symbol has no entry at all.
    UnknownSymbol,
    /// The symbol exists but has no snapshot for the session.
    MissingSession,
    /// The snapshot for the session.
    Found(&'a Value),
}

impl QuoteTree {
    /// Look up `symbol` for `session_key`.
    pub fn lookup(&self, symbol: &str, session_key: &str) -> QuoteLookup<'_> {
        match self.symbols.get(symbol) {
            None => QuoteLookup::UnknownSymbol,
            Some(sessions) => sessions
                .get(session_key)
                .map_or(QuoteLookup::MissingSession, QuoteLookup::Found),
        }
    }
}

/// symbol → chart object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ChartTree {
    charts: HashMap<String, Value>,
}

impl ChartTree {
    /// Chart for `symbol`, falling back to the `error` entry.
    ///
    /// The flag is `true` when the fallback was used.
    pub fn lookup(&self, symbol: &str) -> Option<(&Value, bool)> {
        if let Some(chart) = self.charts.get(symbol) {
            return Some((chart, false));
        }
        self.charts.get(CHART_FALLBACK_SYMBOL).map(|chart| (chart, true))
    }
}

/// Presentation formats stored for one options symbol.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionsEntry {
    /// Full chain, served by default.
    #[serde(default)]
    pub chain: Option<Value>,
    /// Straddle view, served when `straddle=true`.
    #[serde(default)]
    pub straddle: Option<Value>,
}

/// Option presentation selected by the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OptionsFormat {
    /// `chain`
    Chain,
    /// `straddle`
    Straddle,
}

impl OptionsEntry {
    /// Payload stored for `format`.
    pub fn get(&self, format: OptionsFormat) -> Option<&Value> {
        match format {
            OptionsFormat::Chain => self.chain.as_ref(),
            OptionsFormat::Straddle => self.straddle.as_ref(),
        }
    }
}

/// symbol → options entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct OptionsTree {
    symbols: HashMap<String, OptionsEntry>,
}

impl OptionsTree {
    /// Entry for `symbol`.
    pub fn lookup(&self, symbol: &str) -> Option<&OptionsEntry> {
        self.symbols.get(symbol)
    }
}

/// A typed fixture tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceTree {
    /// Quote fixtures.
    Quote(QuoteTree),
    /// Chart fixtures.
    Chart(ChartTree),
    /// Options fixtures.
    Options(OptionsTree),
}

impl ResourceTree {
    /// Convert a raw tree into the shape expected for `kind`.
    pub fn parse(kind: ResourceKind, raw: &Value) -> Result<Self> {
        let tree = match kind {
            ResourceKind::Quote => ResourceTree::Quote(QuoteTree::deserialize(raw)?),
            ResourceKind::Chart => ResourceTree::Chart(ChartTree::deserialize(raw)?),
            ResourceKind::Options => ResourceTree::Options(OptionsTree::deserialize(raw)?),
        };
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_kind_parses_lowercase_ids() {
        assert_eq!("quote".parse::<ResourceKind>().unwrap(), ResourceKind::Quote);
        assert_eq!("options".parse::<ResourceKind>().unwrap(), ResourceKind::Options);
        assert!("screener".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn quote_lookup_distinguishes_missing_symbol_and_session() {
        let raw = json!({"AAPL": {"POST": {"price": 1.0}}});
        let ResourceTree::Quote(tree) = ResourceTree::parse(ResourceKind::Quote, &raw).unwrap() else {
            panic!("expected quote tree");
        };
        assert_eq!(tree.lookup("AAPL", "POST"), QuoteLookup::Found(&json!({"price": 1.0})));
        assert_eq!(tree.lookup("AAPL", "PRE"), QuoteLookup::MissingSession);
        assert_eq!(tree.lookup("MSFT", "POST"), QuoteLookup::UnknownSymbol);
    }

    #[test]
    fn chart_lookup_falls_back_to_error_entry() {
        let raw = json!({"AAPL": {"id": "aapl"}, "error": {"id": "err"}});
        let ResourceTree::Chart(tree) = ResourceTree::parse(ResourceKind::Chart, &raw).unwrap() else {
            panic!("expected chart tree");
        };
        assert_eq!(tree.lookup("AAPL"), Some((&json!({"id": "aapl"}), false)));
        assert_eq!(tree.lookup("NOPE"), Some((&json!({"id": "err"}), true)));
        assert_eq!(ChartTree::default().lookup("NOPE"), None);
    }

    #[test]
    fn structural_mismatch_is_reported() {
        let scalar_symbol = json!({"AAPL": 42});
        assert!(ResourceTree::parse(ResourceKind::Quote, &scalar_symbol).is_err());
        assert!(ResourceTree::parse(ResourceKind::Options, &scalar_symbol).is_err());
        assert!(ResourceTree::parse(ResourceKind::Chart, &json!([1, 2])).is_err());
    }

    #[test]
    fn options_entry_selects_format() {
        let raw = json!({"AAPL": {"chain": {"c": 1}}});
        let ResourceTree::Options(tree) = ResourceTree::parse(ResourceKind::Options, &raw).unwrap() else {
            panic!("expected options tree");
        };
        let entry = tree.lookup("AAPL").unwrap();
        assert_eq!(entry.get(OptionsFormat::Chain), Some(&json!({"c": 1})));
        assert_eq!(entry.get(OptionsFormat::Straddle), None);
        assert!(tree.lookup("MSFT").is_none());
    }

    #[test]
    fn fixtures_expose_nested_resources() {
        let fixtures: Fixtures = serde_json::from_str(r#"{"resources": {"yfin": {"quote": {}}}}"#).unwrap();
        assert_eq!(fixtures.resource("yfin", "quote"), Some(&json!({})));
        assert!(fixtures.resource("yfin", "chart").is_none());
        assert!(fixtures.resource("other", "quote").is_none());
    }
}
