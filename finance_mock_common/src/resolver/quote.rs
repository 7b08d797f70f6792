//! Quote resolution.
//!
//! `symbols` is a comma-separated list. Output order follows input order:
//! - a symbol with no fixture at all is skipped (logged, the request carries on);
//! - a symbol without a snapshot for the current session yields `null` in its slot.
use log::{debug, warn};
use serde_json::Value;

use crate::error::RequestError;
use crate::fixture::{QuoteLookup, QuoteTree, ResourceKind};
use crate::market::MarketState;
use crate::request::RequestContext;
use crate::response::{Reply, ResponseBody};

use super::Resolver;

/// Query parameter listing the requested symbols.
pub const SYMBOLS_PARAM: &str = "symbols";

/// Serves quote snapshots.
#[derive(Debug, Clone)]
pub struct QuoteResolver {
    tree: QuoteTree,
}

impl QuoteResolver {
    /// Wrap a quote tree.
    pub fn new(tree: QuoteTree) -> Self {
        Self { tree }
    }
}

impl Resolver for QuoteResolver {
    fn resolve(&self, ctx: &RequestContext, state: MarketState) -> Result<Reply, RequestError> {
        debug!("Retrieving quote resource.");

        let symbols: Vec<&str> = ctx
            .query
            .all(SYMBOLS_PARAM)
            .iter()
            .flat_map(|v| v.split(','))
            .filter(|s| !s.is_empty())
            .collect();
        if symbols.is_empty() {
            return Err(RequestError::MissingRequiredParameter(SYMBOLS_PARAM.to_string()));
        }

        let session = state.fixture_key();
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.tree.lookup(symbol, session) {
                QuoteLookup::Found(quote) => quotes.push(quote.clone()),
                QuoteLookup::MissingSession => {
                    debug!("No {} snapshot for {}", session, symbol);
                    quotes.push(Value::Null);
                }
                QuoteLookup::UnknownSymbol => warn!("No quote fixture for symbol {}", symbol),
            }
        }

        Ok(Reply::ok(ResponseBody::resource(ResourceKind::Quote, quotes)))
    }
}
