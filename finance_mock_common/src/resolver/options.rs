//! Options resolution.
//!
//! The symbol is the last path segment. An unknown symbol is not an error: it yields an
//! empty result list. `straddle=true` (exactly) switches from the chain to the straddle
//! view.
use log::debug;

use crate::error::RequestError;
use crate::fixture::{OptionsFormat, OptionsTree, ResourceKind};
use crate::market::MarketState;
use crate::request::RequestContext;
use crate::response::{Reply, ResponseBody};

use super::Resolver;

/// Query flag selecting the straddle view.
pub const STRADDLE_PARAM: &str = "straddle";

/// Serves option chains.
#[derive(Debug, Clone)]
pub struct OptionsResolver {
    tree: OptionsTree,
}

impl OptionsResolver {
    /// Wrap an options tree.
    pub fn new(tree: OptionsTree) -> Self {
        Self { tree }
    }
}

/// Presentation requested by `ctx`.
pub fn requested_format(ctx: &RequestContext) -> OptionsFormat {
    match ctx.query.first(STRADDLE_PARAM) {
        Some("true") => OptionsFormat::Straddle,
        _ => OptionsFormat::Chain,
    }
}

impl Resolver for OptionsResolver {
    fn resolve(&self, ctx: &RequestContext, _state: MarketState) -> Result<Reply, RequestError> {
        let symbol = ctx.last_segment()?;
        let format = requested_format(ctx);
        debug!("Retrieving options resource for {} ({}).", symbol, format);

        let Some(entry) = self.tree.lookup(&symbol) else {
            debug!("No options fixture for {}", symbol);
            return Ok(Reply::ok(ResponseBody::resource(ResourceKind::Options, Vec::new())));
        };

        let payload = entry.get(format).ok_or_else(|| {
            RequestError::UnresolvedResource(format!("options fixture for {} has no {} view", symbol, format))
        })?;
        Ok(Reply::ok(ResponseBody::resource(ResourceKind::Options, vec![payload.clone()])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::ResourceTree;
    use crate::request::QueryParams;
    use http::StatusCode;
    use serde_json::{json, Value};

    fn resolver() -> OptionsResolver {
        let raw = json!({
            "AAPL": {"chain": {"view": "chain"}, "straddle": {"view": "straddle"}},
            "MSFT": {"chain": {"view": "msft-chain"}}
        });
        match ResourceTree::parse(ResourceKind::Options, &raw).unwrap() {
            ResourceTree::Options(tree) => OptionsResolver::new(tree),
            other => panic!("unexpected tree {:?}", other),
        }
    }

    fn at(path: &str, q: &str) -> RequestContext {
        RequestContext {
            method: "GET".into(),
            path: path.into(),
            query: QueryParams::parse(q).unwrap(),
            ..Default::default()
        }
    }

    fn body(reply: Reply) -> Value {
        serde_json::to_value(reply.body.unwrap()).unwrap()
    }

    #[test]
    fn chain_is_the_default() {
        let reply = resolver().resolve(&at("/v7/finance/options/AAPL", ""), MarketState::Post).unwrap();
        assert_eq!(
            body(reply),
            json!({"optionChain": {"result": [{"view": "chain"}], "error": null}})
        );
    }

    #[test]
    fn straddle_requires_literal_true() {
        let reply = resolver()
            .resolve(&at("/v7/finance/options/AAPL", "straddle=true"), MarketState::Post)
            .unwrap();
        assert_eq!(body(reply)["optionChain"]["result"][0]["view"], "straddle");

        for q in ["straddle=TRUE", "straddle=1", "straddle=false"] {
            let reply = resolver().resolve(&at("/v7/finance/options/AAPL", q), MarketState::Post).unwrap();
            assert_eq!(body(reply)["optionChain"]["result"][0]["view"], "chain", "{}", q);
        }
    }

    #[test]
    fn unknown_symbol_is_empty_not_error() {
        let reply = resolver().resolve(&at("/v7/finance/options/NOPE", ""), MarketState::Post).unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(body(reply), json!({"optionChain": {"result": [], "error": null}}));
    }

    #[test]
    fn missing_view_is_unresolvable() {
        let err = resolver()
            .resolve(&at("/v7/finance/options/MSFT", "straddle=true"), MarketState::Post)
            .unwrap_err();
        assert!(matches!(err, RequestError::UnresolvedResource(_)));
    }
}
