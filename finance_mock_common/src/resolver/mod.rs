//! Resource resolvers.
//!
//! A resolver turns a matched request into a reply by reading its typed fixture tree.
//! One resolver is picked per (service, resource) when the route table is built, so
//! request handling never has to inspect resource ids:
//!
//! - `quote`: [`QuoteResolver`], multi-symbol snapshots for the current session;
//! - `chart`: [`ChartResolver`], one chart with an `error` fallback;
//! - `options`: [`OptionsResolver`], chain or straddle view;
//! - anything else, or a fixture tree of the wrong shape: [`Unresolvable`].
use std::sync::Arc;

use log::warn;

use crate::error::RequestError;
use crate::fixture::{Fixtures, ResourceKind, ResourceTree};
use crate::market::MarketState;
use crate::request::RequestContext;
use crate::response::Reply;

pub mod chart;
pub mod options;
pub mod quote;

pub use chart::ChartResolver;
pub use options::OptionsResolver;
pub use quote::QuoteResolver;

/// Produces the reply for a matched route.
pub trait Resolver: Send + Sync {
    /// Resolve `ctx` against the fixtures, reading quotes for `state`.
    fn resolve(&self, ctx: &RequestContext, state: MarketState) -> Result<Reply, RequestError>;
}

/// Resolver for routes that cannot be served; always answers 500.
#[derive(Debug, Clone)]
pub struct Unresolvable {
    reason: String,
}

impl Unresolvable {
    /// Create one carrying the reason logged on every hit.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Resolver for Unresolvable {
    fn resolve(&self, ctx: &RequestContext, _state: MarketState) -> Result<Reply, RequestError> {
        warn!("Couldn't resolve {} {}: {}", ctx.method, ctx.path, self.reason);
        Err(RequestError::UnresolvedResource(self.reason.clone()))
    }
}

/// Pick the resolver for `resource` of `service`.
///
/// Problems are not fatal: they are logged and the route answers 500.
pub fn for_resource(service: &str, resource: &str, fixtures: &Fixtures) -> Arc<dyn Resolver> {
    let unresolvable = |reason: String| -> Arc<dyn Resolver> {
        warn!("{}/{}: {}", service, resource, reason);
        Arc::new(Unresolvable::new(reason))
    };

    let Ok(kind) = resource.parse::<ResourceKind>() else {
        return unresolvable(format!("unknown resource type {:?}", resource));
    };
    let Some(raw) = fixtures.resource(service, resource) else {
        return unresolvable(format!("no fixtures for resource {:?}", resource));
    };

    match ResourceTree::parse(kind, raw) {
        Ok(ResourceTree::Quote(tree)) => Arc::new(QuoteResolver::new(tree)),
        Ok(ResourceTree::Chart(tree)) => Arc::new(ChartResolver::new(tree)),
        Ok(ResourceTree::Options(tree)) => Arc::new(OptionsResolver::new(tree)),
        Err(e) => unresolvable(format!("fixture shape mismatch for {}: {}", kind, e)),
    }
}
