//! Chart resolution. The symbol is the last path segment.
use http::StatusCode;
use log::{debug, warn};

use crate::error::RequestError;
use crate::fixture::{ChartTree, ResourceKind, CHART_FALLBACK_SYMBOL};
use crate::market::MarketState;
use crate::request::RequestContext;
use crate::response::{ErrorInfo, Reply, ResponseBody};

use super::Resolver;

const NOT_FOUND_CODE: &str = "Not Found";
const NOT_FOUND_DESCRIPTION: &str = "No data found, symbol may be delisted";

/// Serves single-symbol charts.
#[derive(Debug, Clone)]
pub struct ChartResolver {
    tree: ChartTree,
}

impl ChartResolver {
    /// Wrap a chart tree.
    pub fn new(tree: ChartTree) -> Self {
        Self { tree }
    }
}

impl Resolver for ChartResolver {
    fn resolve(&self, ctx: &RequestContext, _state: MarketState) -> Result<Reply, RequestError> {
        let symbol = ctx.last_segment()?;
        debug!("Retrieving chart resource for {}.", symbol);

        match self.tree.lookup(&symbol) {
            Some((chart, fallback)) => {
                if fallback {
                    debug!("No chart for {}, serving {:?} fixture", symbol, CHART_FALLBACK_SYMBOL);
                }
                Ok(Reply::ok(ResponseBody::resource(ResourceKind::Chart, vec![chart.clone()])))
            }
            None => {
                warn!("No chart for {} and no {:?} fixture", symbol, CHART_FALLBACK_SYMBOL);
                Ok(Reply {
                    status: StatusCode::NOT_FOUND,
                    body: Some(ResponseBody::resource_error(
                        ResourceKind::Chart,
                        ErrorInfo::new(NOT_FOUND_CODE, NOT_FOUND_DESCRIPTION),
                    )),
                })
            }
        }
    }
}
