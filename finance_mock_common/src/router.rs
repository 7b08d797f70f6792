//! Route table and request dispatch.
//!
//! Every path template of the spec is compiled once at startup. Routes declared under an
//! HTTP verb are grouped by that verb (upper-cased, the way requests arrive); verb-less
//! routes sit in a separate list and answer any method.
//!
//! Request paths are percent-decoded once before matching. Lookup walks the request
//! verb's group first, then the verb-less list, and takes the
//! first matcher that accepts the path. Both lists are kept in spec declaration order,
//! so overlapping templates always resolve the same way.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::error::RequestError;
use crate::fixture::Fixtures;
use crate::market::MarketSession;
use crate::path::PathMatcher;
use crate::request::{QueryParams, RequestContext};
use crate::resolver::{self, Resolver};
use crate::response::Reply;
use crate::spec::{Operation, PathItem, ServiceId, Spec};
use crate::Result;

/// A compiled (matcher, operation) pair.
#[derive(Clone)]
pub struct CompiledRoute {
    /// Service declaring the route.
    pub service: ServiceId,
    /// Matcher compiled from the path template.
    pub matcher: PathMatcher,
    /// The declared operation.
    pub operation: Arc<Operation>,
    /// Resolver chosen for the operation's resource.
    pub resolver: Arc<dyn Resolver>,
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("service", &self.service)
            .field("template", &self.matcher.template())
            .field("resource", &self.operation.resource)
            .finish()
    }
}

/// A route that accepted a request, with its bound path variables.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// The winning route.
    pub route: &'a CompiledRoute,
    /// Values bound to the template's placeholders.
    pub path_vars: IndexMap<String, String>,
}

/// All compiled routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    by_verb: HashMap<String, Vec<CompiledRoute>>,
    any_verb: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile every route declared in `spec`, selecting resolvers from `fixtures`.
    ///
    /// Fails only on malformed path templates. Resource problems leave the route in
    /// place, answering 500.
    pub fn build(spec: &Spec, fixtures: &Fixtures) -> Result<Self> {
        let mut table = RouteTable::default();
        let mut resolvers: HashMap<(&str, &str), Arc<dyn Resolver>> = HashMap::new();
        let mut num_paths = 0;
        let mut num_endpoints = 0;

        for (service, definition) in &spec.services {
            for (template, item) in &definition.paths {
                num_paths += 1;
                let matcher = PathMatcher::compile(template)?;
                debug!("Compiled path: {} -> {}", template, matcher.as_str());

                let operations: Vec<(Option<&str>, &Operation)> = match item {
                    PathItem::Operation(op) => vec![(None, op)],
                    PathItem::Verbs(verbs) => verbs.iter().map(|(v, op)| (Some(v.as_str()), op)).collect(),
                };

                for (verb, operation) in operations {
                    num_endpoints += 1;
                    let resolver = resolvers
                        .entry((service.as_str(), operation.resource.as_str()))
                        .or_insert_with(|| resolver::for_resource(service, &operation.resource, fixtures))
                        .clone();

                    let route = CompiledRoute {
                        service: service.clone(),
                        matcher: matcher.clone(),
                        operation: Arc::new(operation.clone()),
                        resolver,
                    };
                    match verb {
                        Some(verb) => table.by_verb.entry(verb.to_uppercase()).or_default().push(route),
                        None => table.any_verb.push(route),
                    }
                }
            }
        }

        info!("Routing to {} path(s) and {} endpoint(s)", num_paths, num_endpoints);
        Ok(table)
    }

    /// First route accepting `method` and `path`.
    pub fn route(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        let verb_routes = self
            .by_verb
            .get(&method.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default();

        verb_routes
            .iter()
            .chain(self.any_verb.iter())
            .find_map(|route| {
                route
                    .matcher
                    .captures(path)
                    .map(|path_vars| RouteMatch { route, path_vars })
            })
    }

    /// Number of compiled endpoints.
    pub fn len(&self) -> usize {
        self.any_verb.len() + self.by_verb.values().map(Vec::len).sum::<usize>()
    }

    /// Whether no route was compiled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The stub engine: routes plus the shared market session.
#[derive(Debug)]
pub struct StubServer {
    routes: RouteTable,
    market: Arc<MarketSession>,
}

impl StubServer {
    /// Build the engine from a spec and its fixtures.
    pub fn new(spec: &Spec, fixtures: &Fixtures, market: Arc<MarketSession>) -> Result<Self> {
        Ok(Self {
            routes: RouteTable::build(spec, fixtures)?,
            market,
        })
    }

    /// The compiled routes.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The shared market session.
    pub fn market(&self) -> &Arc<MarketSession> {
        &self.market
    }

    /// Serve one request. Never fails: every problem becomes an error reply.
    pub fn handle(&self, method: &str, path: &str, raw_query: Option<&str>) -> Reply {
        let start = Instant::now();
        let reply = self.dispatch(method, path, raw_query).unwrap_or_else(|e| {
            match &e {
                RequestError::RouteNotFound { .. } => info!("{}", e),
                _ => warn!("{} {}: {}", method, path, e),
            }
            e.into_reply()
        });
        debug!("Resolved {} {} in {:?}", method, path, start.elapsed());
        reply
    }

    fn dispatch(&self, method: &str, path: &str, raw_query: Option<&str>) -> Result<Reply, RequestError> {
        let method = method.to_uppercase();
        let not_found = || RequestError::RouteNotFound {
            method: method.clone(),
            path: path.to_string(),
        };
        let path = urlencoding::decode(path).map_err(|_| not_found())?;
        let matched = self.routes.route(&method, &path).ok_or_else(not_found)?;

        let ctx = RequestContext {
            query: QueryParams::parse(raw_query.unwrap_or_default())?,
            path: path.into_owned(),
            path_vars: matched.path_vars,
            method,
        };

        let operation = &matched.route.operation;
        if let Some(missing) = operation
            .required_parameters()
            .find(|name| !ctx.path_vars.contains_key(*name) && !ctx.query.has_value(name))
        {
            return Err(RequestError::MissingRequiredParameter(missing.to_string()));
        }

        let state = self.market.current();
        matched.route.resolver.resolve(&ctx, state)
    }
}
