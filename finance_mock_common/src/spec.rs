//! Declarative API specification.
//!
//! A spec lists services, and for each service the path templates it serves. A path
//! template maps either straight to an `Operation` (the verb-less layout, answering any
//! HTTP method) or to a table of verb → `Operation`. Every map keeps declaration order,
//! which is what makes "first matching route wins" reproducible.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of a simulated upstream service (e.g. `yfin`).
pub type ServiceId = String;
/// Identifier of a resource inside a service (e.g. `quote`).
pub type ResourceId = String;
/// Path template such as `/v8/finance/chart/{symbol}`.
pub type PathTemplate = String;

/// Top-level specification document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spec {
    /// Services in declaration order.
    #[serde(default)]
    pub services: IndexMap<ServiceId, Service>,
}

/// The path templates served by one service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    /// Path templates in declaration order.
    #[serde(default)]
    pub paths: IndexMap<PathTemplate, PathItem>,
}

/// What a path template is bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathItem {
    /// A single operation answering any method.
    Operation(Operation),
    /// Operations keyed by HTTP verb.
    Verbs(IndexMap<String, Operation>),
}

/// A resource served at a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Resource identifier selecting the resolver and fixture subtree.
    pub resource: ResourceId,
    /// Declared request parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// A declared request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name as it appears in the query string or path template.
    pub name: String,
    /// Whether the request must carry it.
    #[serde(default)]
    pub required: bool,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl Operation {
    /// Names of the parameters flagged as required.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }
}
