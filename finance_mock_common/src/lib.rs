//!
//! Engine of the finance API stub server.
//!
//! This crate aggregates:
//! - `spec`: the declarative API specification (services, path templates, operations).
//! - `fixture`: canned responses and their typed per-resource trees.
//! - `path`: path template compilation into anchored matchers.
//! - `router`: the route table and the `StubServer` request dispatcher.
//! - `resolver`: per-resource lookup rules (quote, chart, options).
//! - `market`: the shared simulated market session.
//! - `request`: per-request context and query parsing.
//! - `response`: response envelopes and JSON rendering.
//! - `error` / `result`: the error types and `Result` alias used across the workspace.
#![warn(missing_docs)]
pub mod error;
pub mod fixture;
pub mod market;
pub mod path;
pub mod request;
pub mod resolver;
pub mod response;
pub mod result;
pub mod router;
pub mod spec;

pub use error::{MockError, RequestError};
pub use fixture::Fixtures;
pub use market::{MarketSession, MarketState};
pub use response::{Rendered, Reply};
pub use result::Result;
pub use router::StubServer;
pub use spec::Spec;
