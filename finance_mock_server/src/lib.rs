//! Finance API stub server: process bootstrap around `finance_mock_common`.
//!
//! - `args`: command-line interface.
//! - `loader`: reads the spec and fixture documents.
//! - `api`: axum routers for the stub API and the market-state config endpoint.
#![warn(missing_docs)]
pub mod api;
pub mod args;
pub mod loader;
