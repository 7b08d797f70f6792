//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `MockError`, so functions can simply return `Result<T>`.
use crate::error::MockError;

/// Workspace-wide `Result` alias with `MockError` as the default error.
pub type Result<T, E = MockError> = std::result::Result<T, E>;
