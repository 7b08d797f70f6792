//! Reading the spec and fixture documents from disk.
//!
//! Files ending in `.yml` or `.yaml` are decoded as YAML, anything else as JSON.
use std::fs;
use std::path::{Path, PathBuf};

use finance_mock_common::{Fixtures, MockError, Result, Spec};
use log::info;
use serde::de::DeserializeOwned;

/// Encoding of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json` and anything unrecognized.
    Json,
    /// `.yml` / `.yaml`.
    Yaml,
}

impl DocumentFormat {
    /// Format implied by the extension of `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

/// Load the API spec from a JSON or YAML file.
pub fn load_spec(raw_path: &str) -> Result<Spec> {
    let path = normalize_path(raw_path);
    let spec: Spec = load(&path, "spec")?;
    info!("Loaded spec with {} service(s) from {}", spec.services.len(), path.display());
    Ok(spec)
}

/// Load the fixtures from a JSON or YAML file.
pub fn load_fixtures(raw_path: &str) -> Result<Fixtures> {
    let path = normalize_path(raw_path);
    let fixtures: Fixtures = load(&path, "fixtures")?;
    info!("Loaded fixtures for {} service(s) from {}", fixtures.resources.len(), path.display());
    Ok(fixtures)
}

fn load<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .map_err(|e| MockError::Format(format!("error loading {} {}: {}", what, path.display(), e)))?;

    let decoded = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => serde_json::from_str(&text).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str(&text).map_err(|e| e.to_string()),
    };
    decoded.map_err(|e| MockError::Format(format!("error decoding {} {}: {}", what, path.display(), e)))
}

/// Path given on the command line, without surrounding blanks or one pair of double quotes.
fn normalize_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    match raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => PathBuf::from(inner),
        None => PathBuf::from(raw),
    }
}
