//! Path template compilation.
//!
//! A template like `/v8/finance/chart/{symbol}` is split on `/` and turned into an
//! anchored regular expression:
//!
//! - literal segments must match exactly;
//! - a `{name}` segment captures one segment of `[A-Za-z0-9_.-]` under `name`.
//!
//! Patterns are anchored at both ends, so `/v7/finance/quote` does not accept
//! `/v7/finance/quote/extra`. Malformed templates are rejected here, at startup, and
//! never reach request handling.
use indexmap::IndexMap;
use regex::Regex;

use crate::error::MockError;
use crate::Result;

/// Characters accepted inside a captured segment.
const SEGMENT_CLASS: &str = "[A-Za-z0-9_.\\-]+";

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    template: String,
    pattern: Regex,
    params: Vec<String>,
}

impl PathMatcher {
    /// Compile `template` into a matcher.
    pub fn compile(template: &str) -> Result<Self> {
        let mut source = String::from("^");
        let mut params = Vec::new();

        for segment in template.split('/').filter(|s| !s.is_empty()) {
            source.push('/');
            match placeholder_name(template, segment)? {
                Some(name) => {
                    if params.iter().any(|p| p == name) {
                        return Err(invalid(template, format!("duplicate placeholder {{{}}}", name)));
                    }
                    source.push_str(&format!("(?P<{}>{})", name, SEGMENT_CLASS));
                    params.push(name.to_string());
                }
                None => source.push_str(&regex::escape(segment)),
            }
        }

        if params.is_empty() && source.len() == 1 {
            source.push('/');
        }
        source.push('$');

        Ok(PathMatcher {
            template: template.to_string(),
            pattern: Regex::new(&source)?,
            params,
        })
    }

    /// Whether `path` is accepted.
    pub fn is_match(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Values bound to each placeholder, in template order, or `None` if `path` is not
    /// accepted.
    pub fn captures(&self, path: &str) -> Option<IndexMap<String, String>> {
        let caps = self.pattern.captures(path)?;
        Some(
            self.params
                .iter()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Placeholder names in template order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The template this matcher was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Source of the compiled pattern.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// `Some(name)` for a `{name}` segment, `None` for a literal one.
fn placeholder_name<'a>(template: &str, segment: &'a str) -> Result<Option<&'a str>> {
    let has_braces = segment.contains('{') || segment.contains('}');
    if !has_braces {
        return Ok(None);
    }

    let name = segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| invalid(template, format!("unbalanced braces in segment {:?}", segment)))?;

    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(invalid(template, format!("bad placeholder name {:?}", name)));
    }
    Ok(Some(name))
}

fn invalid(template: &str, reason: String) -> MockError {
    MockError::PathTemplate {
        template: template.to_string(),
        reason,
    }
}
