//! Route bookkeeping for resources and routes classes
//!
//! axum panics on path syntax it does not accept and on two handlers for
//! the same method and path. Every mapping is checked here first so that a
//! bad configuration surfaces as [`TesseraError::IllegalValue`] from
//! `init()`.

use crate::error::{Result, TesseraError};
use axum::Router;
use axum::http::Method;
use std::collections::HashMap;
use std::collections::HashSet;

/// One method and path served by a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: Method,
    pub path: String,
}

impl RouteKey {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// The router a component contributes, with the routes it serves.
pub struct Mounted {
    pub router: Router,
    pub routes: Vec<RouteKey>,
}

/// Tracks which component serves each route.
#[derive(Debug, Default)]
pub struct RouteTable {
    owners: HashMap<(Method, String), String>,
    // shape → first path registered with that shape
    paths: HashMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `owner` serves `route`.
    ///
    /// Fails when another owner (or `owner` itself) already serves the same
    /// method and path, or when the path only differs from a known path by
    /// capture names (`/user/{id}` against `/user/{name}`).
    pub fn claim(&mut self, owner: &str, route: &RouteKey) -> Result<()> {
        let shape = shape(&route.path);
        if let Some(existing) = self.paths.get(&shape) {
            if *existing != route.path {
                return Err(TesseraError::illegal_value(format!(
                    "{} {} conflicts with {}: captures at the same position must share a name",
                    route.method, route.path, existing
                )));
            }
        }

        let key = (route.method.clone(), shape.clone());
        if let Some(previous) = self.owners.get(&key) {
            let message = if previous == owner {
                format!("{} {} is mapped more than once by '{}'", route.method, route.path, owner)
            } else {
                format!(
                    "{} {} is served by both '{}' and '{}'",
                    route.method, route.path, previous, owner
                )
            };
            return Err(TesseraError::illegal_value(message));
        }

        self.paths.insert(shape, route.path.clone());
        self.owners.insert(key, owner.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Leading slash, no trailing slash (except for the root).
pub(crate) fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Accept only the path syntax axum routes: literal segments, `{name}`
/// captures and a trailing `{*name}` wildcard.
pub(crate) fn check_path(path: &str) -> Result<()> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut captures = HashSet::new();

    for (index, segment) in segments.iter().enumerate() {
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(TesseraError::illegal_value(format!(
                "Invalid segment '{segment}' in {path}: use {{name}} or {{*name}} for captures"
            )));
        }
        if !segment.contains(['{', '}']) {
            continue;
        }

        let Some(inner) = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        else {
            return Err(TesseraError::illegal_value(format!(
                "Invalid segment '{segment}' in {path}: a capture must span the whole segment"
            )));
        };
        let (wildcard, name) = match inner.strip_prefix('*') {
            Some(name) => (true, name),
            None => (false, inner),
        };
        if name.is_empty() || name.contains(['{', '}', '*', ':']) {
            return Err(TesseraError::illegal_value(format!(
                "Invalid capture '{segment}' in {path}"
            )));
        }
        if wildcard && index + 1 != segments.len() {
            return Err(TesseraError::illegal_value(format!(
                "Wildcard '{segment}' must be the last segment of {path}"
            )));
        }
        if !captures.insert(name) {
            return Err(TesseraError::illegal_value(format!(
                "Capture '{name}' appears more than once in {path}"
            )));
        }
    }
    Ok(())
}

/// `/user/{id}/posts/{*rest}` → `/user/{}/posts/{*}`
fn shape(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with("{*") {
                "{*}"
            } else if segment.starts_with('{') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
