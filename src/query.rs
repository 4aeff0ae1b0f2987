//! Query-string handling for list pages.
//!
//! Keeps the pairs in request order so that pagination links can rewrite a
//! single parameter and leave the rest of the query untouched.

use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query};
use axum::http::{Uri, request::Parts};
use std::fmt;

/// Ordered, multi-valued query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parameters of a request URI, decoded by axum's `Query` extractor.
    pub fn from_uri(uri: &Uri) -> Result<Self, QueryRejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)?;
        Ok(Self::from_pairs(pairs))
    }

    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Last value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Last non-blank value given for `key`, trimmed.
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Copy of these parameters with `key` set to a single `value`, or removed
    /// when `value` is `None`. An existing key keeps its position.
    pub fn with(&self, key: &str, value: Option<&str>) -> Self {
        let mut pairs = Vec::with_capacity(self.pairs.len() + 1);
        let mut placed = false;
        for (k, v) in &self.pairs {
            if k != key {
                pairs.push((k.clone(), v.clone()));
            } else if let (Some(new), false) = (value, placed) {
                pairs.push((k.clone(), new.to_string()));
                placed = true;
            }
        }
        if let (Some(new), false) = (value, placed) {
            pairs.push((key.to_string(), new.to_string()));
        }
        Self { pairs }
    }

    /// Apply several replacements in order and return the encoded query.
    pub fn transform(&self, updates: &[(&str, Option<&str>)]) -> String {
        updates
            .iter()
            .fold(self.clone(), |acc, (key, value)| acc.with(key, *value))
            .to_string()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = QueryRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_uri(&parts.uri)
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", urlencoding::encode(k), urlencoding::encode(v))?;
        }
        Ok(())
    }
}

/// Parse a bare query string the way a request would be parsed.
#[cfg(test)]
pub(crate) fn parse_query(raw: &str) -> QueryParams {
    let uri: Uri = format!("/?{raw}").parse().expect("Failed to build URI");
    QueryParams::from_uri(&uri).expect("Failed to parse query")
}
