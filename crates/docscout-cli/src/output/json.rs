//! Machine-readable rendering.

use anyhow::Result;
use docscout_core::discovery::{KnownEntry, KnownSearchResult};
use serde::Serialize;
use serde_json::{Value, json};

/// Pretty-print any serializable value.
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Override entries as `{package, docsUrl, description}` objects.
pub fn known_entries(entries: &[KnownEntry]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|e| {
                json!({
                    "package": e.package,
                    "docsUrl": e.docs_url,
                    "description": e.description,
                })
            })
            .collect(),
    )
}

/// Search hits with their score and the field that matched.
pub fn known_results(results: &[KnownSearchResult]) -> Value {
    Value::Array(
        results
            .iter()
            .map(|r| {
                json!({
                    "package": r.entry.package,
                    "docsUrl": r.entry.docs_url,
                    "description": r.entry.description,
                    "score": r.score,
                    "matchField": r.match_field,
                })
            })
            .collect(),
    )
}
