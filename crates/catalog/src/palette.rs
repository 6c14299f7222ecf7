//! The palette of placeable primitives.
//!
//! Remote listings come in two shapes, both accepted:
//! - an array of type identifiers: `["DocumentIntelligence", "SuperCompute"]`
//! - an object keyed by identifier, as the engine's `/primitives` endpoint
//!   returns it: `{"SuperCompute": {"description": "...", "methods": [...]}}`
//!
//! Malformed entries are skipped, never fatal.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::kind::{Appearance, PrimitiveKind};

/// Primitives that are always available, even with no engine reachable.
pub const BASE_PRIMITIVES: &[&str] = &["CronTrigger"];

// ---------------------------------------------------------------------------
// Primitive
// ---------------------------------------------------------------------------

/// One palette entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Identifier stored in node data and sent to the engine.
    pub type_id: String,
    /// Resolved once at construction; `None` for types without a dedicated look.
    pub kind: Option<PrimitiveKind>,
    pub description: String,
    /// Methods the engine exposes for this primitive.
    pub methods: Vec<String>,
}

impl Primitive {
    pub fn new(type_id: impl Into<String>) -> Self {
        let type_id = type_id.into();
        Self {
            kind: PrimitiveKind::parse(&type_id),
            type_id,
            description: String::new(),
            methods: Vec::new(),
        }
    }

    pub fn appearance(&self) -> Appearance {
        self.kind
            .map(PrimitiveKind::appearance)
            .unwrap_or(Appearance::FALLBACK)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated set of primitives.
///
/// The base primitives always come first; remote entries follow in listing
/// order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Primitive>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// The built-in palette only.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for type_id in BASE_PRIMITIVES {
            catalog.insert(Primitive::new(*type_id));
        }
        catalog
    }

    /// Built-in palette followed by every usable entry of `listing`.
    pub fn from_listing(listing: &Value) -> Self {
        let mut catalog = Self::builtin();

        match listing {
            Value::Array(items) => {
                for item in items {
                    match item.as_str() {
                        Some(type_id) if !type_id.trim().is_empty() => {
                            catalog.insert(Primitive::new(type_id));
                        }
                        _ => warn!("skipping malformed catalog entry: {item}"),
                    }
                }
            }
            Value::Object(map) => {
                for (type_id, details) in map {
                    if type_id.trim().is_empty() {
                        warn!("skipping catalog entry with an empty identifier");
                        continue;
                    }
                    let mut primitive = Primitive::new(type_id.as_str());
                    primitive.description = details
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .trim()
                        .to_owned();
                    primitive.methods = details
                        .get("methods")
                        .and_then(Value::as_array)
                        .map(|methods| {
                            methods
                                .iter()
                                .filter_map(Value::as_str)
                                .map(str::to_owned)
                                .collect()
                        })
                        .unwrap_or_default();
                    catalog.insert(primitive);
                }
            }
            other => warn!("catalog listing is neither a list nor a map: {other}"),
        }

        catalog
    }

    /// Append `primitive` unless its identifier is already present.
    ///
    /// Returns `false` for a duplicate; the first occurrence wins.
    pub fn insert(&mut self, primitive: Primitive) -> bool {
        if self.index.contains_key(&primitive.type_id) {
            return false;
        }
        self.index.insert(primitive.type_id.clone(), self.entries.len());
        self.entries.push(primitive);
        true
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    pub fn get(&self, type_id: &str) -> Option<&Primitive> {
        self.index.get(type_id).map(|&i| &self.entries[i])
    }

    /// Appearance for any type identifier; unknown types get the fallback.
    pub fn appearance(&self, type_id: &str) -> Appearance {
        self.get(type_id)
            .map(Primitive::appearance)
            .unwrap_or(Appearance::FALLBACK)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Icon;
    use serde_json::json;

    fn ids(catalog: &Catalog) -> Vec<&str> {
        catalog.iter().map(|p| p.type_id.as_str()).collect()
    }

    #[test]
    fn builtin_always_has_a_trigger() {
        let catalog = Catalog::builtin();
        assert_eq!(ids(&catalog), vec!["CronTrigger"]);
        assert!(catalog.get("CronTrigger").unwrap().kind.unwrap().is_trigger());
    }

    #[test]
    fn array_listing_is_appended_after_the_base_set() {
        let catalog = Catalog::from_listing(&json!(["DocumentIntelligence", "SuperCompute"]));
        assert_eq!(ids(&catalog), vec!["CronTrigger", "DocumentIntelligence", "SuperCompute"]);
    }

    #[test]
    fn map_listing_uses_keys_and_keeps_details() {
        let catalog = Catalog::from_listing(&json!({
            "SecurityGuardian": { "description": "Threat scoring", "methods": ["scan", "block"] },
            "NetworkManager": {}
        }));

        assert!(catalog.contains("NetworkManager"));
        let guardian = catalog.get("SecurityGuardian").unwrap();
        assert_eq!(guardian.description, "Threat scoring");
        assert_eq!(guardian.methods, vec!["scan", "block"]);
        assert_eq!(guardian.appearance().icon, Icon::Shield);
    }

    #[test]
    fn map_listing_keeps_the_engine_key_order() {
        let listing: Value = serde_json::from_str(
            r#"{ "ZetaScanner": {}, "SuperCompute": {}, "AlphaRelay": { "methods": [] } }"#,
        )
        .unwrap();
        let catalog = Catalog::from_listing(&listing);
        assert_eq!(ids(&catalog), ["CronTrigger", "ZetaScanner", "SuperCompute", "AlphaRelay"]);
    }

    #[test]
    fn duplicates_are_dropped() {
        let catalog = Catalog::from_listing(&json!(["CronTrigger", "SuperCompute", "SuperCompute"]));
        assert_eq!(ids(&catalog), vec!["CronTrigger", "SuperCompute"]);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let catalog = Catalog::from_listing(&json!(["SuperCompute", 42, null, "", { "x": 1 }]));
        assert_eq!(ids(&catalog), vec!["CronTrigger", "SuperCompute"]);
    }

    #[test]
    fn unusable_listing_degrades_to_builtin() {
        let catalog = Catalog::from_listing(&json!("not a listing"));
        assert_eq!(ids(&catalog), vec!["CronTrigger"]);
    }

    #[test]
    fn unknown_types_render_with_the_fallback() {
        let catalog = Catalog::from_listing(&json!(["QuantumOracle"]));
        assert!(catalog.contains("QuantumOracle"));
        assert_eq!(catalog.appearance("QuantumOracle"), Appearance::FALLBACK);
        assert_eq!(catalog.appearance("NeverListed"), Appearance::FALLBACK);
    }
}
