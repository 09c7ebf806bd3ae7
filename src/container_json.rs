//! Purpose: JSON descriptions of decoded containers and alias tables for CLI output.
//! Exports: `container_json` and `alias_table_json`.
//! Role: Keep CLI output envelopes in one place, separate from the config-shape serializer.
//! Invariants: Raw text reports `kind: "raw"`; operations always report `operation`, `text`, `vars`.
//! Invariants: Variable descriptions nest recursively with the same envelope.

use serde_json::{Map, Value, json};
use textspec::core::{AliasTable, TextContainer};

pub(crate) fn container_json(container: &TextContainer) -> Value {
    let mut map = Map::new();
    match container {
        TextContainer::Raw(text) => {
            map.insert("kind".to_string(), json!("raw"));
            map.insert("text".to_string(), json!(text));
        }
        TextContainer::Operation { name, text, vars } => {
            map.insert("kind".to_string(), json!("operation"));
            map.insert("operation".to_string(), json!(name));
            map.insert("text".to_string(), json!(text));
            let vars: Map<String, Value> = vars
                .iter()
                .map(|(name, var)| (name.clone(), container_json(var)))
                .collect();
            map.insert("vars".to_string(), Value::Object(vars));
        }
    }
    Value::Object(map)
}

pub(crate) fn alias_table_json(table: &AliasTable) -> Value {
    let aliases: Map<String, Value> = table
        .iter()
        .map(|(public, canonical)| (public.to_string(), json!(canonical)))
        .collect();
    let mut map = Map::new();
    map.insert("aliases".to_string(), Value::Object(aliases));
    Value::Object(map)
}
