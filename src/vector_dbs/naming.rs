use serde::Serialize;
use serde_json::Value;

use crate::models::normalize_identifier;

const GENERATED_PREFIXES: [&str; 2] = ["vs_", "vdb-"];
const GENERATED_MIN_LEN: usize = 24;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VectorStoreDescriptor {
    pub identifier: String,
    pub display_name: String,
}

/// Server-assigned ids such as `vs_5f1c...` carry no meaning for users.
pub fn is_machine_generated(identifier: &str) -> bool {
    identifier.len() >= GENERATED_MIN_LEN
        && GENERATED_PREFIXES
            .iter()
            .any(|prefix| identifier.starts_with(prefix))
}

pub fn store_identifier(record: &Value) -> String {
    normalize_identifier(record)
}

fn explicit_name(record: &Value) -> Option<&str> {
    ["vector_db_name", "name"]
        .iter()
        .filter_map(|key| record.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|name| !name.is_empty())
}

/// Name field, else the identifier unless it looks generated, else
/// `fallback_label`.
pub fn display_name(record: &Value, fallback_label: &str) -> String {
    if let Some(name) = explicit_name(record) {
        return name.to_string();
    }
    let identifier = store_identifier(record);
    if identifier.is_empty() || is_machine_generated(&identifier) {
        fallback_label.to_string()
    } else {
        identifier
    }
}

pub fn describe(record: &Value, fallback_label: &str) -> VectorStoreDescriptor {
    VectorStoreDescriptor {
        identifier: store_identifier(record),
        display_name: display_name(record, fallback_label),
    }
}

/// Identifiers of the stores whose display name is in `names`, in listing
/// order, plus the names that matched nothing.
pub fn resolve_ids(
    records: &[Value],
    names: &[String],
    fallback_label: &str,
) -> (Vec<String>, Vec<String>) {
    let described: Vec<VectorStoreDescriptor> =
        records.iter().map(|r| describe(r, fallback_label)).collect();

    let ids = described
        .iter()
        .filter(|d| names.contains(&d.display_name))
        .map(|d| d.identifier.clone())
        .collect();
    let unmatched = names
        .iter()
        .filter(|name| !described.iter().any(|d| &d.display_name == *name))
        .cloned()
        .collect();
    (ids, unmatched)
}

/// Record whose display name equals `name`.
pub fn find_by_display_name<'a>(
    records: &'a [Value],
    name: &str,
    fallback_label: &str,
) -> Option<&'a Value> {
    records
        .iter()
        .find(|record| display_name(record, fallback_label) == name)
}

/// The identifier a store registered as `name` ended up with: a record naming
/// it, else an identifier equal to it, else one containing it, else `name`.
pub fn find_store_id(records: &[Value], name: &str) -> String {
    records
        .iter()
        .find(|record| explicit_name(record) == Some(name))
        .or_else(|| records.iter().find(|record| store_identifier(record) == name))
        .or_else(|| {
            records
                .iter()
                .find(|record| store_identifier(record).contains(name))
        })
        .map(store_identifier)
        .unwrap_or_else(|| name.to_string())
}

/// Whether `name` already names or identifies one of `records`.
pub fn store_exists(records: &[Value], name: &str, fallback_label: &str) -> bool {
    records.iter().any(|record| {
        store_identifier(record) == name || display_name(record, fallback_label) == name
    })
}
