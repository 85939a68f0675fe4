// crates/jira-core/src/sanitize.rs - Blank value removal for edited documents
//
// Jira rejects requests that contain empty arrays, empty objects or blank
// strings, and a YAML template cannot tell "leave this field out" apart from
// "this field is blank". The edited document is therefore parsed into a
// dynamic tree first, pruned here, and only then deserialized into the typed
// document.
//
// PRUNING RULES (applied depth-first, children before parents):
// - mapping entries whose value is empty are removed
// - sequence items whose value is empty are removed
// - "empty" means: null, a whitespace-only string, an empty sequence or an
//   empty mapping, including containers that became empty after pruning

use serde_yaml::Value;

/// Prune blank values from `value` in place
///
/// The top-level value itself is never removed; callers decide what an empty
/// root means.
pub fn sanitize(value: &mut Value) {
    match value {
        Value::Mapping(map) => {
            for (_, child) in map.iter_mut() {
                sanitize(child);
            }
            map.retain(|_, child| !is_blank(child));
        }
        Value::Sequence(items) => {
            for child in items.iter_mut() {
                sanitize(child);
            }
            items.retain(|child| !is_blank(child));
        }
        Value::Tagged(tagged) => sanitize(&mut tagged.value),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// Whether a value counts as "absent" for the remote service
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.chars().all(char::is_whitespace),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Tagged(tagged) => is_blank(&tagged.value),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Parse YAML text, prune it and serialize it back
///
/// Returns the cleaned document text, ready to be deserialized into a typed
/// document.
pub fn sanitize_document(text: &str) -> Result<String, serde_yaml::Error> {
    let mut raw: Value = serde_yaml::from_str(text)?;
    sanitize(&mut raw);
    serde_yaml::to_string(&raw)
}
