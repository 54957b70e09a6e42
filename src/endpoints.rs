//! Endpoint extraction - one entry per operation in the document's path table.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::resolver::resolve_ref;
use crate::types::{endpoint_key, json_type_name, SpecOptions, HTTP_VERBS};

/// Raw operation node with its effective parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Lowercase HTTP verb.
    pub verb: &'static str,
    /// Path as declared (with `basePath` if requested), parameters not templated.
    pub path: String,
    /// Path-level parameters not overridden by the operation, then the
    /// operation's own parameters.
    pub parameters: Vec<Value>,
    /// Response table keyed by status code (extensions excluded).
    pub responses: Map<String, Value>,
    pub deprecated: bool,
}

/// Collect every operation of `document`, keyed by endpoint key.
///
/// Path items given as `$ref` are skipped with a warning. When two templates
/// share a key (e.g. `/a/{x}` and `/a/{y}`), the later one replaces the earlier.
pub fn extract(document: &Value, options: &SpecOptions) -> BTreeMap<String, Operation> {
    let mut operations = BTreeMap::new();

    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return operations;
    };

    let base_path = if options.base_path {
        document
            .get("basePath")
            .and_then(Value::as_str)
            .map(|base| base.trim_end_matches('/'))
            .unwrap_or("")
    } else {
        ""
    };

    for (path, item) in paths {
        if path.starts_with("x-") {
            continue;
        }
        let Some(item) = item.as_object() else {
            tracing::warn!(
                "path item {} must be an object, got {}; skipping",
                path,
                json_type_name(item)
            );
            continue;
        };
        if let Some(reference) = item.get("$ref") {
            tracing::warn!(
                "path item {} is a reference ({}); not supported, skipping",
                path,
                reference
            );
            continue;
        }

        let shared = parameter_list(item);
        let full_path = format!("{}{}", base_path, path);

        for &verb in HTTP_VERBS {
            let Some(op) = item.get(verb).and_then(Value::as_object) else {
                continue;
            };

            let key = endpoint_key(verb, &full_path);
            if operations.contains_key(&key) {
                tracing::warn!("{} {} replaces earlier endpoint {}", verb, path, key);
            }

            let parameters = merge_parameters(document, &shared, &parameter_list(op));
            let responses = op
                .get("responses")
                .and_then(Value::as_object)
                .map(|responses| {
                    responses
                        .iter()
                        .filter(|(code, _)| !code.starts_with("x-"))
                        .map(|(code, response)| (code.clone(), response.clone()))
                        .collect()
                })
                .unwrap_or_default();

            operations.insert(
                key,
                Operation {
                    verb,
                    path: full_path.clone(),
                    parameters,
                    responses,
                    deprecated: op.get("deprecated").and_then(Value::as_bool) == Some(true),
                },
            );
        }
    }

    operations
}

fn parameter_list(node: &Map<String, Value>) -> Vec<Value> {
    node.get("parameters")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Shared parameters are defaults: an operation parameter with the same
/// name replaces them, whatever its location.
fn merge_parameters(document: &Value, shared: &[Value], own: &[Value]) -> Vec<Value> {
    let own_names: Vec<&str> = own
        .iter()
        .filter_map(|p| parameter_name(document, p))
        .collect();

    shared
        .iter()
        .filter(|p| match parameter_name(document, p) {
            Some(name) => !own_names.contains(&name),
            None => true,
        })
        .chain(own)
        .cloned()
        .collect()
}

fn parameter_name<'a>(document: &'a Value, parameter: &'a Value) -> Option<&'a str> {
    resolve_ref(document, parameter)?.get("name")?.as_str()
}
