//! Schema flattening - expands references, compositions, arrays and maps
//! into a flat set of field descriptors.
//!
//! Resolution walks a schema with an explicit [`FieldPath`] stack. Each
//! property pushes a segment; array items mark the current segment as a
//! list (`name[]`). The stack is what makes self-referential schemas finite:
//! before following a `$ref` from a field, the field's name is looked up in
//! the rendered path leading to it, and a hit produces a single `reference`
//! leaf instead of another expansion.

use std::fmt;

use serde_json::{Map, Value};

use crate::loader::navigate_fragment;
use crate::types::{json_type_name, Descriptor, FieldType, Flattened, Location};

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    name: String,
    list: bool,
}

/// Path from a schema root down to the node being resolved.
///
/// Renders as `/`-joined names with `[]` after list segments, e.g.
/// `obj/selfs[]/name`. A list at the root renders as `[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path of a schema root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Descend into a named property.
    pub fn push(&mut self, name: &str) {
        self.segments.push(Segment {
            name: name.to_string(),
            list: false,
        });
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Mark the current node as a list; returns a token for [`Self::unmark_list`].
    ///
    /// At the root there is no field to mark, so an anonymous list segment
    /// is pushed instead.
    fn mark_list(&mut self) -> ListMark {
        match self.segments.last_mut() {
            Some(last) => {
                let was = last.list;
                last.list = true;
                ListMark::Flagged { was }
            }
            None => {
                self.segments.push(Segment {
                    name: String::new(),
                    list: true,
                });
                ListMark::Pushed
            }
        }
    }

    fn unmark_list(&mut self, mark: ListMark) {
        match mark {
            ListMark::Pushed => self.pop(),
            ListMark::Flagged { was } => {
                if let Some(last) = self.segments.last_mut() {
                    last.list = was;
                }
            }
        }
    }

    /// True when the current field's name already occurs in the rendered
    /// prefix leading to it: the prefix is `name/`, or contains `/name/` or
    /// `/name[]/`.
    ///
    /// A name that only opens a longer prefix (`self/x/`) or opens it as a
    /// list (`selfs[]/`) does not count, so such cycles unroll one more level.
    fn revisits(&self) -> bool {
        let Some((last, ancestors)) = self.segments.split_last() else {
            return false;
        };
        if last.name.is_empty() || ancestors.is_empty() {
            return false;
        }

        let mut prefix = render(ancestors);
        prefix.push('/');
        let name = &last.name;
        prefix == format!("{}/", name)
            || prefix.contains(&format!("/{}/", name))
            || prefix.contains(&format!("/{}[]/", name))
    }
}

fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(&segment.name);
        if segment.list {
            out.push_str("[]");
        }
    }
    out
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.segments))
    }
}

#[derive(Debug, Clone, Copy)]
enum ListMark {
    Pushed,
    Flagged { was: bool },
}

/// Flatten a body schema into descriptors.
///
/// Unresolvable references and unsupported shapes are logged and
/// contribute nothing; the rest of the schema is still flattened.
pub fn resolve_schema(document: &Value, schema: &Value) -> Flattened {
    let mut resolver = Resolver::new(document);
    let mut out = Flattened::default();
    resolver.resolve(schema, &mut FieldPath::root(), false, false, &mut out);
    out
}

/// Flatten one operation parameter.
///
/// Body parameters expand their schema; every other location contributes a
/// single leaf named after the parameter, required if the parameter says so.
pub fn resolve_parameter(document: &Value, parameter: &Value) -> Flattened {
    let mut out = Flattened::default();
    let Some(parameter) = resolve_ref(document, parameter) else {
        return out;
    };

    let location = parameter.get("in").and_then(Value::as_str).unwrap_or("");
    if location == "body" {
        match parameter.get("schema") {
            Some(schema) => out.merge(resolve_schema(document, schema)),
            None => tracing::warn!("body parameter without schema"),
        }
        return out;
    }

    let Some(location) = Location::parse(location) else {
        tracing::warn!("unsupported parameter location {:?}; skipping", location);
        return out;
    };
    let Some(name) = parameter.get("name").and_then(Value::as_str) else {
        tracing::warn!("{} parameter without name; skipping", location);
        return out;
    };

    if parameter.get("required").and_then(Value::as_bool) == Some(true) {
        out.required.insert(name.to_string());
    }
    out.all
        .insert(Descriptor::new(name, location, FieldType::declared(parameter)));
    out
}

/// Follow a node's `$ref`, if it has one.
///
/// Returns the node itself when it isn't a reference, and `None` (after
/// logging) when the reference cannot be followed within the document.
pub fn resolve_ref<'a>(document: &'a Value, node: &'a Value) -> Option<&'a Value> {
    match node.get("$ref").and_then(Value::as_str) {
        None => Some(node),
        Some(reference) => lookup(document, reference, "/"),
    }
}

fn lookup<'a>(document: &'a Value, reference: &str, at: &str) -> Option<&'a Value> {
    if !reference.starts_with('#') {
        tracing::warn!(
            "reference {} at {} points outside the document; not supported",
            reference,
            at
        );
        return None;
    }
    let target = navigate_fragment(document, reference);
    if target.is_none() {
        tracing::warn!("unresolvable reference {} at {}", reference, at);
    }
    target
}

struct Resolver<'a> {
    document: &'a Value,
    /// References being expanded, with the path depth they were entered at.
    expanding: Vec<(String, usize)>,
}

impl<'a> Resolver<'a> {
    fn new(document: &'a Value) -> Self {
        Self {
            document,
            expanding: Vec::new(),
        }
    }

    /// Resolve `node` found at `path`.
    ///
    /// `required` says whether the enclosing object lists this field as
    /// required; `inline` whether the node was written in place as a
    /// property or item schema rather than reached through `$ref`.
    fn resolve(
        &mut self,
        node: &'a Value,
        path: &mut FieldPath,
        required: bool,
        inline: bool,
        out: &mut Flattened,
    ) {
        let Some(map) = node.as_object() else {
            tracing::warn!(
                "expected schema object at {}, got {}",
                display_path(path),
                json_type_name(node)
            );
            return;
        };

        if let Some(members) = map.get("allOf").and_then(Value::as_array) {
            if inline {
                tracing::warn!(
                    "allOf nested in {} is not supported; skipping",
                    display_path(path)
                );
                return;
            }
            for member in members {
                self.resolve(member, path, required, false, out);
            }
            return;
        }

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            self.follow(reference, path, out);
            return;
        }

        if let Some(properties) = map.get("properties").and_then(Value::as_object) {
            self.resolve_properties(properties, map, path, out);
            return;
        }

        match map.get("type").and_then(Value::as_str) {
            Some("array") => self.resolve_array(map, path, required, out),
            Some("object") => {
                // Only fields can be maps; an open-ended root has nothing to name.
                if !path.is_root() {
                    let value_type = match map.get("additionalProperties") {
                        Some(additional @ Value::Object(_)) => FieldType::declared(additional),
                        _ => FieldType::Any,
                    };
                    out.all.insert(Descriptor::new(
                        path.to_string(),
                        Location::Body,
                        FieldType::Map(Box::new(value_type)),
                    ));
                }
            }
            _ => {
                if !path.is_root() {
                    leaf(path, FieldType::declared(node), required, out);
                }
            }
        }
    }

    fn resolve_properties(
        &mut self,
        properties: &'a Map<String, Value>,
        schema: &'a Map<String, Value>,
        path: &mut FieldPath,
        out: &mut Flattened,
    ) {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        for (name, property) in properties {
            path.push(name);
            let is_required = required.contains(&name.as_str());
            self.resolve(property, path, is_required, true, out);
            path.pop();
        }
    }

    fn resolve_array(
        &mut self,
        schema: &'a Map<String, Value>,
        path: &mut FieldPath,
        required: bool,
        out: &mut Flattened,
    ) {
        match schema.get("items") {
            Some(items) if is_structured(items) => {
                let mark = path.mark_list();
                self.resolve(items, path, false, true, out);
                path.unmark_list(mark);
            }
            Some(items) => {
                let item_type = FieldType::declared(items);
                if path.is_root() {
                    let mark = path.mark_list();
                    leaf(path, item_type, false, out);
                    path.unmark_list(mark);
                } else {
                    leaf(path, FieldType::ArrayOf(Box::new(item_type)), required, out);
                }
            }
            None => {
                if !path.is_root() {
                    leaf(path, FieldType::Named("array".into()), required, out);
                }
            }
        }
    }

    /// Expand the target of `reference` at `path`, unless doing so would loop.
    fn follow(&mut self, reference: &str, path: &mut FieldPath, out: &mut Flattened) {
        if path.revisits() {
            out.all.insert(Descriptor::new(
                path.to_string(),
                Location::Body,
                FieldType::Reference,
            ));
            return;
        }

        let Some(target) = lookup(self.document, reference, &display_path(path)) else {
            return;
        };

        // A reference re-entered without descending (e.g. `A: {allOf: [$ref: A]}`)
        // would never reach a new field name.
        let depth = path.depth();
        if self
            .expanding
            .iter()
            .any(|(r, d)| r == reference && *d == depth)
        {
            tracing::warn!(
                "reference {} loops back on itself at {}; skipping",
                reference,
                display_path(path)
            );
            return;
        }

        self.expanding.push((reference.to_string(), depth));
        self.resolve(target, path, false, false, out);
        self.expanding.pop();
    }
}

fn leaf(path: &FieldPath, ty: FieldType, required: bool, out: &mut Flattened) {
    let rendered = path.to_string();
    if required {
        out.required.insert(rendered.clone());
    }
    out.all.insert(Descriptor::new(rendered, Location::Body, ty));
}

/// Item schemas that expand into fields rather than typing a primitive array.
fn is_structured(items: &Value) -> bool {
    ["$ref", "properties", "allOf"]
        .iter()
        .any(|key| items.get(key).is_some())
}

fn display_path(path: &FieldPath) -> String {
    if path.is_root() {
        "schema root".to_string()
    } else {
        path.to_string()
    }
}
