//! Integration tests for compatibility checking and change reports.

use std::path::PathBuf;

use serde_json::{json, Value};
use swagger_diff::{Changes, Diff, Incompatibilities, Source, SpecOptions, Specification};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> Specification {
    Specification::load(Source::File(fixture(name)), &SpecOptions::default()).unwrap()
}

fn diff(old: &str, new: &str) -> Diff {
    Diff::new(load(old), load(new))
}

fn spec(document: Value) -> Specification {
    Specification::new(document, &SpecOptions::new().validate(false))
}

fn document(paths: Value, definitions: Value) -> Value {
    json!({
        "swagger": "2.0",
        "info": { "title": "Test", "version": "1" },
        "paths": paths,
        "definitions": definitions
    })
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Messages for one endpoint, sorted for stable comparison.
fn sorted(messages: Option<&Vec<String>>) -> Vec<String> {
    let mut messages = messages.cloned().unwrap_or_default();
    messages.sort();
    messages
}

// === Dummy API: every facet changes between v1 and v2 ===

mod dummy_incompatibilities {
    use super::*;

    fn incompatibilities() -> Incompatibilities {
        diff("dummy.v1.json", "dummy.v2.json").incompatibilities()
    }

    #[test]
    fn not_compatible() {
        let diff = diff("dummy.v1.json", "dummy.v2.json");
        assert!(!diff.compatible());
        assert!(!diff.endpoints_compatible());
        assert!(!diff.requests_compatible());
        assert!(!diff.responses_compatible());
    }

    #[test]
    fn missing_endpoints() {
        assert_eq!(
            incompatibilities().endpoints,
            strings(&["post /b/", "put /a/{}"])
        );
    }

    #[test]
    fn request_params() {
        let inc = incompatibilities();
        assert_eq!(
            inc.request_params.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["get /a/", "patch /a/{}", "post /a/", "post /c/", "put /b/{}"]
        );
        assert_eq!(
            sorted(inc.request_params.get("get /a/")),
            strings(&["missing request param: limit (in: query, type: integer)"])
        );
        assert_eq!(
            sorted(inc.request_params.get("post /a/")),
            strings(&["new required request param: extra"])
        );
        assert_eq!(
            sorted(inc.request_params.get("patch /a/{}")),
            strings(&[
                r#"missing request param: name (in: body, type: ["string", "null"])"#,
                "missing request param: obj/thing (in: body, type: integer)",
                "missing request param: str (in: body, type: string)",
            ])
        );
        assert_eq!(
            sorted(inc.request_params.get("put /b/{}")),
            strings(&["new required request param: extra"])
        );
    }

    #[test]
    fn required_member_of_existing_object_is_flagged() {
        // `existing/b` became required under an object the old version
        // already had; `new/a` and `new/b` belong to a brand-new object.
        assert_eq!(
            sorted(incompatibilities().request_params.get("post /c/")),
            strings(&["new required request param: existing/b"])
        );
    }

    #[test]
    fn response_attributes() {
        let inc = incompatibilities();
        assert_eq!(
            inc.response_attributes
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            vec!["get /a/{}", "get /c/", "patch /a/{}", "post /a/", "put /b/{}"]
        );
        for key in ["get /a/{}", "post /a/", "put /b/{}"] {
            assert_eq!(
                sorted(inc.response_attributes.get(key)),
                strings(&["missing attribute from 200 response: description (in: body, type: string)"]),
                "{}",
                key
            );
        }
        assert_eq!(
            sorted(inc.response_attributes.get("patch /a/{}")),
            strings(&[
                "missing attribute from 200 response: obj/thing (in: body, type: integer)",
                "missing attribute from 200 response: objs[]/thing (in: body, type: integer)",
            ])
        );
        assert_eq!(
            sorted(inc.response_attributes.get("get /c/")),
            strings(&[
                "missing 201 response",
                "missing attribute from 200 response: []/name (in: body, type: string)",
            ])
        );
    }

    #[test]
    fn referenced_parameters_and_responses_match_inline_ones() {
        // v2 declares `put /b/{}`'s path parameter and `post /c/`'s 204
        // response through `$ref`; neither shows up as a difference.
        let inc = incompatibilities();
        assert!(!inc.request_params["put /b/{}"]
            .iter()
            .any(|m| m.contains("(in: path")));
        assert!(!inc.response_attributes.contains_key("post /c/"));
    }
}

mod dummy_changes {
    use super::*;

    fn changes() -> Changes {
        diff("dummy.v1.json", "dummy.v2.json").changes()
    }

    #[test]
    fn endpoints() {
        let changes = changes();
        assert!(changes.new_endpoints.is_empty());
        assert_eq!(changes.removed_endpoints, strings(&["post /b/", "put /a/{}"]));
        assert_eq!(changes.deprecated_endpoints, strings(&["get /a/{}"]));
    }

    #[test]
    fn new_request_params() {
        let changes = changes();
        assert_eq!(
            changes
                .new_request_params
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            vec!["patch /a/{}", "post /a/", "post /c/", "put /b/{}"]
        );
        assert_eq!(
            sorted(changes.new_request_params.get("post /a/")),
            strings(&["new request param: extra (in: body, type: string)"])
        );
        assert_eq!(
            sorted(changes.new_request_params.get("patch /a/{}")),
            strings(&[
                "new request param: name (in: body, type: string)",
                "new request param: obj/str (in: body, type: string)",
                "new request param: obj/thing (in: body, type: string)",
            ])
        );
        assert_eq!(
            sorted(changes.new_request_params.get("post /c/")),
            strings(&[
                "new request param: new/a (in: body, type: string)",
                "new request param: new/b (in: body, type: string)",
            ])
        );
    }

    #[test]
    fn removed_sections_mirror_incompatibilities() {
        let diff = diff("dummy.v1.json", "dummy.v2.json");
        let changes = diff.changes();
        let inc = diff.incompatibilities();
        assert_eq!(changes.removed_request_params, inc.request_params);
        assert_eq!(changes.removed_response_attributes, inc.response_attributes);
    }

    #[test]
    fn new_response_attributes() {
        let changes = changes();
        assert_eq!(
            changes
                .new_response_attributes
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            vec!["patch /a/{}"]
        );
        assert_eq!(
            sorted(changes.new_response_attributes.get("patch /a/{}")),
            strings(&[
                "new attribute for 200 response: obj/str (in: body, type: string)",
                "new attribute for 200 response: obj/thing (in: body, type: string)",
                "new attribute for 200 response: objs[]/str (in: body, type: string)",
                "new attribute for 200 response: objs[]/thing (in: body, type: string)",
            ])
        );
    }

    #[test]
    fn relaxed_requirement_is_a_change_not_an_incompatibility() {
        let required = document(
            json!({
                "/a/": {
                    "get": {
                        "parameters": [
                            { "name": "limit", "in": "query", "required": true, "type": "integer" }
                        ],
                        "responses": { "200": { "description": "ok" } }
                    }
                }
            }),
            json!({}),
        );
        let mut optional = required.clone();
        optional["paths"]["/a/"]["get"]["parameters"][0]["required"] = json!(false);

        let diff = Diff::new(spec(required), spec(optional));
        assert!(diff.compatible());
        assert_eq!(
            diff.changes().new_request_params["get /a/"],
            strings(&["limit is no longer required"])
        );
    }
}

// === Petstore: adding endpoints and optional params ===

mod petstore {
    use super::*;

    #[test]
    fn adding_endpoints_is_compatible() {
        let diff = diff("petstore.json", "petstore-with-external-docs.json");
        assert!(diff.compatible());
        assert!(diff.incompatibilities().is_empty());

        let changes = diff.changes();
        assert_eq!(
            changes.new_endpoints,
            strings(&["delete /pets/{}", "get /pets/{}", "post /pets"])
        );
        assert_eq!(
            sorted(changes.new_request_params.get("get /pets")),
            strings(&[
                "new request param: limit (in: query, type: integer)",
                "new request param: tags (in: query, type: array)",
            ])
        );
        assert!(changes.new_response_attributes.is_empty());
    }

    #[test]
    fn removing_endpoints_is_incompatible() {
        let diff = diff("petstore-with-external-docs.json", "petstore.json");
        assert!(!diff.compatible());
        assert!(!diff.endpoints_compatible());
        assert!(!diff.requests_compatible());
        assert!(diff.responses_compatible());

        let inc = diff.incompatibilities();
        assert_eq!(
            inc.endpoints,
            strings(&["delete /pets/{}", "get /pets/{}", "post /pets"])
        );
        assert_eq!(
            sorted(inc.request_params.get("get /pets")),
            strings(&[
                "missing request param: limit (in: query, type: integer)",
                "missing request param: tags (in: query, type: array)",
            ])
        );
    }

    #[test]
    fn json_and_yaml_are_interchangeable() {
        let diff = diff("petstore.json", "petstore.yaml");
        assert!(diff.compatible());
        assert!(diff.changes().is_empty());
    }

    #[test]
    fn load_from_sources() {
        let diff = Diff::load(
            Source::File(fixture("petstore.yaml")),
            Source::Text(
                std::fs::read_to_string(fixture("petstore-with-external-docs.json")).unwrap(),
            ),
            &SpecOptions::default(),
        )
        .unwrap();
        assert!(diff.compatible());
        assert_eq!(diff.new_endpoints().len(), 3);
    }
}

// === Properties that hold for any pair of documents ===

mod properties {
    use super::*;

    const FIXTURES: &[&str] = &[
        "dummy.v1.json",
        "dummy.v2.json",
        "petstore.json",
        "petstore.yaml",
        "petstore-with-external-docs.json",
        "recursive.json",
    ];

    #[test]
    fn comparing_a_document_with_itself_is_empty() {
        for name in FIXTURES {
            let diff = diff(name, name);
            assert!(diff.compatible(), "{}", name);
            assert!(diff.incompatibilities().is_empty(), "{}", name);
            assert!(diff.changes().is_empty(), "{}", name);
        }
    }

    #[test]
    fn endpoint_deltas_are_symmetric() {
        for old in FIXTURES {
            for new in FIXTURES {
                let forward = diff(old, new);
                let backward = diff(new, old);
                assert_eq!(
                    forward.missing_endpoints(),
                    backward.new_endpoints(),
                    "{} -> {}",
                    old,
                    new
                );
                assert_eq!(
                    forward.changes().removed_endpoints,
                    backward.changes().new_endpoints,
                    "{} -> {}",
                    old,
                    new
                );
            }
        }
    }

    #[test]
    fn compatible_agrees_with_incompatibilities() {
        for old in FIXTURES {
            for new in FIXTURES {
                let diff = diff(old, new);
                assert_eq!(
                    diff.compatible(),
                    diff.incompatibilities().is_empty(),
                    "{} -> {}",
                    old,
                    new
                );
            }
        }
    }
}

// === Edge cases ===

mod edge_cases {
    use super::*;

    fn pets(schema: Value) -> Value {
        document(
            json!({
                "/pets": {
                    "post": {
                        "parameters": [{ "name": "pet", "in": "body", "schema": schema }],
                        "responses": { "200": { "description": "ok" } }
                    }
                }
            }),
            json!({
                "Pet": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "tag": { "type": "string" }
                    }
                }
            }),
        )
    }

    #[test]
    fn array_body_flattens_under_list_marker() {
        let direct = spec(pets(json!({ "$ref": "#/definitions/Pet" })));
        let listed = spec(pets(
            json!({ "type": "array", "items": { "$ref": "#/definitions/Pet" } }),
        ));

        let direct: Vec<String> = direct.request_params()["post /pets"]
            .all
            .iter()
            .map(|d| format!("[]/{}", d))
            .collect();
        let listed: Vec<String> = listed.request_params()["post /pets"]
            .all
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(direct, listed);
    }

    #[test]
    fn renamed_path_parameter_keeps_endpoint() {
        let old = spec(document(
            json!({ "/pets/{id}": { "get": { "responses": { "200": { "description": "ok" } } } } }),
            json!({}),
        ));
        let new = spec(document(
            json!({ "/pets/{petId}": { "get": { "responses": { "200": { "description": "ok" } } } } }),
            json!({}),
        ));
        let diff = Diff::new(old, new);
        assert!(diff.endpoints_compatible());
        assert!(diff.changes().new_endpoints.is_empty());
    }

    #[test]
    fn new_required_field_under_new_nested_object_is_compatible() {
        let old = spec(pets(json!({ "$ref": "#/definitions/Pet" })));
        let new = spec(pets(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "tag": { "type": "string" },
                "owner": {
                    "type": "object",
                    "required": ["id"],
                    "properties": { "id": { "type": "integer" } }
                }
            }
        })));
        let diff = Diff::new(old, new);
        assert!(diff.compatible());
        assert_eq!(
            diff.changes().new_request_params["post /pets"],
            strings(&["new request param: owner/id (in: body, type: integer)"])
        );
    }

    #[test]
    fn new_required_top_level_field_is_incompatible() {
        let old = spec(pets(json!({ "$ref": "#/definitions/Pet" })));
        let new = spec(pets(json!({
            "type": "object",
            "required": ["age"],
            "properties": {
                "name": { "type": "string" },
                "tag": { "type": "string" },
                "age": { "type": "integer" }
            }
        })));
        let diff = Diff::new(old, new);
        assert!(!diff.requests_compatible());
        assert_eq!(
            diff.incompatibilities().request_params["post /pets"],
            strings(&["new required request param: age"])
        );
    }

    #[test]
    fn type_change_is_removal_of_old_descriptor() {
        let old = spec(pets(json!({ "$ref": "#/definitions/Pet" })));
        let new = spec(pets(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "tag": { "type": "integer" }
            }
        })));
        let diff = Diff::new(old, new);
        assert_eq!(
            diff.incompatibilities().request_params["post /pets"],
            strings(&["missing request param: tag (in: body, type: string)"])
        );
        assert_eq!(
            diff.changes().new_request_params["post /pets"],
            strings(&["new request param: tag (in: body, type: integer)"])
        );
    }

    #[test]
    fn self_referential_schemas_compare() {
        let tree = document(
            json!({
                "/nodes": {
                    "get": {
                        "responses": {
                            "200": { "description": "ok", "schema": { "$ref": "#/definitions/Node" } }
                        }
                    }
                }
            }),
            json!({
                "Node": {
                    "type": "object",
                    "properties": {
                        "value": { "type": "integer" },
                        "children": { "type": "array", "items": { "$ref": "#/definitions/Node" } }
                    }
                }
            }),
        );
        let mut pruned = tree.clone();
        pruned["definitions"]["Node"]["properties"]
            .as_object_mut()
            .unwrap()
            .remove("value");

        assert!(Diff::new(spec(tree.clone()), spec(tree.clone())).compatible());

        let diff = Diff::new(spec(tree), spec(pruned));
        assert_eq!(
            sorted(diff.incompatibilities().response_attributes.get("get /nodes")),
            strings(&[
                "missing attribute from 200 response: children[]/children[]/value (in: body, type: integer)",
                "missing attribute from 200 response: children[]/value (in: body, type: integer)",
                "missing attribute from 200 response: value (in: body, type: integer)",
            ])
        );
    }

    #[test]
    fn base_path_is_opt_in() {
        let options = SpecOptions::new().base_path(true);
        let old = Specification::load(Source::File(fixture("dummy.v1.json")), &options).unwrap();
        let new = Specification::load(Source::File(fixture("dummy.v2.json")), &options).unwrap();
        let diff = Diff::new(old, new);

        // Different base paths leave nothing in common.
        let inc = diff.incompatibilities();
        assert!(inc.endpoints.contains(&"get /api/a/".to_string()));
        assert!(inc.request_params.is_empty());
        assert!(diff.new_endpoints().contains(&"get /api/v2/a/".to_string()));
    }
}
