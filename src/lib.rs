//! Swagger Diff
//!
//! Backwards-compatibility checking for Swagger 2.0 API descriptions.
//!
//! Each document is flattened into a [`Specification`]: per endpoint, the set
//! of request fields (with the subset that is required) and, per response
//! status code, the set of response fields. Two specifications are then
//! compared by a [`Diff`], which reports what a client of the old version
//! would lose ([`Diff::incompatibilities`]) and everything that changed
//! ([`Diff::changes`]).
//!
//! # Example
//!
//! ```
//! use swagger_diff::{Diff, SpecOptions, Specification};
//! use serde_json::json;
//!
//! let old = json!({
//!     "swagger": "2.0",
//!     "info": { "title": "Pets", "version": "1.0" },
//!     "paths": {
//!         "/pets": {
//!             "get": {
//!                 "parameters": [
//!                     { "name": "limit", "in": "query", "type": "integer" }
//!                 ],
//!                 "responses": { "200": { "description": "pets" } }
//!             }
//!         }
//!     }
//! });
//! let mut new = old.clone();
//! new["paths"]["/pets"]["get"]["parameters"] = json!([]);
//!
//! let options = SpecOptions::default();
//! let diff = Diff::new(
//!     Specification::new(old, &options),
//!     Specification::new(new, &options),
//! );
//!
//! assert!(!diff.compatible());
//! assert_eq!(
//!     diff.incompatibilities().request_params["get /pets"],
//!     vec!["missing request param: limit (in: query, type: integer)"]
//! );
//! ```
//!
//! # Descriptors
//!
//! | Schema shape | Descriptor |
//! |--------------|------------|
//! | query parameter | `limit (in: query, type: integer)` |
//! | nested property | `obj/thing (in: body, type: integer)` |
//! | array of objects | `objs[]/thing (in: body, type: integer)` |
//! | array of primitives | `letters (in: body, type: string[])` |
//! | map | `attributes (in: body, type: Hash[string, string])` |
//! | cycle | `obj/self/self (in: body, type: reference)` |

mod diff;
mod endpoints;
mod error;
mod loader;
mod report;
mod resolver;
mod specification;
mod types;
mod validator;

pub use diff::{Changes, Diff, EndpointMessages, Incompatibilities};
pub use endpoints::{extract, Operation};
pub use error::{LoadError, SchemaError, UNSUPPORTED_INPUT};
pub use loader::{is_url, load_document, load_file, load_str, navigate_fragment, Source};
pub use resolver::{resolve_parameter, resolve_ref, resolve_schema, FieldPath};
pub use specification::Specification;
pub use types::{
    endpoint_key, Descriptor, FieldType, Flattened, Location, ResponseAttributes, SpecOptions,
    HTTP_VERBS,
};
pub use validator::validate;

#[cfg(feature = "remote")]
pub use loader::load_url;
