//! Flattened view of one API description.
//!
//! A [`Specification`] owns its parsed document and exposes, per endpoint,
//! the flattened request parameters and response attributes. Derived maps
//! are computed on first access and kept for the lifetime of the view; the
//! document never changes after construction.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::endpoints::{extract, Operation};
use crate::error::{LoadError, SchemaError};
use crate::loader::{load_document, Source};
use crate::resolver::{resolve_parameter, resolve_ref, resolve_schema};
use crate::types::{Flattened, ResponseAttributes, SpecOptions};
use crate::validator::validate;

#[derive(Debug)]
pub struct Specification {
    document: Value,
    operations: BTreeMap<String, Operation>,
    validation_errors: Vec<SchemaError>,
    request_params: OnceCell<BTreeMap<String, Flattened>>,
    response_attributes: OnceCell<BTreeMap<String, ResponseAttributes>>,
}

impl Specification {
    /// Build a view over an already-parsed document.
    ///
    /// When `options.validate` is set, meta-schema findings are logged as
    /// warnings and kept in [`Self::validation_errors`].
    pub fn new(document: Value, options: &SpecOptions) -> Self {
        let validation_errors = if options.validate {
            let errors = validate(&document);
            for error in &errors {
                tracing::warn!("invalid Swagger 2.0 document: {}", error);
            }
            errors
        } else {
            Vec::new()
        };

        let operations = extract(&document, options);

        Self {
            document,
            operations,
            validation_errors,
            request_params: OnceCell::new(),
            response_attributes: OnceCell::new(),
        }
    }

    /// Load a document from `source` and build a view over it.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the source cannot be read or parsed.
    pub fn load(source: Source, options: &SpecOptions) -> Result<Self, LoadError> {
        let document = load_document(source)?;
        Ok(Self::new(document, options))
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The document's declared `basePath`, if any.
    pub fn base_path(&self) -> Option<&str> {
        self.document.get("basePath").and_then(Value::as_str)
    }

    /// Meta-schema findings gathered at construction.
    pub fn validation_errors(&self) -> &[SchemaError] {
        &self.validation_errors
    }

    /// Raw operations keyed by endpoint key.
    pub fn operations(&self) -> &BTreeMap<String, Operation> {
        &self.operations
    }

    /// Every endpoint key, e.g. `get /pets/{}`.
    pub fn endpoints(&self) -> BTreeSet<&str> {
        self.operations.keys().map(String::as_str).collect()
    }

    /// Endpoints whose operation is marked `deprecated`.
    pub fn deprecated_endpoints(&self) -> BTreeSet<&str> {
        self.operations
            .iter()
            .filter(|(_, op)| op.deprecated)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Flattened request fields per endpoint.
    pub fn request_params(&self) -> &BTreeMap<String, Flattened> {
        self.request_params.get_or_init(|| {
            self.operations
                .iter()
                .map(|(key, op)| (key.clone(), self.flatten_parameters(op)))
                .collect()
        })
    }

    /// Flattened response fields per endpoint and status code.
    pub fn response_attributes(&self) -> &BTreeMap<String, ResponseAttributes> {
        self.response_attributes.get_or_init(|| {
            self.operations
                .iter()
                .map(|(key, op)| (key.clone(), self.flatten_responses(op)))
                .collect()
        })
    }

    fn flatten_parameters(&self, op: &Operation) -> Flattened {
        let mut flat = Flattened::default();
        for parameter in &op.parameters {
            flat.merge(resolve_parameter(&self.document, parameter));
        }
        flat
    }

    fn flatten_responses(&self, op: &Operation) -> ResponseAttributes {
        op.responses
            .iter()
            .map(|(code, response)| {
                let attributes = resolve_ref(&self.document, response)
                    .and_then(|response| response.get("schema"))
                    .map(|schema| resolve_schema(&self.document, schema).all)
                    .unwrap_or_default();
                (code.clone(), attributes)
            })
            .collect()
    }
}
