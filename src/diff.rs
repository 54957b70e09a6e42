//! Compatibility checking between two versions of an API description.
//!
//! Every facet is computed by one enumeration run in two directions:
//! old against new yields incompatibilities, new against old yields the
//! additive changes. The enumerations are lazy iterators, so the
//! `*_compatible` checks stop at the first finding.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::LoadError;
use crate::loader::Source;
use crate::specification::Specification;
use crate::types::{Descriptor, SpecOptions};

/// Messages per endpoint key.
pub type EndpointMessages = BTreeMap<String, Vec<String>>;

/// Which way a facet is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Old document against new: what callers lose.
    Breaking,
    /// New document against old: what callers gain.
    Additive,
}

impl Direction {
    fn required(self, name: &str) -> String {
        match self {
            Direction::Breaking => format!("new required request param: {}", name),
            Direction::Additive => format!("{} is no longer required", name),
        }
    }

    fn param(self, param: &Descriptor) -> String {
        match self {
            Direction::Breaking => format!("missing request param: {}", param),
            Direction::Additive => format!("new request param: {}", param),
        }
    }

    fn attribute(self, code: &str, attribute: &Descriptor) -> String {
        match self {
            Direction::Breaking => format!("missing attribute from {} response: {}", code, attribute),
            Direction::Additive => format!("new attribute for {} response: {}", code, attribute),
        }
    }

    fn status(self, code: &str) -> String {
        match self {
            Direction::Breaking => format!("missing {} response", code),
            Direction::Additive => format!("new {} response", code),
        }
    }
}

/// Breaking differences between an old and a new document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Incompatibilities {
    /// Endpoints of the old document missing from the new one.
    pub endpoints: Vec<String>,
    pub request_params: EndpointMessages,
    pub response_attributes: EndpointMessages,
}

impl Incompatibilities {
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
            && self.request_params.is_empty()
            && self.response_attributes.is_empty()
    }
}

/// Every difference between an old and a new document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Changes {
    pub new_endpoints: Vec<String>,
    pub removed_endpoints: Vec<String>,
    /// Endpoints in both documents, deprecated only in the new one.
    pub deprecated_endpoints: Vec<String>,
    pub new_request_params: EndpointMessages,
    pub removed_request_params: EndpointMessages,
    pub new_response_attributes: EndpointMessages,
    pub removed_response_attributes: EndpointMessages,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.new_endpoints.is_empty()
            && self.removed_endpoints.is_empty()
            && self.deprecated_endpoints.is_empty()
            && self.new_request_params.is_empty()
            && self.removed_request_params.is_empty()
            && self.new_response_attributes.is_empty()
            && self.removed_response_attributes.is_empty()
    }
}

/// Comparison of an old and a new version of an API description.
#[derive(Debug)]
pub struct Diff {
    old: Specification,
    new: Specification,
}

impl Diff {
    pub fn new(old: Specification, new: Specification) -> Self {
        Self { old, new }
    }

    /// Load both documents and compare them.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if either source cannot be read or parsed.
    pub fn load(old: Source, new: Source, options: &SpecOptions) -> Result<Self, LoadError> {
        let old = Specification::load(old, options)?;
        let new = Specification::load(new, options)?;
        Ok(Self::new(old, new))
    }

    pub fn old_spec(&self) -> &Specification {
        &self.old
    }

    pub fn new_spec(&self) -> &Specification {
        &self.new
    }

    /// True when nothing a client of the old document relies on is gone.
    pub fn compatible(&self) -> bool {
        self.endpoints_compatible() && self.requests_compatible() && self.responses_compatible()
    }

    pub fn endpoints_compatible(&self) -> bool {
        self.old
            .endpoints()
            .is_subset(&self.new.endpoints())
    }

    pub fn requests_compatible(&self) -> bool {
        request_param_deltas(&self.old, &self.new, Direction::Breaking)
            .next()
            .is_none()
    }

    pub fn responses_compatible(&self) -> bool {
        response_attribute_deltas(&self.old, &self.new, Direction::Breaking)
            .next()
            .is_none()
    }

    /// Endpoints of the old document absent from the new one, sorted.
    pub fn missing_endpoints(&self) -> Vec<String> {
        endpoint_difference(&self.old, &self.new)
    }

    /// Endpoints of the new document absent from the old one, sorted.
    pub fn new_endpoints(&self) -> Vec<String> {
        endpoint_difference(&self.new, &self.old)
    }

    /// Endpoints present in both documents that became deprecated, sorted.
    pub fn newly_deprecated_endpoints(&self) -> Vec<String> {
        let shared = self.old.endpoints();
        let was_deprecated = self.old.deprecated_endpoints();
        self.new
            .deprecated_endpoints()
            .into_iter()
            .filter(|key| shared.contains(key) && !was_deprecated.contains(key))
            .map(str::to_string)
            .collect()
    }

    pub fn incompatibilities(&self) -> Incompatibilities {
        Incompatibilities {
            endpoints: self.missing_endpoints(),
            request_params: group(request_param_deltas(
                &self.old,
                &self.new,
                Direction::Breaking,
            )),
            response_attributes: group(response_attribute_deltas(
                &self.old,
                &self.new,
                Direction::Breaking,
            )),
        }
    }

    pub fn changes(&self) -> Changes {
        let incompatibilities = self.incompatibilities();
        Changes {
            new_endpoints: self.new_endpoints(),
            removed_endpoints: incompatibilities.endpoints,
            deprecated_endpoints: self.newly_deprecated_endpoints(),
            new_request_params: group(request_param_deltas(
                &self.new,
                &self.old,
                Direction::Additive,
            )),
            removed_request_params: incompatibilities.request_params,
            new_response_attributes: group(response_attribute_deltas(
                &self.new,
                &self.old,
                Direction::Additive,
            )),
            removed_response_attributes: incompatibilities.response_attributes,
        }
    }
}

fn endpoint_difference(from: &Specification, to: &Specification) -> Vec<String> {
    let to = to.endpoints();
    from.endpoints()
        .difference(&to)
        .map(|key| key.to_string())
        .collect()
}

/// Request fields that `to` requires or lacks relative to `from`, for
/// endpoints present in both.
fn request_param_deltas<'s>(
    from: &'s Specification,
    to: &'s Specification,
    direction: Direction,
) -> impl Iterator<Item = (&'s str, String)> + 's {
    let to_params = to.request_params();
    from.request_params()
        .iter()
        .filter_map(move |(key, from)| to_params.get(key).map(|to| (key.as_str(), from, to)))
        .flat_map(move |(key, from, to)| {
            let required = to
                .required
                .difference(&from.required)
                .filter(move |name| !new_child(name, &from.all))
                .map(move |name| (key, direction.required(name)));
            let missing = from
                .all
                .difference(&to.all)
                .map(move |param| (key, direction.param(param)));
            required.chain(missing)
        })
}

/// Response codes and attributes of `from` that `to` lacks, for endpoints
/// present in both.
fn response_attribute_deltas<'s>(
    from: &'s Specification,
    to: &'s Specification,
    direction: Direction,
) -> impl Iterator<Item = (&'s str, String)> + 's {
    let to_responses = to.response_attributes();
    from.response_attributes()
        .iter()
        .filter_map(move |(key, from)| {
            to_responses.get(key).map(|to| (key.as_str(), from, to))
        })
        .flat_map(move |(key, from, to)| {
            from.iter().flat_map(move |(code, from_attributes)| {
                let messages: Vec<String> = match to.get(code) {
                    Some(to_attributes) => from_attributes
                        .difference(to_attributes)
                        .map(|attribute| direction.attribute(code, attribute))
                        .collect(),
                    None => vec![direction.status(code)],
                };
                messages.into_iter().map(move |message| (key, message))
            })
        })
}

/// True when `name` is nested under a parent that has no fields at all in
/// `existing`: a new required member of a brand-new object breaks nobody.
fn new_child(name: &str, existing: &BTreeSet<Descriptor>) -> bool {
    match name.rfind('/') {
        None => false,
        Some(idx) => {
            let parent = &name[..=idx];
            !existing.iter().any(|field| field.path.starts_with(parent))
        }
    }
}

fn group<'s>(deltas: impl Iterator<Item = (&'s str, String)>) -> EndpointMessages {
    let mut grouped = EndpointMessages::new();
    for (key, message) in deltas {
        grouped.entry(key.to_string()).or_default().push(message);
    }
    grouped
}
