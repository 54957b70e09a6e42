//! Nested bullet reports for [`Changes`] and [`Incompatibilities`].
//!
//! ```text
//! - incompatible request params
//!   - get /a/
//!     - missing request param: limit (in: query, type: integer)
//! ```
//!
//! Empty sections are left out, so an empty result renders as `""`.

use std::fmt::{self, Write};

use crate::diff::{Changes, EndpointMessages, Incompatibilities};

impl fmt::Display for Incompatibilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        endpoints_section(f, "missing endpoints", &self.endpoints)?;
        messages_section(f, "incompatible request params", &self.request_params)?;
        messages_section(f, "incompatible response attributes", &self.response_attributes)
    }
}

impl fmt::Display for Changes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        endpoints_section(f, "new endpoints", &self.new_endpoints)?;
        endpoints_section(f, "removed endpoints", &self.removed_endpoints)?;
        endpoints_section(f, "newly deprecated endpoints", &self.deprecated_endpoints)?;
        messages_section(f, "new request params", &self.new_request_params)?;
        messages_section(f, "removed request params", &self.removed_request_params)?;
        messages_section(f, "new response attributes", &self.new_response_attributes)?;
        messages_section(f, "removed response attributes", &self.removed_response_attributes)
    }
}

fn endpoints_section(out: &mut impl Write, title: &str, endpoints: &[String]) -> fmt::Result {
    if endpoints.is_empty() {
        return Ok(());
    }
    writeln!(out, "- {}", title)?;
    let mut sorted: Vec<&String> = endpoints.iter().collect();
    sorted.sort();
    for endpoint in sorted {
        writeln!(out, "  - {}", endpoint)?;
    }
    Ok(())
}

fn messages_section(out: &mut impl Write, title: &str, groups: &EndpointMessages) -> fmt::Result {
    if groups.values().all(Vec::is_empty) {
        return Ok(());
    }
    writeln!(out, "- {}", title)?;
    // BTreeMap iteration is already sorted by endpoint key.
    for (endpoint, messages) in groups {
        if messages.is_empty() {
            continue;
        }
        writeln!(out, "  - {}", endpoint)?;
        let mut sorted: Vec<&String> = messages.iter().collect();
        sorted.sort();
        for message in sorted {
            writeln!(out, "    - {}", message)?;
        }
    }
    Ok(())
}
