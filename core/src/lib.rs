//! Core utilities and shared types for the PQC readiness toolbox.

mod error;
mod input;
mod target;

pub use error::InputError;
pub use input::{open_bom_tolerant, read_json, require_file, strip_bom};
pub use target::{load_targets, parse_targets, Target, TargetSpecError, DEFAULT_TLS_PORT};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Current UTC time as RFC 3339, or an empty string if formatting fails.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}
