//! Configuration schema validation, coercion, and file loading.

mod coerce;
mod error;
mod header;
mod loader;
mod schema;

pub use coerce::expand_env;
pub use error::ConfigError;
pub use header::{Header, header_schema, validate_header};
pub use loader::{RawConfig, load_configs};
pub use schema::{Field, FieldKind, Schema};
