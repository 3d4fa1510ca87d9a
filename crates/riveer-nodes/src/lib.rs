//! Reference node implementations and their registration into a
//! [`riveer_registry::Registry`].

mod array_batcher;
mod http_delta;
mod postgres_spring;

pub use array_batcher::ArrayBatcher;
pub use http_delta::HttpDelta;
pub use postgres_spring::PostgresSpring;

use riveer_registry::{Registry, RegistryError};

/// Registers every reference node type this crate ships under its
/// class id. There's no runtime discovery here (Rust has no
/// `pkgutil.walk_packages` equivalent): every type this process can
/// construct is named explicitly, once, at startup.
pub fn register_builtins(registry: &Registry) -> Result<(), RegistryError> {
  registry.register_spring("postgresql", PostgresSpring::build_node)?;
  registry.register_flow("array_batcher", ArrayBatcher::build_node)?;
  registry.register_delta("http", HttpDelta::build_node)?;
  Ok(())
}
