//! XML Interface Description Loading
//!
//! Reads introspection XML (`<node>`, `<interface>`, `<method>`, `<signal>`,
//! `<property>`) into the `idl_types` model. Every `<node>` that declares
//! at least one interface becomes an [`idl_types::ObjectNode`]; several
//! interfaces on one node are merged into a derived interface.

pub mod errors;
pub mod parser;

pub use errors::LoadError;
pub use parser::{LoaderOptions, XmlLoader};

// Re-export idl_types for convenience
pub use idl_types;
