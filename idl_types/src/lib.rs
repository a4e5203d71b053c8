//! Interface Model Definitions
//!
//! This crate contains the data structures describing bus interfaces as they
//! are read from XML introspection documents: interfaces with their methods,
//! signals and properties, plus the object nodes that expose them. It holds
//! no XML parsing or code generation logic.

pub mod node;
pub mod types;

// Re-export commonly used types at the crate root
pub use node::*;
pub use types::*;
