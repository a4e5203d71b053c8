use crate::types::Interface;
use serde_derive::{Deserialize, Serialize};

/// An object exposed on the bus: the generated client and service classes
/// are named after it and it carries the (possibly merged) interface it
/// implements.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ObjectNode {
    /// Class name used for generated files and classes.
    pub name: String,
    /// Absolute object path, e.g. `/org/example/Chat`.
    pub path: String,
    pub interface: Interface,
}

impl ObjectNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>, interface: Interface) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            interface,
        }
    }
}
