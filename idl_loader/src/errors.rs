use std::path::PathBuf;
use thiserror::Error;

/// Problems found while reading an interface description. Each one aborts
/// the load; recoverable oddities are reported through `tracing::warn!`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("expected a <node> document root, found <{found}>")]
    UnexpectedRoot { found: String },

    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    #[error("in {member}, all arguments must be named; enable lax naming for generated names")]
    UnnamedArg { member: String },

    #[error("{member} cannot have multiple arguments named '{arg}'")]
    DuplicateArg { member: String, arg: String },

    #[error("argument '{arg}' of {member} has invalid direction '{value}'")]
    InvalidDirection {
        member: String,
        arg: String,
        value: String,
    },

    #[error("property '{property}' has invalid access '{value}'")]
    InvalidAccess { property: String, value: String },

    #[error("two interfaces named '{name}' with different contents")]
    ConflictingInterface { name: String },

    #[error("nested object names must be given and cannot be paths (found '{name}')")]
    NestedNodeName { name: String },

    #[error("more than one object named '{name}'")]
    DuplicateObject { name: String },

    #[error("object name not defined; give it in the XML or on the command line")]
    MissingObjectName,
}
