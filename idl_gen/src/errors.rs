use crate::signature::SignatureError;
use thiserror::Error;

/// Fatal conditions raised while generating code for one interface. Any of
/// these discards all output for that interface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("invalid signature for '{arg}' in {member}: {source}")]
    Signature {
        member: String,
        arg: String,
        #[source]
        source: SignatureError,
    },

    #[error(
        "multiple containers with name '{name}': '{existing}' and '{conflicting}' would both declare it"
    )]
    NameCollision {
        name: String,
        existing: String,
        conflicting: String,
    },

    #[error("{kind} '{name}' is declared by both {first} and {second}")]
    DuplicateMember {
        kind: &'static str,
        name: String,
        first: String,
        second: String,
    },

    #[error("'{name}' in {member} clashes with a name the generated code declares")]
    ReservedName { member: String, name: String },
}
