pub mod cpp;
pub mod cpp_gen;

/// One output file produced for an object node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory.
    pub name: String,
    pub contents: String,
    /// Files holding developer code (signal handler and method bodies).
    /// They are never silently overwritten.
    pub editable: bool,
}

impl GeneratedFile {
    pub fn generated(name: impl Into<String>, contents: String) -> Self {
        Self {
            name: name.into(),
            contents,
            editable: false,
        }
    }

    pub fn editable(name: impl Into<String>, contents: String) -> Self {
        Self {
            name: name.into(),
            contents,
            editable: true,
        }
    }
}
