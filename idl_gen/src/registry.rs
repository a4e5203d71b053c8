//! Composite type discovery.
//!
//! The [`Registry`] collects every struct, dictionary entry and array of
//! composites referenced by one interface and assigns each a synthesized
//! C++ type name derived from the owning argument. It is rebuilt by
//! [`Registry::begin_interface`] for every interface and passed by
//! reference to the generators.

use crate::errors::GenError;
use crate::signature::{
    classify, extract_inner_dict_entry, extract_inner_struct, Shape, SigType,
};
use idl_types::{Arg, Interface};
use indexmap::IndexMap;
use serde_derive::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeKind {
    Struct,
    DictEntry,
    CompositeArray,
}

/// One discovered composite argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompositeEntry {
    pub kind: CompositeKind,
    /// Name of the argument (or property) that referenced the type.
    pub arg_name: String,
    /// Full signature of that argument.
    pub signature: String,
    /// Synthesized C++ type name, e.g. `pointStruct` or `countsDictEntry`.
    pub type_name: String,
    /// The struct or dictionary type declared under `type_name`. For a
    /// composite array this is the element type.
    pub declared: SigType,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Registry {
    interface: Option<String>,
    structs: Vec<CompositeEntry>,
    dict_entries: Vec<CompositeEntry>,
    composite_arrays: Vec<CompositeEntry>,
    #[serde(skip)]
    declared: IndexMap<String, String>,
}

/// Run the discovery pass over a single interface.
pub fn discover(iface: &Interface) -> Result<Registry, GenError> {
    let mut registry = Registry::new();
    registry.begin_interface(iface)?;
    Ok(registry)
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything known about the previous interface and scan
    /// `iface`: method arguments, then signal arguments, then properties,
    /// each in declaration order. On error the registry is left empty.
    pub fn begin_interface(&mut self, iface: &Interface) -> Result<(), GenError> {
        self.clear();
        self.interface = Some(iface.name.clone());
        if let Err(err) = self.populate(iface) {
            self.clear();
            return Err(err);
        }
        debug!(
            interface = %iface.name,
            structs = self.structs.len(),
            dict_entries = self.dict_entries.len(),
            composite_arrays = self.composite_arrays.len(),
            "discovered composite types"
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.interface = None;
        self.structs.clear();
        self.dict_entries.clear();
        self.composite_arrays.clear();
        self.declared.clear();
    }

    fn populate(&mut self, iface: &Interface) -> Result<(), GenError> {
        for method in &iface.methods {
            for arg in &method.args {
                self.consider(&format!("method {}", method.name), arg)?;
            }
        }
        for signal in &iface.signals {
            for arg in &signal.args {
                self.consider(&format!("signal {}", signal.name), arg)?;
            }
        }
        for property in &iface.properties {
            self.consider(&format!("property {}", property.name), &property.arg())?;
        }
        Ok(())
    }

    fn consider(&mut self, member: &str, arg: &Arg) -> Result<(), GenError> {
        let ty = SigType::parse(&arg.signature).map_err(|source| GenError::Signature {
            member: member.to_string(),
            arg: arg.name.clone(),
            source,
        })?;

        let sig = arg.signature.as_str();
        match classify(sig) {
            Shape::Struct => self.insert(
                CompositeKind::Struct,
                arg,
                format!("{}Struct", arg.name),
                extract_inner_struct(sig),
                ty,
            ),
            Shape::DictEntry => self.insert(
                CompositeKind::DictEntry,
                arg,
                format!("{}DictEntry", arg.name),
                extract_inner_dict_entry(sig),
                ty,
            ),
            Shape::Array => {
                /* only the element reached through array prefixes is declared here */
                let (element, _) = ty.peel_arrays();
                let (type_name, declared_signature) = match element {
                    SigType::Struct(_) => {
                        (format!("{}Struct", arg.name), extract_inner_struct(sig))
                    }
                    SigType::DictEntry { .. } => (
                        format!("{}DictEntry", arg.name),
                        extract_inner_dict_entry(sig),
                    ),
                    _ => return Ok(()),
                };
                let element = element.clone();
                self.insert(
                    CompositeKind::CompositeArray,
                    arg,
                    type_name,
                    declared_signature,
                    element,
                )
            }
            Shape::Basic(_) | Shape::Variant | Shape::NonBasic => Ok(()),
        }
    }

    fn insert(
        &mut self,
        kind: CompositeKind,
        arg: &Arg,
        type_name: String,
        declared_signature: &str,
        declared: SigType,
    ) -> Result<(), GenError> {
        let seen = self
            .list(kind)
            .iter()
            .any(|entry| entry.arg_name == arg.name && entry.signature == arg.signature);
        if seen {
            return Ok(());
        }

        match self.declared.get(&type_name) {
            Some(existing) if existing != declared_signature => {
                return Err(GenError::NameCollision {
                    name: type_name,
                    existing: existing.clone(),
                    conflicting: declared_signature.to_string(),
                });
            }
            Some(_) => {}
            None => {
                self.declared
                    .insert(type_name.clone(), declared_signature.to_string());
            }
        }

        let entry = CompositeEntry {
            kind,
            arg_name: arg.name.clone(),
            signature: arg.signature.clone(),
            type_name,
            declared,
        };
        match kind {
            CompositeKind::Struct => self.structs.push(entry),
            CompositeKind::DictEntry => self.dict_entries.push(entry),
            CompositeKind::CompositeArray => self.composite_arrays.push(entry),
        }
        Ok(())
    }

    fn list(&self, kind: CompositeKind) -> &[CompositeEntry] {
        match kind {
            CompositeKind::Struct => &self.structs,
            CompositeKind::DictEntry => &self.dict_entries,
            CompositeKind::CompositeArray => &self.composite_arrays,
        }
    }

    /// Name of the interface the registry currently describes.
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    pub fn structs(&self) -> &[CompositeEntry] {
        &self.structs
    }

    pub fn dict_entries(&self) -> &[CompositeEntry] {
        &self.dict_entries
    }

    pub fn composite_arrays(&self) -> &[CompositeEntry] {
        &self.composite_arrays
    }

    /// One entry per declared type name: structs first, then dictionary
    /// entries, then composite arrays, first-seen order within each.
    pub fn declarations(&self) -> Vec<&CompositeEntry> {
        let mut emitted = Vec::new();
        let mut out = Vec::new();
        for entry in self
            .structs
            .iter()
            .chain(&self.dict_entries)
            .chain(&self.composite_arrays)
        {
            if !emitted.contains(&entry.type_name.as_str()) {
                emitted.push(entry.type_name.as_str());
                out.push(entry);
            }
        }
        out
    }
}
