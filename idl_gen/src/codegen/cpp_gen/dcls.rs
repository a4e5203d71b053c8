use super::helpers::{dict_body, struct_body};
use crate::fragment::Fragment;
use crate::registry::{CompositeKind, Registry};
use crate::signature::SigType;

/* Emit the aggregate declared under `type_name` for a struct or dictionary entry type */
pub fn generate_declaration(ty: &SigType, type_name: &str) -> Option<Fragment> {
    let body = match ty {
        SigType::Struct(members) => struct_body(members),
        SigType::DictEntry { key, value } => dict_body(*key, value),
        SigType::Basic(_) | SigType::Variant | SigType::Array(_) => return None,
    };
    Some(Fragment::block(format!("struct {}{{", type_name), body, "};"))
}

/// Every composite declaration of the registry's interface, each preceded
/// by a comment naming the argument that introduced it.
pub fn emit_declarations(registry: &Registry) -> Vec<Fragment> {
    let mut out = Vec::new();
    for entry in registry.declarations() {
        let Some(declaration) = generate_declaration(&entry.declared, &entry.type_name) else {
            continue;
        };
        let what = match entry.kind {
            CompositeKind::Struct => "struct",
            CompositeKind::DictEntry => "dictionary entry",
            CompositeKind::CompositeArray => "array element",
        };
        out.push(Fragment::comment(format!(
            "{} for \"{}\" with signature {}",
            what, entry.arg_name, entry.signature
        )));
        out.push(declaration);
        out.push(Fragment::Blank);
    }
    out
}
