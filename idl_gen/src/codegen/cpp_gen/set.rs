//! Marshalling: statements that pack C++ values into a `MsgArg`.
//!
//! Structs and dictionary entries are packed with a single `Set` call whose
//! signature lists every member, nested structs inlined. Members that need
//! conversion first (string arrays, arrays of structs, dictionaries) get a
//! temporary buffer filled by a loop; once the call has been made the
//! container is stabilized so the buffers can be released.

use super::helpers::{counter, flat, for_each, scalar_value, slot, struct_members, Slot};
use crate::fragment::Fragment;
use crate::signature::{ScalarKind, SigType};

/// Pack `source`, a value of type `ty`, into the `MsgArg` named by
/// `container`. `depth` selects the first loop counter.
pub fn generate_set(container: &str, ty: &SigType, source: &str, depth: usize) -> Vec<Fragment> {
    match slot(ty) {
        Slot::Scalar(kind) => vec![Fragment::line(format!(
            "{}.Set(\"{}\", {});",
            container,
            kind.code(),
            scalar_value(kind, source)
        ))],
        Slot::Variant | Slot::Opaque => {
            vec![Fragment::line(format!("{} = {};", container, source))]
        }
        Slot::ScalarArray(kind) if !kind.is_string_like() => vec![Fragment::line(format!(
            "{}.Set(\"{}\", {}NumElements, {});",
            container,
            ty.signature(),
            source,
            source
        ))],
        Slot::ScalarArray(_) | Slot::StructArray(_) | Slot::Dict { .. } => {
            let mut pack = Pack::default();
            let buffer = pack.buffer(ty, source, depth);
            pack.signature = ty.signature();
            pack.values = vec![format!("{}NumElements", source), buffer];
            pack.finish(container)
        }
        Slot::Struct(members) => pack_struct(container, members, source, depth),
    }
}

/// Pack every member of the struct `expr` with one `Set` call.
pub fn pack_struct(container: &str, members: &[SigType], expr: &str, depth: usize) -> Vec<Fragment> {
    let mut pack = Pack::default();
    for member in struct_members(members) {
        pack.member(member.ty, &format!("{}.{}", expr, member.field), depth);
    }
    pack.signature = format!("({})", pack.signature);
    pack.finish(container)
}

/// Pack the `key` and `value` fields of the dictionary entry `expr`.
pub fn pack_dict_entry(
    container: &str,
    key: ScalarKind,
    value: &SigType,
    expr: &str,
    depth: usize,
) -> Vec<Fragment> {
    let mut pack = Pack::default();
    pack.member(&SigType::Basic(key), &format!("{}.key", expr), depth);
    pack.member(value, &format!("{}.value", expr), depth);
    pack.signature = format!("{{{}}}", pack.signature);
    pack.finish(container)
}

#[derive(Default)]
struct Pack {
    prep: Vec<Fragment>,
    signature: String,
    values: Vec<String>,
    temps: Vec<String>,
}

impl Pack {
    fn member(&mut self, ty: &SigType, expr: &str, depth: usize) {
        match slot(ty) {
            Slot::Scalar(kind) => {
                self.signature.push(kind.code());
                self.values.push(scalar_value(kind, expr));
            }
            Slot::Variant => {
                self.signature.push('v');
                self.values.push(format!("&{}", expr));
            }
            Slot::Opaque => {
                self.signature.push('*');
                self.values.push(format!("&{}", expr));
            }
            Slot::ScalarArray(kind) if !kind.is_string_like() => {
                self.signature.push_str(&ty.signature());
                self.values.push(format!("{}NumElements", expr));
                self.values.push(expr.to_string());
            }
            Slot::Struct(members) => {
                self.signature.push('(');
                for member in struct_members(members) {
                    self.member(member.ty, &format!("{}.{}", expr, member.field), depth);
                }
                self.signature.push(')');
            }
            Slot::ScalarArray(_) | Slot::StructArray(_) | Slot::Dict { .. } => {
                let buffer = self.buffer(ty, expr, depth);
                self.signature.push_str(&ty.signature());
                self.values.push(format!("{}NumElements", expr));
                self.values.push(buffer);
            }
        }
    }

    /* Fill a temporary buffer with the converted elements of `expr`; returns its name */
    fn buffer(&mut self, ty: &SigType, expr: &str, depth: usize) -> String {
        let i = counter(depth);
        let element = format!("{}[{}]", expr, i);
        let (temp, alloc, body) = match slot(ty) {
            Slot::StructArray(members) => {
                let temp = format!("temp{}Arg", flat(expr));
                let alloc = format!("MsgArg *{} = new MsgArg[{}NumElements];", temp, expr);
                let target = format!("{}[{}]", temp, i);
                let body = pack_struct(&target, members, &element, depth + 1);
                (temp, alloc, body)
            }
            Slot::Dict { key, value } => {
                let temp = format!("temp{}DictEntries", flat(expr));
                let alloc = format!("MsgArg *{} = new MsgArg[{}NumElements];", temp, expr);
                let target = format!("{}[{}]", temp, i);
                let body = pack_dict_entry(&target, key, value, &element, depth + 1);
                (temp, alloc, body)
            }
            _ => {
                let temp = format!("temp{}Array", flat(expr));
                let alloc = format!(
                    "const char **{} = new const char *[{}NumElements];",
                    temp, expr
                );
                let body = vec![Fragment::line(format!(
                    "{}[{}] = {}.c_str();",
                    temp, i, element
                ))];
                (temp, alloc, body)
            }
        };
        self.prep.push(Fragment::line(alloc));
        self.prep.push(for_each(expr, depth, body));
        self.temps.push(temp.clone());
        temp
    }

    fn finish(self, container: &str) -> Vec<Fragment> {
        let mut out = self.prep;
        let mut call = format!("{}.Set(\"{}\"", container, self.signature);
        for value in &self.values {
            call.push_str(", ");
            call.push_str(value);
        }
        call.push_str(");");
        out.push(Fragment::line(call));
        if !self.temps.is_empty() {
            out.push(Fragment::line(format!("{}.Stabilize();", container)));
            for temp in &self.temps {
                out.push(Fragment::line(format!("delete [] {};", temp)));
            }
        }
        out
    }
}
