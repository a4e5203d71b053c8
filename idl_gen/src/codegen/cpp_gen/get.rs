//! Unmarshalling: statements that copy a `MsgArg` into owned C++ values.
//!
//! Values handed out by `MsgArg::Get` borrow from the message. Strings are
//! read through a `char *` temporary and copied into a `String`; arrays
//! are read as a count plus a borrowed pointer, then copied element by
//! element into a freshly allocated destination.

use super::helpers::{
    counter, flat, for_each, nested_type_name, slot, slot_fields, struct_members, type_name, Slot,
};
use crate::fragment::Fragment;
use crate::signature::{ScalarKind, SigType};

/// Copy the value held by `container` into `dest`. With `declare`, local
/// variables for `dest` are declared first.
pub fn generate_get(
    container: &str,
    ty: &SigType,
    dest: &str,
    declare: bool,
    depth: usize,
) -> Vec<Fragment> {
    let mut out = if declare {
        slot_fields(dest, ty, false)
    } else {
        Vec::new()
    };
    out.extend(get_value(container, ty, dest, &type_name(dest, ty), depth));
    out
}

/* `type_name` is the C++ element type of `dest`, qualified when nested */
fn get_value(
    container: &str,
    ty: &SigType,
    dest: &str,
    type_name: &str,
    depth: usize,
) -> Vec<Fragment> {
    match slot(ty) {
        Slot::Scalar(kind) if kind.is_string_like() => {
            let temp = format!("temp{}", flat(dest));
            vec![
                Fragment::line(format!("char *{};", temp)),
                Fragment::line(format!("{}.Get(\"{}\", &{});", container, kind.code(), temp)),
                Fragment::line(format!("{} = {};", dest, temp)),
            ]
        }
        Slot::Scalar(kind) => vec![Fragment::line(format!(
            "{}.Get(\"{}\", &{});",
            container,
            kind.code(),
            dest
        ))],
        Slot::Variant | Slot::Opaque => {
            vec![Fragment::line(format!("{} = {};", dest, container))]
        }
        Slot::Struct(members) => unpack_struct(container, members, dest, type_name, depth),
        Slot::ScalarArray(_) | Slot::StructArray(_) | Slot::Dict { .. } => {
            let mut unpack = Unpack::default();
            unpack.counted(ty, dest, type_name, depth);
            unpack.signature = ty.signature();
            unpack.finish(container)
        }
    }
}

/// Read every member of the struct `expr` with one `Get` call.
pub fn unpack_struct(
    container: &str,
    members: &[SigType],
    expr: &str,
    type_name: &str,
    depth: usize,
) -> Vec<Fragment> {
    let mut unpack = Unpack::default();
    for member in struct_members(members) {
        unpack.member(
            member.ty,
            &format!("{}.{}", expr, member.field),
            &nested_type_name(type_name, &member.field, member.ty),
            depth,
        );
    }
    unpack.signature = format!("({})", unpack.signature);
    unpack.finish(container)
}

/// Read the `key` and `value` fields of the dictionary entry `expr`.
pub fn unpack_dict_entry(
    container: &str,
    key: ScalarKind,
    value: &SigType,
    expr: &str,
    type_name: &str,
    depth: usize,
) -> Vec<Fragment> {
    let mut unpack = Unpack::default();
    unpack.member(
        &SigType::Basic(key),
        &format!("{}.key", expr),
        key.cpp_type(),
        depth,
    );
    unpack.member(
        value,
        &format!("{}.value", expr),
        &nested_type_name(type_name, "value", value),
        depth,
    );
    unpack.signature = format!("{{{}}}", unpack.signature);
    unpack.finish(container)
}

/* Temporaries are declared, filled by a single Get, then copied out */
#[derive(Default)]
struct Unpack {
    decls: Vec<Fragment>,
    signature: String,
    addrs: Vec<String>,
    post: Vec<Fragment>,
}

impl Unpack {
    fn member(&mut self, ty: &SigType, expr: &str, type_name: &str, depth: usize) {
        match slot(ty) {
            Slot::Scalar(kind) if kind.is_string_like() => {
                let temp = format!("temp{}", flat(expr));
                self.decls.push(Fragment::line(format!("char *{};", temp)));
                self.signature.push(kind.code());
                self.addrs.push(format!("&{}", temp));
                self.post.push(Fragment::line(format!("{} = {};", expr, temp)));
            }
            Slot::Scalar(kind) => {
                self.signature.push(kind.code());
                self.addrs.push(format!("&{}", expr));
            }
            Slot::Variant | Slot::Opaque => {
                let temp = format!("temp{}", flat(expr));
                self.decls.push(Fragment::line(format!("MsgArg *{};", temp)));
                self.signature
                    .push(if matches!(ty, SigType::Variant) { 'v' } else { '*' });
                self.addrs.push(format!("&{}", temp));
                self.post.push(Fragment::line(format!("{} = *{};", expr, temp)));
            }
            Slot::Struct(members) => {
                self.signature.push('(');
                for member in struct_members(members) {
                    self.member(
                        member.ty,
                        &format!("{}.{}", expr, member.field),
                        &nested_type_name(type_name, &member.field, member.ty),
                        depth,
                    );
                }
                self.signature.push(')');
            }
            Slot::ScalarArray(_) | Slot::StructArray(_) | Slot::Dict { .. } => {
                self.counted(ty, expr, type_name, depth);
                self.signature.push_str(&ty.signature());
            }
        }
    }

    /* Count plus borrowed elements, then an owned copy of each element */
    fn counted(&mut self, ty: &SigType, expr: &str, type_name: &str, depth: usize) {
        let i = counter(depth);
        let element = format!("{}[{}]", expr, i);
        let (temp, decl, body) = match slot(ty) {
            Slot::ScalarArray(kind) if !kind.is_string_like() => {
                let temp = format!("temp{}Array", flat(expr));
                let decl = format!("{} *{};", kind.cpp_type(), temp);
                let body = vec![Fragment::line(format!(
                    "{} = {}[{}];",
                    element, temp, i
                ))];
                (temp, decl, body)
            }
            Slot::StructArray(members) => {
                let temp = format!("temp{}Arg", flat(expr));
                let decl = format!("const MsgArg *{};", temp);
                let source = format!("{}[{}]", temp, i);
                let body = unpack_struct(&source, members, &element, type_name, depth + 1);
                (temp, decl, body)
            }
            Slot::Dict { key, value } => {
                let temp = format!("temp{}DictEntries", flat(expr));
                let decl = format!("const MsgArg *{};", temp);
                let source = format!("{}[{}]", temp, i);
                let body =
                    unpack_dict_entry(&source, key, value, &element, type_name, depth + 1);
                (temp, decl, body)
            }
            _ => {
                let temp = format!("temp{}Array", flat(expr));
                let decl = format!("const MsgArg *{};", temp);
                let source = format!("{}[{}]", temp, i);
                let body = get_value(&source, ty_element(ty), &element, type_name, depth + 1);
                (temp, decl, body)
            }
        };
        self.decls.push(Fragment::line(decl));
        self.addrs.push(format!("&{}NumElements", expr));
        self.addrs.push(format!("&{}", temp));
        self.post.push(Fragment::line(format!(
            "{} = new {}[{}NumElements];",
            expr, type_name, expr
        )));
        self.post.push(for_each(expr, depth, body));
    }

    fn finish(self, container: &str) -> Vec<Fragment> {
        let mut out = self.decls;
        let mut call = format!("{}.Get(\"{}\"", container, self.signature);
        for addr in &self.addrs {
            call.push_str(", ");
            call.push_str(addr);
        }
        call.push_str(");");
        out.push(Fragment::line(call));
        out.extend(self.post);
        out
    }
}

fn ty_element(ty: &SigType) -> &SigType {
    match ty {
        SigType::Array(element) => element,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::render;

    fn get(container: &str, sig: &str, dest: &str, declare: bool) -> String {
        let ty = SigType::parse(sig).unwrap();
        render(&generate_get(container, &ty, dest, declare, 0))
    }

    #[test]
    fn string_scalar_is_copied_from_temporary() {
        assert_eq!(
            get("returnArgs[0]", "s", "reply", false),
            "char *tempreply;\nreturnArgs[0].Get(\"s\", &tempreply);\nreply = tempreply;\n"
        );
    }

    #[test]
    fn numeric_scalar_is_read_in_place() {
        assert_eq!(
            get("args[0]", "u", "id", true),
            "unsigned int id;\nargs[0].Get(\"u\", &id);\n"
        );
    }

    #[test]
    fn variant_is_assigned() {
        assert_eq!(get("args[2]", "v", "payload", true), "MsgArg payload;\npayload = args[2];\n");
    }

    #[test]
    fn dictionary_copies_every_entry() {
        assert_eq!(
            get("value", "a{si}", "counts", false),
            "const MsgArg *tempcountsDictEntries;\n\
             value.Get(\"a{si}\", &countsNumElements, &tempcountsDictEntries);\n\
             counts = new countsDictEntry[countsNumElements];\n\
             for (size_t i0 = 0; i0 < countsNumElements; i0++) {\n\
             \x20   char *tempcountsi0_key;\n\
             \x20   tempcountsDictEntries[i0].Get(\"{si}\", &tempcountsi0_key, &counts[i0].value);\n\
             \x20   counts[i0].key = tempcountsi0_key;\n\
             }\n"
        );
    }

    #[test]
    fn numeric_array_is_copied_into_owned_buffer() {
        assert_eq!(
            get("args[0]", "ay", "data", true),
            "unsigned char *data;\n\
             size_t dataNumElements;\n\
             unsigned char *tempdataArray;\n\
             args[0].Get(\"ay\", &dataNumElements, &tempdataArray);\n\
             data = new unsigned char[dataNumElements];\n\
             for (size_t i0 = 0; i0 < dataNumElements; i0++) {\n\
             \x20   data[i0] = tempdataArray[i0];\n\
             }\n"
        );
    }

    #[test]
    fn string_array_takes_a_copy_of_each_element() {
        let out = get("args[0]", "as", "names", false);
        assert!(out.starts_with("const MsgArg *tempnamesArray;\n"));
        assert!(out.contains("names = new String[namesNumElements];\n"));
        assert!(out.contains(
            "    char *tempnamesi0;\n    tempnamesArray[i0].Get(\"s\", &tempnamesi0);\n    names[i0] = tempnamesi0;\n"
        ));
    }

    #[test]
    fn struct_array_unpacks_each_element() {
        let out = get("returnArgs[0]", "a(is)", "records", false);
        assert!(out.contains("const MsgArg *temprecordsArg;\n"));
        assert!(out.contains("records = new recordsStruct[recordsNumElements];\n"));
        assert!(out.contains(
            "    temprecordsArg[i0].Get(\"(is)\", &records[i0].member0, &temprecordsi0_member1);\n"
        ));
    }

    #[test]
    fn struct_reads_all_members_in_one_call() {
        assert_eq!(
            get("args[0]", "(i(sv)ad)", "shape", true),
            "shapeStruct shape;\n\
             char *tempshape_s0_member0;\n\
             MsgArg *tempshape_s0_member1;\n\
             double *tempshape_member1Array;\n\
             args[0].Get(\"(i(sv)ad)\", &shape.member0, &tempshape_s0_member0, &tempshape_s0_member1, &shape.member1NumElements, &tempshape_member1Array);\n\
             shape.s0.member0 = tempshape_s0_member0;\n\
             shape.s0.member1 = *tempshape_s0_member1;\n\
             shape.member1 = new double[shape.member1NumElements];\n\
             for (size_t i0 = 0; i0 < shape.member1NumElements; i0++) {\n\
             \x20   shape.member1[i0] = tempshape_member1Array[i0];\n\
             }\n"
        );
    }

    #[test]
    fn nested_struct_arrays_use_qualified_types() {
        let out = get("args[0]", "(ia(yy))", "grid", false);
        assert!(out.contains("grid.s0 = new gridStruct::s0Struct[grid.s0NumElements];"));
        assert!(out.contains(
            "    tempgrid_s0Arg[i0].Get(\"(yy)\", &grid.s0[i0].member0, &grid.s0[i0].member1);"
        ));
    }

    #[test]
    fn dictionary_with_struct_value_nests_value_type() {
        let out = get("args[0]", "a{s(ia{ii})}", "index", false);
        assert!(out.contains("index = new indexDictEntry[indexNumElements];"));
        assert!(out.contains(
            "index[i0].value.d0 = new indexDictEntry::valueStruct::d0DictEntry[index[i0].value.d0NumElements];"
        ));
        assert!(out.contains(
            "for (size_t i1 = 0; i1 < index[i0].value.d0NumElements; i1++) {"
        ));
    }

    #[test]
    fn opaque_member_copies_through_pointer() {
        let out = get("args[0]", "(aai)", "blob", false);
        assert!(out.contains("MsgArg *tempblob_member0;"));
        assert!(out.contains("args[0].Get(\"(*)\", &tempblob_member0);"));
        assert!(out.contains("blob.member0 = *tempblob_member0;"));
    }
}
