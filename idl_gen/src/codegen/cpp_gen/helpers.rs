use crate::errors::GenError;
use crate::fragment::Fragment;
use crate::signature::{ScalarKind, SigType};
use idl_types::{Arg, Direction};

/// How a value of a given signature is stored on the C++ side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Scalar(ScalarKind),
    Variant,
    /// Arrays of arrays, variants or dictionaries; carried as a `MsgArg`.
    Opaque,
    ScalarArray(ScalarKind),
    Struct(&'a [SigType]),
    StructArray(&'a [SigType]),
    Dict {
        key: ScalarKind,
        value: &'a SigType,
    },
}

pub fn slot(ty: &SigType) -> Slot<'_> {
    match ty {
        SigType::Basic(kind) => Slot::Scalar(*kind),
        SigType::Variant => Slot::Variant,
        SigType::Struct(members) => Slot::Struct(members),
        SigType::DictEntry { key, value } => Slot::Dict { key: *key, value },
        SigType::Array(element) => match element.as_ref() {
            SigType::Basic(kind) => Slot::ScalarArray(*kind),
            SigType::Struct(members) => Slot::StructArray(members),
            SigType::Variant | SigType::Array(_) | SigType::DictEntry { .. } => Slot::Opaque,
        },
    }
}

impl Slot<'_> {
    /// Whether the value travels as a pointer plus a `NumElements` count.
    pub fn is_counted(&self) -> bool {
        matches!(
            self,
            Slot::ScalarArray(_) | Slot::StructArray(_) | Slot::Dict { .. }
        )
    }
}

/// A named member of a generated struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member<'a> {
    pub field: String,
    pub ty: &'a SigType,
}

/// Name struct members by position: `member{n}` for plain values, `s{k}`
/// for nested structs and struct arrays, `d{j}` for dictionaries. Each
/// counter runs independently.
pub fn struct_members(members: &[SigType]) -> Vec<Member<'_>> {
    let (mut plain, mut structs, mut dicts) = (0, 0, 0);
    members
        .iter()
        .map(|ty| {
            let field = match slot(ty) {
                Slot::Struct(_) | Slot::StructArray(_) => {
                    structs += 1;
                    format!("s{}", structs - 1)
                }
                Slot::Dict { .. } => {
                    dicts += 1;
                    format!("d{}", dicts - 1)
                }
                _ => {
                    plain += 1;
                    format!("member{}", plain - 1)
                }
            };
            Member { field, ty }
        })
        .collect()
}

/// Element type of a slot named `field`: the scalar type, `MsgArg`, or the
/// synthesized `{field}Struct` / `{field}DictEntry` name.
pub fn type_name(field: &str, ty: &SigType) -> String {
    match slot(ty) {
        Slot::Scalar(kind) | Slot::ScalarArray(kind) => kind.cpp_type().to_string(),
        Slot::Variant | Slot::Opaque => "MsgArg".to_string(),
        Slot::Struct(_) | Slot::StructArray(_) => format!("{}Struct", field),
        Slot::Dict { .. } => format!("{}DictEntry", field),
    }
}

/// Like [`type_name`], but synthesized names are nested in `parent`.
pub fn nested_type_name(parent: &str, field: &str, ty: &SigType) -> String {
    match slot(ty) {
        Slot::Struct(_) | Slot::StructArray(_) | Slot::Dict { .. } => {
            format!("{}::{}", parent, type_name(field, ty))
        }
        _ => type_name(field, ty),
    }
}

/// Temporary-name stem for an expression: `a.b[i0]` becomes `a_bi0`.
pub fn flat(expr: &str) -> String {
    expr.chars()
        .filter(|c| *c != '[' && *c != ']')
        .map(|c| if c == '.' { '_' } else { c })
        .collect()
}

pub fn counter(depth: usize) -> String {
    format!("i{}", depth)
}

/// `for` loop over the `NumElements` count of `expr`.
pub fn for_each(expr: &str, depth: usize, body: Vec<Fragment>) -> Fragment {
    let i = counter(depth);
    Fragment::block(
        format!(
            "for (size_t {i} = 0; {i} < {expr}NumElements; {i}++) {{",
            i = i,
            expr = expr
        ),
        body,
        "}",
    )
}

/// Argument passed to `MsgArg::Set` for a scalar expression.
pub fn scalar_value(kind: ScalarKind, expr: &str) -> String {
    if kind.is_string_like() {
        format!("{}.c_str()", expr)
    } else {
        expr.to_string()
    }
}

/// Field declarations for a slot named `field`. With `inline_types`, struct
/// and dictionary element types are defined in place.
pub fn slot_fields(field: &str, ty: &SigType, inline_types: bool) -> Vec<Fragment> {
    let count = Fragment::line(format!("size_t {}NumElements;", field));
    match slot(ty) {
        Slot::Scalar(kind) => vec![Fragment::line(format!("{} {};", kind.cpp_type(), field))],
        Slot::Variant | Slot::Opaque => vec![Fragment::line(format!("MsgArg {};", field))],
        Slot::ScalarArray(kind) => vec![
            Fragment::line(format!("{} *{};", kind.cpp_type(), field)),
            count,
        ],
        Slot::Struct(members) => {
            let name = type_name(field, ty);
            if inline_types {
                vec![Fragment::block(
                    format!("struct {}{{", name),
                    struct_body(members),
                    format!("}} {};", field),
                )]
            } else {
                vec![Fragment::line(format!("{} {};", name, field))]
            }
        }
        Slot::StructArray(members) => {
            let name = type_name(field, ty);
            let mut out = Vec::new();
            if inline_types {
                out.push(Fragment::block(
                    format!("struct {}{{", name),
                    struct_body(members),
                    "};",
                ));
            }
            out.push(Fragment::line(format!("{} *{};", name, field)));
            out.push(count);
            out
        }
        Slot::Dict { key, value } => {
            let name = type_name(field, ty);
            let mut out = Vec::new();
            if inline_types {
                out.push(Fragment::block(
                    format!("struct {}{{", name),
                    dict_body(key, value),
                    "};",
                ));
            }
            out.push(Fragment::line(format!("{} *{};", name, field)));
            out.push(count);
            out
        }
    }
}

pub fn struct_body(members: &[SigType]) -> Vec<Fragment> {
    struct_members(members)
        .into_iter()
        .flat_map(|member| slot_fields(&member.field, member.ty, true))
        .collect()
}

pub fn dict_body(key: ScalarKind, value: &SigType) -> Vec<Fragment> {
    let mut body = vec![Fragment::line(format!("{} key;", key.cpp_type()))];
    body.extend(slot_fields("value", value, true));
    body
}

/// Parameter text for `name` in a function signature. Inputs are passed by
/// value or const pointer, outputs by reference.
pub fn param_decl(name: &str, ty: &SigType, direction: Direction) -> String {
    let ty_name = type_name(name, ty);
    match (slot(ty), direction) {
        (Slot::Scalar(_) | Slot::Struct(_) | Slot::Variant | Slot::Opaque, Direction::In) => {
            format!("{} {}", ty_name, name)
        }
        (Slot::Scalar(_) | Slot::Struct(_) | Slot::Variant | Slot::Opaque, Direction::Out) => {
            format!("{}& {}", ty_name, name)
        }
        (_, Direction::In) => format!(
            "const {} *{}, size_t {}NumElements",
            ty_name, name, name
        ),
        (_, Direction::Out) => format!(
            "{} *&{}, size_t& {}NumElements",
            ty_name, name, name
        ),
    }
}

/// Expression list passing a value named `name` on to a function declared
/// with [`param_decl`].
pub fn call_args(name: &str, ty: &SigType) -> String {
    if slot(ty).is_counted() {
        format!("{0}, {0}NumElements", name)
    } else {
        name.to_string()
    }
}

/// Parse the signature of an argument owned by `member`.
pub fn parse_arg(member: &str, arg: &Arg) -> Result<SigType, GenError> {
    SigType::parse(&arg.signature).map_err(|source| GenError::Signature {
        member: member.to_string(),
        arg: arg.name.clone(),
        source,
    })
}

/// Upper-case the first character, for `Get{Prop}` style names.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A function definition: the signature line, then the braced body.
pub fn function(signature: String, body: Vec<Fragment>) -> Vec<Fragment> {
    vec![Fragment::line(signature), Fragment::block("{", body, "}")]
}

/// `status` early-return used after every fallible call.
pub fn return_on_error(status: &str) -> Fragment {
    Fragment::block(
        format!("if ({} != ER_OK) {{", status),
        vec![Fragment::line(format!("return {};", status))],
        "}",
    )
}
