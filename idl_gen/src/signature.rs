//! Type-signature grammar.
//!
//! Signatures are compact strings describing the shape of a value:
//! single letters for scalars, `v` for a variant, `(...)` for a struct,
//! `a` followed by an element for an array and `a{KV}` for an array of
//! dictionary entries whose key `K` must be a scalar.
//!
//! Two views are offered. [`classify`] together with the `extract_*`
//! helpers looks only at the leading characters of a signature, which is
//! what the discovery pass needs. [`SigType::parse`] builds the complete
//! tree that every generator walks.
//!
//! # Example
//! ```
//! use idl_gen::signature::{ScalarKind, SigType};
//!
//! let ty = SigType::parse("a{is}").unwrap();
//! match ty {
//!     SigType::DictEntry { key, .. } => assert_eq!(key, ScalarKind::Int32),
//!     _ => unreachable!(),
//! }
//! ```

use serde_derive::Serialize;
use thiserror::Error;

/// Deepest container nesting accepted by the parser.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("empty signature")]
    Empty,
    #[error("unbalanced signature '{signature}'")]
    Unbalanced { signature: String },
    #[error("unknown type code '{code}' in signature '{signature}'")]
    UnknownCode { code: char, signature: String },
    #[error(
        "invalid dictionary entry in '{signature}': the key must be a basic data type, not '{key}'"
    )]
    NonBasicDictKey { signature: String, key: char },
    #[error("dictionary entry in '{signature}' must hold exactly one key and one value")]
    MalformedDictEntry { signature: String },
    #[error("empty struct in signature '{signature}'")]
    EmptyStruct { signature: String },
    #[error("signature '{signature}' exceeds the maximum container depth of {limit}")]
    DepthExceeded { signature: String, limit: usize },
    #[error("unexpected characters after position {position} in signature '{signature}'")]
    TrailingCharacters { signature: String, position: usize },
}

/// The scalar (basic) type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarKind {
    Byte,
    Boolean,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Double,
    ObjectPath,
    Signature,
    String,
}

impl ScalarKind {
    pub fn from_code(code: char) -> Option<Self> {
        let kind = match code {
            'y' => ScalarKind::Byte,
            'b' => ScalarKind::Boolean,
            'n' => ScalarKind::Int16,
            'q' => ScalarKind::Uint16,
            'i' => ScalarKind::Int32,
            'u' => ScalarKind::Uint32,
            'x' => ScalarKind::Int64,
            't' => ScalarKind::Uint64,
            'd' => ScalarKind::Double,
            'o' => ScalarKind::ObjectPath,
            'g' => ScalarKind::Signature,
            's' => ScalarKind::String,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> char {
        match self {
            ScalarKind::Byte => 'y',
            ScalarKind::Boolean => 'b',
            ScalarKind::Int16 => 'n',
            ScalarKind::Uint16 => 'q',
            ScalarKind::Int32 => 'i',
            ScalarKind::Uint32 => 'u',
            ScalarKind::Int64 => 'x',
            ScalarKind::Uint64 => 't',
            ScalarKind::Double => 'd',
            ScalarKind::ObjectPath => 'o',
            ScalarKind::Signature => 'g',
            ScalarKind::String => 's',
        }
    }

    /// C++ type used for members, locals and parameters.
    pub fn cpp_type(self) -> &'static str {
        match self {
            ScalarKind::Byte => "unsigned char",
            ScalarKind::Boolean => "bool",
            ScalarKind::Int16 => "short",
            ScalarKind::Uint16 => "unsigned short",
            ScalarKind::Int32 => "int",
            ScalarKind::Uint32 => "unsigned int",
            ScalarKind::Int64 => "long long",
            ScalarKind::Uint64 => "unsigned long long",
            ScalarKind::Double => "double",
            ScalarKind::ObjectPath | ScalarKind::Signature | ScalarKind::String => "String",
        }
    }

    /// Field of the `MsgArg` value union holding this scalar.
    pub fn msg_field(self) -> &'static str {
        match self {
            ScalarKind::Byte => "v_byte",
            ScalarKind::Boolean => "v_bool",
            ScalarKind::Int16 => "v_int16",
            ScalarKind::Uint16 => "v_uint16",
            ScalarKind::Int32 => "v_int32",
            ScalarKind::Uint32 => "v_uint32",
            ScalarKind::Int64 => "v_int64",
            ScalarKind::Uint64 => "v_uint64",
            ScalarKind::Double => "v_double",
            ScalarKind::ObjectPath => "v_objPath.str",
            ScalarKind::Signature => "v_signature.sig",
            ScalarKind::String => "v_string.str",
        }
    }

    pub fn type_id(self) -> &'static str {
        match self {
            ScalarKind::Byte => "ALLJOYN_BYTE",
            ScalarKind::Boolean => "ALLJOYN_BOOLEAN",
            ScalarKind::Int16 => "ALLJOYN_INT16",
            ScalarKind::Uint16 => "ALLJOYN_UINT16",
            ScalarKind::Int32 => "ALLJOYN_INT32",
            ScalarKind::Uint32 => "ALLJOYN_UINT32",
            ScalarKind::Int64 => "ALLJOYN_INT64",
            ScalarKind::Uint64 => "ALLJOYN_UINT64",
            ScalarKind::Double => "ALLJOYN_DOUBLE",
            ScalarKind::ObjectPath => "ALLJOYN_OBJECT_PATH",
            ScalarKind::Signature => "ALLJOYN_SIGNATURE",
            ScalarKind::String => "ALLJOYN_STRING",
        }
    }

    /// Type id of an array with this element type. String-like elements
    /// have no scalar array id.
    pub fn array_type_id(self) -> &'static str {
        match self {
            ScalarKind::Byte => "ALLJOYN_BYTE_ARRAY",
            ScalarKind::Boolean => "ALLJOYN_BOOLEAN_ARRAY",
            ScalarKind::Int16 => "ALLJOYN_INT16_ARRAY",
            ScalarKind::Uint16 => "ALLJOYN_UINT16_ARRAY",
            ScalarKind::Int32 => "ALLJOYN_INT32_ARRAY",
            ScalarKind::Uint32 => "ALLJOYN_UINT32_ARRAY",
            ScalarKind::Int64 => "ALLJOYN_INT64_ARRAY",
            ScalarKind::Uint64 => "ALLJOYN_UINT64_ARRAY",
            ScalarKind::Double => "ALLJOYN_DOUBLE_ARRAY",
            ScalarKind::ObjectPath | ScalarKind::Signature | ScalarKind::String => {
                "ALLJOYN_ARRAY"
            }
        }
    }

    /// String, object path and signature values travel as narrow C strings.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            ScalarKind::ObjectPath | ScalarKind::Signature | ScalarKind::String
        )
    }
}

/// Leading-character classification of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Basic(ScalarKind),
    Struct,
    Array,
    DictEntry,
    Variant,
    /// Not a known leading code; callers must treat it as needing composite
    /// handling or as malformed.
    NonBasic,
}

/// Classify a signature by its leading characters only.
pub fn classify(sig: &str) -> Shape {
    let mut chars = sig.chars();
    match chars.next() {
        Some('(') => Shape::Struct,
        Some('a') => match chars.next() {
            Some('{') => Shape::DictEntry,
            _ => Shape::Array,
        },
        Some('v') => Shape::Variant,
        Some(code) => match ScalarKind::from_code(code) {
            Some(kind) => Shape::Basic(kind),
            None => Shape::NonBasic,
        },
        None => Shape::NonBasic,
    }
}

/// Return the balanced struct starting at the first `(` of `sig`, or an
/// empty string when there is none.
pub fn extract_inner_struct(sig: &str) -> &str {
    let Some(start) = sig.find('(') else {
        return "";
    };
    let mut depth = 0usize;
    for (offset, c) in sig[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return &sig[start..start + offset + 1];
                }
            }
            _ => {}
        }
    }
    ""
}

/// Return the balanced `a{...}` starting at the first `a{` of `sig`, or an
/// empty string when there is none.
pub fn extract_inner_dict_entry(sig: &str) -> &str {
    let Some(start) = sig.find("a{") else {
        return "";
    };
    let bytes = sig.as_bytes();
    let mut depth = 0usize;
    let mut index = start;
    while index < bytes.len() {
        match bytes[index] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return &sig[start..=index];
                }
            }
            _ => {}
        }
        index += 1;
    }
    ""
}

/// Fully parsed signature tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SigType {
    Basic(ScalarKind),
    Variant,
    Struct(Vec<SigType>),
    Array(Box<SigType>),
    /// An array of dictionary entries, `a{KV}`.
    DictEntry {
        key: ScalarKind,
        value: Box<SigType>,
    },
}

impl SigType {
    /// Parse a complete single-type signature.
    pub fn parse(sig: &str) -> Result<SigType, SignatureError> {
        if sig.is_empty() {
            return Err(SignatureError::Empty);
        }
        let mut parser = Parser { sig, pos: 0 };
        let ty = parser.parse_type(0)?;
        if parser.pos != sig.len() {
            return Err(SignatureError::TrailingCharacters {
                signature: sig.to_string(),
                position: parser.pos,
            });
        }
        Ok(ty)
    }

    /// Encode the tree back into signature text.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        match self {
            SigType::Basic(kind) => out.push(kind.code()),
            SigType::Variant => out.push('v'),
            SigType::Struct(members) => {
                out.push('(');
                for member in members {
                    member.write_signature(out);
                }
                out.push(')');
            }
            SigType::Array(element) => {
                out.push('a');
                element.write_signature(out);
            }
            SigType::DictEntry { key, value } => {
                out.push_str("a{");
                out.push(key.code());
                value.write_signature(out);
                out.push('}');
            }
        }
    }

    /// Strip nested array levels, returning the innermost element and the
    /// number of `a` prefixes removed.
    pub fn peel_arrays(&self) -> (&SigType, usize) {
        let mut current = self;
        let mut levels = 0;
        while let SigType::Array(element) = current {
            current = element;
            levels += 1;
        }
        (current, levels)
    }

    /// `MsgArg` type id of a value of this type.
    pub fn type_id(&self) -> &'static str {
        match self {
            SigType::Basic(kind) => kind.type_id(),
            SigType::Variant => "ALLJOYN_VARIANT",
            SigType::Struct(_) => "ALLJOYN_STRUCT",
            SigType::Array(element) => match element.as_ref() {
                SigType::Basic(kind) => kind.array_type_id(),
                _ => "ALLJOYN_ARRAY",
            },
            SigType::DictEntry { .. } => "ALLJOYN_ARRAY",
        }
    }

    /// Whether [`SigType::type_id`] identifies the whole signature: scalars
    /// and arrays of non-string scalars.
    pub fn type_id_is_exact(&self) -> bool {
        match self {
            SigType::Basic(_) => true,
            SigType::Array(element) => {
                matches!(element.as_ref(), SigType::Basic(kind) if !kind.is_string_like())
            }
            _ => false,
        }
    }
}

struct Parser<'a> {
    sig: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.sig[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn enter(&self, depth: usize) -> Result<usize, SignatureError> {
        let depth = depth + 1;
        if depth > MAX_DEPTH {
            return Err(SignatureError::DepthExceeded {
                signature: self.sig.to_string(),
                limit: MAX_DEPTH,
            });
        }
        Ok(depth)
    }

    fn unbalanced(&self) -> SignatureError {
        SignatureError::Unbalanced {
            signature: self.sig.to_string(),
        }
    }

    fn parse_type(&mut self, depth: usize) -> Result<SigType, SignatureError> {
        let Some(c) = self.bump() else {
            return Err(self.unbalanced());
        };
        match c {
            '(' => {
                let depth = self.enter(depth)?;
                let mut members = Vec::new();
                loop {
                    match self.peek() {
                        Some(')') => {
                            self.pos += 1;
                            break;
                        }
                        Some(_) => members.push(self.parse_type(depth)?),
                        None => return Err(self.unbalanced()),
                    }
                }
                if members.is_empty() {
                    return Err(SignatureError::EmptyStruct {
                        signature: self.sig.to_string(),
                    });
                }
                Ok(SigType::Struct(members))
            }
            'a' => {
                let depth = self.enter(depth)?;
                if self.peek() == Some('{') {
                    self.pos += 1;
                    self.parse_dict_entry(depth)
                } else {
                    Ok(SigType::Array(Box::new(self.parse_type(depth)?)))
                }
            }
            'v' => Ok(SigType::Variant),
            ')' | '}' | '{' => Err(self.unbalanced()),
            code => ScalarKind::from_code(code)
                .map(SigType::Basic)
                .ok_or_else(|| SignatureError::UnknownCode {
                    code,
                    signature: self.sig.to_string(),
                }),
        }
    }

    fn parse_dict_entry(&mut self, depth: usize) -> Result<SigType, SignatureError> {
        let key = match self.bump() {
            Some(code) => match ScalarKind::from_code(code) {
                Some(kind) => kind,
                None => {
                    return Err(SignatureError::NonBasicDictKey {
                        signature: self.sig.to_string(),
                        key: code,
                    });
                }
            },
            None => return Err(self.unbalanced()),
        };
        if self.peek() == Some('}') {
            return Err(SignatureError::MalformedDictEntry {
                signature: self.sig.to_string(),
            });
        }
        let value = self.parse_type(depth)?;
        match self.bump() {
            Some('}') => Ok(SigType::DictEntry {
                key,
                value: Box::new(value),
            }),
            Some(_) => Err(SignatureError::MalformedDictEntry {
                signature: self.sig.to_string(),
            }),
            None => Err(self.unbalanced()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_struct(levels: usize) -> String {
        format!("{}i{}", "(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn classify_dispatches_on_leading_characters() {
        assert_eq!(classify("s"), Shape::Basic(ScalarKind::String));
        assert_eq!(classify("(is)"), Shape::Struct);
        assert_eq!(classify("a{si}"), Shape::DictEntry);
        assert_eq!(classify("ai"), Shape::Array);
        assert_eq!(classify("aai"), Shape::Array);
        assert_eq!(classify("v"), Shape::Variant);
        assert_eq!(classify("z"), Shape::NonBasic);
        assert_eq!(classify(""), Shape::NonBasic);
    }

    #[test]
    fn classify_is_deterministic() {
        for sig in ["y", "(ia{ss})", "a(ii)", "a{o(ss)}", "v", "aav"] {
            assert_eq!(classify(sig), classify(sig));
        }
    }

    #[test]
    fn extract_inner_struct_is_idempotent() {
        for sig in ["(is)", "(i(s(is)))", "((i)(s))"] {
            assert_eq!(extract_inner_struct(sig), sig);
            assert_eq!(extract_inner_struct(extract_inner_struct(sig)), sig);
        }
    }

    #[test]
    fn extract_inner_struct_finds_nested_member() {
        assert_eq!(extract_inner_struct("i(s(is))d"), "(s(is))");
        assert_eq!(extract_inner_struct("ai"), "");
        assert_eq!(extract_inner_struct("(ii"), "");
    }

    #[test]
    fn extract_inner_dict_entry_tracks_nested_entries() {
        assert_eq!(extract_inner_dict_entry("(ia{i(sa{ss})})"), "a{i(sa{ss})}");
        assert_eq!(extract_inner_dict_entry("a{si}"), "a{si}");
        assert_eq!(extract_inner_dict_entry("a{si"), "");
        assert_eq!(extract_inner_dict_entry("(ii)"), "");
    }

    #[test]
    fn parses_dict_with_basic_key() {
        let ty = SigType::parse("a{is}").unwrap();
        assert_eq!(
            ty,
            SigType::DictEntry {
                key: ScalarKind::Int32,
                value: Box::new(SigType::Basic(ScalarKind::String)),
            }
        );
    }

    #[test]
    fn variant_dict_key_is_rejected() {
        let err = SigType::parse("a{vs}").unwrap_err();
        assert!(matches!(err, SignatureError::NonBasicDictKey { key: 'v', .. }));
        assert!(matches!(
            SigType::parse("a{(i)s}"),
            Err(SignatureError::NonBasicDictKey { key: '(', .. })
        ));
    }

    #[test]
    fn depth_guard_accepts_thirty_two_levels() {
        assert!(SigType::parse(&nested_struct(MAX_DEPTH)).is_ok());
    }

    #[test]
    fn depth_guard_rejects_thirty_three_levels() {
        let err = SigType::parse(&nested_struct(MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(
            err,
            SignatureError::DepthExceeded {
                signature: nested_struct(MAX_DEPTH + 1),
                limit: MAX_DEPTH,
            }
        );
    }

    #[test]
    fn malformed_signatures_are_errors() {
        assert_eq!(SigType::parse(""), Err(SignatureError::Empty));
        assert!(matches!(SigType::parse("(ii"), Err(SignatureError::Unbalanced { .. })));
        assert!(matches!(SigType::parse("ii)"), Err(SignatureError::TrailingCharacters { .. })));
        assert!(matches!(SigType::parse("()"), Err(SignatureError::EmptyStruct { .. })));
        assert!(matches!(SigType::parse("a{s}"), Err(SignatureError::MalformedDictEntry { .. })));
        assert!(matches!(SigType::parse("a{sii}"), Err(SignatureError::MalformedDictEntry { .. })));
        assert!(matches!(SigType::parse("a"), Err(SignatureError::Unbalanced { .. })));
        assert!(matches!(
            SigType::parse("(iz)"),
            Err(SignatureError::UnknownCode { code: 'z', .. })
        ));
    }

    #[test]
    fn signature_text_survives_parsing() {
        for sig in ["(ia{s(ii)}as)", "aa{sv}", "a(oa(yb))", "v"] {
            assert_eq!(SigType::parse(sig).unwrap().signature(), sig);
        }
    }

    #[test]
    fn peel_arrays_reaches_innermost_element() {
        let ty = SigType::parse("aa(ii)").unwrap();
        let (inner, levels) = ty.peel_arrays();
        assert_eq!(levels, 2);
        assert!(matches!(inner, SigType::Struct(_)));
    }

    #[test]
    fn type_ids_follow_shape() {
        assert_eq!(SigType::parse("ay").unwrap().type_id(), "ALLJOYN_BYTE_ARRAY");
        assert_eq!(SigType::parse("as").unwrap().type_id(), "ALLJOYN_ARRAY");
        assert_eq!(SigType::parse("(ii)").unwrap().type_id(), "ALLJOYN_STRUCT");
        assert_eq!(SigType::parse("o").unwrap().type_id(), "ALLJOYN_OBJECT_PATH");
        assert!(SigType::parse("ad").unwrap().type_id_is_exact());
        assert!(!SigType::parse("as").unwrap().type_id_is_exact());
        assert!(!SigType::parse("a{si}").unwrap().type_id_is_exact());
        assert!(!SigType::parse("(ii)").unwrap().type_id_is_exact());
    }
}
