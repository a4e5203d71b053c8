pub mod client;
pub mod dcls;
pub mod get;
pub mod helpers;
pub mod interface;
pub mod service;
pub mod set;
pub mod types;

// Re-export main public functions
pub use client::{emit_client_handlers, emit_client_header, emit_client_source};
pub use dcls::{emit_declarations, generate_declaration};
pub use get::generate_get;
pub use interface::emit_create_interfaces;
pub use service::{emit_service_header, emit_service_methods, emit_service_source};
pub use set::generate_set;
pub use types::emit_types_header;

use crate::errors::GenError;
use crate::registry::Registry;
use crate::signature::SigType;
use helpers::{call_args, param_decl, parse_arg};
use idl_types::{Arg, Direction, Method, ObjectNode, Property, Signal};
use std::collections::HashMap;

/// An argument together with its parsed signature.
#[derive(Debug, Clone)]
pub struct TypedArg<'a> {
    pub arg: &'a Arg,
    pub ty: SigType,
}

impl TypedArg<'_> {
    pub fn name(&self) -> &str {
        &self.arg.name
    }

    pub fn param(&self, direction: Direction) -> String {
        param_decl(&self.arg.name, &self.ty, direction)
    }

    pub fn call(&self) -> String {
        call_args(&self.arg.name, &self.ty)
    }
}

#[derive(Debug, Clone)]
pub struct TypedMethod<'a> {
    pub method: &'a Method,
    /// Concrete interface declaring the method.
    pub interface: &'a str,
    /// Encrypt calls: the method or its interface is marked secure.
    pub secure: bool,
    pub args: Vec<TypedArg<'a>>,
}

impl<'a> TypedMethod<'a> {
    pub fn name(&self) -> &str {
        &self.method.name
    }

    pub fn in_args(&self) -> impl Iterator<Item = &TypedArg<'a>> {
        self.args.iter().filter(|a| a.arg.direction == Direction::In)
    }

    pub fn out_args(&self) -> impl Iterator<Item = &TypedArg<'a>> {
        self.args.iter().filter(|a| a.arg.direction == Direction::Out)
    }

    /// Parameters in declaration order, each with its own direction.
    pub fn params(&self) -> String {
        join(self.args.iter().map(|a| a.param(a.arg.direction)))
    }

    pub fn call_args(&self) -> String {
        join(self.args.iter().map(TypedArg::call))
    }
}

#[derive(Debug, Clone)]
pub struct TypedSignal<'a> {
    pub signal: &'a Signal,
    pub interface: &'a str,
    pub secure: bool,
    pub args: Vec<TypedArg<'a>>,
}

impl TypedSignal<'_> {
    pub fn name(&self) -> &str {
        &self.signal.name
    }

    /// Signal arguments are always passed to the handler as inputs.
    pub fn params(&self) -> String {
        join(self.args.iter().map(|a| a.param(Direction::In)))
    }

    pub fn call_args(&self) -> String {
        join(self.args.iter().map(TypedArg::call))
    }
}

#[derive(Debug, Clone)]
pub struct TypedProperty<'a> {
    pub property: &'a Property,
    pub interface: &'a str,
    pub ty: SigType,
}

impl TypedProperty<'_> {
    pub fn name(&self) -> &str {
        &self.property.name
    }
}

/// Everything the emitters need for one object node. Building it parses
/// every signature, so emitters working from a context cannot fail.
pub struct NodeContext<'a> {
    pub node: &'a ObjectNode,
    pub registry: &'a Registry,
    pub well_known_name: Option<&'a str>,
    pub methods: Vec<TypedMethod<'a>>,
    pub signals: Vec<TypedSignal<'a>>,
    pub properties: Vec<TypedProperty<'a>>,
}

impl<'a> NodeContext<'a> {
    pub fn new(
        node: &'a ObjectNode,
        registry: &'a Registry,
        well_known_name: Option<&'a str>,
    ) -> Result<Self, GenError> {
        let mut methods = Vec::with_capacity(node.interface.methods.len());
        let mut signals = Vec::with_capacity(node.interface.signals.len());
        let mut properties = Vec::with_capacity(node.interface.properties.len());
        let mut owners = MemberOwners::default();

        for iface in node.interface.concrete() {
            for method in &iface.methods {
                owners.claim(MemberKind::Method, &method.name, &iface.name)?;
                let label = format!("method {}", method.name);
                methods.push(TypedMethod {
                    method,
                    interface: &iface.name,
                    secure: method.secure || iface.secure,
                    args: typed_args(&label, &method.args)?,
                });
            }
            for signal in &iface.signals {
                owners.claim(MemberKind::Signal, &signal.name, &iface.name)?;
                let label = format!("signal {}", signal.name);
                signals.push(TypedSignal {
                    signal,
                    interface: &iface.name,
                    secure: signal.secure || iface.secure,
                    args: typed_args(&label, &signal.args)?,
                });
            }
            for property in &iface.properties {
                owners.claim(MemberKind::Property, &property.name, &iface.name)?;
                let label = format!("property {}", property.name);
                check_name(&label, &property.name)?;
                properties.push(TypedProperty {
                    property,
                    interface: &iface.name,
                    ty: parse_arg(&label, &property.arg())?,
                });
            }
        }

        Ok(Self {
            node,
            registry,
            well_known_name,
            methods,
            signals,
            properties,
        })
    }

    /// Class name prefix, e.g. `Chat` for `ChatClient` and `ChatService`.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Prefix of generated macros and constants.
    pub fn upper(&self) -> String {
        self.node.name.to_uppercase()
    }

    pub fn client_class(&self) -> String {
        format!("{}Client", self.node.name)
    }

    pub fn service_class(&self) -> String {
        format!("{}Service", self.node.name)
    }

    pub fn types_header(&self) -> String {
        format!("{}Types.h", self.node.name)
    }
}

fn typed_args<'a>(label: &str, args: &'a [Arg]) -> Result<Vec<TypedArg<'a>>, GenError> {
    args.iter()
        .map(|arg| {
            check_name(label, &arg.name)?;
            parse_arg(label, arg).map(|ty| TypedArg { arg, ty })
        })
        .collect()
}

/// Locals, parameters and class members the generated code declares next
/// to user argument and property names.
const RESERVED_NAMES: &[&str] = &[
    "args",
    "destination",
    "iface",
    "ifcName",
    "member",
    "msg",
    "myBusAttachment",
    "numArgs",
    "propName",
    "propValue",
    "proxyBusObj",
    "replyMsg",
    "returnArgs",
    "serviceName",
    "sessionId",
    "srcPath",
    "status",
    "val",
];

fn check_name(member: &str, name: &str) -> Result<(), GenError> {
    let loop_counter = name.len() > 1
        && name.starts_with('i')
        && name[1..].chars().all(|c| c.is_ascii_digit());
    if RESERVED_NAMES.contains(&name) || loop_counter {
        return Err(GenError::ReservedName {
            member: member.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MemberKind {
    Method,
    Signal,
    Property,
}

impl MemberKind {
    fn as_str(self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::Signal => "signal",
            MemberKind::Property => "property",
        }
    }
}

/* members of all interfaces share one generated class */
#[derive(Default)]
struct MemberOwners<'a> {
    owners: HashMap<(MemberKind, &'a str), &'a str>,
}

impl<'a> MemberOwners<'a> {
    fn claim(
        &mut self,
        kind: MemberKind,
        name: &'a str,
        interface: &'a str,
    ) -> Result<(), GenError> {
        match self.owners.insert((kind, name), interface) {
            Some(first) => Err(GenError::DuplicateMember {
                kind: kind.as_str(),
                name: name.to_string(),
                first: first.to_string(),
                second: interface.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}
