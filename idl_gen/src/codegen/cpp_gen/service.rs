//! Service stubs: a `BusObject` subclass that unpacks incoming calls,
//! hands them to developer-written methods and packs the replies.

use super::get::generate_get;
use super::helpers::{function, return_on_error, slot, slot_fields};
use super::interface::create_interfaces_fn;
use super::set::generate_set;
use super::{NodeContext, TypedMethod, TypedProperty, TypedSignal};
use crate::fragment::{render, Fragment, INDENT};
use crate::signature::SigType;
use idl_types::Direction;

const GET_PROPERTY: &str = "QStatus Get(const char *ifcName, const char *propName, MsgArg &val)";
const SET_PROPERTY: &str = "QStatus Set(const char *ifcName, const char *propName, MsgArg &val)";

/// `{N}Service.h`
pub fn emit_service_header(ctx: &NodeContext) -> String {
    let class = ctx.service_class();
    let guard = format!("{}_SERVICE_H", ctx.upper());

    let mut public = vec![
        Fragment::line(format!("{}(BusAttachment &bus, const char *path);", class)),
        Fragment::line(format!("~{}();", class)),
        Fragment::Blank,
        Fragment::comment(
            "Create the interfaces on the bus, attach them to this object and \
             install the method handlers. Call before registering the object.",
        ),
        Fragment::line("QStatus Initialize();"),
    ];
    for signal in &ctx.signals {
        public.push(Fragment::Blank);
        public.push(Fragment::comment(format!(
            "Emit \"{}\". Without a destination the signal is broadcast.",
            signal.name()
        )));
        public.push(Fragment::line(format!(
            "QStatus Send{}({});",
            signal.name(),
            signal_params(signal, true)
        )));
    }
    if !ctx.properties.is_empty() {
        public.push(Fragment::Blank);
        public.push(Fragment::line(format!("{};", GET_PROPERTY)));
        public.push(Fragment::line(format!("{};", SET_PROPERTY)));
    }

    let mut private = Vec::new();
    for method in &ctx.methods {
        private.push(Fragment::line(format!(
            "void {}Handler(const InterfaceDescription::Member *member, Message &msg);",
            method.name()
        )));
        if !method.method.no_reply {
            private.push(Fragment::line(format!(
                "QStatus {}MethodReply({});",
                method.name(),
                reply_params(method)
            )));
        }
        private.push(Fragment::comment("Implemented in the methods file."));
        private.push(Fragment::line(format!(
            "void {}({});",
            method.name(),
            method.params()
        )));
        private.push(Fragment::Blank);
    }
    private.push(Fragment::line("BusAttachment *myBusAttachment;"));
    for property in &ctx.properties {
        private.extend(slot_fields(property.name(), &property.ty, false));
    }

    let out = vec![
        Fragment::comment(format!(
            "{}.h\nService side of the {} object.",
            class,
            ctx.name()
        )),
        Fragment::line(format!("#ifndef {}", guard)),
        Fragment::line(format!("#define {}", guard)),
        Fragment::Blank,
        Fragment::line(format!("#include \"{}\"", ctx.types_header())),
        Fragment::Blank,
        Fragment::line(format!("class {} : public BusObject", class)),
        Fragment::block(
            "{",
            vec![
                Fragment::block("public:", public, ""),
                Fragment::Blank,
                Fragment::block("private:", private, ""),
            ],
            "};",
        ),
        Fragment::Blank,
        Fragment::line(format!("#endif /* {} */", guard)),
    ];
    render(&out)
}

/// `{N}Service.cc`
pub fn emit_service_source(ctx: &NodeContext) -> String {
    let class = ctx.service_class();
    let mut out = vec![
        Fragment::comment(format!(
            "{}.cc\nImplementation of the {} service class.",
            class,
            ctx.name()
        )),
        Fragment::line(format!("#include \"{}.h\"", class)),
        Fragment::Blank,
    ];

    let mut init = vec!["BusObject(path)".to_string(), "myBusAttachment(&bus)".to_string()];
    let mut cleanup = Vec::new();
    for property in &ctx.properties {
        if slot(&property.ty).is_counted() {
            init.push(format!("{}(NULL)", property.name()));
            init.push(format!("{}NumElements(0)", property.name()));
            cleanup.push(Fragment::line(format!("delete [] {};", property.name())));
        }
    }
    out.push(Fragment::line(format!(
        "{0}::{0}(BusAttachment &bus, const char *path)",
        class
    )));
    out.push(Fragment::line(format!("{}: {}", INDENT, init.join(", "))));
    out.push(Fragment::block("{", Vec::new(), "}"));
    out.push(Fragment::Blank);
    out.extend(function(format!("{0}::~{0}()", class), cleanup));
    out.push(Fragment::Blank);

    out.extend(initialize(ctx, &class));
    out.push(Fragment::Blank);

    for method in &ctx.methods {
        out.push(Fragment::comment(format!(
            "Unpacks a call to \"{}\" on {}.",
            method.name(),
            method.interface
        )));
        out.extend(method_handler(&class, method));
        out.push(Fragment::Blank);
        if !method.method.no_reply {
            out.extend(method_reply(&class, method));
            out.push(Fragment::Blank);
        }
    }

    for signal in &ctx.signals {
        out.extend(send_signal(&class, signal));
        out.push(Fragment::Blank);
    }

    if !ctx.properties.is_empty() {
        out.extend(property_get(&class, &ctx.properties));
        out.push(Fragment::Blank);
        out.extend(property_set(&class, &ctx.properties));
    }
    render(&out)
}

fn initialize(ctx: &NodeContext, class: &str) -> Vec<Fragment> {
    let mut body = vec![
        Fragment::line(format!(
            "QStatus status = {}(*myBusAttachment);",
            create_interfaces_fn(ctx.node)
        )),
        return_on_error("status"),
        Fragment::line("const InterfaceDescription *iface = NULL;"),
    ];
    for iface in ctx.node.interface.concrete() {
        body.push(Fragment::Blank);
        body.push(Fragment::line(format!(
            "iface = myBusAttachment->GetInterface(\"{}\");",
            iface.name
        )));
        body.push(Fragment::block(
            "if (iface == NULL) {",
            vec![Fragment::line("return ER_BUS_NO_SUCH_INTERFACE;")],
            "}",
        ));
        body.push(Fragment::line("status = AddInterface(*iface);"));
        body.push(return_on_error("status"));
        for method in ctx.methods.iter().filter(|m| m.interface == iface.name) {
            body.push(Fragment::line(format!(
                "status = AddMethodHandler(iface->GetMember(\"{}\"), \
                 static_cast<MessageReceiver::MethodHandler>(&{}::{}Handler));",
                method.name(),
                class,
                method.name()
            )));
            body.push(return_on_error("status"));
        }
    }
    body.push(Fragment::line("return status;"));
    function(format!("QStatus {}::Initialize()", class), body)
}

fn method_handler(class: &str, method: &TypedMethod) -> Vec<Fragment> {
    let in_count = method.in_args().count();
    let mut unpack = Vec::new();
    for (index, arg) in method.in_args().enumerate() {
        unpack.extend(generate_get(
            &format!("args[{}]", index),
            &arg.ty,
            arg.name(),
            true,
            0,
        ));
    }
    for arg in method.out_args() {
        unpack.extend(slot_fields(arg.name(), &arg.ty, false));
    }
    unpack.push(Fragment::line(format!(
        "{}({});",
        method.name(),
        method.call_args()
    )));
    if !method.method.no_reply {
        let outs = method
            .out_args()
            .map(|arg| arg.call())
            .collect::<Vec<_>>();
        let mut reply_args = vec!["msg".to_string()];
        reply_args.extend(outs);
        unpack.push(Fragment::line(format!(
            "{}MethodReply({});",
            method.name(),
            reply_args.join(", ")
        )));
    }

    let mut body = vec![
        Fragment::line("const MsgArg *args;"),
        Fragment::line("size_t numArgs;"),
        Fragment::line("msg->GetArgs(numArgs, args);"),
    ];
    if method.method.no_reply {
        body.push(Fragment::block(
            format!("if (numArgs == {}) {{", in_count),
            unpack,
            "}",
        ));
    } else {
        body.push(Fragment::block(
            format!("if (numArgs == {}) {{", in_count),
            unpack,
            "",
        ));
        body.push(Fragment::block(
            "} else {",
            vec![Fragment::line("MethodReply(msg, ER_BUS_BAD_VALUE);")],
            "}",
        ));
    }
    function(
        format!(
            "void {}::{}Handler(const InterfaceDescription::Member *member, Message &msg)",
            class,
            method.name()
        ),
        body,
    )
}

/* reply parameters are the output arguments passed in */
fn reply_params(method: &TypedMethod) -> String {
    let mut params = vec!["Message &msg".to_string()];
    params.extend(method.out_args().map(|arg| arg.param(Direction::In)));
    params.join(", ")
}

fn method_reply(class: &str, method: &TypedMethod) -> Vec<Fragment> {
    let out_count = method.out_args().count();
    let mut body = Vec::new();
    if out_count == 0 {
        body.push(Fragment::line(
            "return MethodReply(msg, static_cast<const MsgArg *>(NULL), 0);",
        ));
    } else {
        body.push(Fragment::line(format!("MsgArg args[{}];", out_count)));
        for (index, arg) in method.out_args().enumerate() {
            body.extend(generate_set(
                &format!("args[{}]", index),
                &arg.ty,
                arg.name(),
                0,
            ));
        }
        body.push(Fragment::line(format!(
            "return MethodReply(msg, args, {});",
            out_count
        )));
    }
    function(
        format!(
            "QStatus {}::{}MethodReply({})",
            class,
            method.name(),
            reply_params(method)
        ),
        body,
    )
}

fn signal_params(signal: &TypedSignal, defaults: bool) -> String {
    let mut params: Vec<String> = signal
        .args
        .iter()
        .map(|arg| arg.param(Direction::In))
        .collect();
    if defaults {
        params.push("const char *destination = NULL".to_string());
        params.push("SessionId sessionId = 0".to_string());
    } else {
        params.push("const char *destination".to_string());
        params.push("SessionId sessionId".to_string());
    }
    params.join(", ")
}

fn send_signal(class: &str, signal: &TypedSignal) -> Vec<Fragment> {
    let mut body = vec![
        Fragment::line(format!(
            "const InterfaceDescription *iface = myBusAttachment->GetInterface(\"{}\");",
            signal.interface
        )),
        Fragment::block(
            "if (iface == NULL) {",
            vec![Fragment::line("return ER_BUS_NO_SUCH_INTERFACE;")],
            "}",
        ),
        Fragment::line(format!(
            "const InterfaceDescription::Member *member = iface->GetMember(\"{}\");",
            signal.name()
        )),
        Fragment::block(
            "if (member == NULL) {",
            vec![Fragment::line("return ER_BUS_INTERFACE_NO_SUCH_MEMBER;")],
            "}",
        ),
    ];
    let args = if signal.args.is_empty() {
        "NULL"
    } else {
        body.push(Fragment::Blank);
        body.push(Fragment::line(format!("MsgArg args[{}];", signal.args.len())));
        for (index, arg) in signal.args.iter().enumerate() {
            body.extend(generate_set(
                &format!("args[{}]", index),
                &arg.ty,
                arg.name(),
                0,
            ));
        }
        "args"
    };
    let flags = if signal.secure {
        "ALLJOYN_FLAG_ENCRYPTED"
    } else {
        "0"
    };
    body.push(Fragment::line(format!(
        "return Signal(destination, sessionId, *member, {}, {}, 0, {});",
        args,
        signal.args.len(),
        flags
    )));
    function(
        format!(
            "QStatus {}::Send{}({})",
            class,
            signal.name(),
            signal_params(signal, false)
        ),
        body,
    )
}

fn matches_property(property: &TypedProperty) -> String {
    format!(
        "if (strcmp(ifcName, \"{}\") == 0 && strcmp(propName, \"{}\") == 0) {{",
        property.interface,
        property.name()
    )
}

fn property_get(class: &str, properties: &[TypedProperty]) -> Vec<Fragment> {
    let mut body = Vec::new();
    for property in properties {
        let branch = if property.property.readable() {
            let mut pack = generate_set("val", &property.ty, property.name(), 0);
            pack.push(Fragment::line("return ER_OK;"));
            pack
        } else {
            vec![Fragment::line("return ER_BUS_PROPERTY_ACCESS_DENIED;")]
        };
        body.push(Fragment::block(matches_property(property), branch, "}"));
    }
    body.push(Fragment::line("return ER_BUS_NO_SUCH_PROPERTY;"));
    function(
        GET_PROPERTY.replacen("Get(", &format!("{}::Get(", class), 1),
        body,
    )
}

/// Condition rejecting a value of the wrong type. Arrays of strings,
/// structs and dictionaries share a type id, so those compare the whole
/// signature. Variant properties accept anything.
fn value_check(property: &TypedProperty) -> Option<String> {
    match &property.ty {
        SigType::Variant => None,
        ty if ty.type_id_is_exact() => Some(format!("val.typeId != {}", ty.type_id())),
        _ => Some(format!(
            "!val.HasSignature(\"{}\")",
            property.property.signature
        )),
    }
}

fn property_set(class: &str, properties: &[TypedProperty]) -> Vec<Fragment> {
    let mut body = Vec::new();
    for property in properties {
        let branch = if property.property.writable() {
            let mut unpack = Vec::new();
            if let Some(check) = value_check(property) {
                unpack.push(Fragment::block(
                    format!("if ({}) {{", check),
                    vec![Fragment::line("return ER_BUS_BAD_VALUE;")],
                    "}",
                ));
            }
            if slot(&property.ty).is_counted() {
                unpack.push(Fragment::line(format!("delete [] {};", property.name())));
            }
            unpack.extend(generate_get("val", &property.ty, property.name(), false, 0));
            unpack.push(Fragment::line("return ER_OK;"));
            unpack
        } else {
            vec![Fragment::line("return ER_BUS_PROPERTY_ACCESS_DENIED;")]
        };
        body.push(Fragment::block(matches_property(property), branch, "}"));
    }
    body.push(Fragment::line("return ER_BUS_NO_SUCH_PROPERTY;"));
    function(
        SET_PROPERTY.replacen("Set(", &format!("{}::Set(", class), 1),
        body,
    )
}

/// `{N}ServiceMethods.cc`: the method bodies left to the developer.
pub fn emit_service_methods(ctx: &NodeContext) -> String {
    let class = ctx.service_class();
    let mut out = vec![
        Fragment::comment(format!(
            "{}Methods.cc\nMethod implementations of the {} service. Output \
             arguments are sent back to the caller once the method returns. \
             Regenerating the stubs does not overwrite this file.",
            class,
            ctx.name()
        )),
        Fragment::line(format!("#include \"{}.h\"", class)),
        Fragment::Blank,
    ];
    for method in &ctx.methods {
        out.extend(function(
            format!("void {}::{}({})", class, method.name(), method.params()),
            vec![Fragment::comment("Fill in method implementation here.")],
        ));
        out.push(Fragment::Blank);
    }
    render(&out)
}
