//! Client stubs: a `BusObject` subclass wrapping a `ProxyBusObject` so
//! remote methods, signals and properties read like local calls.

use super::get::generate_get;
use super::helpers::{capitalize, function, param_decl, return_on_error};
use super::interface::create_interfaces_fn;
use super::set::generate_set;
use super::{NodeContext, TypedMethod, TypedProperty, TypedSignal};
use crate::fragment::{render, Fragment, INDENT};
use idl_types::Direction;

/// `{N}Client.h`
pub fn emit_client_header(ctx: &NodeContext) -> String {
    let class = ctx.client_class();
    let guard = format!("{}_CLIENT_H", ctx.upper());

    let mut public = vec![
        Fragment::comment(
            "Connects to the object at `path` owned by `serviceName` on the given bus.",
        ),
        Fragment::line(format!(
            "{}(BusAttachment &bus, const char *serviceName, const char *path);",
            class
        )),
        Fragment::line(format!("~{}();", class)),
        Fragment::Blank,
    ];
    if ctx.well_known_name.is_some() {
        public.push(Fragment::comment(format!(
            "Look for a service advertising {}_WELL_KNOWN_NAME.",
            ctx.upper()
        )));
        public.push(Fragment::line("QStatus FindName();"));
    }
    public.push(Fragment::comment(
        "Create the proxy object for a joined session and attach the interfaces to it.",
    ));
    public.push(Fragment::line("QStatus SetUpProxy(SessionId sessionId);"));

    for method in &ctx.methods {
        public.push(Fragment::Blank);
        public.push(Fragment::comment(format!(
            "Call \"{0}\" on the remote object. Output arguments are filled from the reply.",
            method.name()
        )));
        public.push(Fragment::line(format!(
            "QStatus {}({});",
            method.name(),
            method.params()
        )));
    }
    for signal in &ctx.signals {
        public.push(Fragment::Blank);
        public.push(Fragment::comment(format!(
            "Start listening for the \"{0}\" signal; {0}Handler() is called for each one.",
            signal.name()
        )));
        public.push(Fragment::line(format!(
            "QStatus Register{}Handler();",
            signal.name()
        )));
    }
    for property in &ctx.properties {
        public.push(Fragment::Blank);
        public.extend(property_decls(property));
    }

    let mut private = Vec::new();
    for signal in &ctx.signals {
        private.push(Fragment::line(format!(
            "void {}Wrapper(const InterfaceDescription::Member *member, const char *srcPath, Message &msg);",
            signal.name()
        )));
        private.push(Fragment::line(format!(
            "void {}Handler({});",
            signal.name(),
            signal.params()
        )));
        private.push(Fragment::Blank);
    }
    private.push(Fragment::line("BusAttachment *myBusAttachment;"));
    private.push(Fragment::line("const char *serviceName;"));
    private.push(Fragment::line("ProxyBusObject *proxyBusObj;"));

    let out = vec![
        Fragment::comment(format!(
            "{0}.h\nClient side of the {1} object. {0} hides the proxy object and \
             the message packing behind typed methods.",
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

fn property_decls(property: &TypedProperty) -> Vec<Fragment> {
    let mut out = Vec::new();
    let name = capitalize(property.name());
    if property.property.readable() {
        out.push(Fragment::line(format!(
            "QStatus Get{}({});",
            name,
            param_decl(property.name(), &property.ty, Direction::Out)
        )));
    }
    if property.property.writable() {
        out.push(Fragment::line(format!(
            "QStatus Set{}({});",
            name,
            param_decl(property.name(), &property.ty, Direction::In)
        )));
    }
    out
}

/// `{N}Client.cc`
pub fn emit_client_source(ctx: &NodeContext) -> String {
    let class = ctx.client_class();
    let mut out = vec![
        Fragment::comment(format!(
            "{}.cc\nImplementation of the {} client class.",
            class,
            ctx.name()
        )),
        Fragment::line(format!("#include \"{}.h\"", class)),
        Fragment::Blank,
    ];

    out.push(Fragment::line(format!(
        "{0}::{0}(BusAttachment &bus, const char *serviceName, const char *path)",
        class
    )));
    out.push(Fragment::line(format!(
        "{}: BusObject(path), myBusAttachment(&bus), serviceName(serviceName), proxyBusObj(NULL)",
        INDENT
    )));
    out.push(Fragment::block("{", Vec::new(), "}"));
    out.push(Fragment::Blank);
    out.extend(function(
        format!("{0}::~{0}()", class),
        vec![Fragment::line("delete proxyBusObj;")],
    ));
    out.push(Fragment::Blank);

    if ctx.well_known_name.is_some() {
        out.extend(function(
            format!("QStatus {}::FindName()", class),
            vec![Fragment::line(format!(
                "return myBusAttachment->FindAdvertisedName({}_WELL_KNOWN_NAME);",
                ctx.upper()
            ))],
        ));
        out.push(Fragment::Blank);
    }

    out.extend(set_up_proxy(ctx, &class));
    out.push(Fragment::Blank);

    for method in &ctx.methods {
        out.push(Fragment::comment(format!(
            "Method call wrapper for \"{}\" on {}.",
            method.name(),
            method.interface
        )));
        out.extend(method_wrapper(&class, method));
        out.push(Fragment::Blank);
    }

    for signal in &ctx.signals {
        out.extend(register_signal(&class, signal));
        out.push(Fragment::Blank);
        out.extend(signal_wrapper(&class, signal));
        out.push(Fragment::Blank);
    }

    for property in &ctx.properties {
        out.extend(property_accessors(&class, property));
    }

    render(&out)
}

fn set_up_proxy(ctx: &NodeContext, class: &str) -> Vec<Fragment> {
    let mut body = vec![
        Fragment::line(format!(
            "QStatus status = {}(*myBusAttachment);",
            create_interfaces_fn(ctx.node)
        )),
        return_on_error("status"),
        Fragment::Blank,
        Fragment::block(
            "if (proxyBusObj == NULL) {",
            vec![Fragment::line(
                "proxyBusObj = new ProxyBusObject(*myBusAttachment, serviceName, GetPath(), sessionId);",
            )],
            "}",
        ),
        Fragment::line("const InterfaceDescription *iface = NULL;"),
    ];
    for iface in ctx.node.interface.concrete() {
        body.push(Fragment::line(format!(
            "iface = myBusAttachment->GetInterface(\"{}\");",
            iface.name
        )));
        body.push(Fragment::block(
            "if (iface == NULL) {",
            vec![Fragment::line("return ER_BUS_NO_SUCH_INTERFACE;")],
            "}",
        ));
        body.push(Fragment::line("status = proxyBusObj->AddInterface(*iface);"));
        body.push(return_on_error("status"));
    }
    body.push(Fragment::line("return status;"));
    function(format!("QStatus {}::SetUpProxy(SessionId sessionId)", class), body)
}

fn method_wrapper(class: &str, method: &TypedMethod) -> Vec<Fragment> {
    let in_count = method.in_args().count();
    let out_count = method.out_args().count();
    let expects_reply = !method.method.no_reply;

    let mut body = vec![Fragment::line("QStatus status = ER_OK;")];
    let args = if in_count > 0 {
        body.push(Fragment::line(format!("MsgArg args[{}];", in_count)));
        for (index, arg) in method.in_args().enumerate() {
            body.extend(generate_set(
                &format!("args[{}]", index),
                &arg.ty,
                arg.name(),
                0,
            ));
        }
        "args"
    } else {
        "NULL"
    };

    let call = if !expects_reply {
        let flags = if method.secure {
            "ALLJOYN_FLAG_NO_REPLY_EXPECTED | ALLJOYN_FLAG_ENCRYPTED"
        } else {
            "ALLJOYN_FLAG_NO_REPLY_EXPECTED"
        };
        format!(
            "status = proxyBusObj->MethodCall(\"{}\", \"{}\", {}, {}, {});",
            method.interface,
            method.name(),
            args,
            in_count,
            flags
        )
    } else {
        body.push(Fragment::line("Message replyMsg(*myBusAttachment);"));
        let tail = if method.secure {
            ", ProxyBusObject::DefaultCallTimeout, ALLJOYN_FLAG_ENCRYPTED"
        } else {
            ""
        };
        format!(
            "status = proxyBusObj->MethodCall(\"{}\", \"{}\", {}, {}, replyMsg{});",
            method.interface,
            method.name(),
            args,
            in_count,
            tail
        )
    };
    body.push(Fragment::line(call));
    body.push(return_on_error("status"));

    if expects_reply && out_count > 0 {
        body.push(Fragment::Blank);
        body.push(Fragment::line("const MsgArg *returnArgs;"));
        body.push(Fragment::line("size_t numArgs;"));
        body.push(Fragment::line("replyMsg->GetArgs(numArgs, returnArgs);"));
        let mut extract = Vec::new();
        for (index, arg) in method.out_args().enumerate() {
            extract.extend(generate_get(
                &format!("returnArgs[{}]", index),
                &arg.ty,
                arg.name(),
                false,
                0,
            ));
        }
        extract.push(Fragment::line("return status;"));
        body.push(Fragment::block(
            format!("if (numArgs == {}) {{", out_count),
            extract,
            "",
        ));
        body.push(Fragment::block(
            "} else {",
            vec![Fragment::line("return ER_BUS_BAD_VALUE;")],
            "}",
        ));
    } else {
        body.push(Fragment::line("return status;"));
    }

    function(
        format!("QStatus {}::{}({})", class, method.name(), method.params()),
        body,
    )
}

fn register_signal(class: &str, signal: &TypedSignal) -> Vec<Fragment> {
    let body = vec![
        Fragment::block(
            "if (proxyBusObj == NULL) {",
            vec![Fragment::line("return ER_FAIL;")],
            "}",
        ),
        Fragment::line(format!(
            "const InterfaceDescription *iface = proxyBusObj->GetInterface(\"{}\");",
            signal.interface
        )),
        Fragment::block(
            "if (iface == NULL) {",
            vec![Fragment::line("return ER_BUS_NO_SUCH_INTERFACE;")],
            "}",
        ),
        Fragment::line(format!(
            "QStatus status = myBusAttachment->RegisterSignalHandler(this, \
             static_cast<MessageReceiver::SignalHandler>(&{}::{}Wrapper), \
             iface->GetMember(\"{}\"), NULL);",
            class,
            signal.name(),
            signal.name()
        )),
        return_on_error("status"),
        Fragment::line(format!(
            "return myBusAttachment->AddMatch(\"type='signal',interface='{}',member='{}'\");",
            signal.interface,
            signal.name()
        )),
    ];
    function(
        format!("QStatus {}::Register{}Handler()", class, signal.name()),
        body,
    )
}

fn signal_wrapper(class: &str, signal: &TypedSignal) -> Vec<Fragment> {
    let handler_call = Fragment::line(format!(
        "{}Handler({});",
        signal.name(),
        signal.call_args()
    ));
    let body = if signal.args.is_empty() {
        vec![handler_call]
    } else {
        let mut unpack = Vec::new();
        for (index, arg) in signal.args.iter().enumerate() {
            unpack.extend(generate_get(
                &format!("args[{}]", index),
                &arg.ty,
                arg.name(),
                true,
                0,
            ));
        }
        unpack.push(handler_call);
        vec![
            Fragment::line("const MsgArg *args;"),
            Fragment::line("size_t numArgs;"),
            Fragment::line("msg->GetArgs(numArgs, args);"),
            Fragment::block(
                format!("if (numArgs == {}) {{", signal.args.len()),
                unpack,
                "}",
            ),
        ]
    };
    function(
        format!(
            "void {}::{}Wrapper(const InterfaceDescription::Member *member, const char *srcPath, Message &msg)",
            class,
            signal.name()
        ),
        body,
    )
}

fn property_accessors(class: &str, property: &TypedProperty) -> Vec<Fragment> {
    let mut out = Vec::new();
    let name = capitalize(property.name());

    if property.property.readable() {
        let mut body = vec![
            Fragment::line("MsgArg propValue;"),
            Fragment::line(format!(
                "QStatus status = proxyBusObj->GetProperty(\"{}\", \"{}\", propValue);",
                property.interface,
                property.name()
            )),
            return_on_error("status"),
        ];
        body.extend(generate_get(
            "propValue",
            &property.ty,
            property.name(),
            false,
            0,
        ));
        body.push(Fragment::line("return status;"));
        out.extend(function(
            format!(
                "QStatus {}::Get{}({})",
                class,
                name,
                param_decl(property.name(), &property.ty, Direction::Out)
            ),
            body,
        ));
        out.push(Fragment::Blank);
    }

    if property.property.writable() {
        let mut body = vec![Fragment::line("MsgArg propValue;")];
        body.extend(generate_set("propValue", &property.ty, property.name(), 0));
        body.push(Fragment::line(format!(
            "return proxyBusObj->SetProperty(\"{}\", \"{}\", propValue);",
            property.interface,
            property.name()
        )));
        out.extend(function(
            format!(
                "QStatus {}::Set{}({})",
                class,
                name,
                param_decl(property.name(), &property.ty, Direction::In)
            ),
            body,
        ));
        out.push(Fragment::Blank);
    }
    out
}

/// `{N}ClientHandlers.cc`: empty signal handlers for the developer.
pub fn emit_client_handlers(ctx: &NodeContext) -> String {
    let class = ctx.client_class();
    let mut out = vec![
        Fragment::comment(format!(
            "{}Handlers.cc\nSignal handlers of the {} client. Fill in the bodies; \
             regenerating the stubs does not overwrite this file.",
            class,
            ctx.name()
        )),
        Fragment::line(format!("#include \"{}.h\"", class)),
        Fragment::Blank,
    ];
    for signal in &ctx.signals {
        out.push(Fragment::comment(format!(
            "Called for every \"{}\" signal received after Register{}Handler().",
            signal.name(),
            signal.name()
        )));
        out.extend(function(
            format!(
                "void {}::{}Handler({})",
                class,
                signal.name(),
                signal.params()
            ),
            vec![Fragment::comment("Fill in signal handler implementation here.")],
        ));
        out.push(Fragment::Blank);
    }
    render(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{discover, Registry};
    use idl_types::{Access, Arg, Interface, Method, ObjectNode, Property, Signal};

    fn chat() -> ObjectNode {
        let mut iface = Interface::new("org.example.Chat");
        let mut send = Method::new("Send");
        send.args.push(Arg::new("text", "s", Direction::In));
        send.args.push(Arg::new("id", "u", Direction::Out));
        iface.methods.push(send);
        let mut ping = Method::new("Ping");
        ping.no_reply = true;
        ping.secure = true;
        iface.methods.push(ping);
        let mut joined = Signal::new("Joined");
        joined.args.push(Arg::new("who", "s", Direction::In));
        joined.args.push(Arg::new("members", "a(su)", Direction::In));
        iface.signals.push(joined);
        iface
            .properties
            .push(Property::new("topic", "s", Access::ReadWrite));
        ObjectNode::new("Chat", "/Chat", iface)
    }

    fn with_ctx<T>(node: &ObjectNode, f: impl FnOnce(&NodeContext) -> T) -> T {
        let registry: Registry = discover(&node.interface).unwrap();
        let ctx = NodeContext::new(node, &registry, Some("org.example.Chat")).unwrap();
        f(&ctx)
    }

    #[test]
    fn header_declares_wrappers_and_handlers() {
        let header = with_ctx(&chat(), emit_client_header);
        assert!(header.contains("class ChatClient : public BusObject\n{\n    public:\n"));
        assert!(header.contains("        QStatus Send(String text, unsigned int& id);\n"));
        assert!(header.contains("        QStatus RegisterJoinedHandler();\n"));
        assert!(header.contains(
            "        void JoinedHandler(String who, const membersStruct *members, size_t membersNumElements);\n"
        ));
        assert!(header.contains("        QStatus GetTopic(String& topic);\n"));
        assert!(header.contains("        QStatus SetTopic(String topic);\n"));
        assert!(header.contains("        ProxyBusObject *proxyBusObj;\n"));
    }

    #[test]
    fn method_wrapper_checks_reply_count() {
        let source = with_ctx(&chat(), emit_client_source);
        assert!(source.contains("QStatus ChatClient::Send(String text, unsigned int& id)\n{\n"));
        assert!(source.contains("    args[0].Set(\"s\", text.c_str());\n"));
        assert!(source.contains(
            "    status = proxyBusObj->MethodCall(\"org.example.Chat\", \"Send\", args, 1, replyMsg);\n"
        ));
        assert!(source.contains(
            "    if (numArgs == 1) {\n        returnArgs[0].Get(\"u\", &id);\n        return status;\n    } else {\n        return ER_BUS_BAD_VALUE;\n    }\n"
        ));
    }

    #[test]
    fn no_reply_method_uses_flags() {
        let source = with_ctx(&chat(), emit_client_source);
        assert!(source.contains(
            "status = proxyBusObj->MethodCall(\"org.example.Chat\", \"Ping\", NULL, 0, ALLJOYN_FLAG_NO_REPLY_EXPECTED | ALLJOYN_FLAG_ENCRYPTED);"
        ));
        let ping = &source[source.find("QStatus ChatClient::Ping()").unwrap()..];
        let ping = &ping[..ping.find("\n}\n").unwrap()];
        assert!(!ping.contains("replyMsg"));
    }

    #[test]
    fn signal_wrapper_unpacks_before_calling_handler() {
        let source = with_ctx(&chat(), emit_client_source);
        assert!(source.contains("    if (numArgs == 2) {\n        String who;\n"));
        assert!(source.contains("        membersStruct *members;\n        size_t membersNumElements;\n"));
        assert!(source.contains("        JoinedHandler(who, members, membersNumElements);\n"));
        assert!(source.contains(
            "static_cast<MessageReceiver::SignalHandler>(&ChatClient::JoinedWrapper)"
        ));
    }

    #[test]
    fn properties_go_through_proxy() {
        let source = with_ctx(&chat(), emit_client_source);
        assert!(source.contains(
            "    QStatus status = proxyBusObj->GetProperty(\"org.example.Chat\", \"topic\", propValue);\n"
        ));
        assert!(source.contains("    propValue.Set(\"s\", topic.c_str());\n"));
    }

    #[test]
    fn handlers_file_has_empty_bodies() {
        let handlers = with_ctx(&chat(), emit_client_handlers);
        assert!(handlers.contains(
            "void ChatClient::JoinedHandler(String who, const membersStruct *members, size_t membersNumElements)\n{\n    /* Fill in signal handler implementation here. */\n}\n"
        ));
    }
}
