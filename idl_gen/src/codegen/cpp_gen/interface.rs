use super::helpers::{function, return_on_error};
use crate::fragment::Fragment;
use idl_types::{Access, Interface, ObjectNode};

pub fn create_interfaces_fn(node: &ObjectNode) -> String {
    format!("Create{}Interfaces", node.name)
}

/// `static QStatus Create{N}Interfaces(BusAttachment &bus)`: registers the
/// description of every concrete interface of the node with the bus unless
/// it is already known there.
pub fn emit_create_interfaces(node: &ObjectNode) -> Vec<Fragment> {
    let mut body = vec![
        Fragment::line("QStatus status = ER_OK;"),
        Fragment::line("InterfaceDescription *iface = NULL;"),
        Fragment::Blank,
    ];
    for iface in node.interface.concrete() {
        body.push(Fragment::block(
            format!("if (bus.GetInterface(\"{}\") == NULL) {{", iface.name),
            describe_interface(iface),
            "}",
        ));
    }
    body.push(Fragment::line("return status;"));

    let mut out = vec![Fragment::comment(format!(
        "Create the interface descriptions implemented by {} on the bus attachment.",
        node.name
    ))];
    out.extend(function(
        format!("static QStatus {}(BusAttachment &bus)", create_interfaces_fn(node)),
        body,
    ));
    out
}

fn describe_interface(iface: &Interface) -> Vec<Fragment> {
    let policy = if iface.secure {
        "AJ_IFC_SECURITY_REQUIRED"
    } else {
        "AJ_IFC_SECURITY_INHERIT"
    };
    let mut out = vec![
        Fragment::line(format!(
            "status = bus.CreateInterface(\"{}\", iface, {});",
            iface.name, policy
        )),
        return_on_error("status"),
    ];

    for method in &iface.methods {
        let flags = if method.no_reply {
            "MEMBER_ANNOTATE_NO_REPLY"
        } else {
            "0"
        };
        out.push(Fragment::line(format!(
            "status = iface->AddMethod(\"{}\", {}, {}, {}, {});",
            method.name,
            quoted_or_null(&method.in_signature()),
            quoted_or_null(&method.out_signature()),
            quoted_or_null(&method.arg_names()),
            flags
        )));
        out.push(return_on_error("status"));
    }

    for signal in &iface.signals {
        out.push(Fragment::line(format!(
            "status = iface->AddSignal(\"{}\", {}, {}, 0);",
            signal.name,
            quoted_or_null(&signal.signature()),
            quoted_or_null(&signal.arg_names())
        )));
        out.push(return_on_error("status"));
    }

    for property in &iface.properties {
        let access = match property.access {
            Access::Read => "PROP_ACCESS_READ",
            Access::Write => "PROP_ACCESS_WRITE",
            Access::ReadWrite => "PROP_ACCESS_RW",
        };
        out.push(Fragment::line(format!(
            "status = iface->AddProperty(\"{}\", \"{}\", {});",
            property.name, property.signature, access
        )));
        out.push(return_on_error("status"));
    }

    out.push(Fragment::line("iface->Activate();"));
    out
}

fn quoted_or_null(text: &str) -> String {
    if text.is_empty() {
        "NULL".to_string()
    } else {
        format!("\"{}\"", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::render;
    use idl_types::{Arg, Direction, Method, Property, Signal};

    fn lamp() -> ObjectNode {
        let mut iface = Interface::new("org.example.Lamp");
        iface.secure = true;
        let mut toggle = Method::new("Toggle");
        toggle.no_reply = true;
        iface.methods.push(toggle);
        let mut dim = Method::new("Dim");
        dim.args.push(Arg::new("level", "y", Direction::In));
        dim.args.push(Arg::new("previous", "y", Direction::Out));
        iface.methods.push(dim);
        let mut changed = Signal::new("Changed");
        changed.args.push(Arg::new("on", "b", Direction::In));
        iface.signals.push(changed);
        iface
            .properties
            .push(Property::new("color", "(yyy)", Access::ReadWrite));
        ObjectNode::new("Lamp", "/Lamp", iface)
    }

    #[test]
    fn members_are_added_with_their_flags() {
        let out = render(&emit_create_interfaces(&lamp()));
        assert!(out.contains("static QStatus CreateLampInterfaces(BusAttachment &bus)\n{\n"));
        assert!(out.contains(
            "bus.CreateInterface(\"org.example.Lamp\", iface, AJ_IFC_SECURITY_REQUIRED);"
        ));
        assert!(out.contains(
            "iface->AddMethod(\"Toggle\", NULL, NULL, NULL, MEMBER_ANNOTATE_NO_REPLY);"
        ));
        assert!(out.contains("iface->AddMethod(\"Dim\", \"y\", \"y\", \"level,previous\", 0);"));
        assert!(out.contains("iface->AddSignal(\"Changed\", \"b\", \"on\", 0);"));
        assert!(out.contains("iface->AddProperty(\"color\", \"(yyy)\", PROP_ACCESS_RW);"));
        assert!(out.contains("        iface->Activate();\n"));
    }

    #[test]
    fn merged_node_creates_each_parent() {
        let mut presence = Interface::new("org.example.Presence");
        presence.signals.push(Signal::new("Away"));
        let node = lamp();
        let merged = Interface::merged(vec![node.interface, presence]);
        let node = ObjectNode::new("Lamp", "/Lamp", merged);

        let out = render(&emit_create_interfaces(&node));
        assert!(out.contains("if (bus.GetInterface(\"org.example.Lamp\") == NULL) {"));
        assert!(out.contains("if (bus.GetInterface(\"org.example.Presence\") == NULL) {"));
        assert!(out.contains("AJ_IFC_SECURITY_INHERIT"));
        assert!(out.contains("iface->AddSignal(\"Away\", NULL, NULL, 0);"));
    }
}
