use super::dcls::emit_declarations;
use super::interface::emit_create_interfaces;
use super::NodeContext;
use crate::fragment::{render, Fragment};

const INCLUDES: &[&str] = &[
    "#include <string.h>",
    "#include <alljoyn/BusAttachment.h>",
    "#include <alljoyn/BusObject.h>",
    "#include <alljoyn/InterfaceDescription.h>",
    "#include <alljoyn/MsgArg.h>",
    "#include <alljoyn/ProxyBusObject.h>",
    "#include <qcc/String.h>",
];

/// `{N}Types.h`: the composite type declarations, bus constants and the
/// interface creation helper shared by the client and the service.
pub fn emit_types_header(ctx: &NodeContext) -> String {
    let guard = format!("{}_TYPES_H", ctx.upper());
    let mut out = vec![
        Fragment::comment(format!(
            "{}\nTypes and constants shared by the {} client and service.",
            ctx.types_header(),
            ctx.name()
        )),
        Fragment::line(format!("#ifndef {}", guard)),
        Fragment::line(format!("#define {}", guard)),
        Fragment::Blank,
    ];
    out.extend(INCLUDES.iter().map(|include| Fragment::line(*include)));
    out.push(Fragment::Blank);
    out.push(Fragment::line("using namespace ajn;"));
    out.push(Fragment::line("using namespace qcc;"));
    out.push(Fragment::Blank);

    if let Some(name) = ctx.well_known_name {
        out.push(Fragment::line(format!(
            "static const char *const {}_WELL_KNOWN_NAME = \"{}\";",
            ctx.upper(),
            name
        )));
    }
    out.push(Fragment::line(format!(
        "static const char *const {}_OBJECT_PATH = \"{}\";",
        ctx.upper(),
        ctx.node.path
    )));
    out.push(Fragment::Blank);

    out.extend(emit_declarations(ctx.registry));
    out.extend(emit_create_interfaces(ctx.node));
    out.push(Fragment::Blank);
    out.push(Fragment::line(format!("#endif /* {} */", guard)));
    render(&out)
}
