use serde_derive::{Deserialize, Serialize};

/* Annotation names recognised on interfaces, members and arguments */
pub const ANNOTATION_NO_REPLY: &str = "org.freedesktop.DBus.Method.NoReply";
pub const ANNOTATION_SECURE: &str = "org.alljoyn.Bus.Secure";
pub const ANNOTATION_ITEM_SECURE: &str = "org.alljoyn.Bus.Item.IsSecure";
pub const ANNOTATION_VARIANT_TYPES: &str = "org.alljoyn.Bus.Arg.VariantTypes";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    In,
    Out,
}

impl Direction {
    /* Parse the XML `direction` attribute; a missing or "unset" value means `in` */
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("") | Some("in") | Some("unset") => Some(Direction::In),
            Some("out") => Some(Direction::Out),
            Some(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    Read,
    Write,
    #[serde(rename = "readwrite")]
    ReadWrite,
}

impl Access {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read" => Some(Access::Read),
            "write" => Some(Access::Write),
            "readwrite" => Some(Access::ReadWrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
            Access::ReadWrite => "readwrite",
        }
    }

    pub fn readable(&self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn writable(&self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// A single named, typed argument of a method or signal.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Arg {
    pub name: String,
    /// Type signature, e.g. `s`, `a{si}` or `(ia(ss))`.
    pub signature: String,
    #[serde(default)]
    pub direction: Direction,
    /// Value of the `org.alljoyn.Bus.Arg.VariantTypes` annotation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_hint: Option<String>,
}

impl Arg {
    pub fn new(name: impl Into<String>, signature: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            direction,
            variant_hint: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Arg>,
    #[serde(default)]
    pub no_reply: bool,
    #[serde(default)]
    pub secure: bool,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            no_reply: false,
            secure: false,
        }
    }

    pub fn in_args(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter().filter(|arg| arg.direction == Direction::In)
    }

    pub fn out_args(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter().filter(|arg| arg.direction == Direction::Out)
    }

    /// Concatenated signature of every `in` argument.
    pub fn in_signature(&self) -> String {
        self.in_args().map(|arg| arg.signature.as_str()).collect()
    }

    /// Concatenated signature of every `out` argument.
    pub fn out_signature(&self) -> String {
        self.out_args().map(|arg| arg.signature.as_str()).collect()
    }

    /// Comma separated argument names, inputs first, as the bus expects them
    /// when the member is added to an interface description.
    pub fn arg_names(&self) -> String {
        self.in_args()
            .chain(self.out_args())
            .map(|arg| arg.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.args.iter().any(|arg| arg.name == name)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Signal {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Arg>,
    #[serde(default)]
    pub secure: bool,
}

impl Signal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            secure: false,
        }
    }

    pub fn signature(&self) -> String {
        self.args.iter().map(|arg| arg.signature.as_str()).collect()
    }

    pub fn arg_names(&self) -> String {
        self.args
            .iter()
            .map(|arg| arg.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.args.iter().any(|arg| arg.name == name)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Property {
    pub name: String,
    pub signature: String,
    pub access: Access,
}

impl Property {
    pub fn new(name: impl Into<String>, signature: impl Into<String>, access: Access) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            access,
        }
    }

    /// The synthetic argument mirroring this property's name and signature.
    pub fn arg(&self) -> Arg {
        Arg::new(self.name.clone(), self.signature.clone(), Direction::Out)
    }

    pub fn readable(&self) -> bool {
        self.access.readable()
    }

    pub fn writable(&self) -> bool {
        self.access.writable()
    }
}

/// A bus interface. When an object implements several interfaces they are
/// merged into one derived interface whose `parents` hold the originals.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Interface {
    /// Fully-qualified dotted name, or the `__` joined short names of the
    /// parents for a derived interface.
    pub name: String,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<Interface>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            signals: Vec::new(),
            properties: Vec::new(),
            secure: false,
            parents: Vec::new(),
        }
    }

    /// Merge several interfaces into one derived interface. Parents are
    /// sorted by full name so the result does not depend on XML order.
    pub fn merged(mut parts: Vec<Interface>) -> Interface {
        if parts.len() == 1 {
            return parts.remove(0);
        }
        parts.sort_by(|a, b| a.name.cmp(&b.name));

        let name = parts
            .iter()
            .map(|part| part.short_name())
            .collect::<Vec<_>>()
            .join("__");
        let mut derived = Interface::new(name);
        for part in &parts {
            derived.methods.extend(part.methods.iter().cloned());
            derived.signals.extend(part.signals.iter().cloned());
            derived.properties.extend(part.properties.iter().cloned());
        }
        derived.parents = parts;
        derived
    }

    /// Last dotted segment of the name (`org.example.Chat` -> `Chat`).
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_derived(&self) -> bool {
        !self.parents.is_empty()
    }

    /// The interfaces that actually exist on the bus: the parents of a
    /// derived interface, or the interface itself.
    pub fn concrete(&self) -> Vec<&Interface> {
        if self.is_derived() {
            self.parents.iter().collect()
        } else {
            vec![self]
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|signal| signal.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Full name of the concrete interface declaring the given method.
    pub fn interface_by_method(&self, name: &str) -> Option<&str> {
        self.concrete()
            .into_iter()
            .find(|iface| iface.method(name).is_some())
            .map(|iface| iface.name.as_str())
    }

    /// Full name of the concrete interface declaring the given signal.
    pub fn interface_by_signal(&self, name: &str) -> Option<&str> {
        self.concrete()
            .into_iter()
            .find(|iface| iface.signal(name).is_some())
            .map(|iface| iface.name.as_str())
    }

    /// Full name of the concrete interface declaring the given property.
    pub fn interface_by_property(&self, name: &str) -> Option<&str> {
        self.concrete()
            .into_iter()
            .find(|iface| iface.property(name).is_some())
            .map(|iface| iface.name.as_str())
    }
}
