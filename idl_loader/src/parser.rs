use crate::errors::LoadError;
use idl_types::{
    Access, Arg, Direction, Interface, Method, ObjectNode, Property, Signal, ANNOTATION_ITEM_SECURE,
    ANNOTATION_NO_REPLY, ANNOTATION_SECURE, ANNOTATION_VARIANT_TYPES,
};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/* Interfaces every bus object already implements */
const STANDARD_INTERFACES: &[&str] = &[
    "org.freedesktop.DBus.Introspectable",
    "org.freedesktop.DBus.Properties",
];

#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Name unnamed arguments `inputArgN`, `outputArgN` and `signalArgN`
    /// instead of rejecting them.
    pub lax_naming: bool,
    /// Parent path of the root object. Taken from the root node's name when
    /// that is an absolute path.
    pub object_path: Option<String>,
    /// Class name of the root object, overriding the root node's name.
    pub object_name: Option<String>,
}

/// Accumulates object nodes across one or more XML documents. Interfaces
/// are tracked across documents so the same name cannot be declared twice
/// with different contents.
pub struct XmlLoader {
    options: LoaderOptions,
    objects: Vec<ObjectNode>,
    interfaces: HashMap<String, Interface>,
}

impl XmlLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            objects: Vec::new(),
            interfaces: HashMap::new(),
        }
    }

    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        info!("loading interface description {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&contents)
    }

    pub fn load_str(&mut self, xml: &str) -> Result<(), LoadError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        if root.tag_name().name() != "node" {
            return Err(LoadError::UnexpectedRoot {
                found: root.tag_name().name().to_string(),
            });
        }

        let xml_name = root.attribute("name").unwrap_or("");
        let base = match &self.options.object_path {
            Some(path) => trim_path(path).to_string(),
            None if xml_name.starts_with('/') => {
                xml_name[..xml_name.rfind('/').unwrap_or(0)].to_string()
            }
            None => String::new(),
        };
        let xml_class = &xml_name[xml_name.rfind('/').map_or(0, |i| i + 1)..];
        let class = match &self.options.object_name {
            Some(name) => {
                if !xml_class.is_empty() && xml_class != name {
                    warn!(
                        "object name '{}' overrides '{}' from the XML",
                        name, xml_class
                    );
                }
                Some(name.clone())
            }
            None if xml_class.is_empty() => None,
            None => Some(xml_class.to_string()),
        };
        let path = match &class {
            Some(name) => join_path(&base, name),
            None => "/".to_string(),
        };

        let before = self.objects.len();
        self.parse_node(root, class, path)?;
        debug!("loaded {} object(s)", self.objects.len() - before);
        Ok(())
    }

    pub fn objects(&self) -> &[ObjectNode] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<ObjectNode> {
        self.objects
    }

    fn parse_node(
        &mut self,
        element: Node,
        name: Option<String>,
        path: String,
    ) -> Result<(), LoadError> {
        let mut interfaces = Vec::new();
        for child in element.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "interface" => {
                    let iface_name = child.attribute("name").unwrap_or("");
                    if STANDARD_INTERFACES.contains(&iface_name) {
                        debug!("skipping standard interface {}", iface_name);
                        continue;
                    }
                    let iface = self.parse_interface(child)?;
                    interfaces.push(self.validate_interface(iface)?);
                }
                "node" => {
                    let child_name = child.attribute("name").unwrap_or("");
                    if child_name.is_empty() || child_name.contains('/') {
                        return Err(LoadError::NestedNodeName {
                            name: child_name.to_string(),
                        });
                    }
                    let child_path = join_path(&path, child_name);
                    self.parse_node(child, Some(child_name.to_string()), child_path)?;
                }
                other => debug!("ignoring <{}> inside <node>", other),
            }
        }

        if interfaces.is_empty() {
            return Ok(());
        }
        let name = name.ok_or(LoadError::MissingObjectName)?;
        if self.objects.iter().any(|object| object.name == name) {
            return Err(LoadError::DuplicateObject { name });
        }
        debug!(
            object = %name,
            path = %path,
            interfaces = interfaces.len(),
            "object node"
        );
        self.objects
            .push(ObjectNode::new(name, path, Interface::merged(interfaces)));
        Ok(())
    }

    /* Reuse an identical earlier declaration; reject a different one */
    fn validate_interface(&mut self, iface: Interface) -> Result<Interface, LoadError> {
        match self.interfaces.get(&iface.name) {
            Some(known) if *known == iface => Ok(iface),
            Some(_) => Err(LoadError::ConflictingInterface { name: iface.name }),
            None => {
                self.interfaces.insert(iface.name.clone(), iface.clone());
                Ok(iface)
            }
        }
    }

    fn parse_interface(&self, element: Node) -> Result<Interface, LoadError> {
        let mut iface = Interface::new(required(element, "name")?);
        for child in element.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "method" => iface.methods.push(self.parse_method(child)?),
                "signal" => iface.signals.push(self.parse_signal(child)?),
                "property" => iface.properties.push(parse_property(child)?),
                "annotation" => {
                    if is_set(child, ANNOTATION_ITEM_SECURE) || is_set(child, ANNOTATION_SECURE) {
                        iface.secure = true;
                    }
                }
                other => debug!("ignoring <{}> inside <interface>", other),
            }
        }
        debug!(
            interface = %iface.name,
            methods = iface.methods.len(),
            signals = iface.signals.len(),
            properties = iface.properties.len(),
            "parsed interface"
        );
        Ok(iface)
    }

    fn parse_method(&self, element: Node) -> Result<Method, LoadError> {
        let mut method = Method::new(required(element, "name")?);
        let label = format!("method {}", method.name);
        let (mut inputs, mut outputs) = (0, 0);

        for child in element.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "arg" => {
                    let raw = child.attribute("direction");
                    let direction =
                        Direction::parse(raw).ok_or_else(|| LoadError::InvalidDirection {
                            member: label.clone(),
                            arg: child.attribute("name").unwrap_or("").to_string(),
                            value: raw.unwrap_or("").to_string(),
                        })?;
                    let counter = match direction {
                        Direction::In => &mut inputs,
                        Direction::Out => &mut outputs,
                    };
                    let prefix = match direction {
                        Direction::In => "inputArg",
                        Direction::Out => "outputArg",
                    };
                    let arg = self.parse_arg(child, &label, direction, prefix, counter)?;
                    if method.has_arg(&arg.name) {
                        return Err(LoadError::DuplicateArg {
                            member: label,
                            arg: arg.name,
                        });
                    }
                    method.args.push(arg);
                }
                "annotation" => {
                    if is_set(child, ANNOTATION_NO_REPLY) {
                        method.no_reply = true;
                    } else if is_set(child, ANNOTATION_ITEM_SECURE) {
                        method.secure = true;
                    }
                }
                _ => {}
            }
        }
        Ok(method)
    }

    fn parse_signal(&self, element: Node) -> Result<Signal, LoadError> {
        let mut signal = Signal::new(required(element, "name")?);
        let label = format!("signal {}", signal.name);
        let mut count = 0;

        for child in element.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "arg" => {
                    let arg = self.parse_arg(child, &label, Direction::In, "signalArg", &mut count)?;
                    if matches!(child.attribute("direction"), Some(value) if value != "unset") {
                        warn!(
                            "signal argument \"{}\" of {} should not have a direction",
                            arg.name, signal.name
                        );
                    }
                    if signal.has_arg(&arg.name) {
                        return Err(LoadError::DuplicateArg {
                            member: label,
                            arg: arg.name,
                        });
                    }
                    signal.args.push(arg);
                }
                "annotation" => {
                    if is_set(child, ANNOTATION_ITEM_SECURE) {
                        signal.secure = true;
                    }
                }
                _ => {}
            }
        }
        Ok(signal)
    }

    /* `counter` numbers the generated names of unnamed arguments */
    fn parse_arg(
        &self,
        element: Node,
        member: &str,
        direction: Direction,
        prefix: &str,
        counter: &mut usize,
    ) -> Result<Arg, LoadError> {
        let signature = required(element, "type")?;
        let name = match element.attribute("name") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if self.options.lax_naming => {
                *counter += 1;
                format!("{}{}", prefix, *counter - 1)
            }
            _ => {
                return Err(LoadError::UnnamedArg {
                    member: member.to_string(),
                })
            }
        };

        let mut arg = Arg::new(name, signature, direction);
        arg.variant_hint = element
            .children()
            .filter(|child| child.has_tag_name("annotation"))
            .find(|child| child.attribute("name") == Some(ANNOTATION_VARIANT_TYPES))
            .and_then(|child| child.attribute("value"))
            .map(str::to_string);
        Ok(arg)
    }
}

fn parse_property(element: Node) -> Result<Property, LoadError> {
    let name = required(element, "name")?;
    let signature = required(element, "type")?;
    let raw = required(element, "access")?;
    let access = Access::parse(&raw).ok_or_else(|| LoadError::InvalidAccess {
        property: name.clone(),
        value: raw.clone(),
    })?;
    Ok(Property::new(name, signature, access))
}

fn required(element: Node, attribute: &str) -> Result<String, LoadError> {
    element
        .attribute(attribute)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LoadError::MissingAttribute {
            element: element.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

/* `<annotation name="{name}" value="true"/>` */
fn is_set(element: Node, name: &str) -> bool {
    element.attribute("name") == Some(name) && element.attribute("value") == Some("true")
}

fn trim_path(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

fn join_path(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}
