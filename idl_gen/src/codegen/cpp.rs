use crate::codegen::cpp_gen::{
    emit_client_handlers, emit_client_header, emit_client_source, emit_service_header,
    emit_service_methods, emit_service_source, emit_types_header, NodeContext,
};
use crate::codegen::GeneratedFile;
use crate::errors::GenError;
use crate::registry::Registry;
use idl_types::ObjectNode;
use tracing::{debug, info};

pub struct CppCodeGenerator {
    options: CppCodeGeneratorOptions,
}

#[derive(Debug, Clone)]
pub struct CppCodeGeneratorOptions {
    /// Bus name the service requests and the client looks for. Without it
    /// no name constant and no `FindName` helper are emitted.
    pub well_known_name: Option<String>,
    /// Emit the service class next to the client.
    pub emit_service: bool,
}

impl Default for CppCodeGeneratorOptions {
    fn default() -> Self {
        Self {
            well_known_name: None,
            emit_service: true,
        }
    }
}

impl CppCodeGenerator {
    pub fn new(options: CppCodeGeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CppCodeGeneratorOptions {
        &self.options
    }

    /// Render every file for one object node. Nothing is written to disk.
    pub fn emit_code(&self, node: &ObjectNode) -> Result<Vec<GeneratedFile>, GenError> {
        let mut registry = Registry::new();
        registry.begin_interface(&node.interface)?;
        let ctx = NodeContext::new(node, &registry, self.options.well_known_name.as_deref())?;
        debug!(
            node = %node.name,
            interface = registry.interface().unwrap_or_default(),
            methods = ctx.methods.len(),
            signals = ctx.signals.len(),
            properties = ctx.properties.len(),
            "emitting C++ stubs"
        );

        let name = &node.name;
        let mut files = vec![
            GeneratedFile::generated(ctx.types_header(), emit_types_header(&ctx)),
            GeneratedFile::generated(format!("{}Client.h", name), emit_client_header(&ctx)),
            GeneratedFile::generated(format!("{}Client.cc", name), emit_client_source(&ctx)),
            GeneratedFile::editable(
                format!("{}ClientHandlers.cc", name),
                emit_client_handlers(&ctx),
            ),
        ];
        if self.options.emit_service {
            files.push(GeneratedFile::generated(
                format!("{}Service.h", name),
                emit_service_header(&ctx),
            ));
            files.push(GeneratedFile::generated(
                format!("{}Service.cc", name),
                emit_service_source(&ctx),
            ));
            files.push(GeneratedFile::editable(
                format!("{}ServiceMethods.cc", name),
                emit_service_methods(&ctx),
            ));
        }
        info!(node = %node.name, files = files.len(), "generated C++ stubs");
        Ok(files)
    }

    /// The composite types a node would declare, for inspection without
    /// generating any code.
    pub fn discover_types(&self, node: &ObjectNode) -> Result<Registry, GenError> {
        let mut registry = Registry::new();
        registry.begin_interface(&node.interface)?;
        Ok(registry)
    }
}
