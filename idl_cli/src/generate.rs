/* Generate command: load every XML file, generate all nodes, then write */

use crate::config::GenConfig;
use crate::output::write_files;
use anyhow::Context;
use clap::ValueEnum;
use idl_gen::{CppCodeGenerator, GeneratedFile};
use idl_loader::XmlLoader;
use idl_types::ObjectNode;
use std::path::PathBuf;
use tracing::debug;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum ModelFormat {
    Json,
    Yaml,
}

pub fn load_objects(config: &GenConfig) -> anyhow::Result<Vec<ObjectNode>> {
    let mut loader = XmlLoader::new(config.loader_options());
    for file in &config.files {
        loader
            .load_file(file)
            .with_context(|| format!("failed to load {}", file.display()))?;
    }
    let objects = loader.into_objects();
    if objects.is_empty() {
        anyhow::bail!("no object in the input declares an interface");
    }
    Ok(objects)
}

/// Nothing is written unless every node generates.
pub fn run(config: &GenConfig) -> anyhow::Result<Vec<PathBuf>> {
    let objects = load_objects(config)?;
    let generator = CppCodeGenerator::new(config.generator_options());

    let mut files: Vec<GeneratedFile> = Vec::new();
    for object in &objects {
        let generated = generator
            .emit_code(object)
            .with_context(|| format!("failed to generate code for object {}", object.name))?;
        debug!(object = %object.name, files = generated.len(), "generated");
        files.extend(generated);
    }

    write_files(&config.output_path, &files, config.overwrite).with_context(|| {
        format!(
            "failed to write output to {}",
            config.output_path.display()
        )
    })
}

pub fn dump_model(config: &GenConfig, format: ModelFormat) -> anyhow::Result<String> {
    let objects = load_objects(config)?;
    let text = match format {
        ModelFormat::Json => serde_json::to_string_pretty(&objects)?,
        ModelFormat::Yaml => serde_yml::to_string(&objects)?,
    };
    Ok(text)
}

/// JSON listing of the composite types discovered for every object.
pub fn dump_types(config: &GenConfig) -> anyhow::Result<String> {
    let objects = load_objects(config)?;
    let generator = CppCodeGenerator::new(config.generator_options());
    let mut registries = Vec::with_capacity(objects.len());
    for object in &objects {
        let registry = generator
            .discover_types(object)
            .with_context(|| format!("failed to discover types of object {}", object.name))?;
        registries.push(registry);
    }
    Ok(serde_json::to_string_pretty(&registries)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"
<node name="/org/example/Chat">
  <interface name="org.example.Chat">
    <method name="Send">
      <arg name="text" type="s" direction="in"/>
      <arg name="members" type="a(su)" direction="out"/>
    </method>
  </interface>
</node>
"#;

    fn config(dir: &std::path::Path, xml: &str) -> GenConfig {
        let input = dir.join("chat.xml");
        std::fs::write(&input, xml).unwrap();
        GenConfig {
            well_known_name: "org.example.Chat".to_string(),
            object_path: None,
            object_name: None,
            client_only: false,
            output_path: dir.join("out"),
            overwrite: false,
            lax_naming: false,
            files: vec![input],
        }
    }

    #[test]
    fn writes_client_and_service() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), XML);
        let written = run(&cfg).unwrap();
        assert_eq!(written.len(), 7);
        let types = std::fs::read_to_string(cfg.output_path.join("ChatTypes.h")).unwrap();
        assert!(types.contains("CHAT_WELL_KNOWN_NAME = \"org.example.Chat\""));
        assert!(types.contains("struct membersStruct{"));
    }

    #[test]
    fn failed_generation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), &XML.replace("a(su)", "a{vs}"));
        assert!(run(&cfg).is_err());
        assert!(!cfg.output_path.exists());
    }

    #[test]
    fn model_dump_is_parseable() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), XML);
        let json = dump_model(&cfg, ModelFormat::Json).unwrap();
        let objects: Vec<ObjectNode> = serde_json::from_str(&json).unwrap();
        assert_eq!(objects[0].path, "/org/example/Chat");

        let yaml = dump_model(&cfg, ModelFormat::Yaml).unwrap();
        assert!(yaml.contains("name: Chat"));
    }

    #[test]
    fn type_dump_lists_composites() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), XML);
        let json = dump_types(&cfg).unwrap();
        assert!(json.contains("\"type-name\": \"membersStruct\""));
    }
}
