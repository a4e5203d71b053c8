use idl_gen::CppCodeGeneratorOptions;
use idl_loader::LoaderOptions;
use std::path::PathBuf;
use thiserror::Error;

const MAX_WELL_KNOWN_NAME: usize = 255;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid well-known name '{name}': {reason}")]
    InvalidWellKnownName { name: String, reason: &'static str },

    #[error("invalid object path '{path}': {reason}")]
    InvalidObjectPath { path: String, reason: &'static str },

    #[error("no input XML files given")]
    NoInputFiles,

    #[error("output path {path} is not a directory")]
    OutputPath { path: PathBuf },
}

/// Validated generator settings.
#[derive(Debug, Clone)]
pub struct GenConfig {
    pub well_known_name: String,
    pub object_path: Option<String>,
    pub object_name: Option<String>,
    pub client_only: bool,
    pub output_path: PathBuf,
    pub overwrite: bool,
    pub lax_naming: bool,
    pub files: Vec<PathBuf>,
}

impl GenConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        validate_well_known_name(&self.well_known_name)?;
        if let Some(path) = &self.object_path {
            validate_object_path(path)?;
        }
        if self.files.is_empty() {
            return Err(ConfigError::NoInputFiles);
        }
        if self.output_path.exists() && !self.output_path.is_dir() {
            return Err(ConfigError::OutputPath {
                path: self.output_path,
            });
        }
        Ok(self)
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            lax_naming: self.lax_naming,
            object_path: self.object_path.clone(),
            object_name: self.object_name.clone(),
        }
    }

    pub fn generator_options(&self) -> CppCodeGeneratorOptions {
        CppCodeGeneratorOptions {
            well_known_name: Some(self.well_known_name.clone()),
            emit_service: !self.client_only,
        }
    }
}

/// Bus name rules: two or more dot separated elements, none empty and none
/// starting with a digit, no `:` and at most 255 characters.
pub fn validate_well_known_name(name: &str) -> Result<(), ConfigError> {
    let fail = |reason| {
        Err(ConfigError::InvalidWellKnownName {
            name: name.to_string(),
            reason,
        })
    };
    if name.contains(':') {
        return fail("cannot contain ':'");
    }
    if name.starts_with('.') {
        return fail("cannot start with '.'");
    }
    if name.ends_with('.') {
        return fail("cannot end with '.'");
    }
    if name.contains("..") {
        return fail("elements cannot be empty");
    }
    let elements: Vec<&str> = name.split('.').collect();
    if elements
        .iter()
        .any(|element| element.starts_with(|c: char| c.is_ascii_digit()))
    {
        return fail("elements cannot start with a digit");
    }
    if elements.len() < 2 {
        return fail("needs two or more elements separated by '.'");
    }
    if name.len() > MAX_WELL_KNOWN_NAME {
        return fail("longer than 255 characters");
    }
    Ok(())
}

pub fn validate_object_path(path: &str) -> Result<(), ConfigError> {
    let fail = |reason| {
        Err(ConfigError::InvalidObjectPath {
            path: path.to_string(),
            reason,
        })
    };
    if !path.starts_with('/') {
        return fail("must start with '/'");
    }
    if path == "/" {
        return Ok(());
    }
    if path.ends_with('/') {
        return fail("cannot end with '/'");
    }
    for segment in path[1..].split('/') {
        if segment.is_empty() {
            return fail("cannot contain empty elements");
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return fail("elements may only contain [A-Za-z0-9_]");
        }
    }
    Ok(())
}
