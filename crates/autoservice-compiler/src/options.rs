//! Plugin configuration.
//!
//! The plugin takes a single required option, `src-gen-dir`, naming the
//! directory manifests are generated into. Options arrive as
//! `(name, value)` pairs addressed to the plugin id and are collected into a
//! [`PluginConfiguration`] before being validated into [`PluginOptions`].

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const PLUGIN_ID: &str = "dev.zacsweers.autoservice";
pub const SRC_GEN_DIR_OPTION: &str = "src-gen-dir";

/// Description of an option the plugin accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliOption {
    pub name: &'static str,
    pub value_description: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub allow_multiple_occurrences: bool,
}

pub const OUTPUT_DIR_OPTION: CliOption = CliOption {
    name: SRC_GEN_DIR_OPTION,
    value_description: "<file-path>",
    description: "Path to directory service files should be generated into",
    required: true,
    allow_multiple_occurrences: false,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option '{name}' for plugin {plugin_id}")]
    UnknownOption { plugin_id: String, name: String },

    #[error("required option '{name}' is missing")]
    MissingRequired { name: String },

    #[error("option '{name}' may only be given once")]
    Duplicate { name: String },
}

/// Option values collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfiguration {
    src_gen_dir: Option<PathBuf>,
}

impl PluginConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the collected values.
    pub fn into_options(self) -> Result<PluginOptions, OptionError> {
        let src_gen_dir = self.src_gen_dir.ok_or_else(|| OptionError::MissingRequired {
            name: SRC_GEN_DIR_OPTION.to_string(),
        })?;
        Ok(PluginOptions { src_gen_dir })
    }
}

/// Validated plugin options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOptions {
    /// Root directory that receives `META-INF/services/`.
    pub src_gen_dir: PathBuf,
}

impl PluginOptions {
    pub fn new(src_gen_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_gen_dir: src_gen_dir.into(),
        }
    }
}

/// Routes option values to the plugin configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLineProcessor;

impl CommandLineProcessor {
    pub fn plugin_id(&self) -> &'static str {
        PLUGIN_ID
    }

    pub fn plugin_options(&self) -> &'static [CliOption] {
        &[OUTPUT_DIR_OPTION]
    }

    pub fn process_option(
        &self,
        configuration: &mut PluginConfiguration,
        name: &str,
        value: &str,
    ) -> Result<(), OptionError> {
        match name {
            SRC_GEN_DIR_OPTION => {
                if configuration.src_gen_dir.is_some() {
                    return Err(OptionError::Duplicate {
                        name: name.to_string(),
                    });
                }
                configuration.src_gen_dir = Some(PathBuf::from(value));
                Ok(())
            }
            _ => Err(OptionError::UnknownOption {
                plugin_id: PLUGIN_ID.to_string(),
                name: name.to_string(),
            }),
        }
    }
}

/// Per-compilation output directory used by build integrations:
/// `<build>/generated/autoService/src-gen-<compilation>`.
///
/// Each compilation gets its own directory so outputs of different compile
/// tasks are never mixed.
pub fn src_gen_dir(build_dir: &Path, compilation_name: &str) -> PathBuf {
    build_dir
        .join("generated")
        .join("autoService")
        .join(format!("src-gen-{compilation_name}"))
}
