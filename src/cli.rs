//! The `autoservice` command line.

use std::path::PathBuf;

use autoservice_compiler::options::SRC_GEN_DIR_OPTION;
use autoservice_compiler::{
    AnalysisError, BinaryExtractor, CommandLineProcessor, PLUGIN_ID, PluginConfiguration,
    RunOutcome, SourceExtractor, SourceSet, read_source_files, run,
};
use autoservice_core::{Diagnostics, Severity};
use autoservice_registry::SymbolRegistry;
use bumpalo::Bump;
use clap::{Parser, ValueEnum};
use tracing::{debug, error, warn};

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "autoservice", version)]
#[command(about = "Generate META-INF/services manifests for @AutoService classes")]
pub struct Cli {
    /// Directory service files are generated into
    #[arg(long = "src-gen-dir", value_name = "DIR")]
    pub src_gen_dir: Option<PathBuf>,

    /// Compiler plugin option, `plugin:<id>:<name>=<value>`
    #[arg(short = 'P', long = "plugin-option", value_name = "OPTION")]
    pub plugin_options: Vec<String>,

    /// Classpath entry: directory, jar or class file
    #[arg(long = "classpath", value_name = "PATH")]
    pub classpath: Vec<PathBuf>,

    /// What the inputs are
    #[arg(long, value_enum, default_value_t = Mode::Source)]
    pub mode: Mode,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Source files or directories, or class directories and jars in binary mode
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Analyze Kotlin sources
    Source,
    /// Read compiled class files
    Binary,
}

/// A `plugin:<id>:<name>=<value>` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginArgument<'a> {
    pub plugin_id: &'a str,
    pub name: &'a str,
    pub value: &'a str,
}

pub fn parse_plugin_argument(argument: &str) -> Option<PluginArgument<'_>> {
    let rest = argument.strip_prefix("plugin:")?;
    let (plugin_id, option) = rest.split_once(':')?;
    let (name, value) = option.split_once('=')?;
    if plugin_id.is_empty() || name.is_empty() {
        return None;
    }
    Some(PluginArgument {
        plugin_id,
        name,
        value,
    })
}

impl Cli {
    /// Feed `--src-gen-dir` and every `-P` option addressed to this plugin
    /// through the command line processor.
    pub fn configuration(&self) -> Result<PluginConfiguration, CliError> {
        let processor = CommandLineProcessor;
        let mut configuration = PluginConfiguration::new();

        if let Some(dir) = &self.src_gen_dir {
            processor.process_option(
                &mut configuration,
                SRC_GEN_DIR_OPTION,
                &dir.to_string_lossy(),
            )?;
        }
        for raw in &self.plugin_options {
            let argument = parse_plugin_argument(raw)
                .ok_or_else(|| CliError::MalformedPluginOption(raw.clone()))?;
            if argument.plugin_id != processor.plugin_id() {
                debug!(plugin = argument.plugin_id, "ignoring option for another plugin");
                continue;
            }
            processor.process_option(&mut configuration, argument.name, argument.value)?;
        }
        Ok(configuration)
    }
}

/// Run the command.
///
/// In source mode, parse errors are logged and turn the run into
/// [`CliError::Skipped`] after the output directory has been cleaned.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn execute(cli: &Cli) -> Result<RunOutcome, CliError> {
    let options = cli.configuration()?.into_options()?;
    debug!(plugin = PLUGIN_ID, output = %options.src_gen_dir.display(), "options");

    match cli.mode {
        Mode::Source => {
            let sources = read_source_files(&cli.inputs)?;
            let arena = Bump::new();
            let mut diagnostics = Diagnostics::new();
            let set = SourceSet::parse_all(&arena, &sources, &mut diagnostics);
            report(&diagnostics);

            let mut registry = SymbolRegistry::with_platform_types();
            registry
                .load_classpath(&cli.classpath)
                .map_err(AnalysisError::from)?;

            match run(&options, &diagnostics, &SourceExtractor::new(&set, &registry))? {
                RunOutcome::Skipped => Err(CliError::Skipped {
                    errors: diagnostics.error_count(),
                }),
                outcome => Ok(outcome),
            }
        }
        Mode::Binary => {
            let extractor = BinaryExtractor::from_paths(&cli.inputs)?;
            Ok(run(&options, &Diagnostics::new(), &extractor)?)
        }
    }
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity {
            Severity::Error => error!("{diagnostic}"),
            Severity::Warning => warn!("{diagnostic}"),
            Severity::Info => debug!("{diagnostic}"),
        }
    }
}
