//! The parsed source files of one compilation.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use autoservice_core::Diagnostics;
use autoservice_parser::{KtFile, Parser};
use bumpalo::Bump;
use tracing::debug;

use crate::error::AnalysisError;

/// A source file before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Parsed files, all allocated in one arena.
#[derive(Debug, Clone, Default)]
pub struct SourceSet<'ast> {
    files: Vec<KtFile<'ast>>,
}

impl<'ast> SourceSet<'ast> {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn from_files(files: Vec<KtFile<'ast>>) -> Self {
        Self { files }
    }

    /// Parse one file, failing on any parse error.
    pub fn add_source(
        &mut self,
        arena: &'ast Bump,
        name: &str,
        text: &str,
    ) -> Result<(), AnalysisError> {
        let file = Parser::parse_file(name, text, arena).map_err(|errors| AnalysisError::Parse {
            file: name.to_string(),
            errors,
        })?;
        self.files.push(file);
        Ok(())
    }

    /// Parse every source, recording parse errors as error diagnostics.
    ///
    /// Files that fail to parse are left out of the set.
    pub fn parse_all(
        arena: &'ast Bump,
        sources: &[SourceFile],
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut set = Self::new();
        for source in sources {
            match Parser::parse_file(&source.name, &source.text, arena) {
                Ok(file) => set.files.push(file),
                Err(errors) => diagnostics.extend_from_parse_errors(&source.name, &errors),
            }
        }
        set
    }

    pub fn push(&mut self, file: KtFile<'ast>) {
        self.files.push(file);
    }

    pub fn files(&self) -> &[KtFile<'ast>] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Read all `.kt` files under the given files and directories, in path order.
pub fn read_source_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SourceFile>, AnalysisError> {
    let mut found = Vec::new();
    for path in paths {
        collect_kotlin_files(path.as_ref(), &mut found)?;
    }
    found.sort();
    found.dedup();

    found
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path).map_err(|source| AnalysisError::Input {
                path: path.clone(),
                source,
            })?;
            Ok(SourceFile::new(path.display().to_string(), text))
        })
        .collect()
}

fn collect_kotlin_files(root: &Path, out: &mut Vec<PathBuf>) -> Result<(), AnalysisError> {
    let input_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| AnalysisError::Input { path, source }
    };

    let metadata = fs::metadata(root).map_err(input_error(root))?;
    if !metadata.is_dir() {
        out.push(root.to_path_buf());
        return Ok(());
    }

    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        for entry in fs::read_dir(&dir).map_err(input_error(&dir))? {
            let entry = entry.map_err(input_error(&dir))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(input_error(&path))?;
            if file_type.is_dir() {
                dirs.push(path);
            } else if path.extension() == Some(OsStr::new("kt")) {
                out.push(path);
            }
        }
    }
    debug!(root = %root.display(), files = out.len(), "collected sources");
    Ok(())
}
