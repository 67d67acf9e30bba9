//! Reading class files from classpath entries.
//!
//! An entry is a directory (scanned recursively), a `.jar`/`.zip` archive or a
//! single `.class` file. `META-INF/` content and `module-info.class` are
//! ignored.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use autoservice_classfile::ClassFile;
use tracing::{debug, trace};
use zip::ZipArchive;

use crate::error::ClasspathError;
use crate::registry::SymbolRegistry;

const MAX_PREALLOCATION: u64 = 1 << 20;

/// Raw bytes of one class file and where they were read from.
///
/// Archive members use `archive.jar!/path/in/Archive.class` as location.
#[derive(Debug, Clone)]
pub struct ClassFileEntry {
    pub location: PathBuf,
    pub bytes: Vec<u8>,
}

impl ClassFileEntry {
    pub fn parse(&self) -> Result<ClassFile, ClasspathError> {
        ClassFile::parse(&self.bytes).map_err(|source| ClasspathError::ClassFile {
            path: self.location.clone(),
            source,
        })
    }
}

/// Collect every class file reachable from one classpath entry.
///
/// Directory contents are returned in path order.
pub fn collect_class_files(path: &Path) -> Result<Vec<ClassFileEntry>, ClasspathError> {
    let metadata = fs::metadata(path).map_err(|source| ClasspathError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    if metadata.is_dir() {
        scan_directory(path, &mut entries)?;
    } else if is_archive(path) {
        scan_archive(path, &mut entries)?;
    } else if is_class_file(path) {
        entries.push(read_class_file(path)?);
    } else {
        debug!(path = %path.display(), "ignoring classpath entry");
    }
    Ok(entries)
}

fn scan_directory(root: &Path, out: &mut Vec<ClassFileEntry>) -> Result<(), ClasspathError> {
    let mut files = Vec::new();
    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| ClasspathError::Io {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| ClasspathError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|source| ClasspathError::Io {
                path: path.clone(),
                source,
            })?;
            if file_type.is_dir() {
                if path.file_name() != Some(OsStr::new("META-INF")) {
                    dirs.push(path);
                }
            } else if is_class_file(&path) || is_archive(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    for path in files {
        if is_archive(&path) {
            scan_archive(&path, out)?;
        } else {
            out.push(read_class_file(&path)?);
        }
    }
    Ok(())
}

fn scan_archive(path: &Path, out: &mut Vec<ClassFileEntry>) -> Result<(), ClasspathError> {
    let file = File::open(path).map_err(|source| ClasspathError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|source| ClasspathError::Zip {
        path: path.to_path_buf(),
        source,
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|source| ClasspathError::Zip {
            path: path.to_path_buf(),
            source,
        })?;
        if !entry.is_file() {
            continue;
        }

        let name = entry.name().to_string();
        if name.starts_with("META-INF/") || !is_class_name(&name) {
            continue;
        }

        let mut bytes = Vec::with_capacity(initial_capacity(entry.size()));
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| ClasspathError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        out.push(ClassFileEntry {
            location: archive_entry_path(path, &name),
            bytes,
        });
    }
    Ok(())
}

/// Archive headers are untrusted, so preallocation is capped.
fn initial_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATION) as usize
}

fn read_class_file(path: &Path) -> Result<ClassFileEntry, ClasspathError> {
    let bytes = fs::read(path).map_err(|source| ClasspathError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ClassFileEntry {
        location: path.to_path_buf(),
        bytes,
    })
}

fn archive_entry_path(archive: &Path, entry: &str) -> PathBuf {
    PathBuf::from(format!("{}!/{entry}", archive.display()))
}

fn is_class_name(name: &str) -> bool {
    name.ends_with(".class") && !name.ends_with("module-info.class")
}

fn is_class_file(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(is_class_name)
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip"))
}

impl SymbolRegistry {
    /// Register every class found on the given classpath entries.
    ///
    /// Missing entries are skipped. Returns the number of classes registered.
    pub fn load_classpath<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize, ClasspathError> {
        let mut registered = 0;
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                debug!(path = %path.display(), "classpath entry does not exist");
                continue;
            }
            for entry in collect_class_files(path)? {
                let class = entry.parse()?;
                if self.register_class_file(&class) {
                    registered += 1;
                } else {
                    trace!(location = %entry.location.display(), "skipped class file");
                }
            }
        }
        debug!(registered, "loaded classpath");
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use autoservice_classfile::{AccessFlags, ClassFileBuilder};
    use autoservice_core::FqName;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_class(dir: &Path, internal_name: &str, bytes: Vec<u8>) {
        let path = dir.join(format!("{internal_name}.class"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn write_jar(path: &Path, classes: &[(&str, Vec<u8>)]) {
        let mut jar = zip::ZipWriter::new(File::create(path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        jar.start_file("META-INF/MANIFEST.MF", options).unwrap();
        jar.write_all(b"Manifest-Version: 1.0\n").unwrap();
        for (name, bytes) in classes {
            jar.start_file(format!("{name}.class"), options).unwrap();
            jar.write_all(bytes).unwrap();
        }
        jar.finish().unwrap();
    }

    #[test]
    fn directory_scan_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "b/Second", ClassFileBuilder::new("b/Second").build());
        write_class(dir.path(), "a/First", ClassFileBuilder::new("a/First").build());
        write_class(dir.path(), "module-info", ClassFileBuilder::new("module-info").build());
        fs::write(dir.path().join("a/readme.txt"), "not a class").unwrap();

        let entries = collect_class_files(dir.path()).unwrap();
        let classes: Vec<_> = entries
            .iter()
            .map(|entry| entry.parse().unwrap().this_class)
            .collect();
        assert_eq!(classes, ["a/First", "b/Second"]);
    }

    #[test]
    fn jar_members_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("lib.jar");
        write_jar(
            &jar,
            &[
                (
                    "lib/Service",
                    ClassFileBuilder::new("lib/Service")
                        .access(AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
                        .build(),
                ),
                ("lib/Service$Default", ClassFileBuilder::new("lib/Service$Default").build()),
            ],
        );

        let entries = collect_class_files(&jar).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].location.to_string_lossy().ends_with("lib.jar!/lib/Service.class"));

        let mut registry = SymbolRegistry::new();
        assert_eq!(registry.load_classpath(&[&jar]).unwrap(), 2);
        assert!(registry.contains_class(&FqName::from_dotted("lib.Service.Default")));
    }

    #[test]
    fn declared_archive_sizes_are_capped() {
        assert_eq!(initial_capacity(512), 512);
        assert_eq!(initial_capacity(u64::MAX), MAX_PREALLOCATION as usize);
    }

    #[test]
    fn missing_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = SymbolRegistry::new();
        let missing = dir.path().join("does-not-exist");
        assert_eq!(registry.load_classpath(&[missing]).unwrap(), 0);
    }

    #[test]
    fn malformed_class_reports_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.class");
        fs::write(&path, [0xCA, 0xFE]).unwrap();

        let mut registry = SymbolRegistry::new();
        let err = registry.load_classpath(&[&path]).unwrap_err();
        assert!(matches!(err, ClasspathError::ClassFile { path: p, .. } if p == path));
    }
}
