//! Expansion of command-line paths into compilation units.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{CocoError, Result};

pub const SOURCE_EXTENSION: &str = "co";

/// A file to compile and the top-level argument it was found under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub base: PathBuf,
}

pub struct SourceWalker {
    top_level: Vec<PathBuf>,
}

impl SourceWalker {
    pub fn new<S: AsRef<str>>(args: &[S]) -> Self {
        SourceWalker {
            top_level: args.iter().map(|a| normalize(Path::new(a.as_ref()))).collect(),
        }
    }

    /// Walk every top-level argument, depth first, directory entries in name order.
    ///
    /// # Errors
    ///
    /// Returns `CocoError::NotFound` for a path that does not exist (after
    /// the `.co` retry) and I/O errors from reading directories.
    pub fn collect(&self) -> Result<Vec<SourceUnit>> {
        let mut units = Vec::new();
        for path in &self.top_level {
            self.walk(path, None, true, &mut units)?;
        }
        Ok(units)
    }

    fn walk(
        &self,
        source: &Path,
        base: Option<&Path>,
        top: bool,
        units: &mut Vec<SourceUnit>,
    ) -> Result<()> {
        let base = base.map_or_else(|| normalize(source), Path::to_path_buf);

        let metadata = match fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(_) if top && !has_source_extension(source) => {
                return self.walk(&with_source_extension(source), None, false, units);
            }
            Err(_) => return Err(CocoError::NotFound(source.to_path_buf())),
        };

        if metadata.is_dir() {
            let mut entries = fs::read_dir(source)?
                .map(|entry| entry.map(|e| normalize(&e.path())))
                .collect::<io::Result<Vec<_>>>()?;
            entries.sort();
            for entry in entries {
                self.walk(&entry, Some(&base), false, units)?;
            }
        } else if top || self.top_level.iter().any(|p| p == source) || has_source_extension(source) {
            units.push(SourceUnit {
                path: source.to_path_buf(),
                base,
            });
        }
        Ok(())
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

fn with_source_extension(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(SOURCE_EXTENSION);
    PathBuf::from(name)
}

/// Lexically clean a path: drop `.` segments and fold `..` where possible.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "1").unwrap();
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("./src/./a")), PathBuf::from("src/a"));
        assert_eq!(normalize(Path::new("src/../lib")), PathBuf::from("lib"));
        assert_eq!(normalize(Path::new(".")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_directory_walk_is_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        touch(&src.join("b.co"));
        touch(&src.join("a.CO"));
        touch(&src.join("notes.txt"));
        touch(&src.join("nested").join("c.co"));

        let walker = SourceWalker::new(&[src.to_string_lossy()]);
        let units = walker.collect().unwrap();
        let names: Vec<PathBuf> = units
            .iter()
            .map(|u| u.path.strip_prefix(&src).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.CO"),
                PathBuf::from("b.co"),
                PathBuf::from("nested/c.co")
            ]
        );
        assert!(units.iter().all(|u| u.base == normalize(&src)));
    }

    #[test]
    fn test_missing_argument_retries_with_extension() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("main.co");
        touch(&file);

        let bare = temp.path().join("main");
        let units = SourceWalker::new(&[bare.to_string_lossy()]).collect().unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].path, normalize(&file));
    }

    #[test]
    fn test_top_level_file_without_extension_is_compiled() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("script");
        touch(&file);
        let units = SourceWalker::new(&[file.to_string_lossy()]).collect().unwrap();
        assert_eq!(units[0].path, normalize(&file));
        assert_eq!(units[0].base, normalize(&file));
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone.co");
        let err = SourceWalker::new(&[missing.to_string_lossy()])
            .collect()
            .unwrap_err();
        assert!(err.to_string().starts_with("Can't find: "));
        assert!(err.to_string().ends_with("gone.co"));
    }
}
