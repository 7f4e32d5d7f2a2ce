//! Where compiled output lands on disk.

use std::fs;
use std::path::{Path, PathBuf};

use super::walker::normalize;

#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    output_dir: Option<PathBuf>,
    json: bool,
    watch: bool,
}

impl OutputWriter {
    #[must_use]
    pub fn new(output_dir: Option<PathBuf>, json: bool, watch: bool) -> Self {
        OutputWriter {
            output_dir,
            json,
            watch,
        }
    }

    /// Output file name for a source basename.
    ///
    /// The last extension is replaced by `.js` (`.json` in JSON mode) unless
    /// the stem carries its own extension, which then wins: `data.json.co`
    /// becomes `data.json`.
    #[must_use]
    pub fn file_name(&self, basename: &str) -> String {
        let default_ext = if self.json { ".json" } else { ".js" };
        match split_extension(basename) {
            Some((stem, _)) if split_extension(stem).is_some() => stem.to_string(),
            Some((stem, _)) => format!("{stem}{default_ext}"),
            None => format!("{basename}{default_ext}"),
        }
    }

    /// Full destination path for `source`, relocated under the output
    /// directory (minus the `base` prefix) when one is configured.
    #[must_use]
    pub fn destination(&self, source: &Path, base: Option<&Path>) -> PathBuf {
        let basename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source_dir = source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let dir = match &self.output_dir {
            Some(root) => {
                let relative = match base {
                    Some(base) if base != Path::new(".") => {
                        source_dir.strip_prefix(base).unwrap_or(Path::new(""))
                    }
                    _ => source_dir,
                };
                normalize(&root.join(relative))
            }
            None => source_dir.to_path_buf(),
        };
        dir.join(self.file_name(&basename))
    }

    /// Write `output` for `source`. Failures are reported as warnings and
    /// yield `None`.
    pub fn write(&self, source: &Path, output: &str, base: Option<&Path>) -> Option<PathBuf> {
        let destination = self.destination(source, base);
        let contents = if output.is_empty() { "\n" } else { output };

        let result = match destination.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
            _ => Ok(()),
        }
        .and_then(|()| fs::write(&destination, contents));

        match result {
            Ok(()) => {
                log::debug!("wrote {}", destination.display());
                if self.watch {
                    println!("{} => {}", source.display(), destination.display());
                }
                Some(destination)
            }
            Err(e) => {
                crate::warn(&format!("{}: {e}", destination.display()));
                None
            }
        }
    }
}

// Split off a trailing `.word` extension.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    let dot = name.rfind('.')?;
    let ext = &name[dot + 1..];
    if !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Some((&name[..dot], &name[dot..]))
    } else {
        None
    }
}
