//! Filesystem discovery of analyzable source files.
//!
//! Roots may be files or directories. Directories are walked with `walkdir`,
//! skipping the configured ignored directory names; files are then filtered by
//! registered extension, exclude globs and size.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::config::AnalysisConfig;
use crate::core::errors::{CommentaryError, Result};
use crate::lang::registry::extension_is_supported;

/// Compiled discovery filters.
#[derive(Debug)]
pub struct FileFilter {
    exclude: Option<GlobSet>,
    ignored_dirs: HashSet<String>,
    max_file_size: u64,
}

impl FileFilter {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            exclude: compile_globset(&config.exclude_patterns)?,
            ignored_dirs: config.ignored_dirs.iter().cloned().collect(),
            max_file_size: config.max_file_size_bytes,
        })
    }

    fn is_ignored_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .ignored_dirs
                .contains(entry.file_name().to_string_lossy().as_ref())
    }

    /// Whether `path` (found under `base`) should be analyzed.
    pub fn should_keep(&self, path: &Path, base: &Path) -> bool {
        let supported = path
            .extension()
            .map(|ext| extension_is_supported(&ext.to_string_lossy()))
            .unwrap_or(false);
        if !supported {
            return false;
        }

        if let Some(exclude) = &self.exclude {
            let relative = path.strip_prefix(base).unwrap_or(path);
            if exclude.is_match(relative) || exclude.is_match(path) {
                debug!("Excluded by pattern: {}", path.display());
                return false;
            }
        }

        if self.max_file_size > 0 {
            match fs::metadata(path) {
                Ok(meta) if meta.len() > self.max_file_size => {
                    debug!(
                        "Skipping {} ({} bytes exceeds limit of {})",
                        path.display(),
                        meta.len(),
                        self.max_file_size
                    );
                    return false;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("Cannot stat {}: {}", path.display(), err);
                    return false;
                }
            }
        }

        true
    }
}

/// Discover source files under `roots`, sorted and deduplicated.
pub fn discover_files(roots: &[PathBuf], config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    if roots.is_empty() {
        return Ok(Vec::new());
    }

    let filter = FileFilter::from_config(config)?;
    let mut unique = HashSet::new();
    let mut collected = Vec::new();

    for root in roots {
        if !root.exists() {
            return Err(CommentaryError::io(
                format!("Path does not exist: {}", root.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing path"),
            ));
        }

        if root.is_file() {
            let base = root.parent().unwrap_or(root);
            if filter.should_keep(root, base) && unique.insert(root.clone()) {
                collected.push(root.clone());
            }
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !filter.is_ignored_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            if filter.should_keep(&path, root) && unique.insert(path.clone()) {
                collected.push(path);
            }
        }
    }

    collected.sort();
    info!("Discovered {} source files", collected.len());
    Ok(collected)
}

/// Logical identifier for a discovered path: relative to its root when possible.
pub fn file_id_for(path: &Path, roots: &[PathBuf]) -> String {
    roots
        .iter()
        .filter(|root| root.is_dir())
        .find_map(|root| path.strip_prefix(root).ok())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn compile_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|err| {
                CommentaryError::config_field(
                    format!("Invalid glob pattern '{}': {}", pattern, err),
                    "analysis.exclude_patterns",
                )
            })?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|err| CommentaryError::config(format!("Failed to build glob set: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discovers_supported_files_only() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/app.js", "// a\n");
        write(temp.path(), "src/lib.py", "# b\n");
        write(temp.path(), "README.md", "# readme\n");

        let files =
            discover_files(&[temp.path().to_path_buf()], &AnalysisConfig::default()).unwrap();
        let ids: Vec<String> = files
            .iter()
            .map(|p| file_id_for(p, &[temp.path().to_path_buf()]))
            .collect();
        assert_eq!(ids, vec!["src/app.js", "src/lib.py"]);
    }

    #[test]
    fn test_skips_ignored_dirs_and_excluded_globs() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "node_modules/dep/index.js", "// dep\n");
        write(temp.path(), "target/debug/build.rs", "// gen\n");
        write(temp.path(), "dist/bundle.min.js", "// min\n");
        write(temp.path(), "web/vendor.min.js", "// min\n");
        write(temp.path(), "web/app.ts", "// app\n");

        let files =
            discover_files(&[temp.path().to_path_buf()], &AnalysisConfig::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("web/app.ts"));
    }

    #[test]
    fn test_size_limit() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "big.js", &"// x\n".repeat(100));
        write(temp.path(), "small.js", "// x\n");

        let config = AnalysisConfig {
            max_file_size_bytes: 64,
            ..AnalysisConfig::default()
        };
        let files = discover_files(&[temp.path().to_path_buf()], &config).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("small.js"));
    }

    #[test]
    fn test_file_root_and_missing_root() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "one.go", "// one\n");
        let files = discover_files(&[file.clone()], &AnalysisConfig::default()).unwrap();
        assert_eq!(files, vec![file]);

        let missing = temp.path().join("nope");
        assert!(discover_files(&[missing], &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let config = AnalysisConfig {
            exclude_patterns: vec!["[".to_string()],
            ..AnalysisConfig::default()
        };
        let err = FileFilter::from_config(&config).unwrap_err();
        assert!(matches!(err, CommentaryError::Config { .. }));
    }
}
