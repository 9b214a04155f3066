//! Source file discovery for a rewrite run.
//!
//! A run is given one or more roots (directories or individual files). This
//! module turns them into a [`SourceSet`]:
//! - Directories are walked recursively (`walkdir`)
//! - Files are selected by extension (default: `cs`)
//! - Default build/VCS directories and user glob patterns are excluded
//! - Ordering is deterministic: roots in the order given, files sorted by path

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Default extension for C# sources.
pub const DEFAULT_EXTENSION: &str = "cs";

/// Directories that never contain hand-written sources worth rewriting.
const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".vs",
    ".idea",
    "bin",
    "obj",
    "node_modules",
    "packages",
    "TestResults",
];

/// Errors raised while discovering source files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("root not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("invalid exclude pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Configuration for source discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// File extensions to include, without the leading dot.
    pub extensions: Vec<String>,
    /// Glob patterns (relative to each root) to exclude.
    pub exclude_patterns: Vec<String>,
    /// Whether to follow symlinks while walking.
    pub follow_symlinks: bool,
    /// Files larger than this are skipped.
    pub max_file_size: Option<u64>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            exclude_patterns: Vec::new(),
            follow_symlinks: false,
            max_file_size: None,
        }
    }
}

impl DiscoveryConfig {
    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Self {
        self.exclude_patterns.push(pattern.to_string());
        self
    }

    fn matches_extension(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    fn build_excludes(&self) -> Result<GlobSet, DiscoveryError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            let glob = Glob::new(pattern).map_err(|e| DiscoveryError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.kind().to_string(),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| DiscoveryError::InvalidPattern {
            pattern: self.exclude_patterns.join(","),
            reason: e.to_string(),
        })
    }
}

/// A source file selected for processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Path used to read and write the file.
    pub path: PathBuf,
    /// Path relative to its root, forward slashes, for reporting.
    pub display_path: String,
    /// Index of the root this file was found under.
    pub root: usize,
    /// File size in bytes at discovery time.
    pub size_bytes: u64,
}

/// The ordered set of source files for a run.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    roots: Vec<PathBuf>,
    files: Vec<SourceFile>,
}

impl SourceSet {
    /// Discover source files under `roots`.
    ///
    /// A root that is a file is included as-is, regardless of extension.
    /// A file reachable from two roots is listed once, under the first root.
    pub fn discover(roots: &[PathBuf], config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let excludes = config.build_excludes()?;
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();

        for (root_index, root) in roots.iter().enumerate() {
            if !root.exists() {
                return Err(DiscoveryError::RootNotFound { path: root.clone() });
            }

            let mut found = if root.is_file() {
                let name = root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| root.display().to_string());
                vec![source_file(root, name, root_index)?]
            } else {
                walk_root(root, root_index, config, &excludes)?
            };

            found.sort_by(|a, b| a.display_path.cmp(&b.display_path));
            for file in found {
                let key = file.path.canonicalize().unwrap_or_else(|_| file.path.clone());
                if seen.insert(key) {
                    files.push(file);
                }
            }
        }

        debug!(roots = roots.len(), files = files.len(), "discovered sources");
        Ok(SourceSet {
            roots: roots.to_vec(),
            files,
        })
    }

    /// The roots this set was discovered from.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// All files in deterministic order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn walk_root(
    root: &Path,
    root_index: usize,
    config: &DiscoveryConfig,
    excludes: &GlobSet,
) -> Result<Vec<SourceFile>, DiscoveryError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !is_default_excluded(&e.file_name().to_string_lossy(), e.file_type().is_dir())
        });

    for entry in walker {
        let entry = entry.map_err(|e| DiscoveryError::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() || !config.matches_extension(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");
        if excludes.is_match(&relative) {
            debug!(path = %relative, "excluded by pattern");
            continue;
        }

        let file = source_file(entry.path(), relative, root_index)?;
        if let Some(max) = config.max_file_size {
            if file.size_bytes > max {
                debug!(path = %file.display_path, size = file.size_bytes, "skipping large file");
                continue;
            }
        }
        files.push(file);
    }

    Ok(files)
}

fn source_file(path: &Path, display_path: String, root: usize) -> Result<SourceFile, DiscoveryError> {
    let metadata = fs::metadata(path).map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SourceFile {
        path: path.to_path_buf(),
        display_path,
        root,
        size_bytes: metadata.len(),
    })
}

fn is_default_excluded(name: &str, is_dir: bool) -> bool {
    is_dir && DEFAULT_EXCLUDE_DIRS.contains(&name)
}

// ============================================================================
// Tests
// ============================================================================
