use anyhow::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::error::{PatternError, WalkError};

/// Version-control metadata never walked, whatever the include patterns say.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    ".gitignore",
    ".gitattributes",
    ".svn",
    "CVS",
    ".cvsignore",
    ".hg",
    ".hgignore",
    ".bzr",
    ".bzrignore",
    "_darcs",
];

pub fn default_m2_repository() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to resolve home directory"))?;
    Ok(home.join(".m2").join("repository"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    ClassFile,
    Archive,
    Other,
}

pub fn container_kind(path: &Path) -> ContainerKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return ContainerKind::Other;
    };
    let stem = path.file_stem().and_then(|s| s.to_str());
    match ext.to_ascii_lowercase().as_str() {
        // Module and package descriptors carry no class of their own.
        "class" if matches!(stem, Some("module-info" | "package-info")) => ContainerKind::Other,
        "class" => ContainerKind::ClassFile,
        "jar" | "zip" | "war" | "ear" | "rar" => ContainerKind::Archive,
        _ => ContainerKind::Other,
    }
}

/// Include/exclude filter over `/`-separated paths relative to the walk root.
///
/// A pattern ending in `/` matches everything below that directory. An empty
/// include list includes every file.
#[derive(Debug, Clone)]
pub struct PathFilter {
    includes: Option<GlobSet>,
    excludes: GlobSet,
}

impl PathFilter {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, PatternError> {
        let includes = if includes.is_empty() {
            None
        } else {
            Some(build_set(includes)?)
        };
        Ok(Self {
            includes,
            excludes: build_set(excludes)?,
        })
    }

    pub fn matches(&self, relative: &str) -> bool {
        if self.excludes.is_match(relative) {
            return false;
        }
        self.includes.as_ref().is_none_or(|set| set.is_match(relative))
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, PatternError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let mut normalized = pattern.trim().replace('\\', "/");
        if normalized.ends_with('/') {
            normalized.push_str("**");
        }
        let glob = GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .map_err(|source| PatternError {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| PatternError {
        pattern: patterns.join(", "),
        source,
    })
}

/// Files found by [`scan_files`], in traversal order, plus the entries that
/// could not be read.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<PathBuf>,
    pub errors: Vec<WalkError>,
}

/// Enumerates the regular files under `base` accepted by `filter`.
///
/// The walk is sorted by file name so repeated runs see the same order.
pub fn scan_files(base: &Path, filter: &PathFilter) -> ScanOutcome {
    let walker = WalkBuilder::new(base)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !DEFAULT_EXCLUDES.contains(&name))
        })
        .build();

    let mut outcome = ScanOutcome::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let file = error_path(&source).unwrap_or_else(|| base.to_path_buf());
                outcome.errors.push(WalkError::Scan { file, source });
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if filter.matches(&relative_slash_path(path, base)) {
            outcome.files.push(path.to_path_buf());
        }
    }
    outcome
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

pub fn relative_slash_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
