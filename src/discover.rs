// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Locating changelog files in a multi-package repository.
//!
//! Two places are searched:
//!
//! - the repository root, for a changelog owned by the root package
//! - each immediate child directory of the packages directory, for a
//!   changelog owned by the package named after that directory
//!
//! Each directory contributes at most one file, chosen by the filename
//! priority in [`Grammar::filenames`]. Nothing deeper than one level
//! under the packages directory is searched.
//!
//! # Example
//!
//! ```no_run
//! use chglog::discover::{Layout, discover_changelogs};
//! use chglog::grammar::Grammar;
//!
//! let changelog = discover_changelogs(&Grammar::new(), &Layout::new(".")).unwrap();
//! for entry in &changelog.entries {
//!     println!("{} {} ({})", entry.package, entry.version, entry.date);
//! }
//! ```

use crate::aggregate::Changelog;
use crate::grammar::{DEFAULT_PACKAGES_DIR, DEFAULT_ROOT_PACKAGE, Grammar};
use crate::parser::{self, parse_changelog};
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Error type for discovery failures.
///
/// Missing files and directories are not errors; only files that exist but
/// cannot be read or parsed are.
#[derive(Debug, Snafu)]
pub enum DiscoverError {
    /// A packages directory entry could not be listed.
    #[snafu(display("failed to list {}: {source}", path.display()))]
    ListPackages {
        /// The packages directory.
        path: PathBuf,
        /// The underlying directory walking error.
        source: walkdir::Error,
    },

    /// A changelog file could not be read.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        /// The changelog file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A changelog file could not be parsed.
    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        /// The changelog file.
        path: PathBuf,
        /// The underlying parse error.
        source: parser::ParseError,
    },
}

/// Where changelogs live in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Repository root.
    pub root: PathBuf,

    /// Name of the directory under `root` holding packages.
    pub packages_dir: String,

    /// Package identifier for the root changelog.
    pub root_package: String,
}

impl Layout {
    /// Creates a layout with the default packages directory and root name.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            packages_dir: DEFAULT_PACKAGES_DIR.to_owned(),
            root_package: DEFAULT_ROOT_PACKAGE.to_owned(),
        }
    }

    /// Sets the packages directory name.
    #[must_use]
    pub fn with_packages_dir(mut self, name: impl Into<String>) -> Self {
        self.packages_dir = name.into();
        self
    }

    /// Sets the root package identifier.
    #[must_use]
    pub fn with_root_package(mut self, name: impl Into<String>) -> Self {
        self.root_package = name.into();
        self
    }

    fn packages_path(&self) -> PathBuf {
        self.root.join(&self.packages_dir)
    }
}

/// A discovered changelog file and its owning package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Location of the file.
    pub path: PathBuf,

    /// Owning package identifier.
    pub package: String,
}

/// Returns the highest-priority changelog file in `dir`, if any.
#[must_use]
pub fn find_changelog(grammar: &Grammar, dir: &Path) -> Option<PathBuf> {
    grammar
        .filenames()
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Lists changelog files: the root file first, then one per package.
///
/// Package directories are visited in file name order. Symlinked package
/// directories are followed. Directories without a changelog and
/// non-directory entries, including dangling symlinks, are skipped.
///
/// # Errors
///
/// Returns [`DiscoverError::ListPackages`] if the packages directory exists
/// but one of its entries cannot be read.
pub fn discover_files(grammar: &Grammar, layout: &Layout) -> Result<Vec<SourceFile>, DiscoverError> {
    let mut files = Vec::new();

    if let Some(path) = find_changelog(grammar, &layout.root) {
        debug!(path = %path.display(), package = %layout.root_package, "found root changelog");
        files.push(SourceFile {
            path,
            package: layout.root_package.clone(),
        });
    }

    let packages_path = layout.packages_path();
    if !packages_path.is_dir() {
        debug!(path = %packages_path.display(), "no packages directory");
        return Ok(files);
    }

    for entry in WalkDir::new(&packages_path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.context(ListPackagesSnafu {
            path: &packages_path,
        })?;
        // Follows symlinks; false for dangling ones
        if !entry.path().is_dir() {
            debug!(path = %entry.path().display(), "skipping non-directory package entry");
            continue;
        }

        let package = entry.file_name().to_string_lossy().into_owned();
        match find_changelog(grammar, entry.path()) {
            Some(path) => {
                debug!(path = %path.display(), package = %package, "found package changelog");
                files.push(SourceFile { path, package });
            }
            None => debug!(package = %package, "package has no changelog"),
        }
    }

    Ok(files)
}

/// Renders `path` relative to `root` with `/` separators.
///
/// Paths outside `root` are returned as given.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> String {
    let Ok(rel) = path.strip_prefix(root) else {
        return path.to_string_lossy().into_owned();
    };
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Discovers, parses and aggregates every changelog in the repository.
///
/// # Errors
///
/// Returns an error if a packages directory entry cannot be listed, or if a
/// discovered changelog cannot be read or contains an invalid release date.
pub fn discover_changelogs(grammar: &Grammar, layout: &Layout) -> Result<Changelog, DiscoverError> {
    let mut entries = Vec::new();

    for file in discover_files(grammar, layout)? {
        let text = std::fs::read_to_string(&file.path).context(ReadFileSnafu { path: &file.path })?;
        let rel = relative_path(&layout.root, &file.path);
        let sections = parse_changelog(grammar, &text, &file.package, &rel)
            .context(ParseFileSnafu { path: &file.path })?;
        debug!(path = %rel, sections = sections.len(), "parsed changelog");
        entries.extend(sections);
    }

    let changelog = Changelog::from_entries(entries);
    info!(
        entries = changelog.len(),
        packages = changelog.packages.len(),
        "aggregated changelogs"
    );
    Ok(changelog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn packages(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.package.as_str()).collect()
    }

    #[test]
    fn finds_nothing_in_empty_repository() {
        let dir = TempDir::new().unwrap();
        let files = discover_files(&Grammar::new(), &Layout::new(dir.path())).unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn prefers_highest_priority_filename() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Changelog.md", "");
        write(dir.path(), "changelog.md", "");

        let found = find_changelog(&Grammar::new(), dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "Changelog.md");
    }

    #[test]
    fn lists_root_first_then_packages_by_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "packages/zeta/CHANGELOG.md", "");
        write(dir.path(), "packages/alpha/changelog.md", "");
        write(dir.path(), "CHANGELOG.md", "");

        let files = discover_files(&Grammar::new(), &Layout::new(dir.path())).unwrap();
        assert_eq!(packages(&files), ["root", "alpha", "zeta"]);
    }

    #[test]
    fn skips_files_and_packages_without_changelog() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "packages/README.md", "");
        write(dir.path(), "packages/CHANGELOG.md", "");
        write(dir.path(), "packages/empty/src/lib.rs", "");
        write(dir.path(), "packages/core/CHANGELOG.md", "");

        let files = discover_files(&Grammar::new(), &Layout::new(dir.path())).unwrap();
        assert_eq!(packages(&files), ["core"]);
    }

    #[cfg(unix)]
    #[test]
    fn skips_dangling_package_symlink() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "packages/core/CHANGELOG.md", "## [1.0.0] (2024-01-01)\n- a\n");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("packages/stale"))
            .unwrap();

        let changelog = discover_changelogs(&Grammar::new(), &Layout::new(dir.path())).unwrap();
        assert_eq!(changelog.packages, ["core"]);
        assert_eq!(changelog.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_package_directory() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendor/linked/CHANGELOG.md", "");
        fs::create_dir_all(dir.path().join("packages")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("vendor/linked"), dir.path().join("packages/linked"))
            .unwrap();

        let files = discover_files(&Grammar::new(), &Layout::new(dir.path())).unwrap();
        assert_eq!(packages(&files), ["linked"]);
    }

    #[test]
    fn honors_custom_layout() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "CHANGELOG.md", "");
        write(dir.path(), "crates/api/CHANGELOG.md", "");
        write(dir.path(), "packages/ignored/CHANGELOG.md", "");

        let layout = Layout::new(dir.path())
            .with_packages_dir("crates")
            .with_root_package("workspace");
        let files = discover_files(&Grammar::new(), &layout).unwrap();
        assert_eq!(packages(&files), ["workspace", "api"]);
    }

    #[test]
    fn renders_relative_paths_with_forward_slashes() {
        let root = Path::new("/repo");
        let path = root.join("packages").join("core").join("CHANGELOG.md");

        assert_eq!(relative_path(root, &path), "packages/core/CHANGELOG.md");
        assert_eq!(relative_path(root, &root.join("CHANGELOG.md")), "CHANGELOG.md");
    }

    #[test]
    fn reports_file_with_invalid_date() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "packages/core/CHANGELOG.md", "## [1.0.0] (2024-02-30)\n");

        let err = discover_changelogs(&Grammar::new(), &Layout::new(dir.path())).unwrap_err();
        assert!(matches!(err, DiscoverError::ParseFile { .. }));
        assert!(err.to_string().contains("CHANGELOG.md"));
    }
}
