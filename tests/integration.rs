// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Integration tests for chglog discovery, parsing and rendering.

use chglog::discover::{Layout, discover_changelogs, discover_files};
use chglog::grammar::Grammar;
use chglog::renderer::render_lines;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Builds a repository with a root changelog and two package changelogs.
fn sample_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "CHANGELOG.md",
        "# Changelog\n\n\
         ## [2.0.0](https://github.com/o/r/compare/v1.9.0...v2.0.0) (2024-03-01)\n\n\
         ### Breaking\n\n\
         - drop old API ([abc1234](https://github.com/o/r/commit/abc1234def5678))\n",
    );
    write(
        dir.path(),
        "packages/core/CHANGELOG.md",
        "## [1.9.0] (2024-03-01)\n### Fixed\n- fix crash\n\
         ## [5.0.0] (2024-01-01)\nInitial release.\n",
    );
    write(
        dir.path(),
        "packages/utils/changelog.md",
        "## 0.3.1 (2024-02-15)\n- See [docs](https://example.com/docs)\n",
    );
    write(dir.path(), "packages/empty/README.md", "no changelog here\n");
    dir
}

/// Root and package changelogs are merged and sorted newest first.
#[test]
fn aggregates_repository_newest_first() {
    let repo = sample_repo();
    let changelog = discover_changelogs(&Grammar::new(), &Layout::new(repo.path())).unwrap();

    let order: Vec<(&str, &str)> = changelog
        .entries
        .iter()
        .map(|e| (e.package.as_str(), e.version.as_str()))
        .collect();
    assert_eq!(
        order,
        [
            ("root", "2.0.0"),
            ("core", "1.9.0"),
            ("utils", "0.3.1"),
            ("core", "5.0.0"),
        ]
    );
    assert_eq!(changelog.packages, ["core", "root", "utils"]);
    assert_eq!(changelog.entries[2].path, "packages/utils/changelog.md");
    assert_eq!(
        changelog.entries[3].date,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );
}

/// The root entry renders its category and its parenthesized commit link.
#[test]
fn renders_root_entry_html() {
    let repo = sample_repo();
    let changelog = discover_changelogs(&Grammar::new(), &Layout::new(repo.path())).unwrap();
    let html = &changelog.entries[0].html;

    assert!(html.starts_with(
        "<h4 class=\"chg-cat\"><span class=\"badge badge-breaking\">Breaking</span></h4>"
    ));
    assert!(html.contains(
        "<li>drop old API <a href=\"https://github.com/o/r/commit/abc1234def5678\" \
         class=\"chg-commit\" title=\"Commit abc1234def5678\">abc1234</a></li>"
    ));
    assert!(html.ends_with("</ul>"));
}

/// Only one root changelog is picked when several spellings exist.
#[test]
fn selects_single_root_changelog_by_priority() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "CHANGELOG.md", "## [1.0.0] (2024-01-01)\n- upper\n");
    write(dir.path(), "Changelog.md", "## [1.0.0] (2024-01-01)\n- title\n");

    let files = discover_files(&Grammar::new(), &Layout::new(dir.path())).unwrap();
    assert_eq!(files.len(), 1);

    let changelog = discover_changelogs(&Grammar::new(), &Layout::new(dir.path())).unwrap();
    assert_eq!(changelog.len(), 1);
    assert_eq!(changelog.entries[0].lines, ["- upper"]);
}

/// Changelogs nested deeper than one level under packages are not found.
#[test]
fn ignores_nested_package_changelogs() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "packages/group/inner/CHANGELOG.md",
        "## [1.0.0] (2024-01-01)\n- hidden\n",
    );

    let changelog = discover_changelogs(&Grammar::new(), &Layout::new(dir.path())).unwrap();
    assert!(changelog.is_empty());
    assert!(changelog.packages.is_empty());
}

/// A missing packages directory is not an error.
#[test]
fn tolerates_missing_packages_directory() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "changelog.md", "## [0.1.0] (2023-06-01)\n");

    let changelog = discover_changelogs(&Grammar::new(), &Layout::new(dir.path())).unwrap();
    assert_eq!(changelog.len(), 1);
    assert_eq!(changelog.entries[0].path, "changelog.md");
}

/// The JSON output carries entries and packages in the documented shape.
#[test]
fn serializes_changelog_for_site_generator() {
    let repo = sample_repo();
    let mut changelog = discover_changelogs(&Grammar::new(), &Layout::new(repo.path())).unwrap();
    changelog.filter_packages(&["core"]);

    let json = serde_json::to_value(&changelog).unwrap();
    let entries = json["entries"].as_array().unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["package"], "core");
    assert_eq!(entries[0]["version"], "1.9.0");
    assert_eq!(entries[0]["date"], "2024-03-01");
    assert_eq!(entries[0]["path"], "packages/core/CHANGELOG.md");
    assert_eq!(entries[1]["html"], "<p>Initial release.</p>");
    assert_eq!(json["packages"], serde_json::json!(["core", "root", "utils"]));
}

/// A blank line closes a list before the following paragraph.
#[test]
fn blank_line_separates_list_and_paragraph() {
    let html = render_lines(&Grammar::new(), &["- item one", "", "plain text"]);

    assert_eq!(
        html,
        "<ul class=\"chg-list\">\n<li>item one</li>\n</ul>\n<p>plain text</p>"
    );
}
