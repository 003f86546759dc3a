// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Filenames and line patterns recognized in changelog documents.
//!
//! A [`Grammar`] is built once and shared by reference with discovery,
//! parsing and rendering. It owns every compiled pattern, so none of the
//! other modules keep global state.
//!
//! # Example
//!
//! ```
//! use chglog::grammar::{Grammar, Link};
//!
//! let grammar = Grammar::new();
//!
//! assert_eq!(
//!     grammar.release_header("## [1.2.0] - (2024-03-01)"),
//!     Some(("1.2.0", "2024-03-01"))
//! );
//! assert_eq!(grammar.category("### bug fixes"), Some("bug fixes"));
//!
//! let links = grammar.links("fix ([abc1234](https://github.com/o/r/commit/abc1234))");
//! assert!(matches!(links[0].link, Link::Commit { sha: "abc1234", .. }));
//! ```

use regex::Regex;
use std::ops::Range;

/// Accepted changelog filenames, in lookup priority order.
pub const CHANGELOG_FILENAMES: [&str; 3] = ["CHANGELOG.md", "Changelog.md", "changelog.md"];

/// Directory under the repository root whose children are packages.
pub const DEFAULT_PACKAGES_DIR: &str = "packages";

/// Package identifier given to the repository-root changelog.
pub const DEFAULT_ROOT_PACKAGE: &str = "root";

const RELEASE_HEADER: &str =
    r"^## \[?([0-9]+\.[0-9]+\.[0-9]+)\]?.*?\(([0-9]{4}-[0-9]{2}-[0-9]{2})\)";
const CATEGORY: &str = r"(?i)^###\s+(Added|Changed|Fixed|Removed|Security|Deprecated|Breaking|Bug Fixes|Features)\s*$";
const GENERIC_CATEGORY: &str = r"^###\s+(.+?)\s*$";
const BULLET: &str = r"^\s*[-*+]\s+(.*)$";
const MARKDOWN_LINK: &str = r"\[([^\]]+)\]\(([^)]+)\)";
const COMMIT_LINK: &str = r"\[([0-9a-f]{7,40})\]\((https://(?:github\.com|gitlab\.com|codeberg\.org)/[^/]+/[^/]+/(?:-/)?commit/([0-9a-f]{7,40}))\)";
const PARENTHESIZED_COMMIT: &str = r#"\((<a [^>]*class="chg-commit"[^>]*>[^<]+</a>)\)"#;

/// A markdown link, classified by what it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link<'a> {
    /// A link to a commit view on a recognized forge.
    Commit {
        /// The full commit URL.
        url: &'a str,
        /// The SHA taken from the URL path.
        sha: &'a str,
    },
    /// Any other `[label](url)` link.
    Generic {
        /// The visible link text.
        label: &'a str,
        /// The link target.
        url: &'a str,
    },
}

/// A link found in a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch<'a> {
    /// Byte range of the whole `[label](url)` construct.
    pub range: Range<usize>,
    /// What the link points at.
    pub link: Link<'a>,
}

/// Compiled patterns plus the accepted filename list.
#[derive(Debug, Clone)]
pub struct Grammar {
    filenames: Vec<String>,
    release_header: Regex,
    category: Regex,
    generic_category: Regex,
    bullet: Regex,
    markdown_link: Regex,
    commit_link: Regex,
    parenthesized_commit: Regex,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// Builds the grammar with the default filename list.
    ///
    /// # Panics
    ///
    /// Never in practice: every pattern is a fixed literal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filenames: CHANGELOG_FILENAMES.iter().map(|&s| s.to_owned()).collect(),
            release_header: compile(RELEASE_HEADER),
            category: compile(CATEGORY),
            generic_category: compile(GENERIC_CATEGORY),
            bullet: compile(BULLET),
            markdown_link: compile(MARKDOWN_LINK),
            commit_link: compile(COMMIT_LINK),
            parenthesized_commit: compile(PARENTHESIZED_COMMIT),
        }
    }

    /// Replaces the accepted filenames. Order is lookup priority.
    #[must_use]
    pub fn with_filenames<I, S>(mut self, filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filenames = filenames.into_iter().map(Into::into).collect();
        self
    }

    /// Accepted changelog filenames, highest priority first.
    #[must_use]
    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    /// Matches a release header, returning the version and the raw date text.
    ///
    /// Only the version and the parenthesized `YYYY-MM-DD` date are
    /// captured; anything else on the heading line is ignored.
    #[must_use]
    pub fn release_header<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.release_header.captures(line)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    /// Matches a level-3 category heading and returns its label.
    ///
    /// The fixed vocabulary is tried first; any other `### text` heading is
    /// still accepted so uncommon categories render as headings too.
    #[must_use]
    pub fn category<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.category
            .captures(line)
            .or_else(|| self.generic_category.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Returns `true` if the heading label is one of the known categories.
    #[must_use]
    pub fn is_known_category(&self, line: &str) -> bool {
        self.category.is_match(line)
    }

    /// Matches a bullet item and returns the item text.
    #[must_use]
    pub fn bullet<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.bullet
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Pattern for a commit anchor standing alone in literal parentheses.
    #[must_use]
    pub const fn parenthesized_commit(&self) -> &Regex {
        &self.parenthesized_commit
    }

    /// Finds every markdown link in `text`, in order of appearance.
    ///
    /// Commit links are matched across the whole text first. The generic
    /// `[label](url)` pattern then only runs over the text between them, so a
    /// commit link is never swallowed by a wider generic match.
    #[must_use]
    pub fn links<'a>(&self, text: &'a str) -> Vec<LinkMatch<'a>> {
        let mut found = Vec::new();
        let mut last = 0;

        for caps in self.commit_link.captures_iter(text) {
            let (Some(whole), Some(url), Some(sha)) = (caps.get(0), caps.get(2), caps.get(3))
            else {
                continue;
            };
            self.push_generic(text, last..whole.start(), &mut found);
            found.push(LinkMatch {
                range: whole.range(),
                link: Link::Commit {
                    url: url.as_str(),
                    sha: sha.as_str(),
                },
            });
            last = whole.end();
        }
        self.push_generic(text, last..text.len(), &mut found);

        found
    }

    fn push_generic<'a>(&self, text: &'a str, gap: Range<usize>, found: &mut Vec<LinkMatch<'a>>) {
        let offset = gap.start;
        for caps in self.markdown_link.captures_iter(&text[gap]) {
            let (Some(whole), Some(label), Some(url)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            found.push(LinkMatch {
                range: offset + whole.start()..offset + whole.end(),
                link: Link::Generic {
                    label: label.as_str(),
                    url: url.as_str(),
                },
            });
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}
