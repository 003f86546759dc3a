// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Splitting changelog documents into release sections.
//!
//! A document is read line by line. A release header such as
//! `## [1.2.0](...) (2024-03-01)` closes the previous section and opens a
//! new one; every other line is appended to the open section. Lines before
//! the first header are dropped.
//!
//! # Example
//!
//! ```
//! use chglog::grammar::Grammar;
//! use chglog::parser::parse_changelog;
//!
//! let text = "# Changelog\n\n## [1.2.0] (2024-03-01)\n### Added\n- New thing\n";
//! let entries = parse_changelog(&Grammar::new(), text, "core", "packages/core/CHANGELOG.md")
//!     .unwrap();
//!
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].version, "1.2.0");
//! assert_eq!(entries[0].lines, ["### Added", "- New thing"]);
//! ```

use crate::grammar::Grammar;
use crate::renderer::render_lines;
use chrono::NaiveDate;
use serde::Serialize;
use snafu::prelude::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error type for changelog parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// A release header carried a date that is not a real calendar day.
    #[snafu(display("line {line}: invalid release date {value:?}: {source}"))]
    InvalidDate {
        /// 1-based line number of the release header.
        line: usize,
        /// The date text as written.
        value: String,
        /// The underlying date parsing error.
        source: chrono::ParseError,
    },
}

/// One release section of one changelog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    /// Owning package identifier.
    pub package: String,

    /// Version from the release header, without brackets.
    pub version: String,

    /// Release date from the release header.
    pub date: NaiveDate,

    /// Raw body lines in document order, excluding the header.
    #[serde(skip)]
    pub lines: Vec<String>,

    /// Rendered HTML for [`lines`](Self::lines).
    pub html: String,

    /// Source file, relative to the repository root, `/`-separated.
    pub path: String,
}

impl ChangelogEntry {
    /// Creates an entry and renders its body.
    #[must_use]
    pub fn new(
        grammar: &Grammar,
        package: impl Into<String>,
        version: impl Into<String>,
        date: NaiveDate,
        lines: Vec<String>,
        path: impl Into<String>,
    ) -> Self {
        let html = render_lines(grammar, &lines);
        Self {
            package: package.into(),
            version: version.into(),
            date,
            lines,
            html,
            path: path.into(),
        }
    }
}

/// A section being accumulated.
struct OpenSection {
    version: String,
    date: NaiveDate,
    lines: Vec<String>,
}

/// Parses a changelog document into its release sections.
///
/// Sections come back in document order, each with its HTML rendered. A
/// document without any release header yields an empty list.
///
/// # Errors
///
/// Returns [`ParseError::InvalidDate`] if a release header matches but its
/// date is not a valid calendar day (for example `2024-13-40`).
pub fn parse_changelog(
    grammar: &Grammar,
    text: &str,
    package: &str,
    path: &str,
) -> Result<Vec<ChangelogEntry>, ParseError> {
    let mut sections = Vec::new();
    let mut current: Option<OpenSection> = None;

    for (idx, line) in text.lines().enumerate() {
        if let Some((version, date_str)) = grammar.release_header(line) {
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).context(InvalidDateSnafu {
                line: idx + 1,
                value: date_str,
            })?;
            sections.extend(current.replace(OpenSection {
                version: version.to_owned(),
                date,
                lines: Vec::new(),
            }));
        } else if let Some(section) = current.as_mut() {
            section.lines.push(line.to_owned());
        }
    }
    sections.extend(current);

    Ok(sections
        .into_iter()
        .map(|s| ChangelogEntry::new(grammar, package, s.version, s.date, s.lines, path))
        .collect())
}
