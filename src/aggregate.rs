// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Merging and ordering entries from every changelog.

use crate::parser::ChangelogEntry;
use serde::Serialize;
use std::collections::BTreeSet;

/// All release entries across a repository, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Changelog {
    /// Entries sorted by `(date, version)` descending.
    pub entries: Vec<ChangelogEntry>,

    /// Distinct package identifiers, sorted ascending.
    pub packages: Vec<String>,
}

impl Changelog {
    /// Sorts the entries and collects their package identifiers.
    ///
    /// Entries sharing a date are ordered by comparing version strings, not
    /// semantic versions, so `1.9.0` sorts above `1.10.0`. The sort is
    /// stable: entries with equal date and version keep their input order.
    #[must_use]
    pub fn from_entries(mut entries: Vec<ChangelogEntry>) -> Self {
        entries.sort_by(|a, b| (b.date, &b.version).cmp(&(a.date, &a.version)));

        let packages = entries
            .iter()
            .map(|e| e.package.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self { entries, packages }
    }

    /// Keeps only entries belonging to one of `packages`.
    ///
    /// An empty filter keeps everything. The package list is left untouched
    /// so consumers can still offer every package as a choice.
    pub fn filter_packages<S: AsRef<str>>(&mut self, packages: &[S]) {
        if packages.is_empty() {
            return;
        }
        self.entries
            .retain(|e| packages.iter().any(|p| p.as_ref() == e.package));
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
