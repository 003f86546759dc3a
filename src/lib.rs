// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Aggregate per-package changelogs into rendered release entries.
//!
//! A multi-package repository often keeps one `CHANGELOG.md` at its root
//! and one per package under `packages/`. This crate collects all of them
//! into a single list of release entries, newest first, each carrying an
//! HTML rendering of its notes for a documentation site to template.
//!
//! # Overview
//!
//! 1. [`discover`] finds changelog files and assigns package identifiers
//! 2. [`parser`] splits each file into release sections
//! 3. [`renderer`] turns each section body into an HTML fragment
//! 4. [`aggregate`] merges and sorts the entries of every file
//!
//! # Example
//!
//! ```no_run
//! use chglog::discover::{Layout, discover_changelogs};
//! use chglog::grammar::Grammar;
//!
//! let grammar = Grammar::new();
//! let changelog = discover_changelogs(&grammar, &Layout::new(".")).unwrap();
//!
//! println!("{} entries across {:?}", changelog.len(), changelog.packages);
//! ```
//!
//! # Modules
//!
//! - [`grammar`]: Accepted filenames and line patterns
//! - [`renderer`]: Markdown subset to HTML conversion
//! - [`parser`]: Release section splitting
//! - [`discover`]: Changelog file discovery
//! - [`aggregate`]: Ordering and package listing

#![deny(missing_docs)]

pub mod aggregate;
pub mod discover;
pub mod grammar;
pub mod parser;
pub mod renderer;
