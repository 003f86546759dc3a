// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! HTML rendering for the body of one release section.
//!
//! Only a small subset of markdown is recognized. Each line is classified
//! in order, first match wins:
//!
//! 1. Blank lines close an open bullet list and produce nothing else.
//! 2. `### Label` headings become category badges.
//! 3. `-`, `*` or `+` bullets become list items, opening a list if needed.
//! 4. Everything else becomes a paragraph. Paragraphs do not close lists.
//!
//! Links inside items and paragraphs are rewritten to anchors. Commit links
//! show the 7-character short SHA; a commit anchor wrapped in literal
//! parentheses loses the parentheses.
//!
//! # Example
//!
//! ```
//! use chglog::grammar::Grammar;
//! use chglog::renderer::render_lines;
//!
//! let html = render_lines(&Grammar::new(), &["### Fixed", "- Crash on start"]);
//!
//! assert_eq!(
//!     html,
//!     "<h4 class=\"chg-cat\"><span class=\"badge badge-fixed\">Fixed</span></h4>\n\
//!      <ul class=\"chg-list\">\n<li>Crash on start</li>\n</ul>"
//! );
//! ```

use crate::grammar::{Grammar, Link};
use std::fmt::Write;

const LIST_OPEN: &str = r#"<ul class="chg-list">"#;
const LIST_CLOSE: &str = "</ul>";
const SHORT_SHA_LEN: usize = 7;

/// Renders the raw body lines of one release section as an HTML fragment.
///
/// The output depends only on `lines`. Fragments for individual lines are
/// joined with `\n`; an empty body renders as an empty string.
///
/// All text is HTML-escaped, bullet item text included, so raw HTML in a
/// changelog shows up literally rather than as markup.
#[must_use]
pub fn render_lines<S: AsRef<str>>(grammar: &Grammar, lines: &[S]) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_list = false;

    for raw in lines {
        let line = raw.as_ref().trim_end();

        if line.is_empty() {
            if in_list {
                out.push(LIST_CLOSE.to_owned());
                in_list = false;
            }
            continue;
        }

        if let Some(label) = grammar.category(line) {
            if in_list {
                out.push(LIST_CLOSE.to_owned());
                in_list = false;
            }
            out.push(render_category(label));
            continue;
        }

        if let Some(item) = grammar.bullet(line) {
            if !in_list {
                out.push(LIST_OPEN.to_owned());
                in_list = true;
            }
            out.push(format!("<li>{}</li>", substitute_links(grammar, item)));
            continue;
        }

        out.push(format!("<p>{}</p>", substitute_links(grammar, line)));
    }

    if in_list {
        out.push(LIST_CLOSE.to_owned());
    }

    let rendered = out.join("\n");
    grammar
        .parenthesized_commit()
        .replace_all(&rendered, "$1")
        .into_owned()
}

fn render_category(label: &str) -> String {
    let canonical = title_case(label);
    format!(
        r#"<h4 class="chg-cat"><span class="badge badge-{}">{}</span></h4>"#,
        slug(&canonical),
        html_escape::encode_text(&canonical)
    )
}

/// Escapes text and rewrites markdown links to anchors.
///
/// Text outside links, link labels and hrefs are each escaped exactly once.
fn substitute_links(grammar: &Grammar, text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut last = 0;

    for found in grammar.links(text) {
        out.push_str(&html_escape::encode_text(&text[last..found.range.start]));
        render_link(&mut out, found.link);
        last = found.range.end;
    }
    out.push_str(&html_escape::encode_text(&text[last..]));

    out
}

fn render_link(out: &mut String, link: Link<'_>) {
    match link {
        Link::Commit { url, sha } => {
            let short = sha.get(..SHORT_SHA_LEN).unwrap_or(sha);
            write!(
                out,
                r#"<a href="{}" class="chg-commit" title="Commit {sha}">{short}</a>"#,
                html_escape::encode_double_quoted_attribute(url)
            )
            .unwrap();
        }
        Link::Generic { label, url } => {
            write!(
                out,
                r#"<a href="{}" class="chg-link">{}</a>"#,
                html_escape::encode_double_quoted_attribute(url),
                html_escape::encode_text(label)
            )
            .unwrap();
        }
    }
}

/// Uppercases the first letter of every word and lowercases the rest.
///
/// A "word" starts at any letter not preceded by another letter, so
/// `bug fixes` becomes `Bug Fixes` and `BREAKING` becomes `Breaking`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// Turns a category label into a CSS class suffix.
///
/// Lowercased, spaces become hyphens, and anything that is not
/// alphanumeric, `-` or `_` is dropped.
fn slug(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}
