//-
// Copyright (c) 2026, The Newsgraph Authors
//
// This file is part of Newsgraph.
//
// Newsgraph is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Newsgraph is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with Newsgraph. If not, see <http://www.gnu.org/licenses/>.

//! Raw header handling: field extraction and sender identity
//! normalization.
//!
//! Header parsing is deliberately tolerant. Anything that isn't one of the
//! three fields the collector cares about is ignored, and a From field in
//! any of the shapes agents produce (`Name <addr>`, `addr (Name)`, bare
//! address, masked address) is boiled down to a canonical `localpart@domain`
//! that serves as the actor identity.

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

lazy_static! {
    /// Best-effort (name-prefix, address, name-suffix) capture.
    static ref ADDRESS: Regex =
        Regex::new(r"^(.*?)[\s<]*(\S+@\S+)[>\s]*(.*?)$").unwrap();
}

/// The header fields the collector cares about, still in source form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawHeaders {
    pub date: Option<String>,
    pub sender: Option<String>,
    pub references: Option<String>,
}

/// Extract the interesting fields from raw header lines.
///
/// Folded continuation lines are joined to the field they continue, field
/// names match ASCII-case-insensitively, and unrecognized fields are
/// ignored. `NNTP-Posting-Date:` wins over `Date:` when both are present.
pub fn extract(lines: &[String]) -> RawHeaders {
    let mut posting_date = None;
    let mut date = None;
    let mut out = RawHeaders::default();

    for line in unfold(lines) {
        if let Some(v) = field_value(&line, "NNTP-Posting-Date:") {
            posting_date = Some(v.to_owned());
        } else if let Some(v) = field_value(&line, "Date:") {
            date = Some(v.to_owned());
        } else if let Some(v) = field_value(&line, "From:") {
            out.sender = Some(v.to_owned());
        } else if let Some(v) = field_value(&line, "References:") {
            out.references = Some(v.to_owned());
        }
    }

    out.date = posting_date.or(date);
    out
}

/// Split a References field into the ancestor chain, oldest first.
pub fn split_references(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_owned).collect()
}

/// Canonicalize a sender field to a bare address.
///
/// `"John Smith <jsmith@example.com>"` and
/// `"JSMITH@EXAMPLE.COM (John Smith)"` both come out as
/// `jsmith@example.com`. The display name is not part of the identity; it
/// is only traced to help diagnose lookup failures. When no address-shaped
/// token is found at all, the whole trimmed input is taken as the address.
pub fn normalize_sender(raw: &str) -> String {
    if let Some(cap) = ADDRESS.captures(raw) {
        let name = display_name(cap[1].trim(), cap[3].trim());
        let addr = cap[2]
            .replace('>', "")
            .replace("_REMOVE", "")
            .replace("REMOVE", "")
            .replace('/', "");
        let parts = addr.split('@').collect::<Vec<_>>();
        if let [local, domain] = parts.as_slice() {
            let canonical = format!("{}@{}", local, domain).to_lowercase();
            trace!(
                "Parsed sender {:?} to address {:?}, name {:?}",
                raw,
                canonical,
                name
            );
            return canonical;
        }
    }
    raw.trim().to_lowercase()
}

fn display_name(prefix: &str, suffix: &str) -> String {
    format!("{} {}", prefix, suffix)
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '"' | '\''))
        .collect()
}

fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    match line.get(..name.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(name) => {
            Some(line[name.len()..].trim())
        },
        _ => None,
    }
}

fn unfold(lines: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(prev) = out.last_mut() {
                prev.push(' ');
                prev.push_str(line.trim_start());
                continue;
            }
        }
        out.push(line.clone());
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_known_fields_and_ignores_the_rest() {
        let headers = extract(&lines(&[
            "Path: news.example.com!not-for-mail",
            "From: John Smith <jsmith@example.com>",
            "Subject: whatever",
            "NNTP-Posting-Date: Thu, 1 Jan 2009 10:00:00 +0000",
            "References: <a@x> <b@x>",
        ]));
        assert_eq!(
            Some("John Smith <jsmith@example.com>".to_owned()),
            headers.sender
        );
        assert_eq!(
            Some("Thu, 1 Jan 2009 10:00:00 +0000".to_owned()),
            headers.date
        );
        assert_eq!(Some("<a@x> <b@x>".to_owned()), headers.references);
    }

    #[test]
    fn posting_date_wins_over_date_regardless_of_order() {
        let headers = extract(&lines(&[
            "Date: Thu, 1 Jan 2009 11:00:00 +0000",
            "NNTP-Posting-Date: Thu, 1 Jan 2009 10:00:00 +0000",
        ]));
        assert_eq!(
            Some("Thu, 1 Jan 2009 10:00:00 +0000".to_owned()),
            headers.date
        );
    }

    #[test]
    fn date_is_a_fallback() {
        let headers =
            extract(&lines(&["Date: Thu, 1 Jan 2009 11:00:00 +0000"]));
        assert_eq!(
            Some("Thu, 1 Jan 2009 11:00:00 +0000".to_owned()),
            headers.date
        );
    }

    #[test]
    fn folded_references_are_unfolded() {
        let headers = extract(&lines(&[
            "References: <a@x>",
            "\t<b@x> <c@x>",
            "From: a@x.com",
        ]));
        assert_eq!(Some("<a@x> <b@x> <c@x>".to_owned()), headers.references);
        assert_eq!(
            vec!["<a@x>", "<b@x>", "<c@x>"],
            split_references(headers.references.as_deref().unwrap())
        );
    }

    #[test]
    fn field_names_match_case_insensitively() {
        let headers = extract(&lines(&["FROM: a@x.com"]));
        assert_eq!(Some("a@x.com".to_owned()), headers.sender);
    }

    #[test]
    fn differently_decorated_headers_collapse() {
        assert_eq!(
            normalize_sender("John Smith <jsmith@example.com>"),
            normalize_sender("JSMITH@EXAMPLE.COM (John Smith)")
        );
        assert_eq!(
            "jsmith@example.com",
            normalize_sender("John Smith <jsmith@example.com>")
        );
    }

    #[test]
    fn masking_tokens_are_stripped() {
        assert_eq!(
            "jsmith@example.com",
            normalize_sender("jsmith_REMOVE@example.com")
        );
        assert_eq!(
            "jsmith@example.com",
            normalize_sender("jsmithREMOVE@/example.com")
        );
    }

    #[test]
    fn addressless_input_falls_back_to_bare_identity() {
        assert_eq!("webmaster", normalize_sender("  Webmaster  "));
    }

    #[test]
    fn over_decorated_address_falls_back() {
        // Two @s survive the regex but fail the re-split.
        assert_eq!("x@y@z", normalize_sender("x@y@z"));
    }
}
