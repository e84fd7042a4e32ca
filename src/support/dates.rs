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

//! Tolerant parsing for the date strings found in message headers.
//!
//! Messages carry their posting date in whatever form the originating agent
//! produced. RFC 2822 covers almost everything seen in the wild; the
//! fallback formats mop up agents that drop the weekday or emit an ISO-style
//! date instead.

use chrono::{DateTime, FixedOffset};

use crate::support::error::Error;

const FALLBACK_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
];

/// Parse a source-native timestamp string to an absolute instant.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, Error> {
    let s = strip_trailing_comment(raw.trim());
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt);
    }
    for format in FALLBACK_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    Err(Error::BadTimestamp(raw.to_owned()))
}

/// Drop a trailing comment like the "(UTC)" in
/// "Thu, 1 Jan 2009 10:00:00 +0000 (UTC)", which chrono rejects.
fn strip_trailing_comment(s: &str) -> &str {
    if s.ends_with(')') {
        if let Some(open) = s.rfind('(') {
            return s[..open].trim_end();
        }
    }
    s
}

#[cfg(test)]
mod test {
    use chrono::prelude::*;

    use super::*;

    #[test]
    fn parses_rfc2822() {
        let dt = parse_timestamp("Thu, 1 Jan 2009 10:30:00 +0200").unwrap();
        assert_eq!(2009, dt.year());
        assert_eq!(10, dt.hour());
        assert_eq!(2 * 3600, dt.offset().local_minus_utc());
    }

    #[test]
    fn parses_with_trailing_zone_comment() {
        let dt = parse_timestamp("Thu, 1 Jan 2009 10:30:00 +0000 (UTC)").unwrap();
        assert_eq!(30, dt.minute());
    }

    #[test]
    fn parses_without_weekday() {
        let dt = parse_timestamp("1 Jan 2009 10:30:00 +0000").unwrap();
        assert_eq!(1, dt.day());
    }

    #[test]
    fn parses_iso_style() {
        let dt = parse_timestamp("2009-01-01 10:30:00 +0000").unwrap();
        assert_eq!(1, dt.month());
    }

    #[test]
    fn rejects_garbage() {
        assert_matches!(
            Err(crate::support::error::Error::BadTimestamp(..)),
            parse_timestamp("yesterday-ish")
        );
    }
}
