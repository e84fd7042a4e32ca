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

/// Determine whether the given project name is "safe".
///
/// Project names become directory names under the workspace root, so this
/// excludes empty names and patterns that cause directory traversal or other
/// unwanted behaviours.
///
/// This does not care about whether the name is ultimately a valid file
/// name; for that, we simply rely on the OS rejecting it.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty() &&
        // Block directory traversal through .. and creation of hidden
        // directories on UNIX
        name.chars().next() != Some('.') &&
        name.find('/').is_none() &&
        // Only a path separator on Windows, but always block since it has
        // high potential of causing problems
        name.find('\\').is_none() &&
        // Don't allow any ASCII control characters
        name.find(|c| c < ' ' || c == '\x7F').is_none()
}

#[cfg(test)]
mod test {
    use super::is_safe_name;

    #[test]
    fn test_is_safe_name() {
        assert!(is_safe_name("lkml"));
        assert!(is_safe_name("gmane.comp.lang.rust"));
        assert!(is_safe_name("project 1"));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name("."));
        assert!(!is_safe_name(".."));
        assert!(!is_safe_name(".hidden"));
        assert!(!is_safe_name("foo/bar"));
        assert!(!is_safe_name("/foo"));
        assert!(!is_safe_name("foo\\bar"));
        assert!(!is_safe_name("foo\0"));
        assert!(!is_safe_name("foo\r"));
        assert!(!is_safe_name("fo\x7Fo"));
    }
}
