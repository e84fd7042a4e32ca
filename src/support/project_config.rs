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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::kv::Store;
use crate::support::error::Error;

/// The collection holding project-wide records (the configuration itself and
/// the reconstruction cache summary).
pub const COLLECTION: &str = "dataset";

const CONFIG_KEY: &str = "config";

/// Per-project settings: where to collect from and which groups to collect.
///
/// Written by the interactive `setup` command, read by everything else. The
/// credentials are passed through to the source verbatim; an empty username
/// means the server accepts unauthenticated readers.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub server: String,
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// The selected groups, with the bounds the server reported when each
    /// group was selected.
    #[serde(default)]
    pub groups: BTreeMap<String, GroupBounds>,
}

/// First and last article number of a group as reported by the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupBounds {
    pub first: u64,
    pub last: u64,
}

impl GroupBounds {
    /// Number of article slots the bounds span. Servers report
    /// `last < first` for groups with no articles.
    pub fn article_count(&self) -> u64 {
        (self.last + 1).saturating_sub(self.first)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            server: "news.gmane.io".to_owned(),
            port: 119,
            username: String::new(),
            password: String::new(),
            groups: BTreeMap::new(),
        }
    }
}

impl ProjectConfig {
    pub fn load(store: &Store) -> Result<Option<ProjectConfig>, Error> {
        store.get(COLLECTION, CONFIG_KEY)
    }

    pub fn save(&self, store: &Store) -> Result<(), Error> {
        store.put(COLLECTION, CONFIG_KEY, self)
    }
}
