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

//! Tracks how far harvesting has progressed in each group.

use serde::{Deserialize, Serialize};

use crate::store::kv::Store;
use crate::support::error::Error;

pub const COLLECTION: &str = "grouppointers";

/// Per-group collection progress.
///
/// Created once, at group-selection time, from the bounds the source
/// reported at that moment; later runs never move it except forward,
/// one article at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCursor {
    pub group: String,
    /// Next sequence number to fetch. Monotonically non-decreasing.
    pub next: u64,
    pub first: u64,
    pub last: u64,
}

impl GroupCursor {
    /// True while there are article numbers left to attempt.
    pub fn has_more(&self) -> bool {
        self.next <= self.last
    }

    pub fn position(&self) -> u64 {
        self.next
    }
}

pub struct CursorManager<'a> {
    store: &'a Store,
}

impl<'a> CursorManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        CursorManager { store }
    }

    /// Create (or, on explicit re-selection, re-create) the cursor for
    /// `group`, positioned at the source-reported lower bound.
    pub fn init_group(
        &self,
        group: &str,
        first: u64,
        last: u64,
    ) -> Result<GroupCursor, Error> {
        let cursor = GroupCursor {
            group: group.to_owned(),
            next: first,
            first,
            last,
        };
        self.persist(&cursor)?;
        Ok(cursor)
    }

    pub fn get(&self, group: &str) -> Result<GroupCursor, Error> {
        self.store
            .get(COLLECTION, group)?
            .ok_or_else(|| Error::UnknownGroup(group.to_owned()))
    }

    /// Step past the article just attempted and make the new position
    /// durable before the next fetch can begin. Called exactly once per
    /// attempt, success or failure; there is no retry.
    pub fn advance(&self, cursor: &mut GroupCursor) -> Result<(), Error> {
        cursor.next += 1;
        self.persist(cursor)
    }

    fn persist(&self, cursor: &GroupCursor) -> Result<(), Error> {
        self.store.put(COLLECTION, &cursor.group, cursor)
    }
}
