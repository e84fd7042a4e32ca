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

//! The flat store of harvested message header records.
//!
//! Records are keyed by `group + "-" + msgid` since different groups can
//! carry unrelated messages under the same source id. Insertion is an
//! overwrite, so a resumed run re-inserting the article it was interrupted
//! on is harmless. Nothing ever deletes an individual message; teardown of a
//! whole project removes the store wholesale.

use serde::{Deserialize, Serialize};

use crate::store::kv::{Collection, Store};
use crate::support::error::Error;

pub const COLLECTION: &str = "emails";

/// One harvested message, reduced to the header fields the graph needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub group: String,
    /// Source message id, unique only within `group`.
    pub msgid: String,
    /// Canonical sender address.
    pub sender: String,
    /// Posting date in source-native form; validated to be parseable before
    /// the record is inserted.
    pub timestamp: String,
    /// Ancestor chain from the References header, oldest first. The last
    /// entry is the immediate parent of a reply.
    pub references: Vec<String>,
}

/// Compose the cross-group-unique key for a message.
pub fn unique_id(group: &str, msgid: &str) -> String {
    format!("{}-{}", group, msgid)
}

pub struct MessageStore<'a> {
    store: &'a Store,
}

impl<'a> MessageStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        MessageStore { store }
    }

    /// Insert `message`, overwriting any prior record with the same unique
    /// id.
    pub fn insert(&self, message: &Message) -> Result<(), Error> {
        self.store.put(
            COLLECTION,
            &unique_id(&message.group, &message.msgid),
            message,
        )
    }

    pub fn get(&self, unique_id: &str) -> Result<Option<Message>, Error> {
        self.store.get(COLLECTION, unique_id)
    }

    /// Fresh scan over every stored message; order unspecified.
    pub fn iter(&self) -> Result<Collection<Message>, Error> {
        self.store.iter(COLLECTION)
    }

    pub fn len(&self) -> Result<usize, Error> {
        self.store.len(COLLECTION)
    }
}
