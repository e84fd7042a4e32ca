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

pub mod fan;
pub mod flat;
pub mod gexf;
pub mod lax;

#[cfg(test)]
pub mod test_graphs {
    //! Canned message stores shared by the serializer tests.

    use crate::store::kv::Store;
    use crate::store::messages::{Message, MessageStore};

    /// An empty project store.
    pub fn empty_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    /// Two messages in group "g": message 2 replies to message 1.
    pub fn reply_store() -> (tempfile::TempDir, Store) {
        let (dir, store) = empty_store();
        let messages = MessageStore::new(&store);
        messages
            .insert(&Message {
                group: "g".to_owned(),
                msgid: "1".to_owned(),
                sender: "a@x.com".to_owned(),
                timestamp: "Thu, 1 Jan 2009 10:00:00 +0000".to_owned(),
                references: vec![],
            })
            .unwrap();
        messages
            .insert(&Message {
                group: "g".to_owned(),
                msgid: "2".to_owned(),
                sender: "b@x.com".to_owned(),
                timestamp: "Thu, 1 Jan 2009 11:00:00 +0000".to_owned(),
                references: vec!["1".to_owned()],
            })
            .unwrap();
        (dir, store)
    }
}
