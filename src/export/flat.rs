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

//! Legacy dumps taken straight off the message store, bypassing the graph
//! engine.

use std::io::Write;

use serde::Serialize;

use crate::store::kv::Store;
use crate::store::messages::{self, MessageStore};
use crate::support::dates;
use crate::support::error::Error;

/// One entry of the cco JSON dump.
#[derive(Serialize)]
struct CcoMessage {
    id: String,
    #[serde(rename = "from")]
    sender: String,
    /// Unix seconds.
    timestamp: i64,
    references: Vec<String>,
}

/// Line-per-message dump: group, message id, sender, resolved recipient
/// (`-` when the message originates a thread or its reference is missing),
/// timestamp.
pub fn dump<W: Write>(mut out: W, store: &Store) -> Result<(), Error> {
    let messages = MessageStore::new(store);
    for entry in messages.iter()? {
        let (_, message) = entry?;
        let recipient = match message.references.last() {
            Some(lastref) => messages
                .get(&messages::unique_id(&message.group, lastref))?
                .map(|parent| parent.sender),
            None => None,
        };
        writeln!(
            out,
            "{} {} {} {} {}",
            message.group,
            message.msgid,
            message.sender,
            recipient.as_deref().unwrap_or("-"),
            message.timestamp
        )?;
    }
    Ok(())
}

/// cco dump: the whole store as a JSON array, ordered by message id.
pub fn dump_cco<W: Write>(out: W, store: &Store) -> Result<(), Error> {
    let messages = MessageStore::new(store);
    let mut records = Vec::new();
    for entry in messages.iter()? {
        let (_, message) = entry?;
        let timestamp =
            dates::parse_timestamp(&message.timestamp)?.timestamp();
        records.push(CcoMessage {
            id: message.msgid,
            sender: message.sender,
            timestamp,
            references: message.references,
        });
    }
    records.sort_by(|a, b| a.id.cmp(&b.id));
    serde_json::to_writer(out, &records)?;
    Ok(())
}
