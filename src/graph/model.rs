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

//! Typed records for the reconstructed communication graph.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Identifier of an Actor, assigned in first-seen order starting at 1.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub struct ActorId(pub u32);

/// Identifier of an Act, assigned in iteration order starting at 1.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub struct ActId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One distinct communicating identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Canonical address; see `collect::headers::normalize_sender`.
    pub email: String,
    /// Earliest instant this identity sent a message or received a resolved
    /// reply.
    pub first_seen: DateTime<FixedOffset>,
    /// Latest such instant.
    pub last_seen: DateTime<FixedOffset>,
}

/// How an act relates to the rest of the thread. A reply carries its
/// resolved parent, so an unresolved "reply" cannot be represented — it
/// degrades to `Originating` before it gets here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActKind {
    Originating,
    Reply { parent: ActId },
}

/// One authored event derived from a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Act {
    pub id: ActId,
    /// Unique id of the message this act was derived from.
    pub message: String,
    pub sender: ActorId,
    pub timestamp: DateTime<FixedOffset>,
    pub kind: ActKind,
}

impl Act {
    pub fn parent(&self) -> Option<ActId> {
        match self.kind {
            ActKind::Reply { parent } => Some(parent),
            ActKind::Originating => None,
        }
    }
}

/// A directed sender→recipient edge derived from one resolved reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub sender: ActorId,
    pub recipient: ActorId,
    pub timestamp: DateTime<FixedOffset>,
}
