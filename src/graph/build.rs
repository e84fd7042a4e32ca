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

//! Reconstructs the communication graph from the message store.
//!
//! The engine scans the message store once, in unique-id order so actor and
//! act ids come out identical across runs, and resolves each reply's parent
//! by the last entry of its reference chain. A reference that cannot be
//! resolved degrades the message to an originating act and bumps a counter;
//! it never fails the pass.
//!
//! The result is memoized per engine with a tri-state cache — unbuilt,
//! stale, built — and persisted into the derived `actors`/`acts`/`relations`
//! collections. An unbuilt engine whose store carries a previous build will
//! reload that instead of recomputing (the legacy `-r` dump behavior);
//! `reset` marks the cache stale, which forces a recomputation and
//! re-persists the derived collections wholesale.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::graph::model::{Act, ActId, ActKind, Actor, ActorId, Relation};
use crate::store::kv::Store;
use crate::store::messages::{self, Message, MessageStore};
use crate::support::dates;
use crate::support::error::Error;
use crate::support::project_config;

pub const ACTORS: &str = "actors";
pub const ACTS: &str = "acts";
pub const RELATIONS: &str = "relations";

const SUMMARY_KEY: &str = "graphcache";

/// Dataset-wide aggregates persisted alongside the derived collections. Its
/// presence marks a completed build.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GraphSummary {
    resolution_errors: u64,
    earliest: Option<DateTime<FixedOffset>>,
    latest: Option<DateTime<FixedOffset>>,
}

/// The fully reconstructed graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    actors: Vec<Actor>,
    acts: Vec<Act>,
    relations: Vec<Relation>,
    resolution_errors: u64,
    earliest: Option<DateTime<FixedOffset>>,
    latest: Option<DateTime<FixedOffset>>,
}

impl Graph {
    /// Actors in ascending id order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.iter()
    }

    /// Acts in ascending id order.
    pub fn acts(&self) -> impl Iterator<Item = &Act> + '_ {
        self.acts.iter()
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> + '_ {
        self.relations.iter()
    }

    /// Replies whose referenced parent was not in the message store.
    pub fn resolution_errors(&self) -> u64 {
        self.resolution_errors
    }

    /// Earliest timestamp observed across the whole dataset.
    pub fn earliest(&self) -> Option<DateTime<FixedOffset>> {
        self.earliest
    }

    pub fn latest(&self) -> Option<DateTime<FixedOffset>> {
        self.latest
    }
}

pub struct GraphEngine<'a> {
    store: &'a Store,
    /// Tri-state cache: `memo` present = built; otherwise `stale` says
    /// whether a rebuild was requested (stale) or a persisted build may be
    /// reloaded (unbuilt).
    memo: Option<Graph>,
    stale: bool,
}

impl<'a> GraphEngine<'a> {
    pub fn new(store: &'a Store) -> Self {
        GraphEngine {
            store,
            memo: None,
            stale: false,
        }
    }

    /// Discard any built state; the next `graph()` call recomputes from the
    /// message store instead of reusing the memo or a previous run's derived
    /// collections.
    pub fn reset(&mut self) {
        self.memo = None;
        self.stale = true;
    }

    /// The reconstructed graph, computed at most once per engine.
    pub fn graph(&mut self) -> Result<&Graph, Error> {
        if self.memo.is_none() {
            let graph = if self.stale {
                self.rebuild()?
            } else {
                match self.load_persisted()? {
                    Some(graph) => graph,
                    None => self.rebuild()?,
                }
            };
            self.stale = false;
            self.memo = Some(graph);
        }
        // Populated just above; the fallback only satisfies the type system.
        Ok(self.memo.get_or_insert_with(Graph::default))
    }

    fn rebuild(&self) -> Result<Graph, Error> {
        debug!("Reconstructing communication graph");
        let store = MessageStore::new(self.store);
        let mut records = store
            .iter()?
            .collect::<Result<Vec<(String, Message)>, Error>>()?;
        // Store iteration order is unspecified; sort so ids are assigned
        // identically on every rebuild.
        records.sort_by(|a, b| a.0.cmp(&b.0));

        let mut graph = Graph::default();
        let mut actor_ids = HashMap::new();
        let mut act_ids = HashMap::new();
        // Parent message of each reply act, resolved to an act id after the
        // main pass: the parent's act may not exist yet while the reply is
        // being processed.
        let mut parent_of: Vec<Option<String>> = Vec::with_capacity(records.len());

        for (uid, message) in &records {
            let timestamp = dates::parse_timestamp(&message.timestamp)?;
            let sender = ensure_actor(
                &mut graph.actors,
                &mut actor_ids,
                &message.sender,
                timestamp,
            );

            let parent_uid = match message.references.last() {
                Some(lastref) => {
                    let parent_uid = messages::unique_id(&message.group, lastref);
                    match store.get(&parent_uid)? {
                        Some(parent) => {
                            let recipient = ensure_actor(
                                &mut graph.actors,
                                &mut actor_ids,
                                &parent.sender,
                                timestamp,
                            );
                            graph.relations.push(Relation {
                                sender,
                                recipient,
                                timestamp,
                            });
                            Some(parent_uid)
                        },
                        None => {
                            debug!(
                                "Reference {} of {} not found; \
                                 degrading to originating act",
                                lastref, uid
                            );
                            graph.resolution_errors += 1;
                            None
                        },
                    }
                },
                None => None,
            };

            let id = ActId(graph.acts.len() as u32 + 1);
            act_ids.insert(uid.clone(), id);
            parent_of.push(parent_uid);
            graph.acts.push(Act {
                id,
                message: uid.clone(),
                sender,
                timestamp,
                kind: ActKind::Originating,
            });
            graph.earliest =
                Some(graph.earliest.map_or(timestamp, |e| e.min(timestamp)));
            graph.latest =
                Some(graph.latest.map_or(timestamp, |l| l.max(timestamp)));
        }

        for (act, parent_uid) in graph.acts.iter_mut().zip(&parent_of) {
            if let Some(parent_uid) = parent_uid {
                if let Some(&parent) = act_ids.get(parent_uid) {
                    act.kind = ActKind::Reply { parent };
                }
            }
        }

        debug!(
            "Reconstructed {} actors, {} acts, {} relations \
             ({} unresolved references)",
            graph.actors.len(),
            graph.acts.len(),
            graph.relations.len(),
            graph.resolution_errors
        );
        self.persist(&graph)?;
        Ok(graph)
    }

    fn persist(&self, graph: &Graph) -> Result<(), Error> {
        for collection in &[ACTORS, ACTS, RELATIONS] {
            self.store.delete_collection(collection)?;
        }
        for actor in &graph.actors {
            self.store.put(ACTORS, &actor.email, actor)?;
        }
        for act in &graph.acts {
            self.store.put(ACTS, &act.message, act)?;
        }
        for (i, relation) in graph.relations.iter().enumerate() {
            self.store.put(RELATIONS, &format!("{:08}", i), relation)?;
        }
        let summary = GraphSummary {
            resolution_errors: graph.resolution_errors,
            earliest: graph.earliest,
            latest: graph.latest,
        };
        self.store
            .put(project_config::COLLECTION, SUMMARY_KEY, &summary)
    }

    fn load_persisted(&self) -> Result<Option<Graph>, Error> {
        let summary: GraphSummary = match self
            .store
            .get(project_config::COLLECTION, SUMMARY_KEY)?
        {
            Some(summary) => summary,
            None => return Ok(None),
        };
        debug!("Reusing the graph persisted by a previous build");

        let mut actors = self
            .store
            .iter::<Actor>(ACTORS)?
            .map(|entry| entry.map(|(_, actor)| actor))
            .collect::<Result<Vec<_>, _>>()?;
        actors.sort_by_key(|actor| actor.id);

        let mut acts = self
            .store
            .iter::<Act>(ACTS)?
            .map(|entry| entry.map(|(_, act)| act))
            .collect::<Result<Vec<_>, _>>()?;
        acts.sort_by_key(|act| act.id);

        let mut relations = self
            .store
            .iter::<Relation>(RELATIONS)?
            .collect::<Result<Vec<_>, _>>()?;
        relations.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Some(Graph {
            actors,
            acts,
            relations: relations.into_iter().map(|(_, r)| r).collect(),
            resolution_errors: summary.resolution_errors,
            earliest: summary.earliest,
            latest: summary.latest,
        }))
    }
}

fn ensure_actor(
    actors: &mut Vec<Actor>,
    index: &mut HashMap<String, ActorId>,
    email: &str,
    seen: DateTime<FixedOffset>,
) -> ActorId {
    if let Some(&id) = index.get(email) {
        let actor = &mut actors[(id.0 - 1) as usize];
        if seen < actor.first_seen {
            actor.first_seen = seen;
        }
        if seen > actor.last_seen {
            actor.last_seen = seen;
        }
        return id;
    }
    let id = ActorId(actors.len() as u32 + 1);
    index.insert(email.to_owned(), id);
    actors.push(Actor {
        id,
        email: email.to_owned(),
        first_seen: seen,
        last_seen: seen,
    });
    id
}

#[cfg(test)]
mod test {
    use super::*;

    fn message(
        msgid: &str,
        sender: &str,
        timestamp: &str,
        references: &[&str],
    ) -> Message {
        Message {
            group: "g".to_owned(),
            msgid: msgid.to_owned(),
            sender: sender.to_owned(),
            timestamp: timestamp.to_owned(),
            references: references.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn store_with(messages: &[Message]) -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let message_store = MessageStore::new(&store);
        for m in messages {
            message_store.insert(m).unwrap();
        }
        (dir, store)
    }

    const T1: &str = "Thu, 1 Jan 2009 10:00:00 +0000";
    const T2: &str = "Thu, 1 Jan 2009 11:00:00 +0000";

    #[test]
    fn reply_produces_two_actors_two_acts_one_relation() {
        let (_dir, store) = store_with(&[
            message("1", "a@x.com", T1, &[]),
            message("2", "b@x.com", T2, &["1"]),
        ]);
        let mut engine = GraphEngine::new(&store);
        let graph = engine.graph().unwrap();

        let actors: Vec<_> = graph.actors().collect();
        assert_eq!(2, actors.len());
        assert_eq!("a@x.com", actors[0].email);
        assert_eq!(ActorId(1), actors[0].id);
        assert_eq!("b@x.com", actors[1].email);

        let acts: Vec<_> = graph.acts().collect();
        assert_eq!(2, acts.len());
        assert_eq!(ActKind::Originating, acts[0].kind);
        assert_eq!("g-1", acts[0].message);
        assert_eq!(
            ActKind::Reply {
                parent: acts[0].id,
            },
            acts[1].kind
        );

        let relations: Vec<_> = graph.relations().collect();
        assert_eq!(1, relations.len());
        assert_eq!(ActorId(2), relations[0].sender);
        assert_eq!(ActorId(1), relations[0].recipient);
        assert_eq!(0, graph.resolution_errors());
    }

    #[test]
    fn broken_reference_degrades_to_originating_act() {
        let (_dir, store) = store_with(&[
            message("3", "c@x.com", T1, &["999"]),
        ]);
        let mut engine = GraphEngine::new(&store);
        let graph = engine.graph().unwrap();

        let acts: Vec<_> = graph.acts().collect();
        assert_eq!(1, acts.len());
        assert_eq!(ActKind::Originating, acts[0].kind);
        assert_eq!(0, graph.relations().count());
        assert_eq!(1, graph.resolution_errors());
    }

    #[test]
    fn only_the_last_reference_is_resolved() {
        let (_dir, store) = store_with(&[
            message("1", "a@x.com", T1, &[]),
            message("2", "b@x.com", T1, &["1"]),
            message("3", "c@x.com", T2, &["1", "2"]),
        ]);
        let mut engine = GraphEngine::new(&store);
        let graph = engine.graph().unwrap();

        let relations: Vec<_> = graph.relations().collect();
        assert_eq!(2, relations.len());
        // Message 3 replies to 2 (its immediate parent), not to 1.
        assert_eq!(ActorId(3), relations[1].sender);
        assert_eq!(ActorId(2), relations[1].recipient);
    }

    #[test]
    fn references_do_not_cross_groups() {
        let mut other = message("2", "b@x.com", T2, &["1"]);
        other.group = "h".to_owned();
        let (_dir, store) =
            store_with(&[message("1", "a@x.com", T1, &[]), other]);
        let mut engine = GraphEngine::new(&store);
        let graph = engine.graph().unwrap();

        // "h-1" does not exist, so the reply degrades.
        assert_eq!(0, graph.relations().count());
        assert_eq!(1, graph.resolution_errors());
    }

    #[test]
    fn repeated_calls_are_memoized_and_reset_rebuilds_identically() {
        let (_dir, store) = store_with(&[
            message("1", "a@x.com", T1, &[]),
            message("2", "b@x.com", T2, &["1"]),
        ]);
        let mut engine = GraphEngine::new(&store);
        let first = engine.graph().unwrap().clone();
        let second = engine.graph().unwrap().clone();
        assert_eq!(first, second);

        engine.reset();
        let rebuilt = engine.graph().unwrap().clone();
        assert_eq!(first, rebuilt);
    }

    #[test]
    fn unbuilt_engine_reloads_the_persisted_build() {
        let (_dir, store) = store_with(&[
            message("1", "a@x.com", T1, &[]),
            message("2", "b@x.com", T2, &["1"]),
        ]);
        let built = GraphEngine::new(&store).graph().unwrap().clone();

        // A later message lands in the store...
        MessageStore::new(&store)
            .insert(&message("3", "c@x.com", T2, &["2"]))
            .unwrap();

        // ...a fresh engine without reset still sees the persisted build...
        let mut reused_engine = GraphEngine::new(&store);
        assert_eq!(built, *reused_engine.graph().unwrap());

        // ...and reset picks the new message up.
        let mut fresh_engine = GraphEngine::new(&store);
        fresh_engine.reset();
        assert_eq!(3, fresh_engine.graph().unwrap().acts().count());
    }

    #[test]
    fn activity_windows_cover_received_replies() {
        let (_dir, store) = store_with(&[
            message("1", "a@x.com", T1, &[]),
            message("2", "b@x.com", T2, &["1"]),
        ]);
        let mut engine = GraphEngine::new(&store);
        let graph = engine.graph().unwrap();

        let a = graph.actors().next().unwrap();
        // a@x.com posted at T1 and received a reply at T2.
        assert_eq!(dates::parse_timestamp(T1).unwrap(), a.first_seen);
        assert_eq!(dates::parse_timestamp(T2).unwrap(), a.last_seen);
        assert_eq!(Some(a.first_seen), graph.earliest());
        assert_eq!(Some(a.last_seen), graph.latest());
    }

    #[test]
    fn empty_store_reconstructs_an_empty_graph() {
        let (_dir, store) = store_with(&[]);
        let mut engine = GraphEngine::new(&store);
        let graph = engine.graph().unwrap();
        assert_eq!(0, graph.actors().count());
        assert_eq!(0, graph.acts().count());
        assert_eq!(0, graph.relations().count());
        assert_eq!(None, graph.earliest());
    }
}
