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

//! The sequential collection loop.
//!
//! One connection, one group at a time, one article at a time in increasing
//! sequence order. Every attempt — stored, skipped, whatever — is followed
//! by exactly one durable cursor advance, so an interrupted run resumes at
//! precisely the first article it never attempted. An article that fails is
//! skipped for good; resumability is the only recovery mechanism.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use nix::libc::c_int;
use nix::sys::signal;

use crate::collect::cursor::CursorManager;
use crate::collect::headers;
use crate::nntp::client::{NntpClient, NntpError};
use crate::store::kv::Store;
use crate::store::messages::{Message, MessageStore};
use crate::support::dates;
use crate::support::error::Error;
use crate::support::project_config::ProjectConfig;

/// Set by the SIGINT handler; polled by the fetch loop.
pub static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_interrupt(_: c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT to `INTERRUPTED` so an interrupt stops the loop between
/// attempts instead of killing the process mid-write.
pub fn install_interrupt_handler() -> Result<(), Error> {
    let action = signal::SigAction::new(
        signal::SigHandler::Handler(handle_interrupt),
        signal::SaFlags::empty(),
        signal::SigSet::empty(),
    );
    unsafe {
        signal::sigaction(signal::Signal::SIGINT, &action)?;
    }
    Ok(())
}

/// Counters for one collection run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HarvestStats {
    pub fetched: u64,
    pub skipped: u64,
    pub interrupted: bool,
}

enum FetchOutcome {
    Stored,
    Skipped,
}

pub struct Harvester<'a> {
    config: &'a ProjectConfig,
    messages: MessageStore<'a>,
    cursors: CursorManager<'a>,
    interrupt: &'a AtomicBool,
}

impl<'a> Harvester<'a> {
    pub fn new(
        store: &'a Store,
        config: &'a ProjectConfig,
        interrupt: &'a AtomicBool,
    ) -> Self {
        Harvester {
            config,
            messages: MessageStore::new(store),
            cursors: CursorManager::new(store),
            interrupt,
        }
    }

    /// Fetch every remaining article of every selected group.
    pub fn run<R: BufRead, W: Write>(
        &self,
        client: &mut NntpClient<R, W>,
    ) -> Result<HarvestStats, Error> {
        let mut stats = HarvestStats::default();
        for group in self.config.groups.keys() {
            if self.interrupted() {
                break;
            }
            let mut cursor = self.cursors.get(group)?;
            if !cursor.has_more() {
                debug!("Group {} already exhausted", group);
                continue;
            }

            client.select_group(group)?;
            while cursor.has_more() {
                if self.interrupted() {
                    break;
                }
                let seq = cursor.position();
                match self.fetch_one(client, group, seq) {
                    Ok(FetchOutcome::Stored) => {
                        stats.fetched += 1;
                        debug!("Collected {} article {}", group, seq);
                    },
                    Ok(FetchOutcome::Skipped) => stats.skipped += 1,
                    Err(e) => {
                        // A signal during the blocking read surfaces as an
                        // I/O error; the flag tells the two cases apart.
                        if self.interrupted() {
                            break;
                        }
                        return Err(e);
                    },
                }
                self.cursors.advance(&mut cursor)?;
            }
        }

        stats.interrupted = self.interrupted();
        if stats.interrupted {
            info!("Interrupted; collected progress is saved");
        }
        Ok(stats)
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    /// One fetch attempt. A message record is only inserted once every field
    /// has parsed; anything less is a skip.
    fn fetch_one<R: BufRead, W: Write>(
        &self,
        client: &mut NntpClient<R, W>,
        group: &str,
        seq: u64,
    ) -> Result<FetchOutcome, Error> {
        let (msgid, lines) = match client.head(seq) {
            Ok(response) => response,
            Err(NntpError::Transient(e)) => {
                warn!("{} {}: article unavailable, skipping: {}", group, seq, e);
                return Ok(FetchOutcome::Skipped);
            },
            Err(NntpError::Encoding) => {
                warn!("{} {}: undecodable headers, skipping", group, seq);
                return Ok(FetchOutcome::Skipped);
            },
            Err(e) => return Err(e.into()),
        };

        let raw = headers::extract(&lines);
        let sender = match raw.sender {
            Some(ref sender) => headers::normalize_sender(sender),
            None => {
                warn!("{} {}: no From header, skipping", group, seq);
                return Ok(FetchOutcome::Skipped);
            },
        };
        let timestamp = match raw.date {
            Some(date) => date,
            None => {
                warn!("{} {}: no usable date header, skipping", group, seq);
                return Ok(FetchOutcome::Skipped);
            },
        };
        if let Err(e) = dates::parse_timestamp(&timestamp) {
            warn!("{} {}: {}, skipping", group, seq, e);
            return Ok(FetchOutcome::Skipped);
        }
        let references = raw
            .references
            .as_deref()
            .map(headers::split_references)
            .unwrap_or_default();

        self.messages.insert(&Message {
            group: group.to_owned(),
            msgid,
            sender,
            timestamp,
            references,
        })?;
        Ok(FetchOutcome::Stored)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::support::project_config::GroupBounds;

    fn config_with_group(name: &str) -> ProjectConfig {
        let mut config = ProjectConfig::default();
        config.groups.insert(
            name.to_owned(),
            GroupBounds { first: 1, last: 2 },
        );
        config
    }

    fn scripted(
        input: &[u8],
    ) -> NntpClient<Cursor<Vec<u8>>, Vec<u8>> {
        NntpClient::new(Cursor::new(input.to_vec()), Vec::new())
    }

    #[test]
    fn collects_skips_and_exhausts() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let config = config_with_group("g");
        let cursors = CursorManager::new(&store);
        cursors.init_group("g", 1, 2).unwrap();

        let interrupt = AtomicBool::new(false);
        let harvester = Harvester::new(&store, &config, &interrupt);
        let mut client = scripted(
            b"211 2 1 2 g\r\n\
              221 1 <one@x>\r\n\
              From: a@x.com\r\n\
              NNTP-Posting-Date: Thu, 1 Jan 2009 10:00:00 +0000\r\n\
              .\r\n\
              430 no such article\r\n",
        );

        let stats = harvester.run(&mut client).unwrap();
        assert_eq!(1, stats.fetched);
        assert_eq!(1, stats.skipped);
        assert!(!stats.interrupted);

        let cursor = cursors.get("g").unwrap();
        assert!(!cursor.has_more());
        assert_eq!(3, cursor.position());

        let messages = MessageStore::new(&store);
        let stored = messages.get("g-<one@x>").unwrap().unwrap();
        assert_eq!("a@x.com", stored.sender);
        assert_eq!(1, messages.len().unwrap());
    }

    #[test]
    fn articles_without_mandatory_headers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let config = config_with_group("g");
        CursorManager::new(&store).init_group("g", 1, 2).unwrap();

        let interrupt = AtomicBool::new(false);
        let harvester = Harvester::new(&store, &config, &interrupt);
        let mut client = scripted(
            b"211 2 1 2 g\r\n\
              221 1 <one@x>\r\n\
              NNTP-Posting-Date: Thu, 1 Jan 2009 10:00:00 +0000\r\n\
              .\r\n\
              221 2 <two@x>\r\n\
              From: b@x.com\r\n\
              NNTP-Posting-Date: the day before yesterday\r\n\
              .\r\n",
        );

        let stats = harvester.run(&mut client).unwrap();
        assert_eq!(0, stats.fetched);
        assert_eq!(2, stats.skipped);
        assert_eq!(0, MessageStore::new(&store).len().unwrap());
        assert!(!CursorManager::new(&store).get("g").unwrap().has_more());
    }

    #[test]
    fn interrupt_stops_before_the_next_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let config = config_with_group("g");
        CursorManager::new(&store).init_group("g", 1, 2).unwrap();

        let interrupt = AtomicBool::new(true);
        let harvester = Harvester::new(&store, &config, &interrupt);
        let mut client = scripted(b"");

        let stats = harvester.run(&mut client).unwrap();
        assert!(stats.interrupted);
        assert_eq!(0, stats.fetched);
        // Nothing was attempted, so the cursor still points at article 1.
        assert_eq!(1, CursorManager::new(&store).get("g").unwrap().position());
    }

    #[test]
    fn resumed_run_reinserts_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let config = config_with_group("g");
        let cursors = CursorManager::new(&store);
        cursors.init_group("g", 1, 2).unwrap();

        let transcript: &[u8] = b"211 2 1 2 g\r\n\
              221 1 <one@x>\r\n\
              From: a@x.com\r\n\
              NNTP-Posting-Date: Thu, 1 Jan 2009 10:00:00 +0000\r\n\
              .\r\n\
              221 2 <two@x>\r\n\
              From: b@x.com\r\n\
              NNTP-Posting-Date: Thu, 1 Jan 2009 11:00:00 +0000\r\n\
              .\r\n";

        let interrupt = AtomicBool::new(false);
        let harvester = Harvester::new(&store, &config, &interrupt);
        harvester.run(&mut scripted(transcript)).unwrap();

        // Simulate a re-selected group: the cursor rewinds and the same
        // articles come down again.
        cursors.init_group("g", 1, 2).unwrap();
        harvester.run(&mut scripted(transcript)).unwrap();

        assert_eq!(2, MessageStore::new(&store).len().unwrap());
    }
}
