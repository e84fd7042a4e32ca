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

use log::info;

use crate::collect::harvest::{self, Harvester};
use crate::nntp::client::NntpClient;
use crate::store::kv::Store;
use crate::support::error::Error;
use crate::support::project_config::ProjectConfig;

pub fn collect(store: &Store) -> Result<(), Error> {
    let config =
        ProjectConfig::load(store)?.ok_or(Error::ProjectNotConfigured)?;
    if config.groups.is_empty() {
        info!("No groups selected; nothing to collect");
        return Ok(());
    }

    harvest::install_interrupt_handler()?;
    let mut client = NntpClient::connect(
        &config.server,
        config.port,
        &config.username,
        &config.password,
    )?;

    let harvester = Harvester::new(store, &config, &harvest::INTERRUPTED);
    let stats = harvester.run(&mut client)?;
    client.quit();

    info!(
        "Collected {} articles, skipped {}{}",
        stats.fetched,
        stats.skipped,
        if stats.interrupted {
            " (interrupted)"
        } else {
            ""
        }
    );
    Ok(())
}
