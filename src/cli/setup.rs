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

//! Interactive project setup: where to collect from, and which groups.
//!
//! Selecting a group is the one and only point where its cursor is
//! (re-)initialized; `collect` never touches the bounds afterwards, so an
//! already-selected group keeps its progress even when setup is re-run.

use std::io::{self, BufRead, Write};

use crate::collect::cursor::CursorManager;
use crate::nntp::client::NntpClient;
use crate::store::kv::Store;
use crate::support::error::Error;
use crate::support::project_config::{GroupBounds, ProjectConfig};

pub fn setup(store: &Store) -> Result<(), Error> {
    let mut config = ProjectConfig::load(store)?.unwrap_or_default();

    config.server = ask("server", &config.server)?;
    loop {
        let raw = ask("port", &config.port.to_string())?;
        match raw.parse() {
            Ok(port) => {
                config.port = port;
                break;
            },
            Err(..) => eprintln!("Not a port number: {}", raw),
        }
    }
    config.username = ask("username", &config.username)?;
    let password = rpassword::prompt_password_stderr(
        "password (empty keeps the current one): ",
    )?;
    if !password.is_empty() {
        config.password = password;
    }
    config.save(store)?;

    if config.groups.is_empty() {
        println!("No groups were selected for download yet");
    } else {
        println!("Groups selected for download from this server:");
        for (name, bounds) in &config.groups {
            println!(
                "  {} (number of messages: {})",
                name,
                bounds.article_count()
            );
        }
    }

    let mut client = NntpClient::connect(
        &config.server,
        config.port,
        &config.username,
        &config.password,
    )?;

    let mut available = config.groups.clone();
    let answer =
        ask("Fetch the full group list from the server? (yes or no)", "yes")?;
    if answer.eq_ignore_ascii_case("yes") {
        for info in client.list()? {
            println!(
                "{} (number of messages: {})",
                info.name,
                (info.last + 1).saturating_sub(info.first)
            );
            available.insert(
                info.name,
                GroupBounds {
                    first: info.first,
                    last: info.last,
                },
            );
        }
    }

    println!("Enter the group names to collect, finish with an empty line");
    let cursors = CursorManager::new(store);
    loop {
        let name = prompt("Enter group name: ")?;
        if name.is_empty() {
            break;
        }
        if config.groups.contains_key(&name) {
            println!("{} is already selected; keeping its progress", name);
            continue;
        }
        // Groups not in the cached listing are resolved directly against the
        // server, so skipping the listing still works.
        let bounds = match available.get(&name).copied() {
            Some(bounds) => bounds,
            None => match client.select_group(&name) {
                Ok(info) => GroupBounds {
                    first: info.first,
                    last: info.last,
                },
                Err(e) => {
                    eprintln!("Cannot select {}: {}", name, e);
                    continue;
                },
            },
        };
        cursors.init_group(&name, bounds.first, bounds.last)?;
        config.groups.insert(name, bounds);
        config.save(store)?;
    }
    client.quit();

    config.save(store)?;
    println!("Setup is completed.");
    Ok(())
}

fn ask(prompt_text: &str, default: &str) -> Result<String, Error> {
    let raw = prompt(&format!("{} (default: {}): ", prompt_text, default))?;
    Ok(if raw.is_empty() {
        default.to_owned()
    } else {
        raw
    })
}

fn prompt(prompt_text: &str) -> Result<String, Error> {
    print!("{}", prompt_text);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}
