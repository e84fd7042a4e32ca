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

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use structopt::StructOpt;

use crate::collect::cursor::CursorManager;
use crate::store::kv::Store;
use crate::store::messages::MessageStore;
use crate::support::error::Error;
use crate::support::project_config::ProjectConfig;
use crate::support::safe_name::is_safe_name;
use crate::support::sysexits::*;

#[derive(StructOpt)]
#[structopt(name = "newsgraph", max_term_width = 80)]
struct Args {
    /// Verbose mode, print debug messages (can use multiple times).
    #[structopt(short = "v", parse(from_occurrences), global = true)]
    verbose: u64,

    /// The directory holding all project workspaces
    /// [default: ~/.newsgraph]
    #[structopt(long, parse(from_os_str), global = true)]
    root: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Summarize a project's settings and collection progress.
    Summarize(ProjectOptions),
    /// Interactively configure what to collect and from where.
    Setup(ProjectOptions),
    /// Start or continue collecting from where the last run left off.
    Collect(ProjectOptions),
    /// Remove a project from the workspace.
    Delete(ProjectOptions),
    /// Dump collected messages as plain text.
    Dump(DumpOptions),
    /// Dump collected messages in cco JSON format.
    Dumpcco(DumpOptions),
    /// Dump the communication graph in Gephi GEXF format.
    Dumpgexf(DumpOptions),
    /// Dump the communication graph in Fantom network serialization format.
    Dumpfan(ReusableDumpOptions),
    /// Dump the communication graph in lax XML serialization format.
    Dumplax(ReusableDumpOptions),
}

#[derive(StructOpt)]
struct ProjectOptions {
    /// Name of the project to operate on.
    project: String,
}

#[derive(StructOpt)]
struct DumpOptions {
    #[structopt(flatten)]
    common: ProjectOptions,

    /// Output file, or "-" for standard output.
    target: String,
}

#[derive(StructOpt)]
struct ReusableDumpOptions {
    #[structopt(flatten)]
    common: DumpOptions,

    /// Reuse the graph built by a previous run instead of rebuilding it
    /// from the collected messages.
    #[structopt(short = "r")]
    reuse: bool,
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more
    // concise API
    let args = Args::from_clap(&match Args::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        }
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        }
    });

    crate::init_simple_log(args.verbose);

    let root = args.root.unwrap_or_else(default_root);
    if let Err(e) = run(&root, args.command) {
        eprintln!("{}", e);
        exit_code_for(&e).exit()
    }
}

fn run(root: &Path, command: Command) -> Result<(), Error> {
    match command {
        Command::Summarize(opts) => {
            summarize(&open_project(root, &opts.project)?)
        },
        Command::Setup(opts) => {
            super::setup::setup(&open_project(root, &opts.project)?)
        },
        Command::Collect(opts) => {
            super::collect::collect(&open_project(root, &opts.project)?)
        },
        Command::Delete(opts) => delete(root, &opts.project),
        Command::Dump(opts) => super::dump::flat(
            &open_project(root, &opts.common.project)?,
            &opts.target,
        ),
        Command::Dumpcco(opts) => super::dump::cco(
            &open_project(root, &opts.common.project)?,
            &opts.target,
        ),
        Command::Dumpgexf(opts) => super::dump::gexf(
            &open_project(root, &opts.common.project)?,
            &opts.common.project,
            &opts.target,
        ),
        Command::Dumpfan(opts) => super::dump::fan(
            &open_project(root, &opts.common.common.project)?,
            &opts.common.common.project,
            &opts.common.target,
            opts.reuse,
        ),
        Command::Dumplax(opts) => super::dump::lax(
            &open_project(root, &opts.common.common.project)?,
            &opts.common.common.project,
            &opts.common.target,
            opts.reuse,
        ),
    }
}

fn open_project(root: &Path, project: &str) -> Result<Store, Error> {
    if !is_safe_name(project) {
        return Err(Error::UnsafeName);
    }
    Store::open(root.join(project))
}

fn default_root() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".newsgraph"),
        None => {
            eprintln!("HOME is not set; pass --root");
            EX_CONFIG.exit()
        },
    }
}

fn exit_code_for(e: &Error) -> Sysexit {
    match e {
        Error::ProjectNotConfigured
        | Error::UnsafeName
        | Error::UnknownGroup(..) => EX_CONFIG,
        Error::Nntp(..) => EX_UNAVAILABLE,
        Error::Io(..) => EX_IOERR,
        _ => EX_DATAERR,
    }
}

fn summarize(store: &Store) -> Result<(), Error> {
    let config =
        ProjectConfig::load(store)?.ok_or(Error::ProjectNotConfigured)?;

    println!("server : {}", config.server);
    println!("port : {}", config.port);
    println!("username : {}", config.username);
    println!(
        "password : {}",
        if config.password.is_empty() {
            "(none)"
        } else {
            "*HIDDEN*"
        }
    );

    let cursors = CursorManager::new(store);
    println!("{} groups selected", config.groups.len());
    for (name, bounds) in &config.groups {
        match cursors.get(name) {
            Ok(cursor) => println!(
                "  {} ({} messages, next article {} of {})",
                name,
                bounds.article_count(),
                cursor.position(),
                cursor.last
            ),
            Err(..) => println!("  {} (no cursor; re-run setup)", name),
        }
    }

    println!(
        "{} messages collected",
        MessageStore::new(store).len()?
    );
    Ok(())
}

fn delete(root: &Path, project: &str) -> Result<(), Error> {
    if !is_safe_name(project) {
        return Err(Error::UnsafeName);
    }
    let dir = root.join(project);
    if !dir.is_dir() {
        return Err(Error::ProjectNotConfigured);
    }

    print!("Really delete project '{}'? (yes or no): ", project);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    if answer.trim().eq_ignore_ascii_case("yes") {
        fs::remove_dir_all(&dir)?;
        println!("Deleted {}", dir.display());
    } else {
        println!("Not deleted");
    }
    Ok(())
}
