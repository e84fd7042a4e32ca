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

//! The dump family of commands: open the target, drive the graph engine
//! with the right rebuild mode, hand over to a serializer.

use std::fs;
use std::io::{self, BufWriter, Write};

use crate::export;
use crate::graph::build::GraphEngine;
use crate::store::kv::Store;
use crate::support::error::Error;

pub fn flat(store: &Store, target: &str) -> Result<(), Error> {
    let mut out = open_target(target)?;
    export::flat::dump(&mut *out, store)?;
    out.flush()?;
    Ok(())
}

pub fn cco(store: &Store, target: &str) -> Result<(), Error> {
    let mut out = open_target(target)?;
    export::flat::dump_cco(&mut *out, store)?;
    out.flush()?;
    Ok(())
}

pub fn gexf(store: &Store, project: &str, target: &str) -> Result<(), Error> {
    let mut engine = GraphEngine::new(store);
    // GEXF always reflects the current message store.
    engine.reset();
    let mut out = open_target(target)?;
    export::gexf::dump(&mut *out, engine.graph()?, project)?;
    out.flush()?;
    Ok(())
}

pub fn fan(
    store: &Store,
    project: &str,
    target: &str,
    reuse: bool,
) -> Result<(), Error> {
    let mut engine = GraphEngine::new(store);
    if !reuse {
        engine.reset();
    }
    let mut out = open_target(target)?;
    export::fan::dump(&mut *out, engine.graph()?, project)?;
    out.flush()?;
    Ok(())
}

pub fn lax(
    store: &Store,
    project: &str,
    target: &str,
    reuse: bool,
) -> Result<(), Error> {
    let mut engine = GraphEngine::new(store);
    if !reuse {
        engine.reset();
    }
    let mut out = open_target(target)?;
    export::lax::dump(&mut *out, engine.graph()?, project)?;
    out.flush()?;
    Ok(())
}

fn open_target(target: &str) -> Result<Box<dyn Write>, Error> {
    if target == "-" {
        Ok(Box::new(io::stdout()))
    } else {
        Ok(Box::new(BufWriter::new(fs::File::create(target)?)))
    }
}
