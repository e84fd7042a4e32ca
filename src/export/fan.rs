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

//! The declarative actor/relation network listing consumed by the Fantom
//! analysis tooling.

use std::io::Write;

use crate::graph::build::Graph;
use crate::support::error::Error;

pub fn dump<W: Write>(
    mut out: W,
    graph: &Graph,
    project: &str,
) -> Result<(), Error> {
    writeln!(out, "using lavi")?;
    writeln!(out, "using sys")?;
    writeln!(out, "Network {{")?;
    writeln!(out, "    name=\"{}\"", project)?;
    writeln!(
        out,
        "    meta=[\"creator\":\"Newsgraph\", \
         \"description\":\"A simple static network\"]"
    )?;

    writeln!(out, "    actors=[")?;
    for actor in graph.actors() {
        // The format quotes names with double quotes and has no escape
        // syntax, so drop any embedded quotes.
        writeln!(
            out,
            "        Actor{{id={}; name=\"{}\"}},",
            actor.id,
            actor.email.replace('"', "")
        )?;
    }
    writeln!(out, "    ]")?;

    writeln!(out, "    relations=[")?;
    for relation in graph.relations() {
        writeln!(
            out,
            "        Relation{{actors=[{},{}];src={};\
             startTstamp=DateTime(\"{}\")}},",
            relation.sender,
            relation.recipient,
            relation.sender,
            relation.timestamp.to_rfc3339()
        )?;
    }
    writeln!(out, "    ]")?;
    writeln!(out, "}}")?;
    Ok(())
}
