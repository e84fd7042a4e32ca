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

//! The lax XML actor/act serialization.
//!
//! Unlike GEXF this format carries every act, not just resolved relations:
//! an originating act is a `call`, a reply references its parent act by id,
//! and times are unix seconds.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::graph::build::Graph;
use crate::graph::model::ActKind;
use crate::support::error::Error;

pub fn dump<W: Write>(
    out: W,
    graph: &Graph,
    project: &str,
) -> Result<(), Error> {
    let mut w = Writer::new_with_indent(out, b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(BytesStart::new("lax")))?;

    w.write_event(Event::Start(BytesStart::new("meta")))?;
    w.write_event(Event::Start(BytesStart::new("name")))?;
    w.write_event(Event::Text(BytesText::new(project)))?;
    w.write_event(Event::End(BytesEnd::new("name")))?;
    w.write_event(Event::End(BytesEnd::new("meta")))?;

    w.write_event(Event::Start(BytesStart::new("actors")))?;
    for actor in graph.actors() {
        let mut el = BytesStart::new("actor");
        el.push_attribute(("id", actor.id.to_string().as_str()));
        el.push_attribute(("name", actor.email.as_str()));
        w.write_event(Event::Empty(el))?;
    }
    w.write_event(Event::End(BytesEnd::new("actors")))?;

    w.write_event(Event::Start(BytesStart::new("actions")))?;
    for act in graph.acts() {
        let mut el = BytesStart::new("act");
        let kind = match act.kind {
            ActKind::Originating => "call",
            ActKind::Reply { .. } => "reply",
        };
        el.push_attribute(("type", kind));
        el.push_attribute(("id", act.id.to_string().as_str()));
        el.push_attribute(("src", act.sender.to_string().as_str()));
        if let Some(parent) = act.parent() {
            el.push_attribute(("reference", parent.to_string().as_str()));
        }
        el.push_attribute((
            "time",
            act.timestamp.timestamp().to_string().as_str(),
        ));
        w.write_event(Event::Empty(el))?;
    }
    w.write_event(Event::End(BytesEnd::new("actions")))?;

    w.write_event(Event::End(BytesEnd::new("lax")))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::export::test_graphs;

    #[test]
    fn dumps_calls_and_replies() {
        let (_dir, store) = test_graphs::reply_store();
        let mut engine = crate::graph::build::GraphEngine::new(&store);
        let mut out = Vec::new();
        dump(&mut out, engine.graph().unwrap(), "testproj").unwrap();
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.contains("<name>testproj</name>"));
        assert!(xml.contains(r#"<actor id="1" name="a@x.com"/>"#));
        assert!(xml.contains(r#"<act type="call" id="1" src="1""#));
        assert!(xml.contains(
            r#"<act type="reply" id="2" src="2" reference="1""#
        ));
    }

    #[test]
    fn tolerates_an_empty_graph() {
        let (_dir, store) = test_graphs::empty_store();
        let mut engine = crate::graph::build::GraphEngine::new(&store);
        let mut out = Vec::new();
        dump(&mut out, engine.graph().unwrap(), "testproj").unwrap();
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.contains("<actors>"));
        assert!(xml.contains("<actions>"));
        assert!(!xml.contains("<act "));
    }
}
