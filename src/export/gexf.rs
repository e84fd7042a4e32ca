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

//! GEXF (Gephi) dynamic graph serialization.
//!
//! One `<node>` per actor carrying its activity window, one `<edge>` per
//! relation carrying the reply instant, graph-level start/end spanning the
//! whole dataset. Timestamps are RFC 3339.

use std::io::Write;

use chrono::{DateTime, FixedOffset, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::graph::build::Graph;
use crate::support::error::Error;

const XMLNS: &str = "http://www.gexf.net/1.2draft";
const CREATOR: &str = "Newsgraph Collector";

pub fn dump<W: Write>(
    out: W,
    graph: &Graph,
    project: &str,
) -> Result<(), Error> {
    let mut w = Writer::new_with_indent(out, b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut gexf = BytesStart::new("gexf");
    gexf.push_attribute(("xmlns", XMLNS));
    gexf.push_attribute(("version", "1.2"));
    w.write_event(Event::Start(gexf))?;

    let mut meta = BytesStart::new("meta");
    meta.push_attribute((
        "lastmodifieddate",
        Utc::now().to_rfc3339().as_str(),
    ));
    w.write_event(Event::Start(meta))?;
    w.write_event(Event::Start(BytesStart::new("creator")))?;
    w.write_event(Event::Text(BytesText::new(CREATOR)))?;
    w.write_event(Event::End(BytesEnd::new("creator")))?;
    w.write_event(Event::Start(BytesStart::new("description")))?;
    w.write_event(Event::Text(BytesText::new(project)))?;
    w.write_event(Event::End(BytesEnd::new("description")))?;
    w.write_event(Event::End(BytesEnd::new("meta")))?;

    let mut graph_el = BytesStart::new("graph");
    graph_el.push_attribute(("mode", "dynamic"));
    if let (Some(earliest), Some(latest)) = (graph.earliest(), graph.latest())
    {
        graph_el.push_attribute(("start", ts(earliest).as_str()));
        graph_el.push_attribute(("end", ts(latest).as_str()));
    }
    w.write_event(Event::Start(graph_el))?;

    w.write_event(Event::Start(BytesStart::new("nodes")))?;
    for actor in graph.actors() {
        let mut node = BytesStart::new("node");
        node.push_attribute(("id", actor.id.to_string().as_str()));
        node.push_attribute(("label", actor.email.as_str()));
        node.push_attribute(("start", ts(actor.first_seen).as_str()));
        node.push_attribute(("end", ts(actor.last_seen).as_str()));
        w.write_event(Event::Empty(node))?;
    }
    w.write_event(Event::End(BytesEnd::new("nodes")))?;

    w.write_event(Event::Start(BytesStart::new("edges")))?;
    for (i, relation) in graph.relations().enumerate() {
        let mut edge = BytesStart::new("edge");
        edge.push_attribute(("id", i.to_string().as_str()));
        edge.push_attribute(("source", relation.sender.to_string().as_str()));
        edge.push_attribute((
            "target",
            relation.recipient.to_string().as_str(),
        ));
        edge.push_attribute(("start", ts(relation.timestamp).as_str()));
        edge.push_attribute(("end", ts(relation.timestamp).as_str()));
        w.write_event(Event::Empty(edge))?;
    }
    w.write_event(Event::End(BytesEnd::new("edges")))?;

    w.write_event(Event::End(BytesEnd::new("graph")))?;
    w.write_event(Event::End(BytesEnd::new("gexf")))?;
    Ok(())
}

fn ts(t: DateTime<FixedOffset>) -> String {
    t.to_rfc3339()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::export::test_graphs;

    #[test]
    fn dumps_nodes_and_edges() {
        let (_dir, store) = test_graphs::reply_store();
        let mut engine = crate::graph::build::GraphEngine::new(&store);
        let mut out = Vec::new();
        dump(&mut out, engine.graph().unwrap(), "testproj").unwrap();
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.contains("<description>testproj</description>"));
        assert!(xml.contains(r#"<node id="1" label="a@x.com""#));
        assert!(xml.contains(r#"<node id="2" label="b@x.com""#));
        assert!(xml.contains(r#"<edge id="0" source="2" target="1""#));
        assert!(xml.contains(r#"mode="dynamic" start="#));
        assert!(xml.ends_with("</gexf>"));
    }

    #[test]
    fn tolerates_an_empty_graph() {
        let (_dir, store) = test_graphs::empty_store();
        let mut engine = crate::graph::build::GraphEngine::new(&store);
        let mut out = Vec::new();
        dump(&mut out, engine.graph().unwrap(), "testproj").unwrap();
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.contains(r#"<graph mode="dynamic">"#));
        assert!(!xml.contains("<node "));
        assert!(!xml.contains("<edge "));
    }
}
