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

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsafe project name")]
    UnsafeName,
    #[error("Project has not been set up; run `setup` first")]
    ProjectNotConfigured,
    #[error("No cursor for group '{0}'; select it with `setup`")]
    UnknownGroup(String),
    #[error("Unparseable timestamp: {0:?}")]
    BadTimestamp(String),
    #[error("Undecodable store key: {0:?}")]
    CorruptKey(String),
    #[error(transparent)]
    Nntp(#[from] crate::nntp::client::NntpError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Cbor(#[from] serde_cbor::error::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Nix(#[from] nix::Error),
}
