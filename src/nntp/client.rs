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

//! A minimal reader-mode NNTP client.
//!
//! **THIS IS NOT A GENERAL-PURPOSE NNTP CLIENT.** It speaks exactly the
//! subset the collector needs (`MODE READER`, `AUTHINFO`, `LIST`, `GROUP`,
//! `HEAD`, `QUIT`) and makes no attempt at pipelining, TLS, or the rest of
//! RFC 3977.
//!
//! The client is generic over its transport so tests can drive it with
//! canned transcripts.

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

use log::{debug, trace, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NntpError {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The server definitively rejected a command (failed authentication,
    /// unknown group, 5xx status). Fatal to the current operation.
    #[error("Server rejected command: {0}")]
    Rejected(String),
    /// The article is unavailable or malformed at the protocol layer. The
    /// caller skips it and moves on.
    #[error("Article unavailable: {0}")]
    Transient(String),
    /// Header bytes not representable in the expected encoding.
    #[error("Response contained non-ASCII header data")]
    Encoding,
    #[error("Malformed response line: {0:?}")]
    Malformed(String),
}

/// Name and article bounds of one group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupInfo {
    pub name: String,
    pub first: u64,
    pub last: u64,
}

pub struct NntpClient<R, W> {
    read: R,
    write: W,
}

impl NntpClient<BufReader<TcpStream>, TcpStream> {
    /// Open a TCP connection to `host:port`, switch to reader mode, and
    /// authenticate when `username` is non-empty.
    pub fn connect(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
    ) -> Result<Self, NntpError> {
        debug!("Connecting to NNTP server {}:{}", host, port);
        let write = TcpStream::connect((host, port))?;
        let read = BufReader::new(write.try_clone()?);
        let mut client = NntpClient { read, write };
        client.handshake(username, password)?;
        Ok(client)
    }
}

impl<R: BufRead, W: Write> NntpClient<R, W> {
    pub fn new(read: R, write: W) -> Self {
        NntpClient { read, write }
    }

    /// Consume the greeting, request reader mode, and authenticate.
    pub fn handshake(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(), NntpError> {
        let (code, line) = self.read_status()?;
        match code {
            200 | 201 => (),
            _ => return Err(NntpError::Rejected(line)),
        }
        // MODE READER is advisory; servers that don't know it answer 500 and
        // carry on fine.
        self.command("MODE READER")?;
        if !username.is_empty() {
            let (code, line) =
                self.command(&format!("AUTHINFO USER {}", username))?;
            match code {
                281 => (),
                381 => {
                    let (code, line) =
                        self.command(&format!("AUTHINFO PASS {}", password))?;
                    if code != 281 {
                        return Err(NntpError::Rejected(line));
                    }
                },
                _ => return Err(NntpError::Rejected(line)),
            }
        }
        Ok(())
    }

    /// `LIST`: every group the server carries, with its bounds.
    pub fn list(&mut self) -> Result<Vec<GroupInfo>, NntpError> {
        let (code, line) = self.command("LIST")?;
        if code != 215 {
            return Err(NntpError::Rejected(line));
        }
        let mut groups = Vec::new();
        for raw in self.read_multiline()? {
            let line = decode_ascii(raw)?;
            // "<name> <last> <first> <flags>"
            let mut fields = line.split_whitespace();
            let entry = match (fields.next(), fields.next(), fields.next()) {
                (Some(name), Some(last), Some(first)) => (name, last, first),
                _ => continue,
            };
            match (entry.2.parse(), entry.1.parse()) {
                (Ok(first), Ok(last)) => groups.push(GroupInfo {
                    name: entry.0.to_owned(),
                    first,
                    last,
                }),
                _ => warn!("Skipping malformed LIST entry: {}", line),
            }
        }
        Ok(groups)
    }

    /// `GROUP`: select `name` for subsequent article commands and report its
    /// current bounds.
    pub fn select_group(&mut self, name: &str) -> Result<GroupInfo, NntpError> {
        let (code, line) = self.command(&format!("GROUP {}", name))?;
        if code != 211 {
            return Err(NntpError::Rejected(line));
        }
        // "211 <count> <first> <last> <name>"
        let mut fields = line.split_whitespace().skip(2);
        let first = fields.next().and_then(|f| f.parse().ok());
        let last = fields.next().and_then(|f| f.parse().ok());
        match (first, last) {
            (Some(first), Some(last)) => Ok(GroupInfo {
                name: name.to_owned(),
                first,
                last,
            }),
            _ => Err(NntpError::Malformed(line)),
        }
    }

    /// `HEAD`: fetch the headers of article `seq` in the selected group.
    /// Returns the source message id and the raw header lines.
    pub fn head(&mut self, seq: u64) -> Result<(String, Vec<String>), NntpError> {
        let (code, line) = self.command(&format!("HEAD {}", seq))?;
        if (400..500).contains(&code) {
            return Err(NntpError::Transient(line));
        }
        if code != 221 {
            return Err(NntpError::Rejected(line));
        }
        // "221 <seq> <message-id>"
        let msgid = line
            .split_whitespace()
            .nth(2)
            .map(str::to_owned)
            .ok_or_else(|| NntpError::Malformed(line.clone()))?;
        // Drain the whole response before decoding anything so that an
        // encoding failure leaves the connection in sync.
        let raw = self.read_multiline()?;
        let mut headers = Vec::with_capacity(raw.len());
        for line in raw {
            headers.push(decode_ascii(line)?);
        }
        Ok((msgid, headers))
    }

    /// `QUIT`, ignoring errors: the server may well hang up first.
    pub fn quit(&mut self) {
        let _ = self.command("QUIT");
    }

    fn command(&mut self, cmd: &str) -> Result<(u16, String), NntpError> {
        trace!(">> {}", cmd);
        self.write.write_all(cmd.as_bytes())?;
        self.write.write_all(b"\r\n")?;
        self.write.flush()?;
        self.read_status()
    }

    fn read_status(&mut self) -> Result<(u16, String), NntpError> {
        let line = decode_ascii(self.read_line()?)?;
        trace!("<< {}", line);
        let code = line
            .get(..3)
            .and_then(|digits| digits.parse::<u16>().ok())
            .ok_or_else(|| NntpError::Malformed(line.clone()))?;
        Ok((code, line))
    }

    fn read_line(&mut self) -> Result<Vec<u8>, NntpError> {
        let mut buf = Vec::new();
        let nread = self.read.read_until(b'\n', &mut buf)?;
        if 0 == nread {
            return Err(NntpError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Connection closed by server",
            )));
        }
        while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(buf)
    }

    /// Read a dot-terminated multiline block, un-stuffing leading dots.
    fn read_multiline(&mut self) -> Result<Vec<Vec<u8>>, NntpError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line.as_slice() == b"." {
                break;
            }
            if line.starts_with(b"..") {
                lines.push(line[1..].to_vec());
            } else {
                lines.push(line);
            }
        }
        Ok(lines)
    }
}

fn decode_ascii(bytes: Vec<u8>) -> Result<String, NntpError> {
    if !bytes.is_ascii() {
        return Err(NntpError::Encoding);
    }
    String::from_utf8(bytes).map_err(|_| NntpError::Encoding)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    fn client(input: &[u8]) -> NntpClient<Cursor<Vec<u8>>, Vec<u8>> {
        NntpClient::new(Cursor::new(input.to_vec()), Vec::new())
    }

    fn sent(client: &NntpClient<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(client.write.clone()).unwrap()
    }

    #[test]
    fn handshake_without_auth() {
        let mut c = client(b"200 ok\r\n500 what?\r\n");
        c.handshake("", "").unwrap();
        assert_eq!("MODE READER\r\n", sent(&c));
    }

    #[test]
    fn handshake_with_auth() {
        let mut c = client(b"200 ok\r\n200 ok\r\n381 pass?\r\n281 welcome\r\n");
        c.handshake("alice", "sekrit").unwrap();
        assert_eq!(
            "MODE READER\r\nAUTHINFO USER alice\r\nAUTHINFO PASS sekrit\r\n",
            sent(&c)
        );
    }

    #[test]
    fn handshake_rejects_bad_credentials() {
        let mut c = client(b"200 ok\r\n200 ok\r\n381 pass?\r\n481 nope\r\n");
        assert_matches!(
            Err(NntpError::Rejected(..)),
            c.handshake("alice", "wrong")
        );
    }

    #[test]
    fn list_parses_groups() {
        let mut c = client(
            b"215 list follows\r\n\
              alt.test 462 7 y\r\n\
              comp.lang.misc 50 1 m\r\n\
              bogus entry\r\n\
              .\r\n",
        );
        let groups = c.list().unwrap();
        assert_eq!(
            vec![
                GroupInfo {
                    name: "alt.test".to_owned(),
                    first: 7,
                    last: 462,
                },
                GroupInfo {
                    name: "comp.lang.misc".to_owned(),
                    first: 1,
                    last: 50,
                },
            ],
            groups
        );
    }

    #[test]
    fn select_group_parses_bounds() {
        let mut c = client(b"211 456 100 555 alt.test\r\n");
        let info = c.select_group("alt.test").unwrap();
        assert_eq!(100, info.first);
        assert_eq!(555, info.last);
        assert_eq!("GROUP alt.test\r\n", sent(&c));
    }

    #[test]
    fn head_returns_id_and_unstuffed_lines() {
        let mut c = client(
            b"221 7 <msg@example.com>\r\n\
              From: a@x.com\r\n\
              ..leading dot\r\n\
              .\r\n",
        );
        let (msgid, lines) = c.head(7).unwrap();
        assert_eq!("<msg@example.com>", msgid);
        assert_eq!(
            vec!["From: a@x.com".to_owned(), ".leading dot".to_owned()],
            lines
        );
        assert_eq!("HEAD 7\r\n", sent(&c));
    }

    #[test]
    fn head_maps_4xx_to_transient() {
        let mut c = client(b"430 no such article\r\n");
        assert_matches!(Err(NntpError::Transient(..)), c.head(3));
    }

    #[test]
    fn head_flags_non_ascii_headers_after_draining() {
        let mut c = client(
            b"221 7 <msg@example.com>\r\n\
              From: caf\xe9@x.com\r\n\
              .\r\n\
              211 1 1 1 alt.test\r\n",
        );
        assert_matches!(Err(NntpError::Encoding), c.head(7));
        // The bad response was fully drained; the next command still works.
        c.select_group("alt.test").unwrap();
    }

    #[test]
    fn eof_is_an_io_error() {
        let mut c = client(b"");
        assert_matches!(Err(NntpError::Io(..)), c.head(1));
    }
}
