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

//! The durable grouped key/value store backing one project.
//!
//! Records are grouped into named collections. Each collection is a
//! directory under the project root; each record is one CBOR file whose name
//! is the URL-safe-base64 encoding of its key (message ids contain `<`, `@`
//! and friends, which have no business in file names). Writes are staged in
//! `tmp/` and renamed into place, so a record is either fully present or
//! absent; an interrupted process never leaves a half-written record behind.
//!
//! Iteration is a plain directory scan: lazy, finite, restartable (each call
//! reflects the contents at that moment) and in no particular order.

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::support::error::Error;
use crate::support::file_ops::{self, IgnoreKinds};

pub struct Store {
    root: PathBuf,
    tmp: PathBuf,
}

impl Store {
    /// Open (creating if necessary) the store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Store, Error> {
        let root = root.as_ref().to_owned();
        let tmp = root.join("tmp");
        fs::create_dir_all(&tmp)?;
        Ok(Store { root, tmp })
    }

    /// Insert `value` under `key`, overwriting any prior record.
    pub fn put(
        &self,
        collection: &str,
        key: &str,
        value: &impl Serialize,
    ) -> Result<(), Error> {
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir)?;
        let data = serde_cbor::to_vec(value)?;
        file_ops::spit(&self.tmp, dir.join(encode_key(key)), true, 0o600, &data)?;
        Ok(())
    }

    /// Point lookup of `key`, `None` if absent.
    pub fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<T>, Error> {
        match fs::read(self.collection_dir(collection).join(encode_key(key))) {
            Ok(data) => Ok(Some(serde_cbor::from_slice(&data)?)),
            Err(e) if io::ErrorKind::NotFound == e.kind() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Lazily iterate every record in `collection`. A collection that was
    /// never written to iterates as empty.
    pub fn iter<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Collection<T>, Error> {
        let entries = match fs::read_dir(self.collection_dir(collection)) {
            Ok(rd) => Some(rd),
            Err(e) if io::ErrorKind::NotFound == e.kind() => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Collection {
            entries,
            _record: PhantomData,
        })
    }

    /// Number of records in `collection`, without decoding any of them.
    pub fn len(&self, collection: &str) -> Result<usize, Error> {
        let entries = match fs::read_dir(self.collection_dir(collection)) {
            Ok(rd) => rd,
            Err(e) if io::ErrorKind::NotFound == e.kind() => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut n = 0;
        for entry in entries {
            entry?;
            n += 1;
        }
        Ok(n)
    }

    /// Remove `collection` and everything in it.
    pub fn delete_collection(&self, collection: &str) -> Result<(), Error> {
        fs::remove_dir_all(self.collection_dir(collection)).ignore_not_found()?;
        Ok(())
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }
}

/// Lazy scan over one collection's records.
pub struct Collection<T> {
    entries: Option<fs::ReadDir>,
    _record: PhantomData<T>,
}

impl<T: DeserializeOwned> Iterator for Collection<T> {
    type Item = Result<(String, T), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.entries.as_mut()?.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e.into())),
        };

        let name = entry.file_name();
        let key = match decode_key(&name.to_string_lossy()) {
            Ok(key) => key,
            Err(e) => return Some(Err(e)),
        };
        let value = fs::read(entry.path())
            .map_err(Error::from)
            .and_then(|data| serde_cbor::from_slice(&data).map_err(Error::from));
        match value {
            Ok(value) => Some(Ok((key, value))),
            Err(e) => Some(Err(e)),
        }
    }
}

fn encode_key(key: &str) -> String {
    base64::encode_config(key, base64::URL_SAFE_NO_PAD)
}

fn decode_key(name: &str) -> Result<String, Error> {
    let bytes = base64::decode_config(name, base64::URL_SAFE_NO_PAD)
        .map_err(|_| Error::CorruptKey(name.to_owned()))?;
    String::from_utf8(bytes).map_err(|_| Error::CorruptKey(name.to_owned()))
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn open_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("proj")).unwrap();
        (dir, store)
    }

    #[test]
    fn put_get_roundtrip() {
        let (_dir, store) = open_store();
        store.put("things", "a-key", &42u32).unwrap();
        assert_eq!(Some(42u32), store.get("things", "a-key").unwrap());
        assert_eq!(None, store.get::<u32>("things", "missing").unwrap());
    }

    #[test]
    fn put_overwrites_in_place() {
        let (_dir, store) = open_store();
        store.put("things", "k", &1u32).unwrap();
        store.put("things", "k", &2u32).unwrap();
        assert_eq!(Some(2u32), store.get("things", "k").unwrap());
        assert_eq!(1, store.len("things").unwrap());
    }

    #[test]
    fn iteration_reflects_current_contents() {
        let (_dir, store) = open_store();
        assert_eq!(0, store.iter::<u32>("things").unwrap().count());

        store.put("things", "a", &1u32).unwrap();
        store.put("things", "b", &2u32).unwrap();
        let mut seen = store
            .iter::<u32>("things")
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        seen.sort();
        assert_eq!(
            vec![("a".to_owned(), 1), ("b".to_owned(), 2)],
            seen
        );
    }

    #[test]
    fn delete_collection_is_total_and_idempotent() {
        let (_dir, store) = open_store();
        store.put("things", "a", &1u32).unwrap();
        store.delete_collection("things").unwrap();
        assert_eq!(0, store.len("things").unwrap());
        store.delete_collection("things").unwrap();
    }

    #[test]
    fn keys_with_hostile_characters() {
        let (_dir, store) = open_store();
        let key = "alt.fan-group-<weird/../id@host>";
        store.put("things", key, &7u32).unwrap();
        assert_eq!(Some(7u32), store.get("things", key).unwrap());
        let (seen_key, _) = store
            .iter::<u32>("things")
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(key, seen_key);
    }

    proptest! {
        #[test]
        fn key_encoding_roundtrip(key in "\\PC{1,64}") {
            prop_assert_eq!(decode_key(&encode_key(&key)).unwrap(), key);
        }
    }
}
