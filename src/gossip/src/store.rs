// Copyright 2023 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The anti-entropy key/value map: last-writer-wins by timestamp, one mutex over the whole
//! entry map. `update` never performs I/O while holding the lock.

use std::collections::BTreeMap;

use dsdb_common::NodeDescriptor;
use dsdb_pb::{Entries, GossipEntry as PbGossipEntry};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::GossipResult;

pub const NODE_KEY_PREFIX: &str = "node:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GossipEntry {
    pub value: Vec<u8>,
    pub last_update: i64,
}

impl GossipEntry {
    pub fn new(value: Vec<u8>, last_update: i64) -> Self {
        Self { value, last_update }
    }
}

pub struct GossipStore {
    entries: Mutex<BTreeMap<String, GossipEntry>>,
}

impl Default for GossipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GossipStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<GossipEntry> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, entry: GossipEntry) {
        self.entries.lock().insert(key.into(), entry);
    }

    /// The core anti-entropy algorithm. For each peer entry, adopts it if newer or absent
    /// locally; ties keep the local copy. Anything local the peer didn't send back is reported
    /// as locally-newer regardless of its age, since the peer's silence on that key means it
    /// doesn't know about it at all.
    pub fn update(&self, peer_entries: &BTreeMap<String, GossipEntry>) -> BTreeMap<String, GossipEntry> {
        let mut newer = BTreeMap::new();
        let mut entries = self.entries.lock();

        for (key, pe) in peer_entries {
            match entries.get(key) {
                None => {
                    entries.insert(key.clone(), pe.clone());
                }
                Some(se) => {
                    if pe.last_update > se.last_update {
                        entries.insert(key.clone(), pe.clone());
                    } else if se.last_update > pe.last_update {
                        newer.insert(key.clone(), se.clone());
                    }
                    // Equal timestamps: keep the local entry, report nothing.
                }
            }
        }

        for (key, se) in entries.iter() {
            if !peer_entries.contains_key(key) {
                newer.insert(key.clone(), se.clone());
            }
        }

        newer
    }

    pub fn snapshot(&self) -> BTreeMap<String, GossipEntry> {
        self.entries.lock().clone()
    }

    /// Scans the `node:` keyspace, deserializes each value as a `NodeDescriptor`, and keeps only
    /// those matching every `(key, value)` pair in `constraints` (only `region` is recognized,
    /// same as the partition-constraint matcher in `dsdb_catalog`).
    pub fn get_nodes(
        &self,
        constraints: Option<&std::collections::BTreeMap<String, String>>,
    ) -> GossipResult<BTreeMap<Uuid, NodeDescriptor>> {
        let entries = self.entries.lock();
        let mut nodes = BTreeMap::new();
        for (key, entry) in entries.iter() {
            let Some(id_str) = key.strip_prefix(NODE_KEY_PREFIX) else {
                continue;
            };
            let Ok(id) = id_str.parse::<Uuid>() else {
                continue;
            };
            let descriptor = NodeDescriptor::from_json(&entry.value)
                .map_err(|e| crate::error::GossipError::MalformedDescriptor(key.clone(), e))?;
            if let Some(constraints) = constraints {
                if !descriptor.satisfies(constraints) {
                    continue;
                }
            }
            nodes.insert(id, descriptor);
        }
        Ok(nodes)
    }
}

/// Converts a local snapshot into the wire representation sent as an `Exchange` request/response.
pub fn to_proto_entries(entries: BTreeMap<String, GossipEntry>) -> Entries {
    Entries {
        entries: entries
            .into_iter()
            .map(|(k, v)| {
                (
                    k,
                    PbGossipEntry {
                        value: v.value,
                        last_update: v.last_update,
                    },
                )
            })
            .collect(),
    }
}

/// Inverse of [`to_proto_entries`].
pub fn from_proto_entries(entries: Entries) -> BTreeMap<String, GossipEntry> {
    entries
        .entries
        .into_iter()
        .map(|(k, v)| (k, GossipEntry::new(v.value, v.last_update)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_adopts_strictly_newer_peer_entries() {
        let store = GossipStore::new();
        store.insert("k", GossipEntry::new(b"old".to_vec(), 10));

        let mut peer = BTreeMap::new();
        peer.insert("k".to_string(), GossipEntry::new(b"new".to_vec(), 20));
        let newer = store.update(&peer);

        assert!(newer.is_empty());
        assert_eq!(store.get("k").unwrap().value, b"new");
    }

    #[test]
    fn update_reports_locally_newer_entries() {
        let store = GossipStore::new();
        store.insert("k", GossipEntry::new(b"local".to_vec(), 20));

        let mut peer = BTreeMap::new();
        peer.insert("k".to_string(), GossipEntry::new(b"stale".to_vec(), 10));
        let newer = store.update(&peer);

        assert_eq!(newer["k"].value, b"local");
        assert_eq!(store.get("k").unwrap().value, b"local");
    }

    #[test]
    fn update_tie_keeps_local_and_reports_nothing() {
        let store = GossipStore::new();
        store.insert("k", GossipEntry::new(b"local".to_vec(), 20));

        let mut peer = BTreeMap::new();
        peer.insert("k".to_string(), GossipEntry::new(b"peer".to_vec(), 20));
        let newer = store.update(&peer);

        assert!(newer.is_empty());
        assert_eq!(store.get("k").unwrap().value, b"local");
    }

    #[test]
    fn update_surfaces_local_only_keys() {
        let store = GossipStore::new();
        store.insert("only_local", GossipEntry::new(b"v".to_vec(), 5));
        let newer = store.update(&BTreeMap::new());
        assert_eq!(newer["only_local"].value, b"v");
    }

    #[test]
    fn bidirectional_exchange_converges() {
        let a = GossipStore::new();
        let b = GossipStore::new();
        a.insert("x", GossipEntry::new(b"a-x".to_vec(), 5));
        b.insert("y", GossipEntry::new(b"b-y".to_vec(), 7));

        let a_newer_for_b = b.update(&a.snapshot());
        let b_newer_for_a = a.update(&b.snapshot());
        a.update(&a_newer_for_b);
        b.update(&b_newer_for_a);

        assert_eq!(a.snapshot(), b.snapshot());
    }
}
