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

//! The immutable descriptor every node publishes into the gossip store under `node:{id}`.
//! Field order here is the canonical JSON field order: `serde_json` serializes struct fields in
//! declaration order, so two nodes that independently construct an identical descriptor always
//! produce byte-identical JSON, which keeps `last_update` ties meaningful rather than masking
//! divergent bytes behind an arbitrary map ordering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub id: Uuid,
    pub sql_addr: String,
    pub grpc_addr: String,
    pub data_dir: String,
    pub region: Option<String>,
    pub seed_peer: Option<String>,
}

impl NodeDescriptor {
    pub fn gossip_key(id: Uuid) -> String {
        format!("node:{id}")
    }

    pub fn to_json(&self) -> Vec<u8> {
        // `serde_json` preserves struct field declaration order; this is the "canonical JSON"
        // the gossip value format relies on.
        serde_json::to_vec(self).expect("NodeDescriptor serializes infallibly")
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::InvalidArgument(format!("malformed node descriptor: {e}")))
    }

    /// Evaluates whether this descriptor satisfies a partition's constraint set. Currently only
    /// the `region` attribute is compared, per the spec.
    pub fn satisfies(&self, constraints: &std::collections::BTreeMap<String, String>) -> bool {
        constraints.iter().all(|(k, v)| match k.as_str() {
            "region" => self.region.as_deref() == Some(v.as_str()),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trips() {
        let desc = NodeDescriptor {
            id: Uuid::nil(),
            sql_addr: "127.0.0.1:5432".into(),
            grpc_addr: "127.0.0.1:6000".into(),
            data_dir: "/tmp/node".into(),
            region: Some("eu".into()),
            seed_peer: None,
        };
        let json = desc.to_json();
        assert_eq!(NodeDescriptor::from_json(&json).unwrap(), desc);
    }

    #[test]
    fn constraint_matching_is_region_only() {
        let desc = NodeDescriptor {
            id: Uuid::nil(),
            sql_addr: String::new(),
            grpc_addr: String::new(),
            data_dir: String::new(),
            region: Some("eu".into()),
            seed_peer: None,
        };
        let mut constraints = std::collections::BTreeMap::new();
        constraints.insert("region".to_string(), "eu".to_string());
        assert!(desc.satisfies(&constraints));

        constraints.insert("region".to_string(), "us".to_string());
        assert!(!desc.satisfies(&constraints));
    }
}
