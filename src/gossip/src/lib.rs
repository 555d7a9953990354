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

//! The gossip membership/epidemic state store: an anti-entropy key/value map exchanged pairwise
//! with peers, plus the worker loop that drives the exchange.

pub mod error;
pub mod store;
pub mod worker;

pub use error::{GossipError, GossipResult};
pub use store::{from_proto_entries, to_proto_entries, GossipEntry, GossipStore, NODE_KEY_PREFIX};
pub use worker::{publish_self, GossipWorker};
