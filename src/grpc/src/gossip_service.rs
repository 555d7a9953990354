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

use std::sync::Arc;

use dsdb_gossip::GossipStore;
use dsdb_pb::gossip_service_server::GossipService;
use dsdb_pb::Entries;
use tonic::{Request, Response, Status};

/// Serves the passive side of the anti-entropy exchange: merges the caller's entries into the
/// local store and hands back whatever the caller is missing.
pub struct GossipServiceImpl {
    store: Arc<GossipStore>,
}

impl GossipServiceImpl {
    pub fn new(store: Arc<GossipStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl GossipService for GossipServiceImpl {
    async fn exchange(&self, request: Request<Entries>) -> Result<Response<Entries>, Status> {
        let peer_entries = dsdb_gossip::from_proto_entries(request.into_inner());
        let newer = self.store.update(&peer_entries);
        Ok(Response::new(dsdb_gossip::to_proto_entries(newer)))
    }
}
