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

//! Thin outbound wrapper over the generated `GossipServiceClient`. Deliberately stateless per
//! call — connections are not pooled, since a node only ever talks to a handful of peers per
//! gossip tick and `tonic::transport::Channel::connect` is cheap enough at this scale.

use dsdb_pb::gossip_service_client::GossipServiceClient;
use dsdb_pb::Entries;

use crate::error::{RpcClientError, RpcResult};

#[derive(Clone, Default)]
pub struct GossipRpcClient;

impl GossipRpcClient {
    pub fn new() -> Self {
        Self
    }

    /// Connects to `addr` (a bare `host:port`, turned into an `http://` endpoint) and issues a
    /// single `Exchange` call carrying the local snapshot.
    pub async fn exchange(&self, addr: &str, local_entries: Entries) -> RpcResult<Entries> {
        let endpoint = format!("http://{addr}");
        let mut client =
            GossipServiceClient::connect(endpoint)
                .await
                .map_err(|source| RpcClientError::Connect {
                    addr: addr.to_string(),
                    source,
                })?;
        let response = client
            .exchange(local_entries)
            .await
            .map_err(|status| RpcClientError::Call {
                addr: addr.to_string(),
                status,
            })?;
        Ok(response.into_inner())
    }
}
