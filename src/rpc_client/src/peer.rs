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

//! Outbound `Insert.Write`/`Update.Apply` calls used by the dispatcher when forwarding a
//! statement to a peer that should materialize it.

use dsdb_pb::insert_service_client::InsertServiceClient;
use dsdb_pb::update_service_client::UpdateServiceClient;
use dsdb_pb::{RawUpdateStmt, Row};

use crate::error::{RpcClientError, RpcResult};

#[derive(Clone, Default)]
pub struct PeerRpcClient;

impl PeerRpcClient {
    pub fn new() -> Self {
        Self
    }

    pub async fn write(&self, addr: &str, row: Row) -> RpcResult<()> {
        let endpoint = format!("http://{addr}");
        let mut client =
            InsertServiceClient::connect(endpoint)
                .await
                .map_err(|source| RpcClientError::Connect {
                    addr: addr.to_string(),
                    source,
                })?;
        client
            .write(row)
            .await
            .map_err(|status| RpcClientError::Call {
                addr: addr.to_string(),
                status,
            })?;
        Ok(())
    }

    pub async fn apply(&self, addr: &str, statement_json: String) -> RpcResult<()> {
        let endpoint = format!("http://{addr}");
        let mut client =
            UpdateServiceClient::connect(endpoint)
                .await
                .map_err(|source| RpcClientError::Connect {
                    addr: addr.to_string(),
                    source,
                })?;
        client
            .apply(RawUpdateStmt { statement_json })
            .await
            .map_err(|status| RpcClientError::Call {
                addr: addr.to_string(),
                status,
            })?;
        Ok(())
    }
}
