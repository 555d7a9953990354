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

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Catalog(#[from] dsdb_catalog::CatalogError),

    #[error(transparent)]
    Storage(#[from] dsdb_storage::StorageError),

    #[error(transparent)]
    Gossip(#[from] dsdb_gossip::GossipError),

    #[error("failed to parse statement: {0}")]
    Parse(String),

    #[error("no eligible peer for this row")]
    NoEligiblePeer,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("dispatch to peer {addr} failed: {source}")]
    Peer {
        addr: String,
        #[source]
        source: dsdb_rpc_client::RpcClientError,
    },
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

impl From<DispatchError> for dsdb_common::Error {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Catalog(e) => e.into(),
            DispatchError::Storage(e) => dsdb_common::Error::Storage(e.to_string()),
            DispatchError::Gossip(e) => e.into(),
            DispatchError::Parse(m) => dsdb_common::Error::InvalidArgument(m),
            DispatchError::NoEligiblePeer => {
                dsdb_common::Error::NotFound("no eligible peer".to_string())
            }
            DispatchError::NotFound(m) => dsdb_common::Error::NotFound(m),
            DispatchError::Unsupported(m) => dsdb_common::Error::Unsupported(m),
            DispatchError::InvalidArgument(m) => dsdb_common::Error::InvalidArgument(m),
            DispatchError::Peer { addr, source } => dsdb_common::Error::dispatch(addr, source),
        }
    }
}
