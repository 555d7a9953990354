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

//! Outbound peer RPC clients, kept separate from `dsdb_grpc`'s server-side handlers so the
//! gossip worker and the dispatcher can depend on this crate without pulling in the server stack.

pub mod error;
pub mod gossip;
pub mod peer;

pub use error::{RpcClientError, RpcResult};
pub use gossip::GossipRpcClient;
pub use peer::PeerRpcClient;
