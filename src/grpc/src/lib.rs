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

//! Server-side adaptors wrapping `dsdb_gossip::GossipStore` and `dsdb_dispatcher::Dispatcher`
//! in the `tonic`-generated service traits from `dsdb_pb`, plus the listener that serves them.

pub mod error;
pub mod gossip_service;
pub mod insert_service;
pub mod server;
pub mod update_service;

pub use error::dispatch_error_to_status;
pub use gossip_service::GossipServiceImpl;
pub use insert_service::InsertServiceImpl;
pub use server::grpc_serve;
pub use update_service::UpdateServiceImpl;
