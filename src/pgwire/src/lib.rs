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

//! The PostgreSQL wire protocol v3 simple-query subset: per-connection framing, the startup
//! handshake, and the accept loop that spawns one session per client.

pub mod error;
pub mod message;
pub mod server;
pub mod session;

pub use error::{ProtocolError, ProtocolResult};
pub use server::pgwire_serve;
pub use session::PgProtocol;
