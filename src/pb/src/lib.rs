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

//! Generated client/server stubs for the peer RPC surface (`Gossip.Exchange`, `Insert.Write`,
//! `Update.Apply`), straight out of `proto/dsdb.proto` via `tonic-build`. Nothing hand-written
//! belongs in this crate.

tonic::include_proto!("dsdb");
