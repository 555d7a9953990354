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
pub enum GossipError {
    #[error("no peer available to gossip with")]
    NoPeerAvailable,

    #[error("malformed node descriptor for key {0:?}: {1}")]
    MalformedDescriptor(String, dsdb_common::Error),
}

pub type GossipResult<T> = std::result::Result<T, GossipError>;

impl From<GossipError> for dsdb_common::Error {
    fn from(e: GossipError) -> Self {
        dsdb_common::Error::Internal(e.to_string())
    }
}
