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
pub enum ProtocolError {
    #[error("connection closed before a complete message was read")]
    UnexpectedEof,

    #[error("the first packet on a new connection must be an 8-byte SSL request")]
    NotAnSslRequest,

    #[error("unsupported startup protocol version {0:#x}")]
    UnsupportedProtocolVersion(i32),

    #[error("malformed startup message: {0}")]
    MalformedStartup(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

impl From<ProtocolError> for dsdb_common::Error {
    fn from(e: ProtocolError) -> Self {
        dsdb_common::Error::Protocol(e.to_string())
    }
}
