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

//! The error kinds shared across every crate in the workspace. Each crate may define its own
//! narrower error enum (see e.g. `dsdb_storage::StorageError`) and convert it into this one with
//! `#[from]` at the boundary, so that the wire layer only ever needs to match on a single type.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A feature or operator is recognized but not implemented.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A table, partition, or key is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A table name collides with an existing one.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A malformed parse tree, bad column type, or unknown constraint shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The underlying KV store faulted.
    #[error("storage error: {0}")]
    Storage(String),

    /// A peer RPC failed; carries the offending address.
    #[error("dispatch error to {addr}: {source}")]
    Dispatch { addr: String, source: String },

    /// Wire-level framing or sequencing violation.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Unclassified internal fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(what: impl fmt::Display) -> Self {
        Error::NotFound(what.to_string())
    }

    pub fn invalid_argument(what: impl fmt::Display) -> Self {
        Error::InvalidArgument(what.to_string())
    }

    pub fn dispatch(addr: impl Into<String>, source: impl fmt::Display) -> Self {
        Error::Dispatch {
            addr: addr.into(),
            source: source.to_string(),
        }
    }
}
