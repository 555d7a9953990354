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
pub enum StorageError {
    #[error("kv store I/O fault: {0}")]
    Io(String),

    #[error("invalid row key or column name: {0}")]
    InvalidArgument(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl From<sled::Error> for StorageError {
    fn from(e: sled::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

impl From<StorageError> for dsdb_common::Error {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Io(msg) => dsdb_common::Error::Storage(msg),
            StorageError::InvalidArgument(msg) => dsdb_common::Error::InvalidArgument(msg),
        }
    }
}
