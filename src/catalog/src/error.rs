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
pub enum CatalogError {
    #[error("table {0:?} already exists")]
    AlreadyExists(String),

    #[error("table {0:?} not found")]
    TableNotFound(String),

    #[error("partition {0:?} not found")]
    PartitionNotFound(String),

    #[error("{0}")]
    Unsupported(String),

    #[error(transparent)]
    Storage(#[from] dsdb_storage::StorageError),

    #[error("{0}")]
    InvalidArgument(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

impl From<CatalogError> for dsdb_common::Error {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::AlreadyExists(t) => dsdb_common::Error::AlreadyExists(t),
            CatalogError::TableNotFound(t) | CatalogError::PartitionNotFound(t) => {
                dsdb_common::Error::NotFound(t)
            }
            CatalogError::Unsupported(m) => dsdb_common::Error::Unsupported(m),
            CatalogError::Storage(e) => dsdb_common::Error::Storage(e.to_string()),
            CatalogError::InvalidArgument(m) => dsdb_common::Error::InvalidArgument(m),
        }
    }
}
