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

//! The KV store adapter and the row-layout bijection on top of it.

pub mod error;
pub mod kv;
pub mod row;

pub use error::{StorageError, StorageResult};
pub use kv::{KvStore, MemKvStore, PrefixScanIter, SledKvStore};
pub use row::{encode_pk, row_key, row_prefix, table_prefix, RowLayout};
