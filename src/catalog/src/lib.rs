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

//! The durable catalog: table/column/partition metadata, backed by the KV store through the two
//! `system.*` tables so that it survives a restart the same way user data does.

pub mod catalog;
pub mod error;
pub mod model;
pub mod system;

pub use catalog::{Catalog, PartitionStrategy};
pub use error::{CatalogError, CatalogResult};
pub use model::{Column, Partition, PartitionSpec, Table};
