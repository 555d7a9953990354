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

//! Classifies and routes parsed SQL statements across the catalog, the local KV store, and
//! peers, per the table's partitioning rules.

pub mod ddl;
pub mod dispatcher;
pub mod error;
pub mod literal;
pub mod peers;
pub mod result;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use result::{FieldDescriptor, QueryResult};
