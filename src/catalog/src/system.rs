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

//! `system.tables` and `system.partitions`: the two catalog-durability tables, plus the JSON
//! encode/decode helpers isolated here so a future binary format would only touch this file.

use std::collections::{BTreeMap, BTreeSet};

use dsdb_common::Type;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Column, Table};

pub const SYSTEM_TABLES: &str = "system.tables";
pub const SYSTEM_PARTITIONS: &str = "system.partitions";

pub fn system_tables_schema() -> Table {
    Table::new(
        SYSTEM_TABLES,
        vec![
            Column::new("table_name", Type::String, true),
            Column::new("columns", Type::String, false),
        ],
    )
    .expect("system.tables schema is well-formed")
}

pub fn system_partitions_schema() -> Table {
    Table::new(
        SYSTEM_PARTITIONS,
        vec![
            Column::new("table_name", Type::String, false),
            Column::new("partition_name", Type::String, true),
            Column::new("constraint", Type::String, false),
            Column::new("column_name", Type::String, false),
            Column::new("partition_value", Type::String, false),
        ],
    )
    .expect("system.partitions schema is well-formed")
}

pub fn columns_to_json(columns: &[Column]) -> String {
    serde_json::to_string(columns).expect("Vec<Column> serializes infallibly")
}

pub fn json_to_columns(json: &str) -> CatalogResult<Vec<Column>> {
    serde_json::from_str(json)
        .map_err(|e| CatalogError::InvalidArgument(format!("malformed columns JSON: {e}")))
}

pub fn constraints_to_json(constraints: &BTreeMap<String, String>) -> String {
    serde_json::to_string(constraints).expect("constraint map serializes infallibly")
}

pub fn json_to_constraints(json: &str) -> CatalogResult<BTreeMap<String, String>> {
    serde_json::from_str(json)
        .map_err(|e| CatalogError::InvalidArgument(format!("malformed constraint JSON: {e}")))
}

pub fn values_to_json(values: &BTreeSet<String>) -> String {
    serde_json::to_string(values).expect("value set serializes infallibly")
}

pub fn json_to_values(json: &str) -> CatalogResult<BTreeSet<String>> {
    serde_json::from_str(json)
        .map_err(|e| CatalogError::InvalidArgument(format!("malformed partition values JSON: {e}")))
}
