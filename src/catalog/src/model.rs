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

//! The table/column/partition model. `Partition` is an explicit sum type rather than a
//! subtyping hierarchy — exhaustive `match` is the canonical dispatch style here, and
//! `CatalogError::Unsupported` is what an unhandled strategy returns.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use dsdb_common::Type;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub is_primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: Type, is_primary_key: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            is_primary_key,
        }
    }
}

/// One named sub-range of a list-partitioned table: the set of column values it claims, and the
/// node-descriptor predicates ("region" = "eu") that restrict which peers may host it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSpec {
    pub values: BTreeSet<String>,
    pub constraints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Partition {
    None,
    List {
        column_name: String,
        partitions: IndexMap<String, PartitionSpec>,
    },
}

impl Default for Partition {
    fn default() -> Self {
        Partition::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub partition: Partition,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> CatalogResult<Self> {
        let pk_count = columns.iter().filter(|c| c.is_primary_key).count();
        if pk_count != 1 {
            return Err(CatalogError::InvalidArgument(format!(
                "table must have exactly one primary key column, found {pk_count}"
            )));
        }
        Ok(Self {
            name: name.into(),
            columns,
            partition: Partition::None,
        })
    }

    pub fn pk_column(&self) -> &Column {
        self.columns
            .iter()
            .find(|c| c.is_primary_key)
            .expect("Table::new enforces exactly one primary key column")
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Renders the column vector the way `SELECT * FROM system.tables` materializes its
    /// `columns` cell: `name:type[(PK)], ...`.
    pub fn columns_description(&self) -> String {
        self.columns
            .iter()
            .map(|c| {
                let ty = match c.ty {
                    Type::Int64 => "int",
                    Type::String => "str",
                };
                if c.is_primary_key {
                    format!("{}:{}(PK)", c.name, ty)
                } else {
                    format!("{}:{}", c.name, ty)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_requires_exactly_one_pk() {
        assert!(Table::new("t", vec![]).is_err());
        assert!(Table::new(
            "t",
            vec![
                Column::new("a", Type::Int64, true),
                Column::new("b", Type::Int64, true),
            ]
        )
        .is_err());
        assert!(Table::new(
            "t",
            vec![
                Column::new("a", Type::Int64, true),
                Column::new("b", Type::Int64, false),
            ]
        )
        .is_ok());
    }

    #[test]
    fn columns_description_format() {
        let table = Table::new(
            "users",
            vec![
                Column::new("id", Type::Int64, true),
                Column::new("name", Type::String, false),
            ],
        )
        .unwrap();
        assert_eq!(table.columns_description(), "id:int(PK), name:str");
    }
}
