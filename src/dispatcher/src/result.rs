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

//! The minimal columnar batch the wire layer needs: no Arrow, no chunked builders, just a
//! `Vec<Vec<Datum>>` and the per-column metadata `RowDescription` requires.

use dsdb_common::{Datum, Type};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: Type,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

/// The dispatcher's uniform return value: an empty batch for DDL/DML, or a populated one for
/// `SELECT`.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub fields: Vec<FieldDescriptor>,
    pub rows: Vec<Vec<Datum>>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True for DDL/DML (no fields, no rows) and for a `SELECT` that matched zero rows: the wire
    /// layer sends `EmptyQueryResponse` in both cases rather than a `RowDescription` carrying no
    /// `DataRow`s.
    pub fn is_empty_query(&self) -> bool {
        self.rows.is_empty()
    }
}
