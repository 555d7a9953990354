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
pub enum TestScriptError {
    #[error("malformed test script at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("statement {sql:?} expected to succeed but failed: {source}")]
    StatementFailed {
        sql: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("query {sql:?} failed: {source}")]
    QueryFailed {
        sql: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("query {sql:?} column count mismatch: expected {expected}, got {actual}")]
    ColumnCountMismatch {
        sql: String,
        expected: usize,
        actual: usize,
    },

    #[error("query {sql:?} row count mismatch: expected {expected}, got {actual}")]
    RowCountMismatch {
        sql: String,
        expected: usize,
        actual: usize,
    },

    #[error("query {sql:?} row {row}, column {column:?}: expected {expected:?}, got {actual:?}")]
    CellMismatch {
        sql: String,
        row: usize,
        column: String,
        expected: String,
        actual: String,
    },
}

pub type TestScriptResult<T> = std::result::Result<T, TestScriptError>;
