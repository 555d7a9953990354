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

//! Drives a parsed test script against a live node over a real `tokio_postgres::Client`, the
//! same wire protocol an end user's `psql` would speak to it.

use tokio_postgres::{Client, SimpleQueryMessage};

use crate::error::{TestScriptError, TestScriptResult};
use crate::Record;

/// Executes every record in `script` against `client` in order, stopping at the first
/// expectation violation.
///
/// Statements and queries alike go out over `simple_query`/`batch_execute`, which speak the
/// simple query protocol (a single `Q` message) rather than `query`'s `Parse`/`Bind`/`Execute`
/// sequence — the only protocol subset the wire session implements.
pub async fn run_script(client: &Client, script: &str) -> TestScriptResult<()> {
    for record in crate::parse(script)? {
        match record {
            Record::StatementOk { sql } => {
                client
                    .batch_execute(&sql)
                    .await
                    .map_err(|source| TestScriptError::StatementFailed { sql, source })?;
            }
            Record::Query {
                type_chars,
                sql,
                header,
                rows: expected_rows,
            } => run_query(client, &sql, &type_chars, &header, &expected_rows).await?,
        }
    }
    Ok(())
}

async fn run_query(
    client: &Client,
    sql: &str,
    type_chars: &str,
    header: &[String],
    expected_rows: &[Vec<String>],
) -> TestScriptResult<()> {
    let messages =
        client
            .simple_query(sql)
            .await
            .map_err(|source| TestScriptError::QueryFailed {
                sql: sql.to_string(),
                source,
            })?;

    let rows: Vec<_> = messages
        .into_iter()
        .filter_map(|message| match message {
            SimpleQueryMessage::Row(row) => Some(row),
            _ => None,
        })
        .collect();

    if rows.len() != expected_rows.len() {
        return Err(TestScriptError::RowCountMismatch {
            sql: sql.to_string(),
            expected: expected_rows.len(),
            actual: rows.len(),
        });
    }

    for (row_idx, (row, expected_row)) in rows.iter().zip(expected_rows).enumerate() {
        let actual_columns = row.len();
        if actual_columns != header.len() || actual_columns != type_chars.len() {
            return Err(TestScriptError::ColumnCountMismatch {
                sql: sql.to_string(),
                expected: header.len(),
                actual: actual_columns,
            });
        }
        for (col_idx, (column_name, expected_cell)) in header.iter().zip(expected_row).enumerate()
        {
            let actual_cell = cell_as_text(row, col_idx);
            if &actual_cell != expected_cell {
                return Err(TestScriptError::CellMismatch {
                    sql: sql.to_string(),
                    row: row_idx,
                    column: column_name.clone(),
                    expected: expected_cell.clone(),
                    actual: actual_cell,
                });
            }
        }
    }
    Ok(())
}

/// Every cell in a simple-query result is already text on the wire; empty string stands in for
/// SQL NULL, which this system's row-storage layer never produces.
fn cell_as_text(row: &tokio_postgres::SimpleQueryRow, idx: usize) -> String {
    row.get(idx).unwrap_or_default().to_string()
}
