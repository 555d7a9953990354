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

//! The consumer-facing test-file format this system's test suite is written in: `statement ok`
//! blocks that must succeed, and `query <type-chars>` blocks whose header and rows must match a
//! literal expected table. Grounded on the shape of the teacher's `.slt` scripts
//! (`tests/simulation/src/slt.rs`) but parsed and executed directly against a live node over
//! `tokio-postgres`, rather than through the full `sqllogictest` runner machinery the teacher
//! pulls in for a much larger SQL surface.

pub mod error;
pub mod runner;

pub use error::{TestScriptError, TestScriptResult};
pub use runner::run_script;

/// One directive parsed out of a test script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// `statement ok` — the following SQL statement must execute without error.
    StatementOk { sql: String },
    /// `query <type-chars>` — the following SQL statement is a query; its result must match the
    /// header and rows given after the `----` separator.
    Query {
        type_chars: String,
        sql: String,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// Parses the literal test-file format described in the external-interfaces section: each
/// directive is a `statement ok` or `query <type-chars>` line, the SQL statement(s) up to the
/// next blank line or `----` separator, and — for `query` — the expected tabular output.
pub fn parse(script: &str) -> TestScriptResult<Vec<Record>> {
    let lines: Vec<&str> = script.lines().collect();
    let mut records = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() || line.starts_with('#') {
            i += 1;
            continue;
        }

        if line == "statement ok" {
            i += 1;
            let (sql, next) = collect_sql(&lines, i)?;
            records.push(Record::StatementOk { sql });
            i = next;
            continue;
        }

        if let Some(type_chars) = line.strip_prefix("query ") {
            let type_chars = type_chars.trim().to_string();
            i += 1;
            let (sql, next) = collect_sql(&lines, i)?;
            i = next;

            if i >= lines.len() || lines[i].trim() != "----" {
                return Err(TestScriptError::Parse {
                    line: i + 1,
                    message: "expected `----` separator after a `query` statement".to_string(),
                });
            }
            i += 1;

            let mut table = Vec::new();
            while i < lines.len() && !lines[i].trim().is_empty() {
                table.push(
                    lines[i]
                        .split_whitespace()
                        .map(str::to_string)
                        .collect::<Vec<_>>(),
                );
                i += 1;
            }
            let Some((header, rows)) = table.split_first() else {
                return Err(TestScriptError::Parse {
                    line: i + 1,
                    message: "expected a header line after `----`".to_string(),
                });
            };

            records.push(Record::Query {
                type_chars,
                sql,
                header: header.clone(),
                rows: rows.to_vec(),
            });
            continue;
        }

        return Err(TestScriptError::Parse {
            line: i + 1,
            message: format!("unrecognized directive {line:?}"),
        });
    }

    Ok(records)
}

/// Collects the SQL statement starting at `lines[start]`: every non-blank line up to (but not
/// including) the terminating `;`, joined with spaces. Returns the statement text and the index
/// of the line following it.
fn collect_sql(lines: &[&str], start: usize) -> TestScriptResult<(String, usize)> {
    let mut sql = String::new();
    let mut i = start;
    loop {
        let Some(line) = lines.get(i) else {
            return Err(TestScriptError::Parse {
                line: i + 1,
                message: "unterminated SQL statement (missing trailing `;`)".to_string(),
            });
        };
        if !sql.is_empty() {
            sql.push(' ');
        }
        sql.push_str(line.trim());
        i += 1;
        if line.trim_end().ends_with(';') {
            break;
        }
    }
    Ok((sql, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_statement_ok() {
        let script = "statement ok\nCREATE TABLE users (id int PRIMARY KEY, name string);\n";
        let records = parse(script).unwrap();
        assert_eq!(
            records,
            vec![Record::StatementOk {
                sql: "CREATE TABLE users (id int PRIMARY KEY, name string);".to_string()
            }]
        );
    }

    #[test]
    fn parses_query_with_expected_table() {
        let script = "query TI\nSELECT name, id FROM users;\n----\nname id\nAlice 1\nBob 2\n";
        let records = parse(script).unwrap();
        assert_eq!(
            records,
            vec![Record::Query {
                type_chars: "TI".to_string(),
                sql: "SELECT name, id FROM users;".to_string(),
                header: vec!["name".to_string(), "id".to_string()],
                rows: vec![
                    vec!["Alice".to_string(), "1".to_string()],
                    vec!["Bob".to_string(), "2".to_string()],
                ],
            }]
        );
    }

    #[test]
    fn query_without_separator_is_a_parse_error() {
        let script = "query T\nSELECT name FROM users;\n";
        assert!(parse(script).is_err());
    }

    #[test]
    fn mixed_script_with_blank_lines_and_comments() {
        let script = "# seed data\nstatement ok\nINSERT INTO users VALUES (1, 'Alice');\n\nquery I\nSELECT id FROM users;\n----\nid\n1\n";
        let records = parse(script).unwrap();
        assert_eq!(records.len(), 2);
    }
}
