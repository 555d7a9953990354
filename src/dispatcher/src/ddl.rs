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

//! `sqlparser`'s `Statement::CreateTable`/`Statement::AlterTable` productions don't carry a
//! first-class `PARTITION BY LIST`/`PARTITION OF`/`ADD CONSTRAINT ... CHECK` shape that matches
//! this system's narrow grammar across dialects. Rather than depend on `sqlparser` internals
//! that drift between versions, these three forms are recognized textually, *before* the
//! statement ever reaches `sqlparser::Parser`, so the rest of the dispatcher only ever sees a
//! `sqlparser::ast::Statement` for the productions it genuinely parses (the plain `CREATE TABLE`,
//! `INSERT`, `UPDATE`, `SELECT`, `DROP`).

use crate::error::{DispatchError, DispatchResult};

/// If `sql` is a `CREATE TABLE name (...) PARTITION BY LIST (column)` statement, returns the SQL
/// with the trailing `PARTITION BY LIST (...)` clause stripped (so `sqlparser` can parse the
/// remainder as a plain `CREATE TABLE`) plus the partition column name.
pub fn extract_partition_by_list(sql: &str) -> (String, Option<String>) {
    let trimmed = sql.trim_end().trim_end_matches(';');
    let upper = trimmed.to_ascii_uppercase();
    let Some(marker_pos) = upper.rfind("PARTITION BY LIST") else {
        return (sql.to_string(), None);
    };
    let after_marker = &trimmed[marker_pos + "PARTITION BY LIST".len()..];
    let Some(open) = after_marker.find('(') else {
        return (sql.to_string(), None);
    };
    let Some(close) = after_marker.find(')') else {
        return (sql.to_string(), None);
    };
    if close < open {
        return (sql.to_string(), None);
    }
    let column = after_marker[open + 1..close].trim().to_string();
    let stripped = format!("{};", trimmed[..marker_pos].trim_end());
    (stripped, Some(column))
}

#[derive(Debug, Clone)]
pub struct PartitionOfDirective {
    pub child_table: String,
    pub parent_table: String,
    pub values: Vec<String>,
}

/// Recognizes `CREATE TABLE child PARTITION OF parent FOR VALUES IN (v1, v2, ...)`. This shape
/// has no plain-`CREATE TABLE` counterpart, so on a match the statement is handled without ever
/// invoking `sqlparser`.
pub fn extract_partition_of(sql: &str) -> Option<PartitionOfDirective> {
    let trimmed = sql.trim().trim_end_matches(';').trim();
    let upper = trimmed.to_ascii_uppercase();
    if !upper.starts_with("CREATE TABLE") {
        return None;
    }
    let partition_of_pos = upper.find("PARTITION OF")?;
    let head = trimmed[..partition_of_pos].trim();
    let child_table = head
        .strip_prefix("CREATE TABLE")
        .or_else(|| head.strip_prefix("create table"))?
        .trim()
        .to_string();

    let after_of = &trimmed[partition_of_pos + "PARTITION OF".len()..];
    let for_values_pos = after_of.to_ascii_uppercase().find("FOR VALUES IN")?;
    let parent_table = after_of[..for_values_pos].trim().to_string();

    let values_segment = &after_of[for_values_pos + "FOR VALUES IN".len()..];
    let open = values_segment.find('(')?;
    let close = values_segment.rfind(')')?;
    let values = values_segment[open + 1..close]
        .split(',')
        .map(|v| v.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|v| !v.is_empty())
        .collect();

    Some(PartitionOfDirective {
        child_table,
        parent_table,
        values,
    })
}

#[derive(Debug, Clone)]
pub struct AddConstraintDirective {
    pub table: String,
    pub column: String,
    pub value: String,
}

/// Recognizes `ALTER TABLE child ADD CONSTRAINT name CHECK (col = const)`. The constraint name
/// itself is not retained (the catalog keys partitions by partition name, which is the child
/// table name carrying the constraint, not the constraint's own identifier).
pub fn extract_add_constraint_check(sql: &str) -> Option<AddConstraintDirective> {
    let trimmed = sql.trim().trim_end_matches(';').trim();
    let upper = trimmed.to_ascii_uppercase();
    if !upper.starts_with("ALTER TABLE") {
        return None;
    }
    let add_constraint_pos = upper.find("ADD CONSTRAINT")?;
    let table = trimmed["ALTER TABLE".len()..add_constraint_pos]
        .trim()
        .to_string();

    let after = &trimmed[add_constraint_pos + "ADD CONSTRAINT".len()..];
    let check_pos = after.to_ascii_uppercase().find("CHECK")?;
    let after_check = &after[check_pos + "CHECK".len()..];
    let open = after_check.find('(')?;
    let close = after_check.find(')')?;
    let predicate = &after_check[open + 1..close];
    let (column, value) = predicate.split_once('=')?;
    Some(AddConstraintDirective {
        table,
        column: column.trim().to_string(),
        value: value.trim().trim_matches(|c| c == '\'' || c == '"').to_string(),
    })
}

pub fn parse_error(e: impl std::fmt::Display) -> DispatchError {
    DispatchError::Parse(e.to_string())
}

pub type DdlResult<T> = DispatchResult<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_partition_by_list_clause() {
        let sql = "CREATE TABLE users (id int PRIMARY KEY, country string) PARTITION BY LIST (country);";
        let (stripped, column) = extract_partition_by_list(sql);
        assert_eq!(column.as_deref(), Some("country"));
        assert_eq!(
            stripped,
            "CREATE TABLE users (id int PRIMARY KEY, country string);"
        );
    }

    #[test]
    fn no_partition_clause_leaves_sql_untouched() {
        let sql = "CREATE TABLE users (id int PRIMARY KEY);";
        let (stripped, column) = extract_partition_by_list(sql);
        assert!(column.is_none());
        assert_eq!(stripped, sql);
    }

    #[test]
    fn recognizes_partition_of() {
        let sql = "CREATE TABLE users_eu PARTITION OF users FOR VALUES IN ('Germany', 'France', 'Italy');";
        let directive = extract_partition_of(sql).unwrap();
        assert_eq!(directive.child_table, "users_eu");
        assert_eq!(directive.parent_table, "users");
        assert_eq!(directive.values, vec!["Germany", "France", "Italy"]);
    }

    #[test]
    fn recognizes_add_constraint_check() {
        let sql = "ALTER TABLE users_eu ADD CONSTRAINT users_eu_region CHECK (region = 'eu');";
        let directive = extract_add_constraint_check(sql).unwrap();
        assert_eq!(directive.table, "users_eu");
        assert_eq!(directive.column, "region");
        assert_eq!(directive.value, "eu");
    }
}
