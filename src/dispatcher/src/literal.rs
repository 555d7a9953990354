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

//! Converts the narrow slice of `sqlparser::ast::Expr` this system accepts — literals and
//! `col op const` arithmetic over `INT64` — into `Datum`s.

use dsdb_common::{Datum, Type};
use sqlparser::ast::{BinaryOperator, Expr, UnaryOperator, Value};

use crate::error::{DispatchError, DispatchResult};

/// A bare literal (optionally unary-minus-prefixed), typed by the column it targets.
pub fn literal_to_datum(expr: &Expr, ty: Type) -> DispatchResult<Datum> {
    match (expr, ty) {
        (Expr::Value(Value::Number(n, _)), Type::Int64) => n
            .parse::<i64>()
            .map(Datum::Int64)
            .map_err(|e| DispatchError::InvalidArgument(format!("bad integer literal {n:?}: {e}"))),
        (Expr::Value(Value::SingleQuotedString(s)), Type::String)
        | (Expr::Value(Value::DoubleQuotedString(s)), Type::String) => {
            Ok(Datum::String(s.clone().into_bytes()))
        }
        (Expr::UnaryOp { op: UnaryOperator::Minus, expr }, Type::Int64) => {
            let Datum::Int64(v) = literal_to_datum(expr, Type::Int64)? else {
                unreachable!("literal_to_datum(_, Type::Int64) always returns Datum::Int64")
            };
            Ok(Datum::Int64(-v))
        }
        _ => Err(DispatchError::InvalidArgument(format!(
            "expected a {ty:?} literal, found {expr}"
        ))),
    }
}

/// `col op const` arithmetic over `INT64` (`+`, `-`, `*`), or a bare literal. `current` is the
/// existing cell value, used as the left operand when the expression references the column by
/// name (the only form of `col` this system recognizes in a SET assignment).
pub fn eval_set_expr(expr: &Expr, column_name: &str, current: &Datum) -> DispatchResult<Datum> {
    match expr {
        Expr::BinaryOp { left, op, right } => {
            let Expr::Identifier(ident) = left.as_ref() else {
                return Err(DispatchError::InvalidArgument(
                    "SET expression's left operand must be a column reference".to_string(),
                ));
            };
            if ident.value != column_name {
                return Err(DispatchError::InvalidArgument(format!(
                    "SET expression references {:?}, expected {column_name:?}",
                    ident.value
                )));
            }
            let Datum::Int64(base) = current else {
                return Err(DispatchError::InvalidArgument(
                    "arithmetic SET expressions are only supported over INT64 columns".to_string(),
                ));
            };
            let Datum::Int64(rhs) = literal_to_datum(right, Type::Int64)? else {
                unreachable!("literal_to_datum(_, Type::Int64) always returns Datum::Int64")
            };
            let value = match op {
                BinaryOperator::Plus => base + rhs,
                BinaryOperator::Minus => base - rhs,
                BinaryOperator::Multiply => base * rhs,
                other => {
                    return Err(DispatchError::Unsupported(format!(
                        "unsupported SET operator {other}"
                    )))
                }
            };
            Ok(Datum::Int64(value))
        }
        literal => literal_to_datum(literal, current.type_of()),
    }
}

/// Extracts the single `column = const` predicate this system's `WHERE` clauses are restricted
/// to.
pub fn single_equality_predicate(expr: &Expr) -> DispatchResult<(String, Expr)> {
    match expr {
        Expr::BinaryOp { left, op: BinaryOperator::Eq, right } => {
            let Expr::Identifier(ident) = left.as_ref() else {
                return Err(DispatchError::InvalidArgument(
                    "WHERE clause must be a single `column = const` predicate".to_string(),
                ));
            };
            Ok((ident.value.clone(), *right.clone()))
        }
        _ => Err(DispatchError::InvalidArgument(
            "WHERE clause must be a single `column = const` predicate".to_string(),
        )),
    }
}
