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

//! The scalar type lattice. Kept intentionally tiny (`INT64`, `STRING`) to match the spec;
//! extending it means adding a `Type` variant, a `Datum` variant, and one arm in each of
//! `encode`/`decode`/`to_pg_oid`/`to_pg_size`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int64,
    String,
}

impl Type {
    /// Parses the type name as it shows up in a `sqlparser` column definition under the
    /// Postgres dialect (`int4`/`int8`/`int`/`bigint` all collapse onto `INT64` since this
    /// system has no narrower integer types).
    pub fn from_ast_string(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "int4" | "int8" | "int" | "integer" | "bigint" => Ok(Type::Int64),
            "string" | "text" | "varchar" | "character varying" => Ok(Type::String),
            other => Err(Error::Unsupported(format!("column type {other:?}"))),
        }
    }

    /// Postgres wire type OID, as sent in `RowDescription`.
    pub fn to_pg_oid(self) -> i32 {
        match self {
            Type::Int64 => 20,
            Type::String => 25,
        }
    }

    /// Postgres wire type size, as sent in `RowDescription` (`-1` means varlena).
    pub fn to_pg_size(self) -> i16 {
        match self {
            Type::Int64 => 8,
            Type::String => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Datum {
    Int64(i64),
    String(Vec<u8>),
}

impl Datum {
    pub fn type_of(&self) -> Type {
        match self {
            Datum::Int64(_) => Type::Int64,
            Datum::String(_) => Type::String,
        }
    }

    /// Renders the datum as wire/text form, used both for `DataRow` cells and for hex-encoding
    /// string primary keys.
    pub fn as_text(&self) -> String {
        match self {
            Datum::Int64(v) => v.to_string(),
            Datum::String(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// `decode(encode(d), typeof(d)) == d` for every well-typed `Datum` is the round-trip invariant
/// tested in this module and exercised again, at the row-layout level, in `dsdb_storage`.
pub fn encode(datum: &Datum) -> Vec<u8> {
    match datum {
        Datum::Int64(v) => v.to_string().into_bytes(),
        Datum::String(bytes) => bytes.clone(),
    }
}

pub fn decode(bytes: &[u8], ty: Type) -> Result<Datum> {
    match ty {
        Type::Int64 => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| Error::InvalidArgument(format!("non-utf8 int64 cell: {e}")))?;
            let value = text
                .parse::<i64>()
                .map_err(|e| Error::InvalidArgument(format!("malformed int64 cell: {e}")))?;
            Ok(Datum::Int64(value))
        }
        Type::String => Ok(Datum::String(bytes.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_int64() {
        let d = Datum::Int64(-42);
        assert_eq!(decode(&encode(&d), d.type_of()).unwrap(), d);
    }

    #[test]
    fn round_trip_string() {
        let d = Datum::String(b"Alice".to_vec());
        assert_eq!(decode(&encode(&d), d.type_of()).unwrap(), d);
    }

    #[test]
    fn pg_oid_and_size() {
        assert_eq!(Type::Int64.to_pg_oid(), 20);
        assert_eq!(Type::Int64.to_pg_size(), 8);
        assert_eq!(Type::String.to_pg_oid(), 25);
        assert_eq!(Type::String.to_pg_size(), -1);
    }

    #[test]
    fn from_ast_string_unknown_is_unsupported() {
        assert!(matches!(
            Type::from_ast_string("jsonb"),
            Err(Error::Unsupported(_))
        ));
    }
}
