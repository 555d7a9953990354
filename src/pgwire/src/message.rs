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

//! Backend message encoding. Every non-startup message is `tag | i32 length-incl-self | payload`,
//! big-endian throughout. `frame` writes a placeholder length, lets the caller fill in the
//! payload, then seeks back and patches it — there is no bespoke message enum, just one builder
//! this module's functions feed into.

use bytes::{BufMut, BytesMut};
use dsdb_dispatcher::{FieldDescriptor, QueryResult};

fn frame(tag: u8, body: impl FnOnce(&mut BytesMut)) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u8(tag);
    let len_pos = buf.len();
    buf.put_i32(0);
    body(&mut buf);
    let len = (buf.len() - len_pos) as i32;
    buf[len_pos..len_pos + 4].copy_from_slice(&len.to_be_bytes());
    buf
}

fn put_cstr(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
}

pub fn authentication_ok() -> BytesMut {
    frame(b'R', |buf| buf.put_i32(0))
}

pub fn parameter_status(name: &str, value: &str) -> BytesMut {
    frame(b'S', |buf| {
        put_cstr(buf, name);
        put_cstr(buf, value);
    })
}

pub fn backend_key_data(process_id: i32, secret_key: i32) -> BytesMut {
    frame(b'K', |buf| {
        buf.put_i32(process_id);
        buf.put_i32(secret_key);
    })
}

pub fn ready_for_query(status: u8) -> BytesMut {
    frame(b'Z', |buf| buf.put_u8(status))
}

pub fn empty_query_response() -> BytesMut {
    frame(b'I', |_| {})
}

pub fn error_response(message: &str) -> BytesMut {
    frame(b'E', |buf| {
        buf.put_u8(b'S');
        put_cstr(buf, "ERROR");
        buf.put_u8(b'M');
        put_cstr(buf, message);
        buf.put_u8(0);
    })
}

pub fn command_complete(tag: &str) -> BytesMut {
    frame(b'C', |buf| put_cstr(buf, tag))
}

pub fn row_description(fields: &[FieldDescriptor]) -> BytesMut {
    frame(b'T', |buf| {
        buf.put_i16(fields.len() as i16);
        for field in fields {
            put_cstr(buf, &field.name);
            buf.put_i32(0); // table oid
            buf.put_i16(0); // attribute number
            buf.put_i32(field.ty.to_pg_oid());
            buf.put_i16(field.ty.to_pg_size());
            buf.put_i32(0); // type modifier
            buf.put_i16(0); // format: text
        }
    })
}

pub fn data_row(values: &[dsdb_common::Datum]) -> BytesMut {
    frame(b'D', |buf| {
        buf.put_i16(values.len() as i16);
        for value in values {
            let text = value.as_text();
            buf.put_i32(text.len() as i32);
            buf.put_slice(text.as_bytes());
        }
    })
}

/// Renders a full query result as the `RowDescription`/`DataRow*`/`CommandComplete` sequence
/// described in the wire session's `ReadyForQuery` transition, or `EmptyQueryResponse` if the
/// result has no field descriptors at all (e.g. DDL, DML, or transaction statements).
pub fn render_query_result(result: &QueryResult) -> Vec<BytesMut> {
    if result.is_empty_query() {
        return vec![empty_query_response()];
    }

    let mut frames = Vec::with_capacity(result.rows.len() + 2);
    frames.push(row_description(&result.fields));
    for row in &result.rows {
        frames.push(data_row(row));
    }
    frames.push(command_complete(&format!("SELECT {}", result.rows.len())));
    frames
}
