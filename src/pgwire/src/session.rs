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

//! `PgProtocol`: the per-connection state machine (`StartUp` → `NoSSLAcknowledged` →
//! `ReadyForQuery`) driving the dispatcher over a single `TcpStream`, owned exclusively by this
//! session for its whole lifetime.

use std::sync::Arc;

use dsdb_dispatcher::Dispatcher;
use rand::Rng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{ProtocolError, ProtocolResult};
use crate::message;

const SSL_REQUEST_MAGIC: i32 = 80_877_103;
const PROTOCOL_VERSION_3_0: i32 = 196_608;

pub struct PgProtocol {
    stream: TcpStream,
    dispatcher: Arc<Dispatcher>,
    process_id: i32,
    secret_key: i32,
}

impl PgProtocol {
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            stream,
            dispatcher,
            process_id: rng.gen(),
            secret_key: rng.gen(),
        }
    }

    /// Runs the session to completion: handshake, then simple-query loop until `Terminate` or
    /// disconnect. Never returns an `Err` for a query-level failure — those are folded into an
    /// `ErrorResponse` and the loop continues; `Err` here means the connection itself is unusable.
    pub async fn run(mut self) -> ProtocolResult<()> {
        self.start_up().await?;
        self.ready_for_query_loop().await
    }

    async fn start_up(&mut self) -> ProtocolResult<()> {
        let len = self.stream.read_i32().await?;
        if len != 8 {
            return Err(ProtocolError::NotAnSslRequest);
        }
        let magic = self.stream.read_i32().await?;
        if magic != SSL_REQUEST_MAGIC {
            return Err(ProtocolError::NotAnSslRequest);
        }
        self.stream.write_all(b"N").await?;

        let len = self.stream.read_i32().await?;
        if len < 8 {
            return Err(ProtocolError::MalformedStartup(format!(
                "startup message length {len} is too short"
            )));
        }
        let mut body = vec![0u8; (len - 4) as usize];
        self.stream.read_exact(&mut body).await?;

        let version = i32::from_be_bytes(body[0..4].try_into().expect("length checked above"));
        if version != PROTOCOL_VERSION_3_0 {
            return Err(ProtocolError::UnsupportedProtocolVersion(version));
        }
        // Key/value pairs follow, NUL-terminated, ending in an extra NUL; this implementation
        // authenticates unconditionally, so their contents are not consulted.

        self.write_frame(message::authentication_ok()).await?;
        for (name, value) in [
            ("server_encoding", "UTF8"),
            ("client_encoding", "UTF8"),
            ("DateStyle", "ISO YMD"),
            ("integer_datetimes", "on"),
            ("server_version", "17.0"),
        ] {
            self.write_frame(message::parameter_status(name, value)).await?;
        }
        self.write_frame(message::backend_key_data(self.process_id, self.secret_key))
            .await?;
        self.write_frame(message::ready_for_query(b'I')).await?;
        Ok(())
    }

    async fn ready_for_query_loop(&mut self) -> ProtocolResult<()> {
        loop {
            let tag = match self.stream.read_u8().await {
                Ok(tag) => tag,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
                Err(e) => return Err(e.into()),
            };
            let len = self.stream.read_i32().await?;
            if len < 4 {
                return Err(ProtocolError::MalformedStartup(format!(
                    "message length {len} is shorter than the length field itself"
                )));
            }
            let mut body = vec![0u8; (len - 4) as usize];
            self.stream.read_exact(&mut body).await?;

            match tag {
                b'Q' => self.handle_simple_query(&body).await?,
                b'X' => return Ok(()),
                other => {
                    tracing::warn!(tag = other as char, "unsupported message tag, closing connection");
                    return Ok(());
                }
            }
        }
    }

    async fn handle_simple_query(&mut self, body: &[u8]) -> ProtocolResult<()> {
        let nul_pos = body.iter().position(|&b| b == 0).unwrap_or(body.len());
        let sql = String::from_utf8_lossy(&body[..nul_pos]).into_owned();

        match self.dispatcher.handle_sql(&sql, true).await {
            Ok(result) => {
                for frame in message::render_query_result(&result) {
                    self.write_frame(frame).await?;
                }
            }
            Err(e) => {
                self.write_frame(message::error_response(&e.to_string())).await?;
            }
        }
        self.write_frame(message::ready_for_query(b'I')).await?;
        Ok(())
    }

    async fn write_frame(&mut self, frame: bytes::BytesMut) -> ProtocolResult<()> {
        self.stream.write_all(&frame).await?;
        Ok(())
    }
}
