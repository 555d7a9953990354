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

use std::net::SocketAddr;
use std::sync::Arc;

use dsdb_dispatcher::Dispatcher;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::session::PgProtocol;

/// Accepts connections on `listen_addr`, spawning one `tokio::task` per connection, until the
/// returned sender is dropped or fired. Returns the listener's actual bound address alongside the
/// handles, so binding to port `0` (as the integration tests do) still lets the caller find out
/// where the node ended up.
pub async fn pgwire_serve(
    listen_addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
) -> std::io::Result<(SocketAddr, JoinHandle<()>, oneshot::Sender<()>)> {
    let listener = TcpListener::bind(listen_addr).await?;
    let bound_addr = listener.local_addr()?;
    let (shutdown_send, mut shutdown_recv) = oneshot::channel::<()>();

    let join_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to accept pgwire connection");
                            continue;
                        }
                    };
                    let dispatcher = dispatcher.clone();
                    tokio::spawn(async move {
                        let session = PgProtocol::new(stream, dispatcher);
                        if let Err(e) = session.run().await {
                            tracing::warn!(peer = %peer, error = %e, "pgwire session ended with an error");
                        }
                    });
                }
                _ = &mut shutdown_recv => {
                    tracing::info!("pgwire listener stopped");
                    return;
                }
            }
        }
    });

    Ok((bound_addr, join_handle, shutdown_send))
}
