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
use dsdb_gossip::GossipStore;
use dsdb_pb::gossip_service_server::GossipServiceServer;
use dsdb_pb::insert_service_server::InsertServiceServer;
use dsdb_pb::update_service_server::UpdateServiceServer;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::gossip_service::GossipServiceImpl;
use crate::insert_service::InsertServiceImpl;
use crate::update_service::UpdateServiceImpl;

/// Boots the three peer-facing gRPC services on one listener and returns a handle alongside a
/// shutdown sender, mirroring how the node's SQL listener is booted in `dsdb_pgwire`.
pub fn grpc_serve(
    listen_addr: SocketAddr,
    store: Arc<GossipStore>,
    dispatcher: Arc<Dispatcher>,
) -> (JoinHandle<()>, oneshot::Sender<()>) {
    let gossip_srv = GossipServiceImpl::new(store);
    let insert_srv = InsertServiceImpl::new(dispatcher.clone());
    let update_srv = UpdateServiceImpl::new(dispatcher);

    let (shutdown_send, shutdown_recv) = oneshot::channel::<()>();
    let join_handle = tokio::spawn(async move {
        let result = tonic::transport::Server::builder()
            .add_service(GossipServiceServer::new(gossip_srv))
            .add_service(InsertServiceServer::new(insert_srv))
            .add_service(UpdateServiceServer::new(update_srv))
            .serve_with_shutdown(listen_addr, async {
                let _ = shutdown_recv.await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "grpc server exited with error");
        }
    });

    (join_handle, shutdown_send)
}
