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

//! The long-lived exchange loop: one `tokio::task` per node, picking a peer every tick and
//! running an `Exchange` RPC against it. Network failures are logged and the tick is skipped —
//! they never propagate to the caller.

use std::sync::Arc;
use std::time::Duration;

use dsdb_common::NodeDescriptor;
use dsdb_rpc_client::GossipRpcClient;
use rand::seq::IteratorRandom;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::store::{from_proto_entries, to_proto_entries, GossipEntry, GossipStore, NODE_KEY_PREFIX};

pub struct GossipWorker {
    cancel: CancellationToken,
}

impl GossipWorker {
    /// Spawns the exchange loop and returns a handle alongside the task's `JoinHandle`. `self_id`
    /// and `seed_peer` come from the node's own descriptor/CLI flags; `period` defaults to 3s.
    pub fn spawn(
        store: Arc<GossipStore>,
        rpc: GossipRpcClient,
        self_id: Uuid,
        seed_peer: Option<String>,
        period: Duration,
    ) -> (Self, JoinHandle<()>) {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {},
                    _ = task_cancel.cancelled() => {
                        tracing::info!("gossip worker stopped");
                        return;
                    }
                }
                run_tick(&store, &rpc, self_id, seed_peer.as_deref()).await;
            }
        });

        (Self { cancel }, handle)
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

async fn run_tick(
    store: &Arc<GossipStore>,
    rpc: &GossipRpcClient,
    self_id: Uuid,
    seed_peer: Option<&str>,
) {
    let Some(peer_addr) = choose_peer(store, self_id, seed_peer) else {
        tracing::debug!("no peer available this tick, skipping");
        return;
    };

    let local_entries = to_proto_entries(store.snapshot());
    match rpc.exchange(&peer_addr, local_entries).await {
        Ok(response) => {
            let response = from_proto_entries(response);
            let _ = store.update(&response);
        }
        Err(e) => {
            tracing::warn!(peer = %peer_addr, error = %e, "gossip exchange failed");
        }
    }
}

/// Seed peer if configured, else a uniformly random non-self `node:` entry's `grpc_addr`.
fn choose_peer(store: &GossipStore, self_id: Uuid, seed_peer: Option<&str>) -> Option<String> {
    if let Some(seed) = seed_peer {
        return Some(seed.to_string());
    }
    let nodes = store.get_nodes(None).ok()?;
    nodes
        .into_iter()
        .filter(|(id, _)| *id != self_id)
        .map(|(_, descriptor)| descriptor.grpc_addr)
        .choose(&mut rand::thread_rng())
}

/// Publishes this node's own descriptor into the local store at startup. Never mutated again.
pub fn publish_self(store: &GossipStore, id: Uuid, descriptor: &NodeDescriptor, now_millis: i64) {
    store.insert(
        format!("{NODE_KEY_PREFIX}{id}"),
        GossipEntry::new(descriptor.to_json(), now_millis),
    );
}
