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

//! `dsdb-server`: boots one node of the cluster — the catalog, the gossip store and its worker,
//! the peer-facing gRPC listener, and the PostgreSQL wire listener — and runs until `SIGINT`/
//! `SIGTERM`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use dsdb_catalog::Catalog;
use dsdb_common::NodeDescriptor;
use dsdb_dispatcher::Dispatcher;
use dsdb_gossip::{publish_self, GossipStore, GossipWorker};
use dsdb_rpc_client::{GossipRpcClient, PeerRpcClient};
use dsdb_storage::{KvStore, MemKvStore, SledKvStore};
use tokio::signal::unix::SignalKind;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "dsdb-server", about = "A distributed SQL database node")]
struct Opts {
    /// Address the PostgreSQL wire listener binds to.
    #[arg(long, env = "DSDB_SQL_ADDR")]
    sql_addr: SocketAddr,

    /// Address the peer gRPC listener (gossip/insert/update services) binds to.
    #[arg(long, env = "DSDB_GRPC_ADDR")]
    grpc_addr: SocketAddr,

    /// Directory backing this node's KV store; `:memory:` uses an in-memory store instead.
    #[arg(long, env = "DSDB_DATA_DIR")]
    data_dir: String,

    /// This node's region, compared against partition constraints.
    #[arg(long, env = "DSDB_REGION")]
    region: Option<String>,

    /// A peer's gRPC address to gossip with at a fixed cadence, bypassing random peer selection.
    #[arg(long, env = "DSDB_JOIN")]
    join: Option<String>,

    /// Gossip exchange period, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    gossip_period_ms: u64,
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the Unix epoch")
        .as_millis() as i64
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    if let Err(e) = run(opts).await {
        tracing::error!(error = %e, "dsdb-server exited with a fatal error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    let self_id = Uuid::new_v4();
    let descriptor = NodeDescriptor {
        id: self_id,
        sql_addr: opts.sql_addr.to_string(),
        grpc_addr: opts.grpc_addr.to_string(),
        data_dir: opts.data_dir.clone(),
        region: opts.region.clone(),
        seed_peer: opts.join.clone(),
    };
    tracing::info!(?descriptor, "starting dsdb node");

    let store: Arc<dyn KvStore> = if opts.data_dir == ":memory:" {
        Arc::new(MemKvStore::new())
    } else {
        Arc::new(SledKvStore::open(&opts.data_dir)?)
    };

    let catalog = Catalog::bootstrap(store.clone())?;

    let gossip = Arc::new(GossipStore::new());
    publish_self(&gossip, self_id, &descriptor, now_millis());

    let dispatcher = Arc::new(Dispatcher::new(
        catalog,
        store,
        gossip.clone(),
        PeerRpcClient::new(),
        self_id,
    ));

    let (gossip_worker, gossip_join) = GossipWorker::spawn(
        gossip.clone(),
        GossipRpcClient::new(),
        self_id,
        opts.join.clone(),
        Duration::from_millis(opts.gossip_period_ms),
    );

    let (grpc_join, grpc_shutdown) = dsdb_grpc::grpc_serve(opts.grpc_addr, gossip, dispatcher.clone());
    let (bound_sql_addr, pgwire_join, pgwire_shutdown) =
        pgwire::pgwire_serve(opts.sql_addr, dispatcher).await?;

    tracing::info!(sql_addr = %bound_sql_addr, grpc_addr = %opts.grpc_addr, "dsdb node ready");

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, stopping node");

    gossip_worker.stop();
    let _ = grpc_shutdown.send(());
    let _ = pgwire_shutdown.send(());

    let _ = tokio::join!(gossip_join, grpc_join, pgwire_join);
    Ok(())
}

/// Waits for either `SIGINT` or `SIGTERM`, the two signals the spec asks for orderly shutdown on.
async fn wait_for_shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    let mut sigterm = match tokio::signal::unix::signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler, SIGINT only");
            let _ = ctrl_c.await;
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm.recv() => {}
    }
}
