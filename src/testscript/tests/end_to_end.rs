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

//! Boots one node entirely in-process (no child process, no real disk) and drives test scripts
//! against it over a real `tokio_postgres::Client`, exercising the wire session, the dispatcher,
//! the catalog, and the row-storage layer together. Mirrors the spec's seed end-to-end scenarios
//! 1 and 4.

use std::sync::Arc;

use dsdb_catalog::Catalog;
use dsdb_common::NodeDescriptor;
use dsdb_dispatcher::Dispatcher;
use dsdb_gossip::{publish_self, GossipStore};
use dsdb_rpc_client::PeerRpcClient;
use dsdb_storage::MemKvStore;
use tokio_postgres::NoTls;
use uuid::Uuid;

async fn spawn_single_node() -> tokio_postgres::Client {
    let self_id = Uuid::new_v4();
    let store: Arc<dyn dsdb_storage::KvStore> = Arc::new(MemKvStore::new());
    let catalog = Catalog::bootstrap(store.clone()).unwrap();
    let gossip = Arc::new(GossipStore::new());
    let descriptor = NodeDescriptor {
        id: self_id,
        sql_addr: "127.0.0.1:0".to_string(),
        grpc_addr: "127.0.0.1:0".to_string(),
        data_dir: ":memory:".to_string(),
        region: None,
        seed_peer: None,
    };
    publish_self(&gossip, self_id, &descriptor, 0);

    let dispatcher = Arc::new(Dispatcher::new(
        catalog,
        store,
        gossip,
        PeerRpcClient::new(),
        self_id,
    ));

    let (bound_addr, _join, _shutdown) =
        pgwire::pgwire_serve("127.0.0.1:0".parse().unwrap(), dispatcher)
            .await
            .expect("pgwire listener binds");

    let (client, connection) = tokio_postgres::connect(
        &format!("host={} port={} user=test", bound_addr.ip(), bound_addr.port()),
        NoTls,
    )
    .await
    .expect("client connects to the node it just booted");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection task ended: {e}");
        }
    });
    client
}

#[tokio::test]
async fn create_and_query_system_table() {
    let client = spawn_single_node().await;
    let script = "statement ok\nCREATE TABLE users (id int PRIMARY KEY, name string);\n\nquery TT\nSELECT * FROM system.tables;\n----\ntable_name columns\nusers id:int(PK), name:str\n";
    dsdb_testscript::run_script(&client, script)
        .await
        .expect("scenario 1 from the spec passes end to end");
}

#[tokio::test]
async fn insert_then_select_round_trips() {
    let client = spawn_single_node().await;
    let script = "statement ok\nCREATE TABLE users (id int PRIMARY KEY, name string);\n\nstatement ok\nINSERT INTO users (id, name) VALUES (1, 'Alice');\n\nquery IT\nSELECT * FROM users;\n----\nid name\n1 Alice\n";
    dsdb_testscript::run_script(&client, script).await.unwrap();
}

#[tokio::test]
async fn update_arithmetic_preserves_sum() {
    let client = spawn_single_node().await;
    let script = concat!(
        "statement ok\n",
        "CREATE TABLE accounts (id int PRIMARY KEY, balance int);\n\n",
        "statement ok\n",
        "INSERT INTO accounts (id, balance) VALUES (1, 100);\n\n",
        "statement ok\n",
        "INSERT INTO accounts (id, balance) VALUES (2, 100);\n\n",
        "statement ok\n",
        "UPDATE accounts SET balance = balance - 10 WHERE id = 1;\n\n",
        "statement ok\n",
        "UPDATE accounts SET balance = balance + 10 WHERE id = 2;\n\n",
        "query II\n",
        "SELECT * FROM accounts;\n",
        "----\n",
        "id balance\n",
        "1 90\n",
        "2 110\n",
    );
    dsdb_testscript::run_script(&client, script).await.unwrap();
}

#[tokio::test]
async fn drop_nonexistent_table_is_a_noop_success() {
    let client = spawn_single_node().await;
    let script = "statement ok\nDROP TABLE ghost;\n";
    dsdb_testscript::run_script(&client, script).await.unwrap();
}

#[tokio::test]
async fn empty_select_returns_no_rows() {
    let client = spawn_single_node().await;
    let script = "statement ok\nCREATE TABLE users (id int PRIMARY KEY, name string);\n\nquery IT\nSELECT * FROM users;\n----\nid name\n";
    dsdb_testscript::run_script(&client, script).await.unwrap();
}
