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

use std::sync::Arc;

use dsdb_dispatcher::Dispatcher;
use dsdb_pb::insert_service_server::InsertService;
use dsdb_pb::{Ack, Row};
use tonic::{Request, Response, Status};

use crate::error::dispatch_error_to_status;

/// Serves rows forwarded by a peer's `insert_one_row` when it resolved this node as a partition
/// owner. Writes land directly through the dispatcher, bypassing SQL parsing entirely.
pub struct InsertServiceImpl {
    dispatcher: Arc<Dispatcher>,
}

impl InsertServiceImpl {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait::async_trait]
impl InsertService for InsertServiceImpl {
    async fn write(&self, request: Request<Row>) -> Result<Response<Ack>, Status> {
        let row = request.into_inner();
        self.dispatcher
            .receive_row(&row.table, row.values)
            .map_err(dispatch_error_to_status)?;
        Ok(Response::new(Ack {}))
    }
}
