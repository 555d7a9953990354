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
use dsdb_pb::update_service_server::UpdateService;
use dsdb_pb::{Ack, RawUpdateStmt};
use tonic::{Request, Response, Status};

use crate::error::dispatch_error_to_status;

/// Serves `UPDATE` statements forwarded by the node that first applied them locally. Applies
/// once, locally, and never forwards again — the sender already reached every other node it
/// knew about.
pub struct UpdateServiceImpl {
    dispatcher: Arc<Dispatcher>,
}

impl UpdateServiceImpl {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait::async_trait]
impl UpdateService for UpdateServiceImpl {
    async fn apply(&self, request: Request<RawUpdateStmt>) -> Result<Response<Ack>, Status> {
        let req = request.into_inner();
        self.dispatcher
            .receive_update(&req.statement_json)
            .map_err(dispatch_error_to_status)?;
        Ok(Response::new(Ack {}))
    }
}
