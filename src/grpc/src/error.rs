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

use dsdb_dispatcher::DispatchError;
use tonic::Status;

/// Maps a dispatcher failure onto the closest-fitting gRPC status code, the way a peer on the
/// other end of `InsertService`/`UpdateService` would want to distinguish "retry elsewhere" from
/// "this request is malformed".
pub fn dispatch_error_to_status(e: DispatchError) -> Status {
    match e {
        DispatchError::NotFound(m) => Status::not_found(m),
        DispatchError::InvalidArgument(m) => Status::invalid_argument(m),
        DispatchError::Unsupported(m) => Status::unimplemented(m),
        other => Status::internal(other.to_string()),
    }
}
