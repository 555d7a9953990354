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

//! Resolves which nodes should materialize an inserted row, per the partition whose value set
//! contains the row's partition-column value.

use dsdb_catalog::{Partition, Table};
use dsdb_common::NodeDescriptor;
use dsdb_gossip::GossipStore;
use uuid::Uuid;

use crate::error::{DispatchError, DispatchResult};

pub enum InsertTarget {
    Local,
    Remote(NodeDescriptor),
}

/// `partition_col_value` is the row's value for the table's partition column, already rendered
/// as text (matching `PartitionSpec::values`' `String` element type); `None` for unpartitioned
/// tables.
pub fn resolve_insert_targets(
    table: &Table,
    partition_col_value: Option<&str>,
    gossip: &GossipStore,
    self_id: Uuid,
) -> DispatchResult<Vec<InsertTarget>> {
    let Partition::List { partitions, .. } = &table.partition else {
        return Ok(vec![InsertTarget::Local]);
    };

    let value = partition_col_value.ok_or_else(|| {
        DispatchError::InvalidArgument("partitioned table insert missing partition column value".to_string())
    })?;

    let spec = partitions
        .values()
        .find(|spec| spec.values.contains(value))
        .ok_or_else(|| DispatchError::NotFound(format!("no partition contains value {value:?}")))?;

    let nodes = gossip.get_nodes(Some(&spec.constraints))?;
    if nodes.is_empty() {
        return Err(DispatchError::NoEligiblePeer);
    }

    Ok(nodes
        .into_iter()
        .map(|(id, descriptor)| {
            if id == self_id {
                InsertTarget::Local
            } else {
                InsertTarget::Remote(descriptor)
            }
        })
        .collect())
}
