// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Address-space utilization accounting.
//!
//! Pure recursion over the materialized space tree. For each node `size` is
//! the address count of its own range and `used` is the sum of the address
//! counts of the strictly contained child ranges. Sums accumulate without
//! deduplication: inputs that overlap (which attach-time validation normally
//! prevents) are double-counted.

use ipam_cidr_set::set::CidrSet;
use ipnet::Ipv4Net;

use crate::{
    directory::{find_network, VirtualNetwork},
    model::{Block, NetworkId, Space},
};

/// Utilization of a whole space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceUtilization {
    /// Total address count of all blocks.
    pub size: u64,
    /// Addresses consumed by attached network prefixes across all blocks.
    pub used: u64,
    /// Per-block breakdown, in block order.
    pub blocks: Vec<BlockUtilization>,
}

/// Utilization of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockUtilization {
    /// The block name.
    pub name: String,
    /// Address count of the block range.
    pub size: u64,
    /// Addresses consumed by attached network prefixes.
    pub used: u64,
    /// Per-attachment breakdown, resolved attachments only.
    pub networks: Vec<NetworkUtilization>,
}

/// Utilization of one attached network within a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkUtilization {
    /// The network identifier.
    pub id: NetworkId,
    /// Address count of the network's prefixes clipped to the block.
    pub size: u64,
    /// Addresses consumed by the network's subnets.
    pub used: u64,
    /// Per-subnet breakdown.
    pub subnets: Vec<SubnetUtilization>,
}

/// Utilization of one subnet of an attached network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetUtilization {
    /// The subnet name.
    pub name: String,
    /// Address count of the subnet prefix.
    pub size: u64,
}

fn addr_count(net: Ipv4Net) -> u64 {
    CidrSet::from_net(net).addr_count()
}

/// Computes the utilization of a space against the given directory listing.
pub fn space_utilization(space: &Space, networks: &[VirtualNetwork]) -> SpaceUtilization {
    let mut utilization = SpaceUtilization {
        size: 0,
        used: 0,
        blocks: Vec::with_capacity(space.blocks.len()),
    };
    for block in &space.blocks {
        let block_utilization = block_utilization(block, networks);
        utilization.size += block_utilization.size;
        utilization.used += block_utilization.used;
        utilization.blocks.push(block_utilization);
    }
    utilization
}

/// Computes the utilization of one block against the given directory listing.
///
/// Attachments that do not resolve in the directory contribute nothing.
pub fn block_utilization(block: &Block, networks: &[VirtualNetwork]) -> BlockUtilization {
    let mut utilization = BlockUtilization {
        name: block.name.clone(),
        size: addr_count(block.cidr),
        used: 0,
        networks: Vec::new(),
    };

    for attachment in &block.attachments {
        let Some(network) = find_network(networks, &attachment.id) else {
            continue;
        };
        let clipped = network.prefixes_within(block.cidr);
        let clipped_set = CidrSet::from_nets(clipped.iter().copied());
        let size: u64 = clipped.iter().map(|prefix| addr_count(*prefix)).sum();
        utilization.used += size;

        let subnets: Vec<SubnetUtilization> = network
            .subnets
            .iter()
            .filter(|subnet| clipped_set.contains_net(subnet.prefix))
            .map(|subnet| {
                SubnetUtilization {
                    name: subnet.name.clone(),
                    size: addr_count(subnet.prefix),
                }
            })
            .collect();
        let used = subnets.iter().map(|subnet| subnet.size).sum();

        utilization.networks.push(NetworkUtilization {
            id: attachment.id.clone(),
            size,
            used,
            subnets,
        });
    }
    utilization
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        directory::SubnetInfo,
        model::{AttachmentRef, TenantId},
    };

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    fn network(id: &str, prefixes: &[&str], subnets: &[(&str, &str)]) -> VirtualNetwork {
        VirtualNetwork {
            id: NetworkId::new(id),
            prefixes: prefixes.iter().map(|p| net(p)).collect(),
            subnets: subnets
                .iter()
                .map(|(name, prefix)| {
                    SubnetInfo {
                        name: name.to_string(),
                        prefix: net(prefix),
                    }
                })
                .collect(),
        }
    }

    fn space_with_blocks(blocks: Vec<Block>) -> Space {
        Space {
            id: "s1".to_string(),
            tenant_id: TenantId::new("t1"),
            name: "corp".to_string(),
            desc: "test".to_string(),
            blocks,
        }
    }

    fn block(name: &str, cidr: &str, attachment_ids: &[&str]) -> Block {
        Block {
            name: name.to_string(),
            cidr: net(cidr),
            attachments: attachment_ids
                .iter()
                .map(|id| {
                    AttachmentRef {
                        id: NetworkId::new(*id),
                        active: true,
                    }
                })
                .collect(),
            reservations: Vec::new(),
        }
    }

    #[test]
    fn test_space_utilization_sums_blocks() {
        let space = space_with_blocks(vec![
            block("a", "10.0.0.0/24", &["net-1"]),
            block("b", "10.1.0.0/24", &[]),
        ]);
        let networks = vec![network(
            "net-1",
            &["10.0.0.0/25"],
            &[("snet-1", "10.0.0.0/26"), ("snet-2", "10.0.0.64/27")],
        )];

        let utilization = space_utilization(&space, &networks);
        assert_eq!(utilization.size, 512);
        assert_eq!(utilization.used, 128);

        let first = &utilization.blocks[0];
        assert_eq!(first.size, 256);
        assert_eq!(first.used, 128);
        assert_eq!(first.networks.len(), 1);
        assert_eq!(first.networks[0].size, 128);
        assert_eq!(first.networks[0].used, 64 + 32);
        assert_eq!(first.networks[0].subnets.len(), 2);

        let second = &utilization.blocks[1];
        assert_eq!(second.size, 256);
        assert_eq!(second.used, 0);
        assert!(second.networks.is_empty());
    }

    #[test]
    fn test_prefixes_outside_block_are_ignored() {
        let space = space_with_blocks(vec![block("a", "10.0.0.0/24", &["net-1"])]);
        let networks = vec![network("net-1", &["10.0.0.0/25", "192.168.0.0/24"], &[])];

        let utilization = space_utilization(&space, &networks);
        assert_eq!(utilization.used, 128, "only the clipped prefix counts");
    }

    #[test]
    fn test_unresolved_attachment_contributes_nothing() {
        let space = space_with_blocks(vec![block("a", "10.0.0.0/24", &["gone"])]);

        let utilization = space_utilization(&space, &[]);
        assert_eq!(utilization.used, 0);
        assert!(utilization.blocks[0].networks.is_empty());
    }

    #[test]
    fn test_overlapping_inputs_double_count() {
        // Two attachments with overlapping prefixes: the sums do not
        // deduplicate.
        let space = space_with_blocks(vec![block("a", "10.0.0.0/24", &["net-1", "net-2"])]);
        let networks = vec![
            network("net-1", &["10.0.0.0/25"], &[]),
            network("net-2", &["10.0.0.0/26"], &[]),
        ];

        let utilization = space_utilization(&space, &networks);
        assert_eq!(utilization.used, 128 + 64);
    }
}
