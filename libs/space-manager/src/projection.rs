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
//! Role-dependent views over the space aggregate.
//!
//! One canonical aggregate, explicit projection functions. The caller's role
//! selects what is visible: admins see every reservation, regular users only
//! their own. Expansion inlines directory data, utilization decorates the
//! view with size/used counters.

use ipam_cidr_set::set::CidrSet;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    directory::{find_network, VirtualNetwork},
    identity::Caller,
    model::{Block, NetworkId, Reservation, Space},
    utilization::{space_utilization, BlockUtilization, NetworkUtilization},
};

/// Options shaping a read of the space hierarchy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOptions {
    /// Inline directory data for attached networks. Admin only.
    pub expand: bool,
    /// Decorate the view with size/used counters.
    pub utilization: bool,
}

/// A view of a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpaceView {
    /// Space identifier.
    pub id: String,
    /// Space name.
    pub name: String,
    /// Space description.
    pub desc: String,
    /// Views of the blocks of the space.
    pub blocks: Vec<BlockView>,
    /// Total address count; populated by the utilization option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Consumed address count; populated by the utilization option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
}

/// A view of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BlockView {
    /// Block name.
    pub name: String,
    /// The block range.
    #[schema(value_type = String)]
    pub cidr: Ipv4Net,
    /// The attached networks.
    pub networks: Vec<NetworkView>,
    /// The reservations visible to the caller.
    pub reservations: Vec<Reservation>,
    /// Address count of the block range; populated by the utilization option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Consumed address count; populated by the utilization option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
}

/// A view of an attached network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NetworkView {
    /// External network identifier.
    pub id: NetworkId,
    /// Whether the attachment is active.
    pub active: bool,
    /// Directory data, populated in expanded views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<NetworkDetail>,
    /// Clipped address count; populated by the utilization option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Addresses consumed by subnets; populated by the utilization option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
}

/// Directory data of an attached network, clipped to the owning block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NetworkDetail {
    /// The prefixes inside the owning block.
    #[schema(value_type = Vec<String>)]
    pub prefixes: Vec<Ipv4Net>,
    /// The subnets within those prefixes.
    pub subnets: Vec<SubnetView>,
}

/// A view of a subnet of an attached network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubnetView {
    /// Subnet name.
    pub name: String,
    /// The subnet prefix.
    #[schema(value_type = String)]
    pub prefix: Ipv4Net,
    /// Address count; populated by the utilization option.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Projects a space for the given caller.
pub fn space_view(
    space: &Space,
    caller: &Caller,
    networks: &[VirtualNetwork],
    options: &ViewOptions,
) -> SpaceView {
    let utilization = options
        .utilization
        .then(|| space_utilization(space, networks));

    let blocks = space
        .blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            project_block(
                block,
                caller,
                networks,
                options,
                utilization.as_ref().map(|u| &u.blocks[i]),
            )
        })
        .collect();

    SpaceView {
        id: space.id.clone(),
        name: space.name.clone(),
        desc: space.desc.clone(),
        blocks,
        size: utilization.as_ref().map(|u| u.size),
        used: utilization.as_ref().map(|u| u.used),
    }
}

/// Projects a single block for the given caller.
pub fn block_view(
    block: &Block,
    caller: &Caller,
    networks: &[VirtualNetwork],
    options: &ViewOptions,
) -> BlockView {
    let utilization = options
        .utilization
        .then(|| crate::utilization::block_utilization(block, networks));
    project_block(block, caller, networks, options, utilization.as_ref())
}

fn project_block(
    block: &Block,
    caller: &Caller,
    networks: &[VirtualNetwork],
    options: &ViewOptions,
    utilization: Option<&BlockUtilization>,
) -> BlockView {
    let network_views = block
        .attachments
        .iter()
        .filter_map(|attachment| {
            let resolved = find_network(networks, &attachment.id);
            if options.expand && resolved.is_none() {
                // Expanded views drop attachments the directory no longer
                // knows about.
                return None;
            }
            let network_utilization =
                utilization.and_then(|u| find_network_utilization(u, &attachment.id));
            let detail = if options.expand {
                resolved.map(|network| {
                    let prefixes = network.prefixes_within(block.cidr);
                    let clipped = CidrSet::from_nets(prefixes.iter().copied());
                    let subnets = network
                        .subnets
                        .iter()
                        .filter(|subnet| clipped.contains_net(subnet.prefix))
                        .map(|subnet| {
                            SubnetView {
                                name: subnet.name.clone(),
                                prefix: subnet.prefix,
                                size: options
                                    .utilization
                                    .then(|| CidrSet::from_net(subnet.prefix).addr_count()),
                            }
                        })
                        .collect();
                    NetworkDetail { prefixes, subnets }
                })
            } else {
                None
            };
            Some(NetworkView {
                id: attachment.id.clone(),
                active: attachment.active,
                detail,
                size: network_utilization.map(|u| u.size),
                used: network_utilization.map(|u| u.used),
            })
        })
        .collect();

    let reservations = block
        .reservations
        .iter()
        .filter(|reservation| caller.is_admin() || reservation.user_id == caller.user_id)
        .cloned()
        .collect();

    BlockView {
        name: block.name.clone(),
        cidr: block.cidr,
        networks: network_views,
        reservations,
        size: utilization.map(|u| u.size),
        used: utilization.map(|u| u.used),
    }
}

fn find_network_utilization<'a>(
    utilization: &'a BlockUtilization,
    id: &NetworkId,
) -> Option<&'a NetworkUtilization> {
    utilization.networks.iter().find(|network| &network.id == id)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        directory::SubnetInfo,
        model::{AttachmentRef, TenantId, UserId, RESERVATION_STATUS_WAIT},
    };

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    fn reservation(id: &str, cidr: &str, user: &str) -> Reservation {
        Reservation {
            id: id.to_string(),
            cidr: net(cidr),
            user_id: UserId::new(user),
            created_on: Utc::now(),
            status: RESERVATION_STATUS_WAIT.to_string(),
        }
    }

    fn sample_space() -> Space {
        Space {
            id: "s1".to_string(),
            tenant_id: TenantId::new("t1"),
            name: "corp".to_string(),
            desc: "test".to_string(),
            blocks: vec![Block {
                name: "BlockA".to_string(),
                cidr: net("10.0.0.0/24"),
                attachments: vec![
                    AttachmentRef {
                        id: NetworkId::new("net-1"),
                        active: true,
                    },
                    AttachmentRef {
                        id: NetworkId::new("gone"),
                        active: true,
                    },
                ],
                reservations: vec![
                    reservation("r1", "10.0.0.128/27", "alice"),
                    reservation("r2", "10.0.0.160/27", "bob"),
                ],
            }],
        }
    }

    fn directory_networks() -> Vec<VirtualNetwork> {
        vec![VirtualNetwork {
            id: NetworkId::new("net-1"),
            prefixes: vec![net("10.0.0.0/26"), net("192.168.0.0/24")],
            subnets: vec![SubnetInfo {
                name: "snet-1".to_string(),
                prefix: net("10.0.0.0/27"),
            }],
        }]
    }

    #[test]
    fn test_admin_sees_all_reservations() {
        let view = space_view(
            &sample_space(),
            &Caller::admin(UserId::new("root")),
            &[],
            &ViewOptions::default(),
        );
        assert_eq!(view.blocks[0].reservations.len(), 2);
        assert!(view.size.is_none());
    }

    #[test]
    fn test_user_sees_only_own_reservations() {
        let view = space_view(
            &sample_space(),
            &Caller::user(UserId::new("alice")),
            &[],
            &ViewOptions::default(),
        );
        let reservations = &view.blocks[0].reservations;
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].id, "r1");
    }

    #[test]
    fn test_expand_inlines_directory_data_and_drops_unresolved() {
        let view = space_view(
            &sample_space(),
            &Caller::admin(UserId::new("root")),
            &directory_networks(),
            &ViewOptions {
                expand: true,
                utilization: false,
            },
        );
        let networks = &view.blocks[0].networks;
        assert_eq!(networks.len(), 1, "unresolved attachments are dropped");
        let detail = networks[0].detail.as_ref().unwrap();
        assert_eq!(detail.prefixes, vec![net("10.0.0.0/26")]);
        assert_eq!(detail.subnets.len(), 1);
        assert!(detail.subnets[0].size.is_none());
    }

    #[test]
    fn test_utilization_decorates_view() {
        let view = space_view(
            &sample_space(),
            &Caller::admin(UserId::new("root")),
            &directory_networks(),
            &ViewOptions {
                expand: false,
                utilization: true,
            },
        );
        assert_eq!(view.size, Some(256));
        assert_eq!(view.used, Some(64));
        let block = &view.blocks[0];
        assert_eq!(block.size, Some(256));
        assert_eq!(block.used, Some(64));
        // Non-expanded views keep unresolved attachments, without counters.
        assert_eq!(block.networks.len(), 2);
        assert_eq!(block.networks[0].size, Some(64));
        assert_eq!(block.networks[0].used, Some(32));
        assert_eq!(block.networks[1].size, None);
    }

    #[test]
    fn test_view_serializes_without_unset_counters() {
        let view = space_view(
            &sample_space(),
            &Caller::admin(UserId::new("root")),
            &[],
            &ViewOptions::default(),
        );
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("size").is_none());
        assert!(json["blocks"][0].get("used").is_none());
    }
}
