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
//! The space aggregate and its embedded records.

use chrono::{DateTime, Utc};
use derive_more::Display;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a freshly created reservation. Transitioning a reservation out
/// of this state is owned by an external provisioning process.
pub const RESERVATION_STATUS_WAIT: &str = "wait";

/// The tenant identifier.
#[derive(
    Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new tenant identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// The identity of a user, as resolved by the identity layer.
#[derive(
    Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Opaque identifier of an externally managed virtual network.
#[derive(
    Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    /// Creates a new network identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Case-insensitive comparison; external resource identifiers are not
    /// case-normalized at their source.
    pub fn eq_ignore_case(&self, other: &NetworkId) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

/// Identifier of an external subscription.
#[derive(
    Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Creates a new subscription identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// The tenant-scoped root aggregate of the address hierarchy.
///
/// A space owns its blocks exclusively; the whole aggregate is read and
/// written as one unit under optimistic versioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Space {
    /// Unique identifier of the space.
    pub id: String,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Name, unique within the tenant (case-insensitive).
    pub name: String,
    /// Free-form description.
    pub desc: String,
    /// The blocks carved out of this space.
    pub blocks: Vec<Block>,
}

impl Space {
    /// Looks up a block by name, case-insensitively.
    pub fn find_block(&self, name: &str) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|block| block.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a block by name, case-insensitively, for mutation.
    pub fn find_block_mut(&mut self, name: &str) -> Option<&mut Block> {
        self.blocks
            .iter_mut()
            .find(|block| block.name.eq_ignore_ascii_case(name))
    }
}

/// A CIDR range managed within a space, the unit of allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Name, unique within the space (case-insensitive).
    pub name: String,
    /// The address range of the block. Never overlaps a sibling block.
    #[schema(value_type = String)]
    pub cidr: Ipv4Net,
    /// External networks attached to this block.
    pub attachments: Vec<AttachmentRef>,
    /// Reservations carved out of this block.
    pub reservations: Vec<Reservation>,
}

impl Block {
    /// Returns true if the network is attached to this block.
    pub fn has_attachment(&self, id: &NetworkId) -> bool {
        self.attachments.iter().any(|attachment| &attachment.id == id)
    }

    /// Looks up a reservation by id.
    pub fn find_reservation(&self, id: &str) -> Option<&Reservation> {
        self.reservations
            .iter()
            .find(|reservation| reservation.id == id)
    }
}

/// Reference to an externally managed network attached to a block.
///
/// Only the reference is stored; the network's address prefixes are resolved
/// live from the network directory and clipped to the owning block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttachmentRef {
    /// External network identifier.
    pub id: NetworkId,
    /// Whether the attachment is active.
    pub active: bool,
}

/// A sub-range of a block held by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    /// Short globally unique identifier.
    pub id: String,
    /// The reserved range, a subset of the owning block's range.
    #[schema(value_type = String)]
    pub cidr: Ipv4Net,
    /// The user that created the reservation.
    pub user_id: UserId,
    /// Creation time.
    pub created_on: DateTime<Utc>,
    /// Provisioning status, created as [RESERVATION_STATUS_WAIT].
    pub status: String,
}

/// Per-tenant record of service administrators and excluded subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdminRegistry {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// The administrator identities.
    pub admins: Vec<Admin>,
    /// Subscriptions excluded from discovery, kept unique and ordered.
    pub exclusions: Vec<SubscriptionId>,
}

impl AdminRegistry {
    /// Creates an empty registry for the tenant.
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            admins: Vec::new(),
            exclusions: Vec::new(),
        }
    }
}

/// A service administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Admin {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Directory object id of the administrator.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> Space {
        Space {
            id: "s1".to_string(),
            tenant_id: TenantId::new("tenant-a"),
            name: "corp".to_string(),
            desc: "Corporate address space".to_string(),
            blocks: vec![Block {
                name: "BlockA".to_string(),
                cidr: "10.0.0.0/16".parse().unwrap(),
                attachments: vec![AttachmentRef {
                    id: NetworkId::new("net-1"),
                    active: true,
                }],
                reservations: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_find_block_is_case_insensitive() {
        let space = space();
        assert!(space.find_block("blocka").is_some());
        assert!(space.find_block("BLOCKA").is_some());
        assert!(space.find_block("blockb").is_none());
    }

    #[test]
    fn test_network_id_case_insensitive_eq() {
        let a = NetworkId::new("/subscriptions/A/networks/One");
        let b = NetworkId::new("/subscriptions/a/networks/one");
        assert!(a.eq_ignore_case(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_space_serde_roundtrip() {
        let space = space();
        let json = serde_json::to_string(&space).unwrap();
        let parsed: Space = serde_json::from_str(&json).unwrap();
        assert_eq!(space, parsed);
    }
}
