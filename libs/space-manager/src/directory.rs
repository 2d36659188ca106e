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
//! External network directory boundary.
//!
//! The directory is the authority on externally managed virtual networks and
//! their address prefixes. The engine queries it fresh on every request and
//! never caches results; only attachment references are persisted.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::{NetworkId, SubscriptionId};

/// Network directory errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory could not be queried.
    #[error("network directory unavailable")]
    Unavailable(#[source] anyhow::Error),
}

/// An externally managed virtual network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VirtualNetwork {
    /// External resource identifier.
    pub id: NetworkId,
    /// The address prefixes of the network.
    #[schema(value_type = Vec<String>)]
    pub prefixes: Vec<Ipv4Net>,
    /// The subnets carved out of the network.
    pub subnets: Vec<SubnetInfo>,
}

impl VirtualNetwork {
    /// Returns the prefixes that lie fully inside the given block range.
    pub fn prefixes_within(&self, block: Ipv4Net) -> Vec<Ipv4Net> {
        self.prefixes
            .iter()
            .copied()
            .filter(|prefix| block.contains(prefix))
            .collect()
    }
}

/// A subnet of a virtual network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubnetInfo {
    /// Subnet name.
    pub name: String,
    /// The subnet prefix.
    #[schema(value_type = String)]
    pub prefix: Ipv4Net,
}

/// Query interface of the external network directory.
pub trait NetworkDirectory {
    /// Lists all virtual networks visible to the service.
    fn list_networks(&self) -> Result<Vec<VirtualNetwork>, DirectoryError>;

    /// Lists all known subscription identifiers.
    fn list_subscriptions(&self) -> Result<Vec<SubscriptionId>, DirectoryError>;
}

/// Looks up a network by id, case-insensitively.
pub fn find_network<'a>(
    networks: &'a [VirtualNetwork],
    id: &NetworkId,
) -> Option<&'a VirtualNetwork> {
    networks.iter().find(|network| network.id.eq_ignore_case(id))
}

/// A directory backed by a fixed in-memory listing, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedNetworkDirectory {
    networks: Vec<VirtualNetwork>,
    subscriptions: Vec<SubscriptionId>,
}

impl FixedNetworkDirectory {
    /// Creates a directory returning the given listings.
    pub fn new(networks: Vec<VirtualNetwork>, subscriptions: Vec<SubscriptionId>) -> Self {
        Self {
            networks,
            subscriptions,
        }
    }
}

impl NetworkDirectory for FixedNetworkDirectory {
    fn list_networks(&self) -> Result<Vec<VirtualNetwork>, DirectoryError> {
        Ok(self.networks.clone())
    }

    fn list_subscriptions(&self) -> Result<Vec<SubscriptionId>, DirectoryError> {
        Ok(self.subscriptions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_within_filters_to_contained() {
        let network = VirtualNetwork {
            id: NetworkId::new("net-1"),
            prefixes: vec![
                "10.0.0.0/25".parse().unwrap(),
                "10.0.4.0/24".parse().unwrap(),
                "192.168.0.0/24".parse().unwrap(),
            ],
            subnets: Vec::new(),
        };

        let clipped = network.prefixes_within("10.0.0.0/22".parse().unwrap());
        assert_eq!(
            clipped,
            vec!["10.0.0.0/25".parse::<Ipv4Net>().unwrap()],
            "only fully contained prefixes survive clipping"
        );
    }

    #[test]
    fn test_find_network_is_case_insensitive() {
        let networks = vec![VirtualNetwork {
            id: NetworkId::new("/Networks/One"),
            prefixes: Vec::new(),
            subnets: Vec::new(),
        }];

        assert!(find_network(&networks, &NetworkId::new("/networks/one")).is_some());
        assert!(find_network(&networks, &NetworkId::new("/networks/two")).is_none());
    }
}
