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
//! Request and response payloads of the space manager.

use chrono::{DateTime, Utc};
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::UserId;

/// Request to create a new space.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSpaceRequest {
    /// Name of the space.
    pub name: String,
    /// A description for the space.
    pub desc: String,
}

/// Request to create a new block within a space.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBlockRequest {
    /// Name of the block.
    pub name: String,
    /// IPv4 CIDR range of the block.
    #[schema(value_type = String)]
    pub cidr: Ipv4Net,
}

/// Request to reserve a range within a specific block.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockReservationRequest {
    /// Network mask bits of the requested range.
    pub size: u8,
    /// Reserve as close to the end of the block as possible.
    #[serde(default)]
    pub reverse_search: bool,
    /// Reserve out of the smallest free range that still fits, keeping large
    /// free ranges intact.
    #[serde(default)]
    pub smallest_cidr: bool,
}

/// Request to reserve a range from the first fitting block of a list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpaceReservationRequest {
    /// Candidate block names, evaluated in the order provided.
    pub blocks: Vec<String>,
    /// Network mask bits of the requested range.
    pub size: u8,
    /// Reserve as close to the end of the block as possible.
    #[serde(default)]
    pub reverse_search: bool,
    /// Reserve out of the smallest free range that still fits.
    #[serde(default)]
    pub smallest_cidr: bool,
}

/// A freshly created reservation, echoed with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatedReservation {
    /// Reservation identifier.
    pub id: String,
    /// The reserved range.
    #[schema(value_type = String)]
    pub cidr: Ipv4Net,
    /// The owning user.
    pub user_id: UserId,
    /// Creation time.
    pub created_on: DateTime<Utc>,
    /// Provisioning status.
    pub status: String,
    /// Name of the space the reservation was made in.
    pub space: String,
    /// Name of the block the range was taken from.
    pub block: String,
}
