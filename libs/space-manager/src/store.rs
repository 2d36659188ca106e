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
//! Versioned aggregate storage.
//!
//! The store persists whole aggregates and offers a version-conditioned
//! replace as its only mutation primitive. Concurrency control is entirely
//! optimistic: a replace is accepted only if the caller presents the version
//! it previously read.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AdminRegistry, Space, TenantId};

pub mod memory;

/// The version of a stored aggregate.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The version of a freshly inserted aggregate.
    pub fn initial() -> Self {
        Self(0)
    }

    /// The version following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// An aggregate together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// The aggregate.
    pub value: T,
    /// The version the aggregate was read at.
    pub version: Version,
}

/// Aggregate store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No aggregate matches the lookup.
    #[error("aggregate not found")]
    NotFound,
    /// The presented version no longer matches the stored one.
    #[error("version conflict")]
    VersionConflict,
    /// The storage backend failed.
    #[error("storage backend error")]
    Backend(#[from] anyhow::Error),
}

/// Storage of space aggregates and tenant admin registries.
pub trait SpaceStore {
    /// Lists all spaces of a tenant.
    fn list_spaces(&self, tenant: &TenantId) -> Result<Vec<Versioned<Space>>, StoreError>;

    /// Fetches a space by name, case-insensitively.
    fn fetch_space(&self, tenant: &TenantId, name: &str) -> Result<Versioned<Space>, StoreError>;

    /// Inserts a new space aggregate.
    fn insert_space(&self, space: Space) -> Result<Version, StoreError>;

    /// Replaces a space aggregate if its stored version still matches
    /// `expected`.
    fn replace_space(&self, space: Space, expected: Version) -> Result<Version, StoreError>;

    /// Deletes a space aggregate by id.
    fn delete_space(&self, tenant: &TenantId, id: &str) -> Result<(), StoreError>;

    /// Fetches the tenant's admin registry, if one exists.
    fn fetch_admin_registry(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<Versioned<AdminRegistry>>, StoreError>;

    /// Creates or replaces the tenant's admin registry.
    ///
    /// With `expected: None` the registry must not exist yet; with
    /// `expected: Some(version)` the stored version must still match.
    fn upsert_admin_registry(
        &self,
        registry: AdminRegistry,
        expected: Option<Version>,
    ) -> Result<Version, StoreError>;
}
