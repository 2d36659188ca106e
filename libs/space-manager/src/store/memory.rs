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
//! In-memory aggregate store.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use crate::{
    model::{AdminRegistry, Space, TenantId},
    store::{SpaceStore, StoreError, Version, Versioned},
};

/// An in-memory [SpaceStore] with optimistic versioning.
///
/// Clones share the same underlying state, so the store can be handed to
/// several managers at once.
#[derive(Debug, Clone, Default)]
pub struct MemorySpaceStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Spaces keyed by (tenant, space id).
    spaces: BTreeMap<(String, String), Versioned<Space>>,
    /// Admin registries keyed by tenant.
    registries: BTreeMap<String, Versioned<AdminRegistry>>,
}

impl MemorySpaceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpaceStore for MemorySpaceStore {
    fn list_spaces(&self, tenant: &TenantId) -> Result<Vec<Versioned<Space>>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .spaces
            .values()
            .filter(|versioned| versioned.value.tenant_id == *tenant)
            .cloned()
            .collect())
    }

    fn fetch_space(&self, tenant: &TenantId, name: &str) -> Result<Versioned<Space>, StoreError> {
        let inner = self.inner.read().unwrap();
        inner
            .spaces
            .values()
            .find(|versioned| {
                versioned.value.tenant_id == *tenant
                    && versioned.value.name.eq_ignore_ascii_case(name)
            })
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn insert_space(&self, space: Space) -> Result<Version, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let key = (space.tenant_id.to_string(), space.id.clone());
        if inner.spaces.contains_key(&key) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "space id {} already exists",
                space.id
            )));
        }
        let version = Version::initial();
        inner.spaces.insert(key, Versioned { value: space, version });
        Ok(version)
    }

    fn replace_space(&self, space: Space, expected: Version) -> Result<Version, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let key = (space.tenant_id.to_string(), space.id.clone());
        let stored = inner.spaces.get_mut(&key).ok_or(StoreError::NotFound)?;
        if stored.version != expected {
            return Err(StoreError::VersionConflict);
        }
        stored.value = space;
        stored.version = expected.next();
        Ok(stored.version)
    }

    fn delete_space(&self, tenant: &TenantId, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner
            .spaces
            .remove(&(tenant.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn fetch_admin_registry(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<Versioned<AdminRegistry>>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.registries.get(&tenant.to_string()).cloned())
    }

    fn upsert_admin_registry(
        &self,
        registry: AdminRegistry,
        expected: Option<Version>,
    ) -> Result<Version, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let key = registry.tenant_id.to_string();
        match (inner.registries.get_mut(&key), expected) {
            (None, None) => {
                let version = Version::initial();
                inner.registries.insert(
                    key,
                    Versioned {
                        value: registry,
                        version,
                    },
                );
                Ok(version)
            }
            (Some(stored), Some(expected)) if stored.version == expected => {
                stored.value = registry;
                stored.version = expected.next();
                Ok(stored.version)
            }
            // Created concurrently, deleted concurrently, or stale version.
            _ => Err(StoreError::VersionConflict),
        }
    }
}
