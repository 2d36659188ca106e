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
//! Tenant admin registry operations.
//!
//! The registry is a per-tenant singleton aggregate holding the admin
//! identities and the excluded subscriptions. It is fetched on demand and
//! mutated under the same optimistic discipline as the space aggregates.

use crate::{
    directory::NetworkDirectory,
    error::Error,
    identity::{ensure_admin, Caller},
    model::{Admin, AdminRegistry, SubscriptionId, TenantId},
    retry,
    store::SpaceStore,
};

/// Manager of the per-tenant admin registry.
pub struct AdminManager<S, D> {
    store: S,
    directory: D,
    max_attempts: usize,
}

impl<S: SpaceStore, D: NetworkDirectory> AdminManager<S, D> {
    /// Creates a new admin manager.
    pub fn new(store: S, directory: D) -> Self {
        Self {
            store,
            directory,
            max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the maximum number of optimistic attempts per mutation.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Runs a read-modify-write mutation of the tenant's registry, creating
    /// an empty one on first use.
    fn mutate_registry<T>(
        &self,
        tenant: &TenantId,
        op: impl FnMut(&mut AdminRegistry) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let store = &self.store;
        retry::mutate(
            self.max_attempts,
            || {
                let registry = store.fetch_admin_registry(tenant).map_err(Error::Store)?;
                Ok(match registry {
                    Some(versioned) => (versioned.value, Some(versioned.version)),
                    None => (AdminRegistry::new(tenant.clone()), None),
                })
            },
            op,
            |registry, expected| store.upsert_admin_registry(registry, expected).map(|_| ()),
        )
    }

    fn fetch_registry(&self, tenant: &TenantId) -> Result<AdminRegistry, Error> {
        Ok(self
            .store
            .fetch_admin_registry(tenant)
            .map_err(Error::Store)?
            .map(|versioned| versioned.value)
            .unwrap_or_else(|| AdminRegistry::new(tenant.clone())))
    }

    /// Validates that every subscription id exists in the directory.
    fn ensure_known_subscriptions(&self, subscriptions: &[SubscriptionId]) -> Result<(), Error> {
        let known = self.directory.list_subscriptions()?;
        let unknown: Vec<&SubscriptionId> = subscriptions
            .iter()
            .filter(|subscription| !known.contains(subscription))
            .collect();
        if !unknown.is_empty() {
            return Err(Error::NotFound(format!("subscription id(s) {unknown:?}")));
        }
        Ok(())
    }
}

// Admins
impl<S: SpaceStore, D: NetworkDirectory> AdminManager<S, D> {
    /// Lists the tenant's admins. Admin only.
    pub fn list_admins(&self, caller: &Caller, tenant: &TenantId) -> Result<Vec<Admin>, Error> {
        ensure_admin(caller)?;
        Ok(self.fetch_registry(tenant)?.admins)
    }

    /// Adds an admin. Admin only.
    pub fn create_admin(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        admin: Admin,
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        self.mutate_registry(tenant, |registry| {
            if registry.admins.iter().any(|existing| existing.id == admin.id) {
                return Err(Error::Conflict("user is already an admin".to_string()));
            }
            registry.admins.push(admin.clone());
            Ok(())
        })?;
        tracing::info!(admin = %admin.id, %tenant, "added admin");
        Ok(())
    }

    /// Replaces the admin list. Admin only.
    pub fn replace_admins(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        admins: Vec<Admin>,
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        for (i, admin) in admins.iter().enumerate() {
            if admins[..i].iter().any(|other| other.id == admin.id) {
                return Err(Error::Conflict(
                    "list contains one or more duplicate object ids".to_string(),
                ));
            }
        }
        self.mutate_registry(tenant, |registry| {
            registry.admins = admins.clone();
            Ok(())
        })
    }

    /// Removes an admin by object id. Admin only.
    pub fn delete_admin(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        object_id: &str,
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        self.mutate_registry(tenant, |registry| {
            let index = registry
                .admins
                .iter()
                .position(|admin| admin.id == object_id)
                .ok_or_else(|| Error::NotFound(format!("admin '{object_id}'")))?;
            registry.admins.remove(index);
            Ok(())
        })?;
        tracing::info!(admin = object_id, %tenant, "removed admin");
        Ok(())
    }
}

// Exclusions
impl<S: SpaceStore, D: NetworkDirectory> AdminManager<S, D> {
    /// Lists the excluded subscriptions. Admin only.
    pub fn list_exclusions(
        &self,
        caller: &Caller,
        tenant: &TenantId,
    ) -> Result<Vec<SubscriptionId>, Error> {
        ensure_admin(caller)?;
        Ok(self.fetch_registry(tenant)?.exclusions)
    }

    /// Adds subscriptions to the exclusion set. Admin only.
    ///
    /// Every id must exist in the directory's subscription listing.
    pub fn add_exclusions(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        subscriptions: &[SubscriptionId],
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        self.ensure_known_subscriptions(subscriptions)?;
        self.mutate_registry(tenant, |registry| {
            for subscription in subscriptions {
                if !registry.exclusions.contains(subscription) {
                    registry.exclusions.push(subscription.clone());
                }
            }
            registry.exclusions.sort();
            Ok(())
        })
    }

    /// Replaces the exclusion set. Admin only.
    pub fn replace_exclusions(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        subscriptions: &[SubscriptionId],
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        self.ensure_known_subscriptions(subscriptions)?;
        self.mutate_registry(tenant, |registry| {
            let mut exclusions = subscriptions.to_vec();
            exclusions.sort();
            exclusions.dedup();
            registry.exclusions = exclusions;
            Ok(())
        })
    }

    /// Removes one subscription from the exclusion set. Admin only.
    pub fn remove_exclusion(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        subscription: &SubscriptionId,
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        self.mutate_registry(tenant, |registry| {
            let index = registry
                .exclusions
                .iter()
                .position(|excluded| excluded == subscription)
                .ok_or_else(|| Error::NotFound(format!("subscription id '{subscription}'")))?;
            registry.exclusions.remove(index);
            Ok(())
        })
    }
}
