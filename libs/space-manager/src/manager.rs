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
//! Space management operations.
//!
//! [SpaceManager] implements every operation on the space hierarchy. All
//! mutations run as read-modify-write cycles against the aggregate store:
//! fetch the space, validate and compute against the fresh copy, then commit
//! with a version-conditioned replace, retrying bounded times on conflicts.

use chrono::Utc;
use ipam_cidr_set::{
    allocator::{self, AllocationError},
    set::CidrSet,
};
use ipam_utils::shortid::short_id;
use rand_chacha::ChaCha8Rng;

use crate::{
    directory::{find_network, NetworkDirectory, VirtualNetwork},
    error::Error,
    identity::{ensure_admin, Caller},
    manager::dto::{
        BlockReservationRequest, CreateBlockRequest, CreateSpaceRequest, CreatedReservation,
        SpaceReservationRequest,
    },
    model::{
        AttachmentRef, Block, NetworkId, Reservation, Space, TenantId, RESERVATION_STATUS_WAIT,
    },
    projection::{block_view, space_view, BlockView, SpaceView, ViewOptions},
    retry,
    store::{SpaceStore, StoreError, Versioned},
    validate,
};

pub mod dto;

/// Manager of tenant address spaces.
///
/// Holds the store and directory collaborators and a seeded RNG for
/// reservation identifier generation. All concurrency control is optimistic;
/// the manager keeps no aggregate state between calls.
pub struct SpaceManager<S, D> {
    store: S,
    directory: D,
    rng: ChaCha8Rng,
    max_attempts: usize,
}

impl<S: SpaceStore, D: NetworkDirectory> SpaceManager<S, D> {
    /// Creates a new space manager.
    pub fn new(store: S, directory: D, rng: ChaCha8Rng) -> Self {
        Self {
            store,
            directory,
            rng,
            max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the maximum number of optimistic attempts per mutation.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    fn fetch_space(&self, tenant: &TenantId, name: &str) -> Result<Versioned<Space>, Error> {
        fetch_space(&self.store, tenant, name)
    }

    /// Runs a read-modify-write mutation of one space aggregate.
    fn mutate_space<T>(
        &self,
        tenant: &TenantId,
        space_name: &str,
        op: impl FnMut(&mut Space) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let store = &self.store;
        retry::mutate(
            self.max_attempts,
            || fetch_space(store, tenant, space_name).map(|v| (v.value, v.version)),
            op,
            |space, version| store.replace_space(space, version).map(|_| ()),
        )
    }
}

// Spaces
impl<S: SpaceStore, D: NetworkDirectory> SpaceManager<S, D> {
    /// Lists all spaces of the tenant, projected for the caller.
    ///
    /// The expand option is admin only; regular callers see only their own
    /// reservations.
    pub fn list_spaces(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        options: &ViewOptions,
    ) -> Result<Vec<SpaceView>, Error> {
        let networks = self.networks_for_view(caller, options)?;
        let spaces = self.store.list_spaces(tenant).map_err(Error::Store)?;
        Ok(spaces
            .iter()
            .map(|space| space_view(&space.value, caller, &networks, options))
            .collect())
    }

    /// Returns one space, projected for the caller.
    pub fn get_space(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        options: &ViewOptions,
    ) -> Result<SpaceView, Error> {
        let networks = self.networks_for_view(caller, options)?;
        let space = self.fetch_space(tenant, space_name)?;
        Ok(space_view(&space.value, caller, &networks, options))
    }

    /// Creates a new space. Admin only.
    pub fn create_space(
        &mut self,
        caller: &Caller,
        tenant: &TenantId,
        request: &CreateSpaceRequest,
    ) -> Result<Space, Error> {
        ensure_admin(caller)?;
        validate::validate_name("space name", &request.name)?;
        validate::validate_desc(&request.desc)?;

        let existing = self.store.list_spaces(tenant).map_err(Error::Store)?;
        validate::ensure_unique_name(
            "space",
            &request.name,
            existing.iter().map(|space| space.value.name.as_str()),
        )?;

        let space = Space {
            id: short_id(&mut self.rng),
            tenant_id: tenant.clone(),
            name: request.name.clone(),
            desc: request.desc.clone(),
            blocks: Vec::new(),
        };
        self.store.insert_space(space.clone()).map_err(Error::Store)?;
        tracing::info!(space = %space.name, %tenant, "created space");
        Ok(space)
    }

    /// Renames a space. Admin only.
    pub fn rename_space(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        new_name: &str,
    ) -> Result<Space, Error> {
        ensure_admin(caller)?;
        validate::validate_name("space name", new_name)?;

        let existing = self.store.list_spaces(tenant).map_err(Error::Store)?;
        validate::ensure_unique_name(
            "space",
            new_name,
            existing
                .iter()
                .map(|space| space.value.name.as_str())
                .filter(|name| !name.eq_ignore_ascii_case(space_name)),
        )?;

        self.mutate_space(tenant, space_name, |space| {
            space.name = new_name.to_string();
            Ok(space.clone())
        })
    }

    /// Replaces the description of a space. Admin only.
    pub fn redescribe_space(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        desc: &str,
    ) -> Result<Space, Error> {
        ensure_admin(caller)?;
        validate::validate_desc(desc)?;
        self.mutate_space(tenant, space_name, |space| {
            space.desc = desc.to_string();
            Ok(space.clone())
        })
    }

    /// Deletes a space. Admin only.
    ///
    /// Refused while the space still contains blocks, unless forced.
    pub fn delete_space(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        force: bool,
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        let space = self.fetch_space(tenant, space_name)?;
        if !force && !space.value.blocks.is_empty() {
            return Err(Error::Conflict(
                "cannot delete space while it contains blocks".to_string(),
            ));
        }
        self.store
            .delete_space(tenant, &space.value.id)
            .map_err(Error::Store)?;
        tracing::info!(space = %space.value.name, %tenant, "deleted space");
        Ok(())
    }

    fn networks_for_view(
        &self,
        caller: &Caller,
        options: &ViewOptions,
    ) -> Result<Vec<VirtualNetwork>, Error> {
        if options.expand && !caller.is_admin() {
            return Err(Error::Permission(
                "expand may only be used by admins".to_string(),
            ));
        }
        if options.expand || options.utilization {
            Ok(self.directory.list_networks()?)
        } else {
            Ok(Vec::new())
        }
    }
}

// Blocks
impl<S: SpaceStore, D: NetworkDirectory> SpaceManager<S, D> {
    /// Lists the blocks of a space, projected for the caller.
    pub fn list_blocks(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        options: &ViewOptions,
    ) -> Result<Vec<BlockView>, Error> {
        let networks = self.networks_for_view(caller, options)?;
        let space = self.fetch_space(tenant, space_name)?;
        Ok(space
            .value
            .blocks
            .iter()
            .map(|block| block_view(block, caller, &networks, options))
            .collect())
    }

    /// Returns one block, projected for the caller.
    pub fn get_block(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
        options: &ViewOptions,
    ) -> Result<BlockView, Error> {
        let networks = self.networks_for_view(caller, options)?;
        let space = self.fetch_space(tenant, space_name)?;
        let block = find_block(&space.value, block_name)?;
        Ok(block_view(block, caller, &networks, options))
    }

    /// Creates a new block within a space. Admin only.
    ///
    /// The block range must not overlap any sibling block.
    pub fn create_block(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        request: &CreateBlockRequest,
    ) -> Result<Block, Error> {
        ensure_admin(caller)?;
        validate::validate_name("block name", &request.name)?;
        validate::validate_cidr("block range", request.cidr)?;

        let block = self.mutate_space(tenant, space_name, |space| {
            validate::ensure_unique_name(
                "block",
                &request.name,
                space.blocks.iter().map(|block| block.name.as_str()),
            )?;
            let siblings = CidrSet::from_nets(space.blocks.iter().map(|block| block.cidr));
            validate::ensure_disjoint(
                request.cidr,
                &siblings,
                "new block cannot overlap existing blocks",
            )?;
            let block = Block {
                name: request.name.clone(),
                cidr: request.cidr,
                attachments: Vec::new(),
                reservations: Vec::new(),
            };
            space.blocks.push(block.clone());
            Ok(block)
        })?;
        tracing::info!(block = %block.name, cidr = %block.cidr, space = space_name, "created block");
        Ok(block)
    }

    /// Deletes a block. Admin only.
    ///
    /// Refused while the block still contains attachments or reservations,
    /// unless forced.
    pub fn delete_block(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
        force: bool,
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        self.mutate_space(tenant, space_name, |space| {
            let index = space
                .blocks
                .iter()
                .position(|block| block.name.eq_ignore_ascii_case(block_name))
                .ok_or_else(|| Error::NotFound(format!("block '{block_name}'")))?;
            let block = &space.blocks[index];
            if !force && (!block.attachments.is_empty() || !block.reservations.is_empty()) {
                return Err(Error::Conflict(
                    "cannot delete block while it contains networks or reservations".to_string(),
                ));
            }
            space.blocks.remove(index);
            Ok(())
        })?;
        tracing::info!(block = block_name, space = space_name, "deleted block");
        Ok(())
    }
}

// Network attachments
impl<S: SpaceStore, D: NetworkDirectory> SpaceManager<S, D> {
    /// Lists directory networks that could be attached to the block: networks
    /// with a prefix inside the block range that are not attached to any
    /// other block. Admin only.
    pub fn available_block_networks(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
    ) -> Result<Vec<VirtualNetwork>, Error> {
        ensure_admin(caller)?;
        let spaces = self.store.list_spaces(tenant).map_err(Error::Store)?;
        let space = spaces
            .iter()
            .map(|space| &space.value)
            .find(|space| space.name.eq_ignore_ascii_case(space_name))
            .ok_or_else(|| Error::NotFound(format!("space '{space_name}'")))?;
        let block = find_block(space, block_name)?;

        let mut available: Vec<VirtualNetwork> = self
            .directory
            .list_networks()?
            .into_iter()
            .filter_map(|network| {
                let valid = network.prefixes_within(block.cidr);
                if valid.is_empty() {
                    return None;
                }
                Some(VirtualNetwork {
                    prefixes: valid,
                    ..network
                })
            })
            .collect();

        // Drop networks that are already attached elsewhere.
        for other_space in spaces.iter().map(|space| &space.value) {
            for other_block in &other_space.blocks {
                if other_space.name.eq_ignore_ascii_case(space_name)
                    && other_block.name.eq_ignore_ascii_case(block_name)
                {
                    continue;
                }
                for attachment in &other_block.attachments {
                    available.retain(|network| !network.id.eq_ignore_case(&attachment.id));
                }
            }
        }
        Ok(available)
    }

    /// Lists the attachment references of a block. Admin only.
    pub fn list_block_networks(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
    ) -> Result<Vec<AttachmentRef>, Error> {
        ensure_admin(caller)?;
        let space = self.fetch_space(tenant, space_name)?;
        Ok(find_block(&space.value, block_name)?.attachments.clone())
    }

    /// Lists the attached networks of a block with their directory data.
    /// Attachments the directory no longer knows are dropped. Admin only.
    pub fn list_block_networks_expanded(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
    ) -> Result<Vec<VirtualNetwork>, Error> {
        ensure_admin(caller)?;
        let space = self.fetch_space(tenant, space_name)?;
        let block = find_block(&space.value, block_name)?;
        let networks = self.directory.list_networks()?;
        Ok(block
            .attachments
            .iter()
            .filter_map(|attachment| find_network(&networks, &attachment.id).cloned())
            .collect())
    }

    /// Attaches an external network to a block. Admin only.
    ///
    /// The network must resolve in the directory, have a prefix inside the
    /// block range, and stay disjoint from the prefixes of the already
    /// attached networks.
    pub fn attach_network(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
        network_id: &NetworkId,
    ) -> Result<Block, Error> {
        ensure_admin(caller)?;
        let directory = &self.directory;
        let block = self.mutate_space(tenant, space_name, |space| {
            let block = find_block_mut(space, block_name)?;
            if block.has_attachment(network_id) {
                return Err(Error::Conflict(
                    "network is already attached to the block".to_string(),
                ));
            }

            let networks = directory.list_networks()?;
            let target = find_network(&networks, network_id)
                .ok_or_else(|| Error::NotFound(format!("network '{network_id}'")))?;
            let target_cidr = target
                .prefixes
                .iter()
                .copied()
                .find(|prefix| block.cidr.contains(prefix))
                .ok_or_else(|| {
                    Error::Conflict("network range not within block range".to_string())
                })?;

            let mut attached = CidrSet::new();
            for attachment in &block.attachments {
                if let Some(network) = find_network(&networks, &attachment.id) {
                    for prefix in network.prefixes_within(block.cidr) {
                        attached.insert(prefix);
                    }
                }
            }
            validate::ensure_disjoint(
                target_cidr,
                &attached,
                "block already contains networks within the range of the target network",
            )?;

            block.attachments.push(AttachmentRef {
                id: network_id.clone(),
                active: true,
            });
            Ok(block.clone())
        })?;
        tracing::info!(network = %network_id, block = block_name, "attached network");
        Ok(block)
    }

    /// Replaces the attached network list of a block. Admin only.
    ///
    /// Every id must resolve and have a prefix inside the block range, and
    /// the prefixes must be pairwise disjoint. The overlap check accumulates
    /// the prefixes into a running set and reports only that an overlap
    /// exists, not which pair conflicts.
    pub fn replace_block_networks(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
        network_ids: &[NetworkId],
    ) -> Result<Vec<AttachmentRef>, Error> {
        ensure_admin(caller)?;
        ensure_unique(network_ids, "list contains one or more duplicate network ids")?;
        let directory = &self.directory;
        let attachments = self.mutate_space(tenant, space_name, |space| {
            let block = find_block_mut(space, block_name)?;
            let networks = directory.list_networks()?;

            let mut unknown = Vec::new();
            let mut outside = Vec::new();
            let mut contained = Vec::new();
            for id in network_ids {
                let Some(target) = find_network(&networks, id) else {
                    unknown.push(id.clone());
                    continue;
                };
                match target
                    .prefixes
                    .iter()
                    .copied()
                    .find(|prefix| block.cidr.contains(prefix))
                {
                    Some(prefix) => contained.push(prefix),
                    None => outside.push(id.clone()),
                }
            }
            validate::ensure_accumulated_disjoint(
                contained,
                "network list contains overlapping ranges",
            )?;
            if !outside.is_empty() {
                return Err(Error::Conflict(format!(
                    "network range(s) not within block range: {outside:?}"
                )));
            }
            if !unknown.is_empty() {
                return Err(Error::NotFound(format!("network id(s) {unknown:?}")));
            }

            block.attachments = network_ids
                .iter()
                .map(|id| {
                    AttachmentRef {
                        id: id.clone(),
                        active: true,
                    }
                })
                .collect();
            Ok(block.attachments.clone())
        })?;
        tracing::info!(
            count = attachments.len(),
            block = block_name,
            "replaced block networks"
        );
        Ok(attachments)
    }

    /// Detaches networks from a block. Admin only.
    ///
    /// All-or-nothing: every id must currently be attached.
    pub fn detach_networks(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
        network_ids: &[NetworkId],
    ) -> Result<(), Error> {
        ensure_admin(caller)?;
        ensure_unique(network_ids, "list contains one or more duplicate network ids")?;
        self.mutate_space(tenant, space_name, |space| {
            let block = find_block_mut(space, block_name)?;
            if !network_ids.iter().all(|id| block.has_attachment(id)) {
                return Err(Error::NotFound(
                    "one or more networks in the list".to_string(),
                ));
            }
            block
                .attachments
                .retain(|attachment| !network_ids.contains(&attachment.id));
            Ok(())
        })?;
        tracing::info!(count = network_ids.len(), block = block_name, "detached networks");
        Ok(())
    }
}

// Reservations
impl<S: SpaceStore, D: NetworkDirectory> SpaceManager<S, D> {
    /// Lists the reservations of a block. Admins see all reservations,
    /// regular callers only their own.
    pub fn list_block_reservations(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
    ) -> Result<Vec<Reservation>, Error> {
        let space = self.fetch_space(tenant, space_name)?;
        let block = find_block(&space.value, block_name)?;
        Ok(block
            .reservations
            .iter()
            .filter(|reservation| caller.is_admin() || reservation.user_id == caller.user_id)
            .cloned()
            .collect())
    }

    /// Reserves a range of the requested size within a block.
    ///
    /// The consumed set is recomputed from the attached networks' clipped
    /// prefixes and the existing reservations on every attempt, so the
    /// returned range is disjoint from both at commit time.
    pub fn create_block_reservation(
        &mut self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
        request: &BlockReservationRequest,
    ) -> Result<CreatedReservation, Error> {
        let store = &self.store;
        let directory = &self.directory;
        let rng = &mut self.rng;
        let created = retry::mutate(
            self.max_attempts,
            || fetch_space(store, tenant, space_name).map(|v| (v.value, v.version)),
            |space| {
                let space_name = space.name.clone();
                let block = find_block_mut(space, block_name)?;
                let networks = directory.list_networks()?;
                let consumed = consumed_set(block, &networks);
                let cidr = allocator::allocate(
                    block.cidr,
                    &consumed,
                    request.size,
                    request.reverse_search,
                    request.smallest_cidr,
                )?;
                let reservation = Reservation {
                    id: short_id(rng),
                    cidr,
                    user_id: caller.user_id.clone(),
                    created_on: Utc::now(),
                    status: RESERVATION_STATUS_WAIT.to_string(),
                };
                block.reservations.push(reservation.clone());
                Ok(to_created(reservation, space_name, block.name.clone()))
            },
            |space, version| store.replace_space(space, version).map(|_| ()),
        )?;
        tracing::info!(cidr = %created.cidr, block = %created.block, "created reservation");
        Ok(created)
    }

    /// Reserves a range from the first block of the list that can fit it.
    ///
    /// Blocks are evaluated in the order provided with their consumed sets
    /// computed per block; the first successful allocation wins and the
    /// remaining blocks are not considered.
    pub fn create_space_reservation(
        &mut self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        request: &SpaceReservationRequest,
    ) -> Result<CreatedReservation, Error> {
        let store = &self.store;
        let directory = &self.directory;
        let rng = &mut self.rng;
        let created = retry::mutate(
            self.max_attempts,
            || fetch_space(store, tenant, space_name).map(|v| (v.value, v.version)),
            |space| {
                let unknown: Vec<&String> = request
                    .blocks
                    .iter()
                    .filter(|name| space.find_block(name).is_none())
                    .collect();
                if !unknown.is_empty() {
                    return Err(Error::NotFound(format!(
                        "block(s) {unknown:?} in block list"
                    )));
                }

                let networks = directory.list_networks()?;
                let space_name = space.name.clone();
                for name in &request.blocks {
                    let block = find_block_mut(space, name).expect("existence checked above");
                    let consumed = consumed_set(block, &networks);
                    match allocator::allocate(
                        block.cidr,
                        &consumed,
                        request.size,
                        request.reverse_search,
                        request.smallest_cidr,
                    ) {
                        Ok(cidr) => {
                            let reservation = Reservation {
                                id: short_id(rng),
                                cidr,
                                user_id: caller.user_id.clone(),
                                created_on: Utc::now(),
                                status: RESERVATION_STATUS_WAIT.to_string(),
                            };
                            block.reservations.push(reservation.clone());
                            return Ok(to_created(reservation, space_name, block.name.clone()));
                        }
                        Err(AllocationError::Exhausted { .. }) => continue,
                        Err(err) => return Err(err.into()),
                    }
                }
                Err(Error::AllocationExhausted)
            },
            |space, version| store.replace_space(space, version).map(|_| ()),
        )?;
        tracing::info!(cidr = %created.cidr, block = %created.block, "created reservation");
        Ok(created)
    }

    /// Deletes reservations from a block, all-or-nothing.
    ///
    /// Every id must exist exactly once in the list and in the block. Regular
    /// callers must own every targeted reservation; a single foreign id
    /// rejects the whole operation with no side effects.
    pub fn delete_block_reservations(
        &self,
        caller: &Caller,
        tenant: &TenantId,
        space_name: &str,
        block_name: &str,
        reservation_ids: &[String],
    ) -> Result<(), Error> {
        ensure_unique(
            reservation_ids,
            "list contains one or more duplicate reservation ids",
        )?;
        self.mutate_space(tenant, space_name, |space| {
            let block = find_block_mut(space, block_name)?;
            if !reservation_ids
                .iter()
                .all(|id| block.find_reservation(id).is_some())
            {
                return Err(Error::NotFound(
                    "one or more reservations in the list".to_string(),
                ));
            }
            if !caller.is_admin() {
                let foreign = reservation_ids.iter().any(|id| {
                    block
                        .find_reservation(id)
                        .is_some_and(|reservation| reservation.user_id != caller.user_id)
                });
                if foreign {
                    return Err(Error::Permission(
                        "users can only delete their own reservations".to_string(),
                    ));
                }
            }
            block
                .reservations
                .retain(|reservation| !reservation_ids.contains(&reservation.id));
            Ok(())
        })?;
        tracing::info!(
            count = reservation_ids.len(),
            block = block_name,
            "deleted reservations"
        );
        Ok(())
    }
}

/// Fetches a space, mapping a store miss to a caller-facing error.
fn fetch_space<S: SpaceStore>(
    store: &S,
    tenant: &TenantId,
    name: &str,
) -> Result<Versioned<Space>, Error> {
    store.fetch_space(tenant, name).map_err(|err| {
        match err {
            StoreError::NotFound => Error::NotFound(format!("space '{name}'")),
            err => Error::Store(err),
        }
    })
}

fn find_block<'a>(space: &'a Space, name: &str) -> Result<&'a Block, Error> {
    space
        .find_block(name)
        .ok_or_else(|| Error::NotFound(format!("block '{name}'")))
}

fn find_block_mut<'a>(space: &'a mut Space, name: &str) -> Result<&'a mut Block, Error> {
    space
        .find_block_mut(name)
        .ok_or_else(|| Error::NotFound(format!("block '{name}'")))
}

/// Everything already consumed within a block: the attached networks'
/// prefixes clipped to the block range plus the existing reservations.
fn consumed_set(block: &Block, networks: &[VirtualNetwork]) -> CidrSet {
    let mut consumed = CidrSet::new();
    for attachment in &block.attachments {
        if let Some(network) = find_network(networks, &attachment.id) {
            for prefix in network.prefixes_within(block.cidr) {
                consumed.insert(prefix);
            }
        }
    }
    for reservation in &block.reservations {
        consumed.insert(reservation.cidr);
    }
    consumed
}

fn ensure_unique<T: PartialEq>(items: &[T], message: &str) -> Result<(), Error> {
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            return Err(Error::Conflict(message.to_string()));
        }
    }
    Ok(())
}

fn to_created(reservation: Reservation, space: String, block: String) -> CreatedReservation {
    CreatedReservation {
        id: reservation.id,
        cidr: reservation.cidr,
        user_id: reservation.user_id,
        created_on: reservation.created_on,
        status: reservation.status,
        space,
        block,
    }
}
