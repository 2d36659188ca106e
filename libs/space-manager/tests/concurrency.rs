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

//! Optimistic-concurrency behavior of the space manager under racing writers.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use ipam_space_manager::{
    directory::FixedNetworkDirectory,
    error::Error,
    identity::Caller,
    manager::{dto::BlockReservationRequest, SpaceManager},
    model::{AdminRegistry, Reservation, Space, TenantId, UserId, RESERVATION_STATUS_WAIT},
    store::{memory::MemorySpaceStore, SpaceStore, StoreError, Version, Versioned},
};
use ntest::timeout;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A competing mutation applied to the shared store right before a
/// conditioned write, so that the write loses its race.
type Competitor = Box<dyn FnOnce(&MemorySpaceStore) + Send>;

/// Store wrapper that lets a test interleave a competing writer between the
/// fetch and the conditioned replace of the manager under test.
#[derive(Clone)]
struct RacingStore {
    inner: MemorySpaceStore,
    competitor: Arc<Mutex<Option<Competitor>>>,
}

impl RacingStore {
    fn new(inner: MemorySpaceStore) -> Self {
        Self {
            inner,
            competitor: Arc::new(Mutex::new(None)),
        }
    }

    fn race_once(&self, competitor: impl FnOnce(&MemorySpaceStore) + Send + 'static) {
        *self.competitor.lock().unwrap() = Some(Box::new(competitor));
    }
}

impl SpaceStore for RacingStore {
    fn list_spaces(&self, tenant: &TenantId) -> Result<Vec<Versioned<Space>>, StoreError> {
        self.inner.list_spaces(tenant)
    }

    fn fetch_space(&self, tenant: &TenantId, name: &str) -> Result<Versioned<Space>, StoreError> {
        self.inner.fetch_space(tenant, name)
    }

    fn insert_space(&self, space: Space) -> Result<Version, StoreError> {
        self.inner.insert_space(space)
    }

    fn replace_space(&self, space: Space, expected: Version) -> Result<Version, StoreError> {
        if let Some(competitor) = self.competitor.lock().unwrap().take() {
            competitor(&self.inner);
        }
        self.inner.replace_space(space, expected)
    }

    fn delete_space(&self, tenant: &TenantId, id: &str) -> Result<(), StoreError> {
        self.inner.delete_space(tenant, id)
    }

    fn fetch_admin_registry(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<Versioned<AdminRegistry>>, StoreError> {
        self.inner.fetch_admin_registry(tenant)
    }

    fn upsert_admin_registry(
        &self,
        registry: AdminRegistry,
        expected: Option<Version>,
    ) -> Result<Version, StoreError> {
        self.inner.upsert_admin_registry(registry, expected)
    }
}

fn tenant() -> TenantId {
    TenantId::new("t1")
}

fn seed_space(store: &MemorySpaceStore, block_cidr: &str) {
    store
        .insert_space(Space {
            id: "s1".to_string(),
            tenant_id: tenant(),
            name: "corp".to_string(),
            desc: "Corp space".to_string(),
            blocks: vec![ipam_space_manager::model::Block {
                name: "blocka".to_string(),
                cidr: block_cidr.parse().unwrap(),
                attachments: Vec::new(),
                reservations: Vec::new(),
            }],
        })
        .unwrap();
}

/// Commits a reservation through a plain fetch/replace cycle, the way a
/// competing request would.
fn commit_reservation(store: &MemorySpaceStore, cidr: &str, user: &str) {
    let fetched = store.fetch_space(&tenant(), "corp").unwrap();
    let mut space = fetched.value;
    space.blocks[0].reservations.push(Reservation {
        id: format!("competing-{user}"),
        cidr: cidr.parse().unwrap(),
        user_id: UserId::new(user),
        created_on: Utc::now(),
        status: RESERVATION_STATUS_WAIT.to_string(),
    });
    store.replace_space(space, fetched.version).unwrap();
}

fn request(size: u8) -> BlockReservationRequest {
    BlockReservationRequest {
        size,
        reverse_search: false,
        smallest_cidr: false,
    }
}

#[test]
#[timeout(10_000)]
fn should_recompute_against_winner_state_after_conflict() {
    let shared = MemorySpaceStore::new();
    seed_space(&shared, "10.0.0.0/24");

    let racing = RacingStore::new(shared.clone());
    // The competitor grabs the first /26 between our fetch and our write.
    racing.race_once(|store| commit_reservation(store, "10.0.0.0/26", "bob"));

    let mut manager = SpaceManager::new(
        racing,
        FixedNetworkDirectory::default(),
        ChaCha8Rng::seed_from_u64(1),
    );
    let caller = Caller::user(UserId::new("alice"));
    let created = manager
        .create_block_reservation(&caller, &tenant(), "corp", "blocka", &request(26))
        .expect("loser must succeed on retry");

    // The loser recomputed against the winner's committed state and took the
    // next free slot.
    assert_eq!(created.cidr.to_string(), "10.0.0.64/26");

    let stored = shared.fetch_space(&tenant(), "corp").unwrap();
    let reservations = &stored.value.blocks[0].reservations;
    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[0].cidr.to_string(), "10.0.0.0/26");
    assert_eq!(reservations[1].cidr.to_string(), "10.0.0.64/26");
}

#[test]
#[timeout(10_000)]
fn should_surface_retry_exhausted_when_conflicts_persist() {
    /// A store whose conditioned writes always lose.
    #[derive(Clone)]
    struct AlwaysConflict(MemorySpaceStore);

    impl SpaceStore for AlwaysConflict {
        fn list_spaces(&self, tenant: &TenantId) -> Result<Vec<Versioned<Space>>, StoreError> {
            self.0.list_spaces(tenant)
        }
        fn fetch_space(
            &self,
            tenant: &TenantId,
            name: &str,
        ) -> Result<Versioned<Space>, StoreError> {
            self.0.fetch_space(tenant, name)
        }
        fn insert_space(&self, space: Space) -> Result<Version, StoreError> {
            self.0.insert_space(space)
        }
        fn replace_space(&self, _space: Space, _expected: Version) -> Result<Version, StoreError> {
            Err(StoreError::VersionConflict)
        }
        fn delete_space(&self, tenant: &TenantId, id: &str) -> Result<(), StoreError> {
            self.0.delete_space(tenant, id)
        }
        fn fetch_admin_registry(
            &self,
            tenant: &TenantId,
        ) -> Result<Option<Versioned<AdminRegistry>>, StoreError> {
            self.0.fetch_admin_registry(tenant)
        }
        fn upsert_admin_registry(
            &self,
            registry: AdminRegistry,
            expected: Option<Version>,
        ) -> Result<Version, StoreError> {
            self.0.upsert_admin_registry(registry, expected)
        }
    }

    let shared = MemorySpaceStore::new();
    seed_space(&shared, "10.0.0.0/24");

    let mut manager = SpaceManager::new(
        AlwaysConflict(shared.clone()),
        FixedNetworkDirectory::default(),
        ChaCha8Rng::seed_from_u64(1),
    )
    .with_max_attempts(3);
    let caller = Caller::user(UserId::new("alice"));

    let result =
        manager.create_block_reservation(&caller, &tenant(), "corp", "blocka", &request(26));
    assert!(matches!(result, Err(Error::RetryExhausted { attempts: 3 })));

    // The losing operation left nothing behind.
    let stored = shared.fetch_space(&tenant(), "corp").unwrap();
    assert!(stored.value.blocks[0].reservations.is_empty());
}

#[test]
#[timeout(10_000)]
fn should_keep_sequential_same_size_requests_disjoint() {
    let shared = MemorySpaceStore::new();
    seed_space(&shared, "10.0.0.0/24");
    let directory = FixedNetworkDirectory::default();

    // Two managers over the same store, as two request handlers would be.
    let mut first = SpaceManager::new(
        shared.clone(),
        directory.clone(),
        ChaCha8Rng::seed_from_u64(1),
    );
    let mut second = SpaceManager::new(
        shared.clone(),
        directory,
        ChaCha8Rng::seed_from_u64(2),
    );

    let alice = Caller::user(UserId::new("alice"));
    let bob = Caller::user(UserId::new("bob"));
    let a = first
        .create_block_reservation(&alice, &tenant(), "corp", "blocka", &request(27))
        .unwrap();
    let b = second
        .create_block_reservation(&bob, &tenant(), "corp", "blocka", &request(27))
        .unwrap();

    assert_eq!(a.cidr.to_string(), "10.0.0.0/27");
    assert_eq!(b.cidr.to_string(), "10.0.0.32/27");
    assert_ne!(a.id, b.id);
}
