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
//! # Space Manager
//!
//! Tenant-scoped management of a hierarchical IPv4 address space.
//!
//! A [model::Space] owns [model::Block]s, which carry references to external
//! network attachments and user [model::Reservation]s. The
//! [manager::SpaceManager] implements every operation on the hierarchy;
//! mutations are read-modify-write cycles against a versioned
//! [store::SpaceStore], made safe under concurrent callers by the optimistic
//! [retry] loop. Address prefixes of attached networks are resolved live
//! through the [directory::NetworkDirectory] and never cached.

pub mod admin;
pub mod directory;
pub mod error;
pub mod identity;
pub mod manager;
pub mod model;
pub mod projection;
pub mod retry;
pub mod store;
pub mod utilization;
pub mod validate;
