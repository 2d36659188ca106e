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
//! # CIDR Set
//!
//! IPv4 address-range arithmetic for the IPAM engine.
//!
//! [set::CidrSet] represents an arbitrary set of IPv4 addresses as ordered,
//! disjoint half-open integer ranges and exposes the set algebra the
//! allocation engine is built on. [allocator::allocate] carves a free
//! sub-range of a requested size out of a block under the configured
//! allocation policy.

pub mod allocator;
pub mod set;
