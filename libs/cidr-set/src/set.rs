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
//! A set of IPv4 addresses with CIDR-level set algebra.

use std::{fmt, net::Ipv4Addr};

use ipam_utils::rangeset::{Range, RangeSet};
use ipnet::Ipv4Net;

/// One past the last IPv4 address, as an integer.
const ADDRESS_SPACE_END: u64 = 1 << 32;

/// A set of IPv4 addresses.
///
/// Addresses are stored as half-open `u64` ranges so that the end of the
/// address space is representable. The set is canonical: ranges are ordered,
/// disjoint and coalesced, independent of how the set was assembled.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct CidrSet {
    ranges: RangeSet<u64>,
}

/// Maps a network to its half-open address range.
fn net_range(net: Ipv4Net) -> Range<u64> {
    let start = u64::from(u32::from(net.network()));
    let size = 1u64 << (32 - net.prefix_len());
    Range::new(start, start + size)
}

impl CidrSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set covering exactly the given network.
    pub fn from_net(net: Ipv4Net) -> Self {
        let mut set = Self::new();
        set.insert(net);
        set
    }

    /// Creates a set covering the union of the given networks.
    pub fn from_nets<I: IntoIterator<Item = Ipv4Net>>(nets: I) -> Self {
        let mut set = Self::new();
        for net in nets {
            set.insert(net);
        }
        set
    }

    /// Adds all addresses of the given network to the set.
    pub fn insert(&mut self, net: Ipv4Net) {
        self.ranges.merge_range(net_range(net));
    }

    /// Returns true if the set contains no addresses.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the number of addresses in the set.
    pub fn addr_count(&self) -> u64 {
        self.ranges.len()
    }

    /// Returns true if every address of the given network is in the set.
    pub fn contains_net(&self, net: Ipv4Net) -> bool {
        self.ranges.contains_range(&net_range(net))
    }

    /// Returns true if the two sets share at least one address.
    pub fn intersects(&self, other: &Self) -> bool {
        self.ranges.intersects(&other.ranges)
    }

    /// Returns the union of the two sets.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            ranges: self.ranges.union(&other.ranges),
        }
    }

    /// Returns the intersection of the two sets.
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            ranges: self.ranges.intersection(&other.ranges),
        }
    }

    /// Returns the addresses of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            ranges: self.ranges.difference(&other.ranges),
        }
    }

    /// Returns the addresses contained in exactly one of the two sets.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        Self {
            ranges: self.ranges.symmetric_difference(&other.ranges),
        }
    }

    /// Returns the maximal power-of-two-aligned blocks that make up the set,
    /// in ascending address order.
    pub fn iter_cidrs(&self) -> Vec<Ipv4Net> {
        let mut cidrs = Vec::new();
        for range in self.ranges.ranges() {
            let mut start = range.start;
            let end = range.end;
            while start < end {
                // Largest block aligned at `start`, capped by the remaining
                // length of the range.
                let align = if start == 0 {
                    ADDRESS_SPACE_END
                } else {
                    start & start.wrapping_neg()
                };
                let remaining = end - start;
                let fit = 1u64 << (63 - remaining.leading_zeros());
                let size = align.min(fit);
                let prefix_len = 32 - size.trailing_zeros() as u8;
                let net = Ipv4Net::new(Ipv4Addr::from(start as u32), prefix_len)
                    .expect("prefix length is at most 32");
                cidrs.push(net);
                start += size;
            }
        }
        cidrs
    }
}

impl fmt::Display for CidrSet {
    // Format the set as [cidr, cidr, ...]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, cidr) in self.iter_cidrs().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cidr}")?;
        }
        write!(f, "]")
    }
}
