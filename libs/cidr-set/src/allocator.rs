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
//! Free-range selection within an address block.

use ipnet::Ipv4Net;
use thiserror::Error;

use crate::set::CidrSet;

/// Allocation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// No free range of the requested size left in the block.
    #[error("no free range of size /{requested} available")]
    Exhausted {
        /// The requested prefix length.
        requested: u8,
    },
    /// The requested prefix length is not a valid IPv4 prefix length.
    #[error("invalid prefix length /{0}")]
    InvalidPrefixLength(u8),
}

/// Selects one free sub-range of the requested prefix length from a block.
///
/// `consumed` is everything already in use within `block`: it must be a
/// subset of the block's range, which the callers maintain by construction
/// (reservation and attachment ranges are validated against the block at
/// creation time).
///
/// Policy flags:
/// * `reverse_search` - pick ranges as close to the end of the block as
///   possible instead of the beginning.
/// * `smallest_first` - prefer the tightest-fitting free range, keeping
///   large free ranges intact.
///
/// The function is pure: identical inputs yield identical output.
pub fn allocate(
    block: Ipv4Net,
    consumed: &CidrSet,
    requested_len: u8,
    reverse_search: bool,
    smallest_first: bool,
) -> Result<Ipv4Net, AllocationError> {
    if requested_len > 32 {
        return Err(AllocationError::InvalidPrefixLength(requested_len));
    }

    let free = CidrSet::from_net(block).symmetric_difference(consumed);

    let mut candidates = free.iter_cidrs();
    if reverse_search {
        candidates.reverse();
    }

    // A free range can hold a sub-range of the requested length iff its own
    // prefix is at most as long.
    let selected = if smallest_first {
        let fitting: Vec<Ipv4Net> = candidates
            .into_iter()
            .filter(|net| net.prefix_len() <= requested_len)
            .collect();
        let tightest = fitting
            .iter()
            .map(|net| net.prefix_len())
            .max()
            .ok_or(AllocationError::Exhausted {
                requested: requested_len,
            })?;
        fitting
            .into_iter()
            .find(|net| net.prefix_len() == tightest)
            .expect("a range of the tightest prefix length exists")
    } else {
        candidates
            .into_iter()
            .find(|net| net.prefix_len() <= requested_len)
            .ok_or(AllocationError::Exhausted {
                requested: requested_len,
            })?
    };

    let mut subnets = selected
        .subnets(requested_len)
        .expect("requested length is at least the selected prefix length");
    let allocated = if reverse_search {
        subnets.last()
    } else {
        subnets.next()
    };
    Ok(allocated.expect("selected range holds at least one subnet"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    fn consumed(nets: &[&str]) -> CidrSet {
        CidrSet::from_nets(nets.iter().map(|s| net(s)))
    }

    #[test]
    fn test_allocates_first_subnet_in_empty_block() {
        let result = allocate(net("10.0.0.0/24"), &CidrSet::new(), 26, false, false).unwrap();
        assert_eq!(result, net("10.0.0.0/26"));
    }

    #[test]
    fn test_reverse_search_allocates_last_subnet() {
        let result = allocate(net("10.0.0.0/24"), &CidrSet::new(), 26, true, false).unwrap();
        assert_eq!(result, net("10.0.0.192/26"));
    }

    #[test]
    fn test_smallest_first_picks_tightest_fit() {
        // Free space is 10.0.0.64/26 and 10.0.0.128/25; the /26 is the
        // tightest range that still fits a /27.
        let result = allocate(
            net("10.0.0.0/24"),
            &consumed(&["10.0.0.0/26"]),
            27,
            false,
            true,
        )
        .unwrap();
        assert_eq!(result, net("10.0.0.64/27"));
    }

    #[test]
    fn test_smallest_first_reverse_breaks_ties_from_the_end() {
        // Two equally tight /26 ranges remain free.
        let result = allocate(
            net("10.0.0.0/24"),
            &consumed(&["10.0.0.0/26", "10.0.0.128/26"]),
            27,
            true,
            true,
        )
        .unwrap();
        assert_eq!(result, net("10.0.0.224/27"));
    }

    #[test]
    fn test_request_larger_than_block_is_exhausted() {
        let result = allocate(net("10.0.0.0/24"), &CidrSet::new(), 20, false, false);
        assert_eq!(result, Err(AllocationError::Exhausted { requested: 20 }));
    }

    #[test]
    fn test_full_block_is_exhausted() {
        let result = allocate(
            net("10.0.0.0/24"),
            &consumed(&["10.0.0.0/25", "10.0.0.128/25"]),
            28,
            false,
            false,
        );
        assert_eq!(result, Err(AllocationError::Exhausted { requested: 28 }));
    }

    #[test]
    fn test_invalid_prefix_length() {
        let result = allocate(net("10.0.0.0/24"), &CidrSet::new(), 33, false, false);
        assert_eq!(result, Err(AllocationError::InvalidPrefixLength(33)));
    }

    #[test]
    fn test_skips_ranges_too_small_for_request() {
        // Free space: 10.0.0.64/26 and 10.0.0.128/25. Only the /25 fits a /25.
        let result = allocate(
            net("10.0.0.0/24"),
            &consumed(&["10.0.0.0/26"]),
            25,
            false,
            false,
        )
        .unwrap();
        assert_eq!(result, net("10.0.0.128/25"));
    }

    #[test]
    fn test_result_is_deterministic() {
        let block = net("10.0.0.0/22");
        let used = consumed(&["10.0.0.64/26", "10.0.2.0/24"]);

        let first = allocate(block, &used, 27, false, true).unwrap();
        let second = allocate(block, &used, 27, false, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_result_is_contained_and_disjoint() {
        let block = net("10.0.0.0/23");
        let mut used = consumed(&["10.0.0.0/26", "10.0.0.192/27", "10.0.1.0/25"]);

        // Exhaust the block /27 by /27 and check the invariants at each step.
        loop {
            let allocated = match allocate(block, &used, 27, false, false) {
                Ok(allocated) => allocated,
                Err(err) => {
                    assert_eq!(err, AllocationError::Exhausted { requested: 27 });
                    break;
                }
            };
            assert_eq!(allocated.prefix_len(), 27);
            assert!(
                CidrSet::from_net(block).contains_net(allocated),
                "allocation {allocated} not inside block {block}"
            );
            assert!(
                !used.intersects(&CidrSet::from_net(allocated)),
                "allocation {allocated} overlaps consumed space"
            );
            used.insert(allocated);
        }
        assert_eq!(used.addr_count(), 512);
    }

    #[test]
    fn test_exact_fit_consumes_whole_free_range() {
        let result = allocate(
            net("10.0.0.0/24"),
            &consumed(&["10.0.0.0/25", "10.0.0.192/26"]),
            26,
            false,
            false,
        )
        .unwrap();
        assert_eq!(result, net("10.0.0.128/26"));
    }
}
