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
//! Input validation and disjointness checking.

use ipam_cidr_set::set::CidrSet;
use ipnet::Ipv4Net;

use crate::error::Error;

/// Maximum length of space and block names.
pub const MAX_NAME_LEN: usize = 16;
/// Maximum length of descriptions.
pub const MAX_DESC_LEN: usize = 32;

/// Validates a space or block name: 1 to 16 alphanumeric characters.
pub fn validate_name(what: &'static str, name: &str) -> Result<(), Error> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric());
    if !valid {
        return Err(Error::Format {
            what,
            reason: format!("must be 1 to {MAX_NAME_LEN} alphanumeric characters"),
        });
    }
    Ok(())
}

/// Validates a description: 1 to 32 characters of alphanumerics, spaces,
/// underscores, hyphens and periods.
pub fn validate_desc(desc: &str) -> Result<(), Error> {
    let valid = !desc.is_empty()
        && desc.len() <= MAX_DESC_LEN
        && desc
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b' ' | b'.' | b'_' | b'-'));
    if !valid {
        return Err(Error::Format {
            what: "description",
            reason: format!(
                "must be 1 to {MAX_DESC_LEN} characters of alphanumerics, spaces, \
                 underscores, hyphens and periods"
            ),
        });
    }
    Ok(())
}

/// Validates that a CIDR is in canonical form, i.e. no host bits are set.
pub fn validate_cidr(what: &'static str, cidr: Ipv4Net) -> Result<(), Error> {
    if cidr.addr() != cidr.network() {
        return Err(Error::Format {
            what,
            reason: format!("{cidr} has host bits set"),
        });
    }
    Ok(())
}

/// Rejects a name already taken by a sibling, case-insensitively.
pub fn ensure_unique_name<'a>(
    what: &'static str,
    name: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<(), Error> {
    if existing
        .into_iter()
        .any(|taken| taken.eq_ignore_ascii_case(name))
    {
        return Err(Error::Conflict(format!("{what} name must be unique")));
    }
    Ok(())
}

/// Rejects a candidate range that overlaps the existing set.
pub fn ensure_disjoint(candidate: Ipv4Net, existing: &CidrSet, message: &str) -> Result<(), Error> {
    if existing.intersects(&CidrSet::from_net(candidate)) {
        return Err(Error::Conflict(message.to_string()));
    }
    Ok(())
}

/// Checks that the given prefixes are pairwise disjoint by accumulating them
/// into a running set and failing on the first overlap.
///
/// This reports only that an overlap exists somewhere, not which pair
/// conflicts. Returns the accumulated set on success.
pub fn ensure_accumulated_disjoint(
    prefixes: impl IntoIterator<Item = Ipv4Net>,
    message: &str,
) -> Result<CidrSet, Error> {
    let mut accumulated = CidrSet::new();
    for prefix in prefixes {
        let candidate = CidrSet::from_net(prefix);
        if accumulated.intersects(&candidate) {
            return Err(Error::Conflict(message.to_string()));
        }
        accumulated = accumulated.union(&candidate);
    }
    Ok(accumulated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("space name", "Corp01").is_ok());
        assert!(validate_name("space name", "a").is_ok());
        assert!(validate_name("space name", "abcdefghij123456").is_ok());

        assert!(validate_name("space name", "").is_err());
        assert!(validate_name("space name", "abcdefghij1234567").is_err());
        assert!(validate_name("space name", "with space").is_err());
        assert!(validate_name("space name", "dash-ed").is_err());
    }

    #[test]
    fn test_validate_desc() {
        assert!(validate_desc("Corp address space v1.0_x-y").is_ok());

        assert!(validate_desc("").is_err());
        assert!(validate_desc(&"x".repeat(33)).is_err());
        assert!(validate_desc("no/slashes").is_err());
    }

    #[test]
    fn test_validate_cidr_rejects_host_bits() {
        assert!(validate_cidr("block range", net("10.0.0.0/24")).is_ok());
        assert!(validate_cidr("block range", net("10.0.0.1/24")).is_err());
    }

    #[test]
    fn test_ensure_unique_name_is_case_insensitive() {
        let existing = ["BlockA", "BlockB"];
        assert!(ensure_unique_name("block", "blockc", existing).is_ok());
        assert!(ensure_unique_name("block", "blocka", existing).is_err());
    }

    #[test]
    fn test_ensure_disjoint() {
        let existing = CidrSet::from_net(net("10.0.0.0/24"));
        assert!(ensure_disjoint(net("10.0.1.0/24"), &existing, "overlap").is_ok());
        assert!(ensure_disjoint(net("10.0.0.128/25"), &existing, "overlap").is_err());
    }

    #[test]
    fn test_ensure_accumulated_disjoint() {
        let ok = ensure_accumulated_disjoint(
            [net("10.0.0.0/25"), net("10.0.0.128/25"), net("10.0.1.0/24")],
            "overlap",
        )
        .unwrap();
        assert_eq!(ok.addr_count(), 512);

        let err = ensure_accumulated_disjoint(
            [net("10.0.0.0/25"), net("10.0.0.64/26")],
            "network list contains overlapping ranges",
        );
        assert!(matches!(err, Err(Error::Conflict(_))));
    }
}
