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
//! The error taxonomy of the space management operations.

use ipam_cidr_set::allocator::AllocationError;
use thiserror::Error;

use crate::{directory::DirectoryError, store::StoreError};

/// Space management errors.
///
/// Validation errors are reported before any mutation is attempted; every
/// committed write is a single whole-aggregate conditioned replace, so failed
/// operations leave no partial state behind. Store-level version conflicts
/// are resolved internally by retrying and never surface here directly.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed name, description or address range.
    #[error("invalid {what}: {reason}")]
    Format {
        /// The offending input.
        what: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// Name, range or id collision.
    #[error("{0}")]
    Conflict(String),
    /// A referenced space, block, reservation or external resource does not
    /// exist.
    #[error("{0} not found")]
    NotFound(String),
    /// The caller lacks the capability for the operation.
    #[error("{0}")]
    Permission(String),
    /// No free range of the requested size is left.
    #[error("network of requested size unavailable in target block(s)")]
    AllocationExhausted,
    /// The operation kept losing against concurrent writers; safe to retry as
    /// a whole.
    #[error("operation aborted after {attempts} conflicting attempts, please try again")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: usize,
    },
    /// The aggregate store failed.
    #[error("store error")]
    Store(#[source] StoreError),
    /// The network directory failed.
    #[error("network directory error")]
    Directory(#[from] DirectoryError),
}

impl From<AllocationError> for Error {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Exhausted { .. } => Error::AllocationExhausted,
            AllocationError::InvalidPrefixLength(len) => {
                Error::Format {
                    what: "prefix length",
                    reason: format!("/{len} is not a valid IPv4 prefix length"),
                }
            }
        }
    }
}
