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
//! Optimistic-concurrency retry loop.

use crate::{error::Error, store::StoreError};

/// Default number of attempts for a mutating operation.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Runs a read-modify-write mutation under optimistic concurrency.
///
/// Each attempt fetches the aggregate fresh and re-runs the entire business
/// computation against it; a stale diff is never reapplied. A write that
/// fails with [StoreError::VersionConflict] triggers the next attempt, any
/// other write failure aborts. When the attempt budget is exhausted the
/// operation fails with [Error::RetryExhausted].
pub fn mutate<A, V: Copy, T>(
    max_attempts: usize,
    mut fetch: impl FnMut() -> Result<(A, V), Error>,
    mut op: impl FnMut(&mut A) -> Result<T, Error>,
    mut write: impl FnMut(A, V) -> Result<(), StoreError>,
) -> Result<T, Error> {
    for attempt in 1..=max_attempts {
        let (mut aggregate, version) = fetch()?;
        let outcome = op(&mut aggregate)?;
        match write(aggregate, version) {
            Ok(()) => {
                if attempt > 1 {
                    tracing::debug!(attempt, "mutation committed after version conflict");
                }
                return Ok(outcome);
            }
            Err(StoreError::VersionConflict) => {
                tracing::debug!(attempt, "version conflict, re-running mutation");
            }
            Err(err) => return Err(Error::Store(err)),
        }
    }
    Err(Error::RetryExhausted {
        attempts: max_attempts,
    })
}
