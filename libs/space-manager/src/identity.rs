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
//! Caller identity and roles.
//!
//! Token decoding and admin-list resolution happen outside the engine; every
//! operation receives an already resolved [Caller].

use crate::{error::Error, model::UserId};

/// The capability of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Service administrator.
    Admin,
    /// Regular authenticated user.
    User,
}

/// A resolved caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The user the request is made on behalf of.
    pub user_id: UserId,
    /// The caller's role, derived from the tenant admin registry.
    pub role: Role,
}

impl Caller {
    /// Creates an admin caller.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    /// Creates a regular caller.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    /// Returns true if the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Rejects non-admin callers.
pub(crate) fn ensure_admin(caller: &Caller) -> Result<(), Error> {
    if !caller.is_admin() {
        return Err(Error::Permission(
            "operation restricted to admins".to_string(),
        ));
    }
    Ok(())
}
