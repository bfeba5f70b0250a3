use std::fmt;
use std::str::FromStr;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use super::error::AuthorizationError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Identifier issued by the external auth platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Agent,
    Buyer,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::Buyer => "buyer",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "agent" => Ok(Role::Agent),
            "buyer" | "user" => Ok(Role::Buyer),
            _ => Err(()),
        }
    }
}

/// Who is calling. Resolved from the session on every request and never cached by services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub id: UserId,
    pub role: Role,
}

impl ActorContext {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId(id.into()),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AuthorizationError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthorizationError::RoleRequired {
                required: "admin",
                actual: self.role,
            })
        }
    }

    pub fn require_agent_or_admin(&self) -> Result<(), AuthorizationError> {
        match self.role {
            Role::Admin | Role::Agent => Ok(()),
            Role::Buyer => Err(AuthorizationError::RoleRequired {
                required: "agent or admin",
                actual: self.role,
            }),
        }
    }

    /// Owners act on their own rows; admins may act on anyone's without taking ownership.
    pub fn require_owner_or_admin(&self, owner: &UserId) -> Result<(), AuthorizationError> {
        if self.is_admin() || &self.id == owner {
            Ok(())
        } else {
            Err(AuthorizationError::NotOwner)
        }
    }
}

/// Read the session headers populated by the auth platform's edge.
///
/// `None` means "no session": callers should send the user through the login flow.
pub fn actor_from_headers(headers: &HeaderMap) -> Option<ActorContext> {
    let id = headers.get(ACTOR_ID_HEADER)?.to_str().ok()?.trim();
    if id.is_empty() {
        return None;
    }
    let role = headers
        .get(ACTOR_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.parse::<Role>())
        .unwrap_or(Ok(Role::Buyer))
        .ok()?;

    Some(ActorContext::new(id, role))
}
