//! Authenticated identity passed explicitly into every gated operation.

use serde::{Deserialize, Serialize};

/// Store-assigned user identifier.
pub type PrincipalId = i64;

/// An authenticated user identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub username: String,
}
