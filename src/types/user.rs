use serde::{Deserialize, Serialize};

pub(crate) type UserId = i64;

/// A stored account. Created on sign-up and never mutated afterwards.
#[derive(Clone, Debug)]
pub(crate) struct Identity {
    pub(crate) id: UserId,
    pub(crate) name: String,
    pub(crate) password_hash: String,
}

/// Inserted into request extensions once a token has been validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AuthenticatedUser {
    pub(crate) id: UserId,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Claims {
    pub(crate) authorized: bool,
    #[serde(rename = "userId")]
    pub(crate) user_id: UserId,
    pub(crate) iss: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}
