pub(crate) mod auth;
pub(crate) mod extract;
pub(crate) mod health;
pub(crate) mod router;
pub(crate) mod terminals;
