pub(crate) mod config;
pub mod error;
pub(crate) mod state;
pub(crate) mod store;
