use std::time::Duration;

use crate::controllers::terminal::TerminalController;
use crate::controllers::user::UserController;
use crate::core::error::ConfigError;
use crate::storage::PgStore;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) store: PgStore,
    pub(crate) user_controller: UserController<PgStore>,
    pub(crate) terminal_controller: TerminalController<PgStore>,
}

impl AppState {
    pub(crate) fn new(
        store: PgStore,
        secret: &str,
        bcrypt_cost: u32,
        deadline: Duration,
    ) -> Result<Self, ConfigError> {
        Ok(AppState {
            store: store.clone(),
            user_controller: UserController::new(store.clone(), secret, bcrypt_cost, deadline)?,
            terminal_controller: TerminalController::new(store, deadline),
        })
    }
}
