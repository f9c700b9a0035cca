use std::future::Future;
use std::time::Duration;

use crate::core::error::StoreError;
use crate::types::{Identity, Terminal, TerminalId, UserId};

/// User records keyed by unique name.
pub(crate) trait CredentialStore: Send + Sync {
    fn lookup(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Identity>, StoreError>> + Send;

    /// Fails with [`StoreError::Conflict`] when the name is taken.
    fn create(
        &self,
        name: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<Identity, StoreError>> + Send;
}

/// The read-only terminal catalog.
pub(crate) trait CatalogStore: Send + Sync {
    fn terminals(&self) -> impl Future<Output = Result<Vec<Terminal>, StoreError>> + Send;
}

/// Per-user favorite sets. Mutations go through a [`FavoritesTx`].
pub(crate) trait FavoritesStore: Send + Sync {
    type Tx: FavoritesTx;

    fn begin(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send;

    /// Ids in insertion order; empty when the user has no row yet.
    fn favorite_ids(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<TerminalId>, StoreError>> + Send;
}

/// One open transaction against the favorites store. Dropping it without
/// calling [`FavoritesTx::commit`] discards every change made through it.
pub(crate) trait FavoritesTx: Send {
    fn terminal_exists(
        &mut self,
        terminal_id: TerminalId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Reads the user's set and holds the row lock until the transaction ends.
    /// `None` means the user has no row.
    fn lock_favorites(
        &mut self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Vec<TerminalId>>, StoreError>> + Send;

    /// Creates the row with `{terminal_id}`. If a concurrent transaction created
    /// it first, appends instead unless the id is already present. Returns
    /// whether the id was added.
    fn insert_row(
        &mut self,
        user_id: UserId,
        terminal_id: TerminalId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn append(
        &mut self,
        user_id: UserId,
        terminal_id: TerminalId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn remove(
        &mut self,
        user_id: UserId,
        terminal_id: TerminalId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Runs a store operation under a deadline.
pub(crate) async fn bounded<T, F>(deadline: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout),
    }
}
