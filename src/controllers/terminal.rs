use std::time::Duration;

use tracing::instrument;

use crate::core::error::Error;
use crate::core::store::{CatalogStore, FavoritesStore, FavoritesTx, bounded};
use crate::types::request::{FavoriteIntent, FavoritesRequest};
use crate::types::{AnnotatedTerminal, TerminalId, UserId};
use crate::utils::reconcile::reconcile;

#[derive(Clone, Debug)]
pub(crate) struct TerminalController<S> {
    store: S,
    deadline: Duration,
}

impl<S> TerminalController<S>
where
    S: CatalogStore + FavoritesStore,
{
    pub(crate) fn new(store: S, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Runs the requested mutation, then returns the reconciled view as it
    /// stands after the commit.
    pub(crate) async fn apply(
        &self,
        user_id: UserId,
        request: FavoritesRequest,
    ) -> Result<Vec<AnnotatedTerminal>, Error> {
        match request.favorite_intent {
            FavoriteIntent::Add => self.add_favorite(request.terminal_id, user_id).await?,
            FavoriteIntent::Remove => self.remove_favorite(request.terminal_id, user_id).await?,
            FavoriteIntent::None => (),
        }

        self.terminals(user_id).await
    }

    pub(crate) async fn terminals(&self, user_id: UserId) -> Result<Vec<AnnotatedTerminal>, Error> {
        let favorite_ids = self.favorite_ids(user_id).await?;

        let catalog = bounded(self.deadline, self.store.terminals())
            .await
            .map_err(Error::CatalogUnavailable)?;

        Ok(reconcile(catalog, &favorite_ids))
    }

    pub(crate) async fn favorite_ids(&self, user_id: UserId) -> Result<Vec<TerminalId>, Error> {
        Ok(bounded(self.deadline, self.store.favorite_ids(user_id)).await?)
    }

    #[instrument(skip(self))]
    pub(crate) async fn add_favorite(
        &self,
        terminal_id: TerminalId,
        user_id: UserId,
    ) -> Result<(), Error> {
        let mut tx = self.begin().await?;
        let outcome = self.stage_add(&mut tx, terminal_id, user_id).await;
        self.finish(tx, outcome).await
    }

    #[instrument(skip(self))]
    pub(crate) async fn remove_favorite(
        &self,
        terminal_id: TerminalId,
        user_id: UserId,
    ) -> Result<(), Error> {
        let mut tx = self.begin().await?;
        let outcome = self.stage_remove(&mut tx, terminal_id, user_id).await;
        self.finish(tx, outcome).await
    }

    async fn stage_add(
        &self,
        tx: &mut S::Tx,
        terminal_id: TerminalId,
        user_id: UserId,
    ) -> Result<(), Error> {
        let exists = bounded(self.deadline, tx.terminal_exists(terminal_id))
            .await
            .map_err(Error::MutationFailed)?;
        if !exists {
            return Err(Error::UnknownTerminal(terminal_id));
        }

        let current = bounded(self.deadline, tx.lock_favorites(user_id))
            .await
            .map_err(Error::MutationFailed)?;

        match current {
            Some(ids) if ids.contains(&terminal_id) => Err(Error::AlreadyFavorited(terminal_id)),
            Some(_) => bounded(self.deadline, tx.append(user_id, terminal_id))
                .await
                .map_err(Error::MutationFailed),
            None => {
                let added = bounded(self.deadline, tx.insert_row(user_id, terminal_id))
                    .await
                    .map_err(Error::MutationFailed)?;
                match added {
                    true => Ok(()),
                    false => Err(Error::AlreadyFavorited(terminal_id)),
                }
            }
        }
    }

    async fn stage_remove(
        &self,
        tx: &mut S::Tx,
        terminal_id: TerminalId,
        user_id: UserId,
    ) -> Result<(), Error> {
        let current = bounded(self.deadline, tx.lock_favorites(user_id))
            .await
            .map_err(Error::MutationFailed)?;

        match current {
            Some(ids) if ids.contains(&terminal_id) => {
                bounded(self.deadline, tx.remove(user_id, terminal_id))
                    .await
                    .map_err(Error::MutationFailed)
            }
            _ => Err(Error::NotFavorited(terminal_id)),
        }
    }

    async fn begin(&self) -> Result<S::Tx, Error> {
        bounded(self.deadline, self.store.begin())
            .await
            .map_err(Error::MutationFailed)
    }

    async fn finish(&self, tx: S::Tx, outcome: Result<(), Error>) -> Result<(), Error> {
        match outcome {
            Ok(()) => bounded(self.deadline, tx.commit())
                .await
                .map_err(Error::MutationFailed),
            Err(e) => {
                if let Err(rollback_error) = bounded(self.deadline, tx.rollback()).await {
                    tracing::error!("Failed to roll back favorites: {:?}", rollback_error);
                }
                Err(e)
            }
        }
    }
}
