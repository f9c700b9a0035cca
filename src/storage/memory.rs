//! In-memory store backing the unit tests. A transaction holds the whole
//! store lock, so transactions are serialized.
//!
//! [`MemoryStore::racing`] drops that lock so transactions overlap. Each one
//! waits in `lock_favorites` until all racers have read their snapshot, and
//! `insert_row` resolves against committed state the way a unique-key upsert
//! does. Appends to an existing row are not isolated in that mode.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Barrier, Mutex, OwnedMutexGuard};

use crate::core::error::StoreError;
use crate::core::store::{CatalogStore, CredentialStore, FavoritesStore, FavoritesTx};
use crate::types::{Identity, Terminal, TerminalId, UserId};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<Identity>,
    catalog: Vec<Terminal>,
    favorites: HashMap<UserId, Vec<TerminalId>>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    fail_writes: Arc<AtomicBool>,
    catalog_down: Arc<AtomicBool>,
    race: Option<Arc<Barrier>>,
}

impl MemoryStore {
    pub(crate) fn with_catalog(catalog: Vec<Terminal>) -> Self {
        let store = Self::default();
        store
            .inner
            .try_lock()
            .expect("fresh store is unlocked")
            .catalog = catalog;
        store
    }

    /// Transactions no longer serialize. `racers` transactions must reach
    /// `lock_favorites` before any of them proceeds.
    pub(crate) fn racing(catalog: Vec<Terminal>, racers: usize) -> Self {
        Self {
            race: Some(Arc::new(Barrier::new(racers))),
            ..Self::with_catalog(catalog)
        }
    }

    /// Makes every subsequent favorites write fail.
    pub(crate) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn take_catalog_down(&self) {
        self.catalog_down.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn set_favorites(&self, user_id: UserId, ids: Vec<TerminalId>) {
        self.inner.lock().await.favorites.insert(user_id, ids);
    }

    pub(crate) async fn has_row(&self, user_id: UserId) -> bool {
        self.inner.lock().await.favorites.contains_key(&user_id)
    }
}

impl CredentialStore for MemoryStore {
    async fn lookup(&self, name: &str) -> Result<Option<Identity>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|user| user.name == name).cloned())
    }

    async fn create(&self, name: &str, password_hash: &str) -> Result<Identity, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|user| user.name == name) {
            return Err(StoreError::Conflict);
        }

        let identity = Identity {
            id: inner.users.len() as UserId + 1,
            name: name.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        inner.users.push(identity.clone());

        Ok(identity)
    }
}

impl CatalogStore for MemoryStore {
    async fn terminals(&self) -> Result<Vec<Terminal>, StoreError> {
        if self.catalog_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("catalog is down".into()));
        }
        Ok(self.inner.lock().await.catalog.clone())
    }
}

impl FavoritesStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let (guard, staged) = match self.race {
            Some(_) => (None, self.inner.lock().await.favorites.clone()),
            None => {
                let guard = self.inner.clone().lock_owned().await;
                let staged = guard.favorites.clone();
                (Some(guard), staged)
            }
        };

        Ok(MemoryTx {
            shared: self.inner.clone(),
            guard,
            staged,
            touched: HashSet::new(),
            race: self.race.clone(),
            fail_writes: self.fail_writes.clone(),
        })
    }

    async fn favorite_ids(&self, user_id: UserId) -> Result<Vec<TerminalId>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.favorites.get(&user_id).cloned().unwrap_or_default())
    }
}

pub(crate) struct MemoryTx {
    shared: Arc<Mutex<Inner>>,
    /// Held for the whole transaction unless the store is racing.
    guard: Option<OwnedMutexGuard<Inner>>,
    staged: HashMap<UserId, Vec<TerminalId>>,
    touched: HashSet<UserId>,
    race: Option<Arc<Barrier>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryTx {
    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

impl FavoritesTx for MemoryTx {
    async fn terminal_exists(&mut self, terminal_id: TerminalId) -> Result<bool, StoreError> {
        let exists = match &self.guard {
            Some(guard) => guard.catalog.iter().any(|t| t.id == terminal_id),
            None => {
                let inner = self.shared.lock().await;
                inner.catalog.iter().any(|t| t.id == terminal_id)
            }
        };
        Ok(exists)
    }

    async fn lock_favorites(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<Vec<TerminalId>>, StoreError> {
        let current = self.staged.get(&user_id).cloned();
        if let Some(race) = &self.race {
            race.wait().await;
        }
        Ok(current)
    }

    async fn insert_row(
        &mut self,
        user_id: UserId,
        terminal_id: TerminalId,
    ) -> Result<bool, StoreError> {
        self.check_writable()?;

        // Racing inserts settle on the shared row, as ON CONFLICT would.
        if self.guard.is_none() {
            let mut inner = self.shared.lock().await;
            let ids = inner.favorites.entry(user_id).or_default();
            let added = !ids.contains(&terminal_id);
            if added {
                ids.push(terminal_id);
            }
            self.staged.insert(user_id, ids.clone());
            return Ok(added);
        }

        let ids = self.staged.entry(user_id).or_default();
        if ids.contains(&terminal_id) {
            return Ok(false);
        }
        ids.push(terminal_id);
        Ok(true)
    }

    async fn append(&mut self, user_id: UserId, terminal_id: TerminalId) -> Result<(), StoreError> {
        self.check_writable()?;
        if let Some(ids) = self.staged.get_mut(&user_id) {
            if !ids.contains(&terminal_id) {
                ids.push(terminal_id);
            }
            self.touched.insert(user_id);
        }
        Ok(())
    }

    async fn remove(&mut self, user_id: UserId, terminal_id: TerminalId) -> Result<(), StoreError> {
        self.check_writable()?;
        if let Some(ids) = self.staged.get_mut(&user_id) {
            ids.retain(|id| *id != terminal_id);
            self.touched.insert(user_id);
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        match self.guard {
            Some(mut guard) => guard.favorites = self.staged,
            None => {
                let mut inner = self.shared.lock().await;
                for user_id in self.touched {
                    if let Some(ids) = self.staged.get(&user_id) {
                        inner.favorites.insert(user_id, ids.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uncommitted_changes_are_discarded() {
        let store = MemoryStore::with_catalog(vec![Terminal::new(1, "north", "active")]);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.insert_row(7, 1).await.unwrap());
        tx.rollback().await.unwrap();

        assert!(!store.has_row(7).await);
    }

    #[tokio::test]
    async fn racing_inserts_add_the_id_once() {
        let store = MemoryStore::racing(vec![Terminal::new(1, "north", "active")], 2);
        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        let (a, b) = tokio::join!(first.lock_favorites(7), second.lock_favorites(7));
        assert_eq!((a.unwrap(), b.unwrap()), (None, None));

        assert!(first.insert_row(7, 1).await.unwrap());
        first.commit().await.unwrap();
        assert!(!second.insert_row(7, 1).await.unwrap());
        second.rollback().await.unwrap();

        assert_eq!(store.favorite_ids(7).await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let store = MemoryStore::default();
        store.create("walter", "hash").await.unwrap();

        let result = store.create("walter", "other").await;
        assert!(matches!(result, Err(StoreError::Conflict)));
    }
}
