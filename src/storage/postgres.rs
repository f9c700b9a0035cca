use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};

use crate::core::error::StoreError;
use crate::core::store::{CatalogStore, CredentialStore, FavoritesStore, FavoritesTx};
use crate::types::{Identity, Terminal, TerminalId, UserId};

#[derive(Clone, Debug)]
pub(crate) struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub(crate) async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }
}

impl CredentialStore for PgStore {
    async fn lookup(&self, name: &str) -> Result<Option<Identity>, StoreError> {
        let identity = sqlx::query("SELECT id, name, password_hash FROM users WHERE name = $1;")
            .bind(name)
            .map(map_identity)
            .fetch_optional(&self.pool)
            .await?;

        Ok(identity)
    }

    async fn create(&self, name: &str, password_hash: &str) -> Result<Identity, StoreError> {
        match sqlx::query(
            "INSERT INTO users (name, password_hash) VALUES ($1, $2)
            RETURNING id, name, password_hash;",
        )
        .bind(name)
        .bind(password_hash)
        .map(map_identity)
        .fetch_one(&self.pool)
        .await
        {
            Ok(identity) => Ok(identity),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Conflict)
            }
            Err(e) => Err(StoreError::Sql(e)),
        }
    }
}

impl CatalogStore for PgStore {
    async fn terminals(&self) -> Result<Vec<Terminal>, StoreError> {
        let terminals = sqlx::query("SELECT id, name, status FROM terminals ORDER BY id;")
            .map(map_terminal)
            .fetch_all(&self.pool)
            .await?;

        Ok(terminals)
    }
}

impl FavoritesStore for PgStore {
    type Tx = PgFavoritesTx;

    async fn begin(&self) -> Result<PgFavoritesTx, StoreError> {
        let tx = self.pool.begin().await?;

        Ok(PgFavoritesTx { tx })
    }

    async fn favorite_ids(&self, user_id: UserId) -> Result<Vec<TerminalId>, StoreError> {
        let ids = sqlx::query("SELECT terminal_ids FROM favorite_terminals WHERE user_id = $1;")
            .bind(user_id)
            .map(|row: PgRow| row.get::<Vec<TerminalId>, _>("terminal_ids"))
            .fetch_optional(&self.pool)
            .await?;

        Ok(ids.unwrap_or_default())
    }
}

pub(crate) struct PgFavoritesTx {
    tx: Transaction<'static, Postgres>,
}

impl FavoritesTx for PgFavoritesTx {
    async fn terminal_exists(&mut self, terminal_id: TerminalId) -> Result<bool, StoreError> {
        let exists = sqlx::query("SELECT EXISTS (SELECT 1 FROM terminals WHERE id = $1) AS found;")
            .bind(terminal_id)
            .map(|row: PgRow| row.get::<bool, _>("found"))
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(exists)
    }

    async fn lock_favorites(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<Vec<TerminalId>>, StoreError> {
        let ids = sqlx::query(
            "SELECT terminal_ids FROM favorite_terminals WHERE user_id = $1 FOR UPDATE;",
        )
        .bind(user_id)
        .map(|row: PgRow| row.get::<Vec<TerminalId>, _>("terminal_ids"))
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(ids)
    }

    async fn insert_row(
        &mut self,
        user_id: UserId,
        terminal_id: TerminalId,
    ) -> Result<bool, StoreError> {
        // A racing insert blocks on the primary key, then takes the update
        // branch. The WHERE guard keeps the set duplicate-free.
        let inserted = sqlx::query(
            "INSERT INTO favorite_terminals (user_id, terminal_ids)
            VALUES ($1, ARRAY[$2::BIGINT])
            ON CONFLICT (user_id) DO UPDATE
            SET terminal_ids = array_append(favorite_terminals.terminal_ids, $2::BIGINT)
            WHERE NOT ($2::BIGINT = ANY(favorite_terminals.terminal_ids))
            RETURNING user_id;",
        )
        .bind(user_id)
        .bind(terminal_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(inserted.is_some())
    }

    async fn append(&mut self, user_id: UserId, terminal_id: TerminalId) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE favorite_terminals
            SET terminal_ids = array_append(terminal_ids, $2::BIGINT)
            WHERE user_id = $1 AND NOT ($2::BIGINT = ANY(terminal_ids));",
        )
        .bind(user_id)
        .bind(terminal_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn remove(&mut self, user_id: UserId, terminal_id: TerminalId) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE favorite_terminals
            SET terminal_ids = array_remove(terminal_ids, $2::BIGINT)
            WHERE user_id = $1;",
        )
        .bind(user_id)
        .bind(terminal_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

fn map_identity(row: PgRow) -> Identity {
    Identity {
        id: row.get("id"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
    }
}

fn map_terminal(row: PgRow) -> Terminal {
    Terminal {
        id: row.get("id"),
        name: row.get("name"),
        status: row.get("status"),
    }
}
