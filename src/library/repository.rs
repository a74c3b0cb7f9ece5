//! Library entry repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::types::{LibraryEntry, LibraryItem};
use crate::catalog::Game;
use crate::{Result, ShelfError};

/// Repository for purchase records.
#[derive(Clone)]
pub struct LibraryRepository {
    pool: SqlitePool,
}

impl LibraryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a purchase. Fails with `UniqueViolation` if the account already
    /// owns the game.
    pub async fn create(
        &self,
        account_id: Uuid,
        game_id: Uuid,
        price_cents: i64,
    ) -> Result<LibraryEntry> {
        let entry = LibraryEntry {
            id: Uuid::new_v4(),
            account_id,
            game_id,
            purchased_at: Utc::now(),
            price_cents,
        };

        sqlx::query(
            "INSERT INTO library_entries (id, account_id, game_id, purchased_at, price_cents)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.account_id.to_string())
        .bind(entry.game_id.to_string())
        .bind(entry.purchased_at)
        .bind(entry.price_cents)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<LibraryEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            "SELECT id, account_id, game_id, purchased_at, price_cents
             FROM library_entries WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(EntryRow::into_entry).transpose()
    }

    /// Entries of one account joined with their games, newest purchase first.
    pub async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<LibraryItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT e.id, e.account_id, e.game_id, e.purchased_at, e.price_cents,
                    g.title, g.description, g.price_cents AS game_price_cents,
                    g.created_at AS game_created_at, g.updated_at AS game_updated_at
             FROM library_entries e
             JOIN games g ON g.id = e.game_id
             WHERE e.account_id = ?
             ORDER BY e.purchased_at DESC, e.rowid DESC",
        )
        .bind(account_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ItemRow::into_item).collect()
    }

    pub async fn owns(&self, account_id: Uuid, game_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM library_entries WHERE account_id = ? AND game_id = ?)",
        )
        .bind(account_id.to_string())
        .bind(game_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn delete(&self, account_id: Uuid, game_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM library_entries WHERE account_id = ? AND game_id = ?")
                .bind(account_id.to_string())
                .bind(game_id.to_string())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn parse_id(kind: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| ShelfError::Database(format!("invalid {kind} id {raw}: {e}")))
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    account_id: String,
    game_id: String,
    purchased_at: DateTime<Utc>,
    price_cents: i64,
}

impl EntryRow {
    fn into_entry(self) -> Result<LibraryEntry> {
        Ok(LibraryEntry {
            id: parse_id("library entry", &self.id)?,
            account_id: parse_id("account", &self.account_id)?,
            game_id: parse_id("game", &self.game_id)?,
            purchased_at: self.purchased_at,
            price_cents: self.price_cents,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    #[sqlx(flatten)]
    entry: EntryRow,
    title: String,
    description: String,
    game_price_cents: i64,
    game_created_at: DateTime<Utc>,
    game_updated_at: Option<DateTime<Utc>>,
}

impl ItemRow {
    fn into_item(self) -> Result<LibraryItem> {
        let entry = self.entry.into_entry()?;
        let game = Game {
            id: entry.game_id,
            title: self.title,
            description: self.description,
            price_cents: self.game_price_cents,
            created_at: self.game_created_at,
            updated_at: self.game_updated_at,
        };
        Ok(LibraryItem { entry, game })
    }
}
