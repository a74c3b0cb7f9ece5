//! Game repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::types::{Game, NewGame};
use crate::{Result, ShelfError};

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, price_cents, created_at, updated_at FROM games";

/// Repository for game CRUD operations.
#[derive(Clone)]
pub struct GameRepository {
    pool: SqlitePool,
}

impl GameRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a game and return it with its assigned id.
    pub async fn create(&self, new_game: &NewGame) -> Result<Game> {
        let game = Game {
            id: Uuid::new_v4(),
            title: new_game.title.clone(),
            description: new_game.description.clone(),
            price_cents: new_game.price_cents,
            created_at: Utc::now(),
            updated_at: None,
        };

        sqlx::query(
            "INSERT INTO games (id, title, description, price_cents, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(game.id.to_string())
        .bind(&game.title)
        .bind(&game.description)
        .bind(game.price_cents)
        .bind(game.created_at)
        .execute(&self.pool)
        .await?;

        Ok(game)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Game>> {
        let row = sqlx::query_as::<_, GameRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(GameRow::into_game).transpose()
    }

    /// All games ordered by title.
    pub async fn list(&self) -> Result<Vec<Game>> {
        let rows = sqlx::query_as::<_, GameRow>(&format!("{SELECT_COLUMNS} ORDER BY title, id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(GameRow::into_game).collect()
    }

    /// Persist title, description, price and last-modified time.
    pub async fn update(&self, game: &Game) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE games SET title = ?, description = ?, price_cents = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&game.title)
        .bind(&game.description)
        .bind(game.price_cents)
        .bind(game.updated_at)
        .bind(game.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct GameRow {
    id: String,
    title: String,
    description: String,
    price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl GameRow {
    fn into_game(self) -> Result<Game> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| ShelfError::Database(format!("invalid game id {}: {e}", self.id)))?;
        Ok(Game {
            id,
            title: self.title,
            description: self.description,
            price_cents: self.price_cents,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
