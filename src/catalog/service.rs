//! Catalog operations with input validation.

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::repository::GameRepository;
use super::types::{Game, GameUpdate, NewGame};
use crate::ShelfError;

/// Maximum title length (in characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum description length (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("game not found")]
    NotFound,

    /// Invalid input for `field`.
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] ShelfError),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

fn invalid(field: &'static str, message: impl Into<String>) -> CatalogError {
    CatalogError::Validation {
        field,
        message: message.into(),
    }
}

fn validate_title(title: &str) -> CatalogResult<()> {
    if title.trim().is_empty() {
        return Err(invalid("title", "title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(invalid(
            "title",
            format!("title must be at most {MAX_TITLE_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> CatalogResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(invalid(
            "description",
            format!("description must be at most {MAX_DESCRIPTION_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn validate_price(price_cents: i64) -> CatalogResult<()> {
    if price_cents < 0 {
        return Err(invalid("price_cents", "price must not be negative"));
    }
    Ok(())
}

/// Games inserted into an empty catalog at startup.
const DEFAULT_GAMES: &[(&str, &str, i64)] = &[
    ("Pac-Man", "Classic maze chase through a field of pellets.", 1999),
    ("Tetris", "Rotate and drop falling blocks to clear lines.", 1499),
    ("Snake", "Guide a growing snake without biting your own tail.", 999),
];

/// Catalog service.
#[derive(Clone)]
pub struct CatalogService {
    repo: GameRepository,
}

impl CatalogService {
    pub fn new(repo: GameRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> CatalogResult<Vec<Game>> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> CatalogResult<Game> {
        self.repo.get_by_id(id).await?.ok_or(CatalogError::NotFound)
    }

    pub async fn create(&self, new_game: NewGame) -> CatalogResult<Game> {
        validate_title(&new_game.title)?;
        validate_description(&new_game.description)?;
        validate_price(new_game.price_cents)?;

        let new_game = NewGame {
            title: new_game.title.trim().to_string(),
            ..new_game
        };
        let game = self.repo.create(&new_game).await?;
        info!(game_id = %game.id, title = %game.title, "Game created");
        Ok(game)
    }

    pub async fn update(&self, id: Uuid, update: GameUpdate) -> CatalogResult<Game> {
        if let Some(title) = update.title.as_deref().filter(|t| !t.trim().is_empty()) {
            validate_title(title)?;
        }
        if let Some(description) = update.description.as_deref() {
            validate_description(description)?;
        }
        if let Some(price_cents) = update.price_cents {
            validate_price(price_cents)?;
        }

        let mut game = self.get(id).await?;
        update.apply_to(&mut game);
        game.updated_at = Some(Utc::now());

        if !self.repo.update(&game).await? {
            return Err(CatalogError::NotFound);
        }
        info!(game_id = %id, "Game updated");
        Ok(game)
    }

    pub async fn delete(&self, id: Uuid) -> CatalogResult<()> {
        if !self.repo.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        info!(game_id = %id, "Game deleted");
        Ok(())
    }

    /// Insert the default games if the catalog is empty. Returns how many were added.
    pub async fn seed_defaults(&self) -> CatalogResult<usize> {
        if self.repo.count().await? > 0 {
            return Ok(0);
        }
        for (title, description, price_cents) in DEFAULT_GAMES {
            self.repo
                .create(&NewGame::new(*title, *description, *price_cents))
                .await?;
        }
        info!(count = DEFAULT_GAMES.len(), "Seeded default catalog");
        Ok(DEFAULT_GAMES.len())
    }
}
