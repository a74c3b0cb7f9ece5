//! Library operations.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::repository::LibraryRepository;
use super::types::{LibraryEntry, LibraryItem};
use crate::catalog::GameRepository;
use crate::ShelfError;

/// Library errors.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("game not found")]
    GameNotFound,

    #[error("game is already in the library")]
    AlreadyOwned,

    #[error("library entry not found")]
    EntryNotFound,

    #[error(transparent)]
    Store(ShelfError),
}

impl From<ShelfError> for LibraryError {
    fn from(e: ShelfError) -> Self {
        match e {
            ShelfError::UniqueViolation(_) => LibraryError::AlreadyOwned,
            other => LibraryError::Store(other),
        }
    }
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;

/// Per-account game library.
#[derive(Clone)]
pub struct LibraryService {
    entries: LibraryRepository,
    games: GameRepository,
}

impl LibraryService {
    pub fn new(entries: LibraryRepository, games: GameRepository) -> Self {
        Self { entries, games }
    }

    pub async fn list_for(&self, account_id: Uuid) -> LibraryResult<Vec<LibraryItem>> {
        Ok(self.entries.list_for_account(account_id).await?)
    }

    /// Add a game at its current price.
    pub async fn add(&self, account_id: Uuid, game_id: Uuid) -> LibraryResult<LibraryItem> {
        let game = self
            .games
            .get_by_id(game_id)
            .await?
            .ok_or(LibraryError::GameNotFound)?;

        if self.entries.owns(account_id, game_id).await? {
            return Err(LibraryError::AlreadyOwned);
        }

        // A concurrent purchase trips the unique index and maps to AlreadyOwned
        let entry = self
            .entries
            .create(account_id, game_id, game.price_cents)
            .await?;

        info!(
            account_id = %account_id,
            game_id = %game_id,
            price_cents = entry.price_cents,
            "Game added to library"
        );
        Ok(LibraryItem { entry, game })
    }

    pub async fn remove(&self, account_id: Uuid, game_id: Uuid) -> LibraryResult<()> {
        if !self.entries.delete(account_id, game_id).await? {
            return Err(LibraryError::EntryNotFound);
        }
        info!(account_id = %account_id, game_id = %game_id, "Game removed from library");
        Ok(())
    }

    pub async fn get(&self, entry_id: Uuid) -> LibraryResult<LibraryEntry> {
        self.entries
            .get_by_id(entry_id)
            .await?
            .ok_or(LibraryError::EntryNotFound)
    }

    pub async fn owns(&self, account_id: Uuid, game_id: Uuid) -> LibraryResult<bool> {
        Ok(self.entries.owns(account_id, game_id).await?)
    }
}
