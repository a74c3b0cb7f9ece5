//! Library model.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::Game;

/// A purchase record: one account owns one game.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub game_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    /// Price paid, copied from the game at purchase time.
    pub price_cents: i64,
}

/// A library entry together with its game.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryItem {
    pub entry: LibraryEntry,
    pub game: Game,
}
