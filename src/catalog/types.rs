//! Game catalog model.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A game offered in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Price in cents.
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data for adding a game to the catalog.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
}

impl NewGame {
    pub fn new(title: impl Into<String>, description: impl Into<String>, price_cents: i64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            price_cents,
        }
    }
}

/// Partial update for a game.
///
/// Empty strings and a missing price leave the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct GameUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
}

impl GameUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn price_cents(mut self, price_cents: i64) -> Self {
        self.price_cents = Some(price_cents);
        self
    }

    /// Apply to `game`, returning whether anything changed.
    pub fn apply_to(&self, game: &mut Game) -> bool {
        let mut changed = false;
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            game.title = title.trim().to_string();
            changed = true;
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            game.description = description.to_string();
            changed = true;
        }
        if let Some(price_cents) = self.price_cents {
            game.price_cents = price_cents;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game {
            id: Uuid::new_v4(),
            title: "Tetris".to_string(),
            description: "Falling blocks".to_string(),
            price_cents: 1499,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_update_applies_fields() {
        let mut g = game();
        let changed = GameUpdate::default()
            .title("Tetris 99")
            .description("Battle royale")
            .price_cents(0)
            .apply_to(&mut g);
        assert!(changed);
        assert_eq!(g.title, "Tetris 99");
        assert_eq!(g.description, "Battle royale");
        assert_eq!(g.price_cents, 0);
    }

    #[test]
    fn test_empty_values_keep_old() {
        let mut g = game();
        let changed = GameUpdate::default()
            .title("   ")
            .description("")
            .apply_to(&mut g);
        assert!(!changed);
        assert_eq!(g.title, "Tetris");
        assert_eq!(g.description, "Falling blocks");
        assert_eq!(g.price_cents, 1499);
    }
}
