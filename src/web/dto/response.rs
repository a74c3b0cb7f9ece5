//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::account::{Account, AuthResult};
use crate::catalog::Game;
use crate::library::{LibraryEntry, LibraryItem};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Account as returned by the API. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// "Admin" or "User".
    pub role: &'static str,
    /// "active", "locked" or "inactive".
    pub status: &'static str,
    pub is_active: bool,
    pub failed_login_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role().as_str(),
            status: account.status_at(Utc::now()).as_str(),
            is_active: account.is_active,
            failed_login_count: account.failed_login_count,
            locked_until: account.locked_until,
            created_at: account.created_at,
            updated_at: account.updated_at,
            last_login_at: account.last_login_at,
        }
    }
}

/// Register/login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub account: AccountSummary,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            token: result.token,
            token_type: "Bearer",
            expires_at: result.expires_at,
            account: AccountSummary::from(&result.account),
        }
    }
}

/// Catalog game.
#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            title: game.title,
            description: game.description,
            price_cents: game.price_cents,
            created_at: game.created_at,
            updated_at: game.updated_at,
        }
    }
}

/// Purchase record without the game.
#[derive(Debug, Serialize)]
pub struct LibraryEntryResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub game_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    pub price_cents: i64,
}

impl From<LibraryEntry> for LibraryEntryResponse {
    fn from(entry: LibraryEntry) -> Self {
        Self {
            id: entry.id,
            account_id: entry.account_id,
            game_id: entry.game_id,
            purchased_at: entry.purchased_at,
            price_cents: entry.price_cents,
        }
    }
}

/// Library listing item: the purchase and its game.
#[derive(Debug, Serialize)]
pub struct LibraryItemResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    /// Price paid at purchase time.
    pub price_cents: i64,
    pub game: GameResponse,
}

impl From<LibraryItem> for LibraryItemResponse {
    fn from(item: LibraryItem) -> Self {
        Self {
            id: item.entry.id,
            account_id: item.entry.account_id,
            purchased_at: item.entry.purchased_at,
            price_cents: item.entry.price_cents,
            game: GameResponse::from(item.game),
        }
    }
}

/// Ownership check result.
#[derive(Debug, Serialize)]
pub struct OwnershipResponse {
    pub game_id: Uuid,
    pub owned: bool,
}

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
