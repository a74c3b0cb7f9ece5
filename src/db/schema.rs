//! Database schema and migrations for gameshelf.
//!
//! Migrations are applied in order; `schema_version` records which ones ran.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: accounts
    r#"
CREATE TABLE accounts (
    id                   TEXT PRIMARY KEY,
    name                 TEXT NOT NULL,
    email                TEXT NOT NULL UNIQUE,
    password_hash        TEXT NOT NULL,        -- Argon2 PHC string
    is_admin             INTEGER NOT NULL DEFAULT 0,
    is_active            INTEGER NOT NULL DEFAULT 1,
    created_at           TEXT NOT NULL,
    updated_at           TEXT,
    last_login_at        TEXT,
    failed_login_count   INTEGER NOT NULL DEFAULT 0,
    locked_until         TEXT
);

CREATE INDEX idx_accounts_created_at ON accounts(created_at);
"#,
    // v2: game catalog
    r#"
CREATE TABLE games (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    price_cents  INTEGER NOT NULL CHECK (price_cents >= 0),
    created_at   TEXT NOT NULL,
    updated_at   TEXT
);

CREATE INDEX idx_games_title ON games(title);
"#,
    // v3: per-account game library
    r#"
CREATE TABLE library_entries (
    id            TEXT PRIMARY KEY,
    account_id    TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    game_id       TEXT NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    purchased_at  TEXT NOT NULL,
    price_cents   INTEGER NOT NULL,
    UNIQUE(account_id, game_id)
);

CREATE INDEX idx_library_entries_account_id ON library_entries(account_id);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_create_tables() {
        assert_eq!(MIGRATIONS.len(), 3);
        assert!(MIGRATIONS[0].contains("CREATE TABLE accounts"));
        assert!(MIGRATIONS[1].contains("CREATE TABLE games"));
        assert!(MIGRATIONS[2].contains("CREATE TABLE library_entries"));
    }

    #[test]
    fn test_accounts_email_unique() {
        assert!(MIGRATIONS[0].contains("email                TEXT NOT NULL UNIQUE"));
    }

    #[test]
    fn test_library_entry_uniqueness() {
        assert!(MIGRATIONS[2].contains("UNIQUE(account_id, game_id)"));
        assert!(MIGRATIONS[2].contains("ON DELETE CASCADE"));
    }
}
