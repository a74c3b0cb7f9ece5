//! Account persistence.
//!
//! The service layer depends on the [`AccountStore`] trait; [`AccountRepository`]
//! is the SQLite implementation.

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::model::{Account, NewAccount};
use crate::{Result, ShelfError};

/// Storage seam for accounts.
///
/// `create` and `update` fail with [`ShelfError::UniqueViolation`] when the
/// email already belongs to another account.
pub trait AccountStore: Send + Sync {
    fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<Account>>> + Send;

    /// Exact (case-sensitive) email lookup.
    fn get_by_email(&self, email: &str) -> impl Future<Output = Result<Option<Account>>> + Send;

    fn create(&self, new_account: NewAccount) -> impl Future<Output = Result<Account>> + Send;

    /// Persist every field of `account`, keyed by its id.
    fn update(&self, account: &Account) -> impl Future<Output = Result<()>> + Send;

    /// Returns `false` when nothing was deleted.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool>> + Send;

    /// All accounts, oldest first.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Account>>> + Send;
}

const SELECT_COLUMNS: &str = "SELECT id, name, email, password_hash, is_admin, is_active,
        created_at, updated_at, last_login_at, failed_login_count, locked_until
     FROM accounts";

/// SQLite-backed account store.
#[derive(Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Count all accounts.
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

impl AccountStore for AccountRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(AccountRow::into_account).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!("{SELECT_COLUMNS} WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(AccountRow::into_account).transpose()
    }

    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        let account = new_account.into_account(Utc::now());

        sqlx::query(
            "INSERT INTO accounts (id, name, email, password_hash, is_admin, is_active,
                                   created_at, failed_login_count)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(account.id.to_string())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.is_admin)
        .bind(account.is_active)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<()> {
        let result = sqlx::query(
            "UPDATE accounts SET name = ?, email = ?, password_hash = ?, is_admin = ?,
                    is_active = ?, updated_at = ?, last_login_at = ?,
                    failed_login_count = ?, locked_until = ?
             WHERE id = ?",
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.is_admin)
        .bind(account.is_active)
        .bind(account.updated_at)
        .bind(account.last_login_at)
        .bind(account.failed_login_count as i64)
        .bind(account.locked_until)
        .bind(account.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ShelfError::NotFound("account".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(AccountRow::into_account).collect()
    }
}

/// Internal struct for mapping database rows to Account.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    failed_login_count: i64,
    locked_until: Option<DateTime<Utc>>,
}

impl AccountRow {
    fn into_account(self) -> Result<Account> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| ShelfError::Database(format!("invalid account id {}: {e}", self.id)))?;
        Ok(Account {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_admin: self.is_admin,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_login_at: self.last_login_at,
            failed_login_count: self.failed_login_count.max(0) as u32,
            locked_until: self.locked_until,
        })
    }
}

/// Process-local store used by service tests.
#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub(crate) struct MemoryAccountStore {
        accounts: Mutex<Vec<Account>>,
    }

    impl MemoryAccountStore {
        pub(crate) fn len(&self) -> usize {
            self.accounts.lock().unwrap().len()
        }
    }

    impl AccountStore for MemoryAccountStore {
        async fn get(&self, id: Uuid) -> Result<Option<Account>> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == id)
                .cloned())
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.email == email)
                .cloned())
        }

        async fn create(&self, new_account: NewAccount) -> Result<Account> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.iter().any(|a| a.email == new_account.email) {
                return Err(ShelfError::UniqueViolation("accounts.email".to_string()));
            }
            let account = new_account.into_account(Utc::now());
            accounts.push(account.clone());
            Ok(account)
        }

        async fn update(&self, account: &Account) -> Result<()> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts
                .iter()
                .any(|a| a.id != account.id && a.email == account.email)
            {
                return Err(ShelfError::UniqueViolation("accounts.email".to_string()));
            }
            match accounts.iter_mut().find(|a| a.id == account.id) {
                Some(slot) => {
                    *slot = account.clone();
                    Ok(())
                }
                None => Err(ShelfError::NotFound("account".to_string())),
            }
        }

        async fn delete(&self, id: Uuid) -> Result<bool> {
            let mut accounts = self.accounts.lock().unwrap();
            let before = accounts.len();
            accounts.retain(|a| a.id != id);
            Ok(accounts.len() < before)
        }

        async fn list_all(&self) -> Result<Vec<Account>> {
            Ok(self.accounts.lock().unwrap().clone())
        }
    }
}
