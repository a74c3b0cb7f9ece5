//! Account lifecycle and login security.
//!
//! [`AccountService`] owns every account state transition: registration,
//! login with failed-attempt lockout, profile and password changes,
//! activation, locking and role changes.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::model::{Account, NewAccount};
use super::store::AccountStore;
use crate::auth::{CredentialHasher, PasswordError, TokenError, TokenIssuer};
use crate::config::{AuthConfig, MAX_LOCKOUT_MINUTES};
use crate::ShelfError;

/// Account operation errors.
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("account not found")]
    NotFound,

    #[error("email is already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password; the two are indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("account is locked until {until}")]
    AccountLocked { until: DateTime<Utc> },

    #[error("current password is incorrect")]
    WrongCurrentPassword,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(ShelfError),
}

impl From<ShelfError> for AccountError {
    fn from(e: ShelfError) -> Self {
        match e {
            ShelfError::UniqueViolation(_) => AccountError::DuplicateEmail,
            ShelfError::NotFound(_) => AccountError::NotFound,
            other => AccountError::Store(other),
        }
    }
}

pub type AccountResult<T> = std::result::Result<T, AccountError>;

/// When and for how long repeated login failures lock an account.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_failed_attempts: u32,
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(30),
        }
    }
}

impl From<&AuthConfig> for LockoutPolicy {
    fn from(config: &AuthConfig) -> Self {
        Self {
            max_failed_attempts: config.max_failed_logins,
            lockout_duration: config.lockout_duration(),
        }
    }
}

/// Lock expiry for a lock starting at `now`, with `duration` capped at
/// [`MAX_LOCKOUT_MINUTES`] so the instant stays representable.
fn lock_expiry(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    now + duration.min(Duration::minutes(MAX_LOCKOUT_MINUTES as i64))
}

/// Successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}

/// Account state machine over a store and a credential hasher.
pub struct AccountService<S, H> {
    store: S,
    hasher: H,
    tokens: TokenIssuer,
    policy: LockoutPolicy,
}

impl<S: AccountStore, H: CredentialHasher> AccountService<S, H> {
    pub fn new(store: S, hasher: H, tokens: TokenIssuer, policy: LockoutPolicy) -> Self {
        Self {
            store,
            hasher,
            tokens,
            policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn policy(&self) -> LockoutPolicy {
        self.policy
    }

    /// Register a standard account and sign the caller in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AccountResult<AuthResult> {
        let account = self.create_account(name, email, password, false).await?;
        info!(account_id = %account.id, email = %account.email, "Account registered");
        self.auth_result(account)
    }

    /// Authenticate with email and password.
    pub async fn login(&self, email: &str, password: &str) -> AccountResult<AuthResult> {
        self.login_at(email, password, Utc::now()).await
    }

    /// Authenticate as if the current time were `now`.
    pub async fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> AccountResult<AuthResult> {
        let Some(mut account) = self.store.get_by_email(email).await? else {
            warn!(email = %email, "Login failed: unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !account.is_active {
            warn!(account_id = %account.id, "Login rejected: account inactive");
            return Err(AccountError::AccountInactive);
        }

        if let Some(until) = account.locked_until {
            if until > now {
                warn!(account_id = %account.id, %until, "Login rejected: account locked");
                return Err(AccountError::AccountLocked { until });
            }
            // Expired lock: the account starts over with a clean counter.
            account.locked_until = None;
            account.failed_login_count = 0;
        }

        if !self.hasher.verify(password, &account.password_hash) {
            account.failed_login_count = account.failed_login_count.saturating_add(1);
            if account.failed_login_count >= self.policy.max_failed_attempts {
                let until = lock_expiry(now, self.policy.lockout_duration);
                account.locked_until = Some(until);
                warn!(
                    account_id = %account.id,
                    attempts = account.failed_login_count,
                    %until,
                    "Account locked after repeated login failures"
                );
            } else {
                warn!(
                    account_id = %account.id,
                    attempts = account.failed_login_count,
                    "Login failed: wrong password"
                );
            }
            account.touch(now);
            self.store.update(&account).await?;
            return Err(AccountError::InvalidCredentials);
        }

        account.failed_login_count = 0;
        account.locked_until = None;
        account.last_login_at = Some(now);
        self.store.update(&account).await?;

        info!(account_id = %account.id, "Login succeeded");
        self.auth_result(account)
    }

    pub async fn get(&self, id: Uuid) -> AccountResult<Account> {
        self.store.get(id).await?.ok_or(AccountError::NotFound)
    }

    pub async fn list(&self) -> AccountResult<Vec<Account>> {
        Ok(self.store.list_all().await?)
    }

    /// Change name and email. The email must not belong to another account.
    pub async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> AccountResult<Account> {
        let mut account = self.get(id).await?;

        if account.email != email {
            if let Some(other) = self.store.get_by_email(email).await? {
                if other.id != id {
                    return Err(AccountError::DuplicateEmail);
                }
            }
        }

        account.name = name.trim().to_string();
        account.email = email.to_string();
        account.touch(Utc::now());
        self.store.update(&account).await?;

        info!(account_id = %id, "Profile updated");
        Ok(account)
    }

    /// Replace the password after verifying the current one. Clears any lock.
    pub async fn change_password(
        &self,
        id: Uuid,
        current: &str,
        new: &str,
    ) -> AccountResult<Account> {
        let mut account = self.get(id).await?;

        if !self.hasher.verify(current, &account.password_hash) {
            warn!(account_id = %id, "Password change rejected: wrong current password");
            return Err(AccountError::WrongCurrentPassword);
        }

        account.password_hash = self.hasher.hash(new)?;
        account.failed_login_count = 0;
        account.locked_until = None;
        account.touch(Utc::now());
        self.store.update(&account).await?;

        info!(account_id = %id, "Password changed");
        Ok(account)
    }

    pub async fn activate(&self, id: Uuid) -> AccountResult<Account> {
        self.mutate(id, "activated", |a| a.is_active = true).await
    }

    pub async fn deactivate(&self, id: Uuid) -> AccountResult<Account> {
        self.mutate(id, "deactivated", |a| a.is_active = false).await
    }

    /// Lock for `duration`, or for the policy's lockout duration when `None`.
    pub async fn lock(&self, id: Uuid, duration: Option<Duration>) -> AccountResult<Account> {
        let until = lock_expiry(Utc::now(), duration.unwrap_or(self.policy.lockout_duration));
        self.mutate(id, "locked", |a| a.locked_until = Some(until)).await
    }

    /// Lift any lock and reset the failed-login counter.
    pub async fn unlock(&self, id: Uuid) -> AccountResult<Account> {
        self.mutate(id, "unlocked", |a| {
            a.locked_until = None;
            a.failed_login_count = 0;
        })
        .await
    }

    pub async fn promote_to_admin(&self, id: Uuid) -> AccountResult<Account> {
        self.mutate(id, "promoted to admin", |a| a.is_admin = true).await
    }

    pub async fn demote_from_admin(&self, id: Uuid) -> AccountResult<Account> {
        self.mutate(id, "demoted from admin", |a| a.is_admin = false).await
    }

    pub async fn delete(&self, id: Uuid) -> AccountResult<()> {
        self.get(id).await?;
        if !self.store.delete(id).await? {
            return Err(AccountError::NotFound);
        }
        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    /// Make sure an administrator with `email` exists, creating or promoting it.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AccountResult<Account> {
        match self.store.get_by_email(email).await? {
            Some(account) if account.is_admin => Ok(account),
            Some(account) => self.promote_to_admin(account.id).await,
            None => {
                let account = self.create_account(name, email, password, true).await?;
                info!(account_id = %account.id, email = %account.email, "Administrator created");
                Ok(account)
            }
        }
    }

    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> AccountResult<Account> {
        if self.store.get_by_email(email).await?.is_some() {
            warn!(email = %email, "Registration rejected: email already registered");
            return Err(AccountError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(password)?;
        let mut new_account = NewAccount::new(name.trim(), email, password_hash);
        new_account.is_admin = is_admin;

        // The store's unique constraint covers a concurrent registration
        Ok(self.store.create(new_account).await?)
    }

    async fn mutate<F>(&self, id: Uuid, action: &str, apply: F) -> AccountResult<Account>
    where
        F: FnOnce(&mut Account) + Send,
    {
        let mut account = self.get(id).await?;
        apply(&mut account);
        account.touch(Utc::now());
        self.store.update(&account).await?;
        info!(account_id = %id, "Account {}", action);
        Ok(account)
    }

    fn auth_result(&self, account: Account) -> AccountResult<AuthResult> {
        let issued = self.tokens.issue(&account)?;
        Ok(AuthResult {
            token: issued.token,
            expires_at: issued.expires_at,
            account,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::store::memory::MemoryAccountStore;
    use crate::account::AccountStatus;
    use crate::auth::{Argon2Hasher, TokenConfig};

    const PASSWORD: &str = "Secur3!pass";

    fn service() -> AccountService<MemoryAccountStore, Argon2Hasher> {
        AccountService::new(
            MemoryAccountStore::default(),
            Argon2Hasher::with_params(1024, 1, 1).unwrap(),
            TokenIssuer::new(TokenConfig {
                secret: "test-secret".to_string(),
                issuer: "gameshelf".to_string(),
                audience: "gameshelf-clients".to_string(),
                expiry_hours: 24,
            }),
            LockoutPolicy::default(),
        )
    }

    async fn register_ana(svc: &AccountService<MemoryAccountStore, Argon2Hasher>) -> Account {
        svc.register("Ana", "ana@example.com", PASSWORD)
            .await
            .unwrap()
            .account
    }

    async fn fail_logins(
        svc: &AccountService<MemoryAccountStore, Argon2Hasher>,
        times: usize,
        now: DateTime<Utc>,
    ) {
        for _ in 0..times {
            let result = svc.login_at("ana@example.com", "Wrong!pass1", now).await;
            assert!(matches!(result, Err(AccountError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn test_register_creates_standard_active_account() {
        let svc = service();
        let result = svc
            .register("  Ana  ", "ana@example.com", PASSWORD)
            .await
            .unwrap();

        assert!(!result.token.is_empty());
        assert!(result.expires_at > Utc::now());
        assert_eq!(result.account.name, "Ana");
        assert!(result.account.is_active);
        assert!(!result.account.is_admin);
        assert_ne!(result.account.password_hash, PASSWORD);

        let claims = svc.tokens().verify(&result.token).unwrap();
        assert_eq!(claims.account_id(), Some(result.account.id));
        assert_eq!(claims.role, "User");
    }

    #[tokio::test]
    async fn test_duplicate_registration_leaves_one_account() {
        let svc = service();
        register_ana(&svc).await;

        let result = svc.register("Ana Two", "ana@example.com", PASSWORD).await;
        assert!(matches!(result, Err(AccountError::DuplicateEmail)));
        assert_eq!(svc.store().len(), 1);
    }

    #[tokio::test]
    async fn test_login_success_updates_last_login() {
        let svc = service();
        register_ana(&svc).await;

        let result = svc.login("ana@example.com", PASSWORD).await.unwrap();
        assert!(result.account.last_login_at.is_some());
        assert_eq!(result.account.failed_login_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_email_is_invalid_credentials() {
        let svc = service();
        let result = svc.login("nobody@example.com", PASSWORD).await;
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_wrong_password_increments_counter() {
        let svc = service();
        let ana = register_ana(&svc).await;

        fail_logins(&svc, 2, Utc::now()).await;

        let stored = svc.get(ana.id).await.unwrap();
        assert_eq!(stored.failed_login_count, 2);
        assert!(stored.locked_until.is_none());
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_lockout_after_five_failures() {
        let svc = service();
        let ana = register_ana(&svc).await;
        let now = Utc::now();

        // The fifth failure sets the lock but still reports bad credentials
        fail_logins(&svc, 5, now).await;

        let stored = svc.get(ana.id).await.unwrap();
        assert_eq!(stored.failed_login_count, 5);
        let until = stored.locked_until.unwrap();
        assert_eq!(until, now + Duration::minutes(30));

        // Sixth attempt, correct password, still rejected
        let result = svc.login_at("ana@example.com", PASSWORD, now).await;
        assert!(matches!(result, Err(AccountError::AccountLocked { until: u }) if u == until));
    }

    #[tokio::test]
    async fn test_lock_expires() {
        let svc = service();
        let ana = register_ana(&svc).await;
        let now = Utc::now();
        fail_logins(&svc, 5, now).await;

        let later = now + Duration::minutes(31);
        let result = svc.login_at("ana@example.com", PASSWORD, later).await.unwrap();
        assert_eq!(result.account.failed_login_count, 0);
        assert!(result.account.locked_until.is_none());

        let stored = svc.get(ana.id).await.unwrap();
        assert_eq!(stored.status_at(later), AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_expired_lock_resets_counter_before_checking_password() {
        let svc = service();
        let ana = register_ana(&svc).await;
        let now = Utc::now();
        fail_logins(&svc, 5, now).await;

        // One wrong attempt after expiry counts from zero again
        let later = now + Duration::minutes(31);
        fail_logins(&svc, 1, later).await;

        let stored = svc.get(ana.id).await.unwrap();
        assert_eq!(stored.failed_login_count, 1);
        assert!(stored.locked_until.is_none());
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let svc = service();
        let ana = register_ana(&svc).await;
        let now = Utc::now();
        fail_logins(&svc, 4, now).await;

        svc.login_at("ana@example.com", PASSWORD, now).await.unwrap();
        let stored = svc.get(ana.id).await.unwrap();
        assert_eq!(stored.failed_login_count, 0);
        assert!(stored.locked_until.is_none());
    }

    #[tokio::test]
    async fn test_inactive_account_cannot_login() {
        let svc = service();
        let ana = register_ana(&svc).await;
        svc.deactivate(ana.id).await.unwrap();

        let result = svc.login("ana@example.com", PASSWORD).await;
        assert!(matches!(result, Err(AccountError::AccountInactive)));
    }

    #[tokio::test]
    async fn test_ana_scenario_change_password_clears_lock() {
        let svc = service();
        let ana = register_ana(&svc).await;
        let now = Utc::now();

        fail_logins(&svc, 5, now).await;
        assert!(matches!(
            svc.login_at("ana@example.com", PASSWORD, now).await,
            Err(AccountError::AccountLocked { .. })
        ));

        let changed = svc
            .change_password(ana.id, PASSWORD, "N3w!password")
            .await
            .unwrap();
        assert_eq!(changed.failed_login_count, 0);
        assert!(changed.locked_until.is_none());

        assert!(svc.login("ana@example.com", "N3w!password").await.is_ok());
        assert!(matches!(
            svc.login("ana@example.com", PASSWORD).await,
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let svc = service();
        let ana = register_ana(&svc).await;
        let result = svc.change_password(ana.id, "Wrong!pass1", "N3w!password").await;
        assert!(matches!(result, Err(AccountError::WrongCurrentPassword)));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let svc = service();
        let ana = register_ana(&svc).await;
        svc.register("Bob", "bob@example.com", PASSWORD).await.unwrap();

        let updated = svc
            .update_profile(ana.id, "Ana Souza", "ana.souza@example.com")
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana Souza");
        assert_eq!(updated.email, "ana.souza@example.com");
        assert!(updated.updated_at.is_some());

        // Keeping one's own email is fine
        assert!(svc
            .update_profile(ana.id, "Ana", "ana.souza@example.com")
            .await
            .is_ok());

        let result = svc.update_profile(ana.id, "Ana", "bob@example.com").await;
        assert!(matches!(result, Err(AccountError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_deactivate_twice_is_idempotent() {
        let svc = service();
        let ana = register_ana(&svc).await;

        svc.deactivate(ana.id).await.unwrap();
        let again = svc.deactivate(ana.id).await.unwrap();
        assert!(!again.is_active);

        let reactivated = svc.activate(ana.id).await.unwrap();
        assert!(reactivated.is_active);
    }

    #[tokio::test]
    async fn test_manual_lock_and_unlock() {
        let svc = service();
        let ana = register_ana(&svc).await;
        fail_logins(&svc, 3, Utc::now()).await;

        let locked = svc.lock(ana.id, Some(Duration::minutes(5))).await.unwrap();
        assert!(locked.is_locked_at(Utc::now()));
        assert!(matches!(
            svc.login("ana@example.com", PASSWORD).await,
            Err(AccountError::AccountLocked { .. })
        ));

        let unlocked = svc.unlock(ana.id).await.unwrap();
        assert!(unlocked.locked_until.is_none());
        assert_eq!(unlocked.failed_login_count, 0);
        assert!(svc.login("ana@example.com", PASSWORD).await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_default_duration() {
        let svc = service();
        let ana = register_ana(&svc).await;
        let before = Utc::now();
        let locked = svc.lock(ana.id, None).await.unwrap();
        let until = locked.locked_until.unwrap();
        assert!(until >= before + Duration::minutes(30));
        assert!(until <= Utc::now() + Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_oversized_lock_durations_are_capped() {
        let mut svc = service();
        svc.policy.lockout_duration = Duration::MAX;
        let ana = register_ana(&svc).await;
        let cap = Duration::minutes(MAX_LOCKOUT_MINUTES as i64);

        let now = Utc::now();
        fail_logins(&svc, 5, now).await;
        let locked = svc.get(ana.id).await.unwrap();
        assert_eq!(locked.locked_until, Some(now + cap));

        let before = Utc::now();
        let locked = svc.lock(ana.id, Some(Duration::MAX)).await.unwrap();
        let until = locked.locked_until.unwrap();
        assert!(until >= before + cap);
        assert!(until <= Utc::now() + cap);
    }

    #[tokio::test]
    async fn test_promote_and_demote() {
        let svc = service();
        let ana = register_ana(&svc).await;

        let promoted = svc.promote_to_admin(ana.id).await.unwrap();
        assert!(promoted.is_admin);
        let token = svc.login("ana@example.com", PASSWORD).await.unwrap().token;
        assert!(svc.tokens().verify(&token).unwrap().is_admin());

        let demoted = svc.demote_from_admin(ana.id).await.unwrap();
        assert!(!demoted.is_admin);
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let svc = service();
        let id = Uuid::new_v4();
        assert!(matches!(svc.get(id).await, Err(AccountError::NotFound)));
        assert!(matches!(svc.activate(id).await, Err(AccountError::NotFound)));
        assert!(matches!(svc.unlock(id).await, Err(AccountError::NotFound)));
        assert!(matches!(svc.delete(id).await, Err(AccountError::NotFound)));
        assert!(matches!(
            svc.update_profile(id, "X", "x@example.com").await,
            Err(AccountError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let svc = service();
        let ana = register_ana(&svc).await;
        svc.delete(ana.id).await.unwrap();
        assert!(matches!(svc.get(ana.id).await, Err(AccountError::NotFound)));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_admin() {
        let svc = service();

        let admin = svc
            .ensure_admin("Root", "root@example.com", PASSWORD)
            .await
            .unwrap();
        assert!(admin.is_admin);

        // Second call finds the existing administrator
        let again = svc
            .ensure_admin("Root", "root@example.com", PASSWORD)
            .await
            .unwrap();
        assert_eq!(again.id, admin.id);
        assert_eq!(svc.list().await.unwrap().len(), 1);

        // An existing standard account is promoted
        let ana = register_ana(&svc).await;
        let promoted = svc
            .ensure_admin("Ana", "ana@example.com", PASSWORD)
            .await
            .unwrap();
        assert_eq!(promoted.id, ana.id);
        assert!(promoted.is_admin);
    }
}
