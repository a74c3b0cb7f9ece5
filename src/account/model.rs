//! Account model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Standard customer account.
    #[default]
    User,
    /// Administrator.
    Admin,
}

impl Role {
    /// Representation used in token claims and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Login-relevant state derived from an account's flags and lock expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Locked { until: DateTime<Utc> },
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Locked { .. } => "locked",
            AccountStatus::Inactive => "inactive",
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never logged or serialized.
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// Unset until the first mutation after creation.
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub failed_login_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl Account {
    pub fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Whether a lock is in force at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Derived status at `now`. Inactive takes precedence over a lock.
    pub fn status_at(&self, now: DateTime<Utc>) -> AccountStatus {
        if !self.is_active {
            return AccountStatus::Inactive;
        }
        match self.locked_until {
            Some(until) if until > now => AccountStatus::Locked { until },
            _ => AccountStatus::Active,
        }
    }

    /// Record a mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl NewAccount {
    /// A standard (non-admin) account.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_admin: false,
        }
    }

    /// Build the account record with a fresh id.
    pub fn into_account(self, now: DateTime<Utc>) -> Account {
        Account {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_admin: self.is_admin,
            is_active: true,
            created_at: now,
            updated_at: None,
            last_login_at: None,
            failed_login_count: 0,
            locked_until: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Account {
        NewAccount::new("Ana", "ana@example.com", "hash").into_account(Utc::now())
    }

    #[test]
    fn test_new_account_defaults() {
        let account = sample();
        assert!(account.is_active);
        assert!(!account.is_admin);
        assert_eq!(account.role(), Role::User);
        assert_eq!(account.failed_login_count, 0);
        assert!(account.updated_at.is_none());
        assert!(account.last_login_at.is_none());
        assert!(account.locked_until.is_none());
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("User".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "Admin");
    }

    #[test]
    fn test_status_active() {
        let account = sample();
        assert_eq!(account.status_at(Utc::now()), AccountStatus::Active);
    }

    #[test]
    fn test_status_locked_until_expiry() {
        let now = Utc::now();
        let mut account = sample();
        let until = now + Duration::minutes(30);
        account.locked_until = Some(until);

        assert!(account.is_locked_at(now));
        assert_eq!(account.status_at(now), AccountStatus::Locked { until });
        assert_eq!(
            account.status_at(until + Duration::seconds(1)),
            AccountStatus::Active
        );
    }

    #[test]
    fn test_status_inactive_wins_over_lock() {
        let now = Utc::now();
        let mut account = sample();
        account.is_active = false;
        account.locked_until = Some(now + Duration::minutes(5));
        assert_eq!(account.status_at(now), AccountStatus::Inactive);
        assert_eq!(account.status_at(now).as_str(), "inactive");
    }
}
