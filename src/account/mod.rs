//! Accounts: model, persistence and the login security state machine.

mod model;
mod service;
mod store;

pub use model::{Account, AccountStatus, NewAccount, Role};
pub use service::{AccountError, AccountResult, AccountService, AuthResult, LockoutPolicy};
pub use store::{AccountRepository, AccountStore};

#[cfg(test)]
pub(crate) use store::memory;
