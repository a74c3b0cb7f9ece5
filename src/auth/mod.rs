//! Authentication primitives: password hashing, access tokens and input
//! validation.

mod password;
mod token;
pub mod validation;

pub use password::{Argon2Hasher, CredentialHasher, PasswordError};
pub use token::{Claims, IssuedToken, TokenConfig, TokenError, TokenIssuer};
pub use validation::ValidationError;
