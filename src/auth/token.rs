//! JWT access tokens.
//!
//! Tokens are HS256-signed. The signing key is the SHA-256 digest of the
//! configured secret, so secrets of any length yield a 256-bit key.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::account::Account;
use crate::config::AuthConfig;

/// Token errors.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Token has expired.
    #[error("token expired")]
    Expired,

    /// Signature, issuer, audience or format check failed.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Settings for issuing and verifying tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_hours: u64,
}

impl From<&AuthConfig> for TokenConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            expiry_hours: config.token_expiry_hours,
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    pub email: String,
    pub name: String,
    /// "Admin" or "User".
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    /// Account id parsed from `sub`.
    pub fn account_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Whether the token was issued to an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == "Admin"
    }
}

/// A signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    expiry: Duration,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        let key = Sha256::digest(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
            validation,
            issuer: config.issuer,
            audience: config.audience,
            expiry: i64::try_from(config.expiry_hours)
                .ok()
                .and_then(Duration::try_hours)
                .unwrap_or(Duration::MAX),
        }
    }

    /// Issue a token for `account`, valid from now.
    pub fn issue(&self, account: &Account) -> Result<IssuedToken, TokenError> {
        self.issue_at(account, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.expiry)
            .ok_or_else(|| TokenError::Signing("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role().as_str().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, expiry, issuer and audience, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> TokenConfig {
        TokenConfig {
            secret: secret.to_string(),
            issuer: "gameshelf".to_string(),
            audience: "gameshelf-clients".to_string(),
            expiry_hours: 24,
        }
    }

    fn account(is_admin: bool) -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            is_admin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            last_login_at: None,
            failed_login_count: 0,
            locked_until: None,
        }
    }

    #[test]
    fn test_oversized_expiry_is_an_error() {
        let issuer = TokenIssuer::new(TokenConfig {
            expiry_hours: 10_000_000_000,
            ..config("test-secret")
        });

        let result = issuer.issue(&account(false));
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new(config("test-secret"));
        let account = account(false);

        let issued = issuer.issue(&account).unwrap();
        let claims = issuer.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.account_id(), Some(account.id));
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.role, "User");
        assert!(!claims.is_admin());
        assert_eq!(claims.iss, "gameshelf");
        assert_eq!(claims.aud, "gameshelf-clients");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_admin_role_claim() {
        let issuer = TokenIssuer::new(config("test-secret"));
        let issued = issuer.issue(&account(true)).unwrap();
        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.role, "Admin");
        assert!(claims.is_admin());
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let issuer = TokenIssuer::new(config("test-secret"));
        let account = account(false);
        let a = issuer.verify(&issuer.issue(&account).unwrap().token).unwrap();
        let b = issuer.verify(&issuer.issue(&account).unwrap().token).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new(config("test-secret"));
        let issued = issuer
            .issue_at(&account(false), Utc::now() - Duration::hours(48))
            .unwrap();
        assert!(matches!(issuer.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = TokenIssuer::new(config("secret-one"))
            .issue(&account(false))
            .unwrap();
        let other = TokenIssuer::new(config("secret-two"));
        assert!(matches!(other.verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let issued = TokenIssuer::new(config("secret")).issue(&account(false)).unwrap();
        let mut other_config = config("secret");
        other_config.audience = "someone-else".to_string();
        let other = TokenIssuer::new(other_config);
        assert!(matches!(other.verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let issued = TokenIssuer::new(config("secret")).issue(&account(false)).unwrap();
        let mut other_config = config("secret");
        other_config.issuer = "impostor".to_string();
        let other = TokenIssuer::new(other_config);
        assert!(matches!(other.verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_raw_secret_is_not_the_key() {
        let issued = TokenIssuer::new(config("raw-secret")).issue(&account(false)).unwrap();
        let raw_key = DecodingKey::from_secret(b"raw-secret");
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["gameshelf-clients"]);
        assert!(decode::<Claims>(&issued.token, &raw_key, &validation).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = TokenIssuer::new(config("secret"));
        assert!(matches!(issuer.verify("not.a.jwt"), Err(TokenError::Invalid(_))));
    }
}
