//! JWT authentication and credential verification.
//!
//! Handles JWT token generation and validation, plus the two supported
//! credential providers: password (argon2-hashed) and federated identity
//! (an externally issued JWT whose subject claim must match the account).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CloudError;

// =============================================================================
// Credentials
// =============================================================================

/// The credential presented at registration and login.
///
/// Passkey/WebAuthn is deliberately not a provider here: it is bound to a
/// browser credential store and has no server-side secret to verify beyond
/// the ceremony itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    /// A plain password, hashed with argon2 at rest.
    Password { password: String },

    /// A federated identity: the external provider's name, the stable
    /// subject it asserts for this user, and the token the provider issued.
    /// The token is verified here - signature against the configured
    /// provider secret, expiry, and subject match - before any session
    /// tokens are minted. The (provider, subject) pair alone is public
    /// and proves nothing.
    Federated {
        provider: String,
        subject: String,
        id_token: String,
    },
}

/// How a stored user authenticates, derived from their credential at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Password,
    Federated,
}

impl ProviderKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Password => "password",
            ProviderKind::Federated => "federated",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(ProviderKind::Password),
            "federated" => Ok(ProviderKind::Federated),
            other => Err(CloudError::Internal(format!(
                "Unknown credential provider '{other}'"
            ))),
        }
    }
}

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> Result<String, CloudError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CloudError::Internal(format!("Failed to hash password: {e}")))
}

/// Verifies a password against a stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, CloudError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CloudError::Internal(format!("Corrupt password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// =============================================================================
// Federated Tokens
// =============================================================================

/// The claims this API requires from an external provider's token.
#[derive(Debug, Serialize, Deserialize)]
pub struct FederatedClaims {
    /// Subject the provider asserts for the user.
    pub sub: String,

    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Verifies an externally issued token: signature against the configured
/// provider secret, unexpired, and subject equal to `expected_subject`.
///
/// Returns `false` on any failure; the caller folds that into the same
/// "Invalid credentials" response as a bad password.
pub fn verify_federated_token(id_token: &str, secret: &str, expected_subject: &str) -> bool {
    // Validation::default() requires an unexpired `exp`
    let decoded = decode::<FederatedClaims>(
        id_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    );

    match decoded {
        Ok(data) => data.claims.sub == expected_subject,
        Err(_) => false,
    }
}

// =============================================================================
// JWT
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Login email
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access" or "refresh")
    pub token_type: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    /// Generate an access token.
    pub fn generate_access_token(&self, user_id: &str, email: &str) -> Result<String, CloudError> {
        self.generate(user_id, email, "access", self.access_lifetime_secs)
    }

    /// Generate a refresh token.
    pub fn generate_refresh_token(&self, user_id: &str, email: &str) -> Result<String, CloudError> {
        self.generate(user_id, email, "refresh", self.refresh_lifetime_secs)
    }

    fn generate(
        &self,
        user_id: &str,
        email: &str,
        token_type: &str,
        lifetime_secs: i64,
    ) -> Result<String, CloudError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CloudError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, CloudError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| CloudError::AuthFailed(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Validate that a token is an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, CloudError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != "access" {
            return Err(CloudError::AuthFailed("Expected access token".to_string()));
        }

        Ok(claims)
    }

    /// Validate that a token is a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, CloudError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != "refresh" {
            return Err(CloudError::AuthFailed("Expected refresh token".to_string()));
        }

        Ok(claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600, 86400);

        let access_token = manager
            .generate_access_token("user-001", "a@example.com")
            .unwrap();

        let claims = manager.validate_access_token(&access_token).unwrap();

        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_wrong_token_type() {
        let manager = JwtManager::new("test-secret".to_string(), 3600, 86400);

        let access_token = manager
            .generate_access_token("user-001", "a@example.com")
            .unwrap();

        // An access token must not pass as a refresh token
        let result = manager.validate_refresh_token(&access_token);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = JwtManager::new("secret-a".to_string(), 3600, 86400);
        let other = JwtManager::new("secret-b".to_string(), 3600, 86400);

        let token = manager
            .generate_access_token("user-001", "a@example.com")
            .unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_credential_wire_shape() {
        let cred: Credential = serde_json::from_str(
            r#"{"type":"password","password":"hunter2"}"#,
        )
        .unwrap();
        assert!(matches!(cred, Credential::Password { .. }));

        let cred: Credential = serde_json::from_str(
            r#"{"type":"federated","provider":"google","subject":"g-123","id_token":"eyJ..."}"#,
        )
        .unwrap();
        assert!(matches!(cred, Credential::Federated { .. }));
    }

    fn mint_provider_token(subject: &str, secret: &str, exp: i64) -> String {
        let claims = FederatedClaims {
            sub: subject.to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_federated_token_verification() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint_provider_token("g-123", "provider-secret", exp);

        assert!(verify_federated_token(&token, "provider-secret", "g-123"));

        // Wrong signing secret
        assert!(!verify_federated_token(&token, "other-secret", "g-123"));

        // Valid signature but for a different subject
        assert!(!verify_federated_token(&token, "provider-secret", "g-456"));
    }

    #[test]
    fn test_expired_federated_token_rejected() {
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = mint_provider_token("g-123", "provider-secret", exp);
        assert!(!verify_federated_token(&token, "provider-secret", "g-123"));
    }
}
