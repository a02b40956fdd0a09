//! HTTP route handlers.
//!
//! ## Endpoint Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cloud API Endpoints                              │
//! │                                                                         │
//! │  POST /auth/register     name + email + credential → account + tokens  │
//! │  POST /auth/login        email + credential → tokens                    │
//! │  POST /auth/refresh      refresh token → fresh token pair               │
//! │                                                                         │
//! │  GET  /users/{id}/subscriptions   bare JSON array ([] if never saved)  │
//! │  PUT  /users/{id}/subscriptions   wholesale replace                     │
//! │  GET  /users/{id}/income          { "income": <cents> } (0 if never    │
//! │  PUT  /users/{id}/income          wholesale replace       saved)       │
//! │                                                                         │
//! │  GET  /health            liveness + database reachability               │
//! │                                                                         │
//! │  All /users routes require a bearer access token whose subject is      │
//! │  the {id} in the path: users only ever touch their own documents.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use subtrack_core::validation::{validate_income, validate_name, validate_subscription};
use subtrack_core::{Money, RecordKind, Subscription};

use crate::auth::{
    extract_bearer_token, hash_password, verify_federated_token, verify_password, Claims,
    Credential, ProviderKind,
};
use crate::db::UserRow;
use crate::error::CloudError;
use crate::AppState;

// =============================================================================
// Router
// =============================================================================

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route(
            "/users/{user_id}/subscriptions",
            get(get_subscriptions).put(put_subscriptions),
        )
        .route("/users/{user_id}/income", get(get_income).put(put_income))
        .with_state(state)
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub credential: Credential,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub credential: Credential,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Account shape returned to clients; credentials never leave the server.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<UserRow> for PublicUser {
    fn from(row: UserRow) -> Self {
        PublicUser {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            last_login: row.last_login,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncomeBody {
    pub income: Money,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// =============================================================================
// Auth Handlers
// =============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, CloudError> {
    validate_name(&req.name).map_err(|e| CloudError::InvalidRequest(e.to_string()))?;
    if !req.email.contains('@') {
        return Err(CloudError::InvalidRequest(
            "A valid email address is required".to_string(),
        ));
    }

    let user = build_user(
        &req.name,
        &req.email,
        &req.credential,
        &state.config.federated_jwt_secret,
    )?;
    state.db.create_user(&user).await?;

    info!(user_id = %user.id, provider = %user.provider, "Account created");

    let response = auth_response(&state, user).await?;
    Ok(Json(response))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, CloudError> {
    let Some(user) = state.db.find_user_by_email(&req.email).await? else {
        // Same error as a bad credential: don't leak which emails exist
        warn!(email = %req.email, "Login for unknown email");
        return Err(CloudError::AuthFailed("Invalid credentials".to_string()));
    };

    let provider: ProviderKind = user.provider.parse()?;
    let verified = match (&req.credential, provider) {
        (Credential::Password { password }, ProviderKind::Password) => {
            let Some(ref hash) = user.password_hash else {
                return Err(CloudError::Internal("Account has no password hash".to_string()));
            };
            verify_password(password, hash)?
        }
        (
            Credential::Federated {
                provider,
                subject,
                id_token,
            },
            ProviderKind::Federated,
        ) => {
            // (provider, subject) alone is public; the provider-signed
            // token is what proves the login
            user.federated_provider.as_deref() == Some(provider.as_str())
                && user.federated_subject.as_deref() == Some(subject.as_str())
                && verify_federated_token(id_token, &state.config.federated_jwt_secret, subject)
        }
        // Credential kind doesn't match how the account was created
        _ => false,
    };

    if !verified {
        warn!(user_id = %user.id, "Login rejected");
        return Err(CloudError::AuthFailed("Invalid credentials".to_string()));
    }

    state.db.touch_last_login(&user.id).await?;
    let user = state
        .db
        .find_user_by_id(&user.id)
        .await?
        .ok_or_else(|| CloudError::Internal("User vanished during login".to_string()))?;

    info!(user_id = %user.id, "Login succeeded");

    let response = auth_response(&state, user).await?;
    Ok(Json(response))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, CloudError> {
    let claims = state.jwt.validate_refresh_token(&req.refresh_token)?;

    let access_token = state.jwt.generate_access_token(&claims.sub, &claims.email)?;
    let refresh_token = state.jwt.generate_refresh_token(&claims.sub, &claims.email)?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt_access_lifetime_secs,
    }))
}

fn build_user(
    name: &str,
    email: &str,
    credential: &Credential,
    federated_secret: &str,
) -> Result<UserRow, CloudError> {
    let (provider, password_hash, federated_provider, federated_subject) = match credential {
        Credential::Password { password } => {
            if password.len() < 8 {
                return Err(CloudError::InvalidRequest(
                    "Password must be at least 8 characters".to_string(),
                ));
            }
            (ProviderKind::Password, Some(hash_password(password)?), None, None)
        }
        Credential::Federated {
            provider,
            subject,
            id_token,
        } => {
            if provider.is_empty() || subject.is_empty() {
                return Err(CloudError::InvalidRequest(
                    "Federated credentials need a provider and subject".to_string(),
                ));
            }
            // The subject we store must be the one the provider attests
            if !verify_federated_token(id_token, federated_secret, subject) {
                return Err(CloudError::AuthFailed(
                    "Federated token is invalid or not for this subject".to_string(),
                ));
            }
            (
                ProviderKind::Federated,
                None,
                Some(provider.clone()),
                Some(subject.clone()),
            )
        }
    };

    Ok(UserRow {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        provider: provider.as_str().to_string(),
        password_hash,
        federated_provider,
        federated_subject,
        created_at: Utc::now(),
        last_login: None,
    })
}

async fn auth_response(state: &AppState, user: UserRow) -> Result<AuthResponse, CloudError> {
    let access_token = state.jwt.generate_access_token(&user.id, &user.email)?;
    let refresh_token = state.jwt.generate_refresh_token(&user.id, &user.email)?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
        expires_in: state.config.jwt_access_lifetime_secs,
        token_type: "Bearer".to_string(),
    })
}

// =============================================================================
// Record Handlers
// =============================================================================

/// GET /users/{user_id}/subscriptions
pub async fn get_subscriptions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Subscription>>, CloudError> {
    authorize(&state, &headers, &user_id)?;

    // A user who never saved has an empty list, not an error
    let Some(doc) = state.db.get_document(&user_id, RecordKind::Subscriptions).await? else {
        return Ok(Json(Vec::new()));
    };

    let subscriptions: Vec<Subscription> = serde_json::from_str(&doc.payload)
        .map_err(|e| CloudError::Internal(format!("Corrupt stored document: {e}")))?;
    Ok(Json(subscriptions))
}

/// PUT /users/{user_id}/subscriptions
pub async fn put_subscriptions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(subscriptions): Json<Vec<Subscription>>,
) -> Result<Json<()>, CloudError> {
    authorize(&state, &headers, &user_id)?;

    let mut seen = HashSet::new();
    for sub in &subscriptions {
        validate_subscription(sub).map_err(|e| CloudError::InvalidRequest(e.to_string()))?;
        if !seen.insert(sub.id) {
            return Err(CloudError::InvalidRequest(format!(
                "Duplicate subscription id {}",
                sub.id
            )));
        }
    }

    let payload = serde_json::to_string(&subscriptions)
        .map_err(|e| CloudError::Internal(e.to_string()))?;
    state
        .db
        .put_document(&user_id, RecordKind::Subscriptions, &payload)
        .await?;

    info!(user_id = %user_id, count = subscriptions.len(), "Subscriptions replaced");
    Ok(Json(()))
}

/// GET /users/{user_id}/income
pub async fn get_income(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<IncomeBody>, CloudError> {
    authorize(&state, &headers, &user_id)?;

    // A user who never saved has zero income, not an error
    let Some(doc) = state.db.get_document(&user_id, RecordKind::Income).await? else {
        return Ok(Json(IncomeBody {
            income: Money::zero(),
        }));
    };

    let income: Money = serde_json::from_str(&doc.payload)
        .map_err(|e| CloudError::Internal(format!("Corrupt stored document: {e}")))?;
    Ok(Json(IncomeBody { income }))
}

/// PUT /users/{user_id}/income
pub async fn put_income(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<IncomeBody>,
) -> Result<Json<()>, CloudError> {
    authorize(&state, &headers, &user_id)?;

    validate_income(body.income).map_err(|e| CloudError::InvalidRequest(e.to_string()))?;

    let payload = serde_json::to_string(&body.income)
        .map_err(|e| CloudError::Internal(e.to_string()))?;
    state
        .db
        .put_document(&user_id, RecordKind::Income, &payload)
        .await?;

    info!(user_id = %user_id, "Income replaced");
    Ok(Json(()))
}

// =============================================================================
// Health Handler
// =============================================================================

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.db.health_check().await {
        Ok(()) => "ok",
        Err(_) => "unreachable",
    };

    Json(HealthResponse {
        status: "ok",
        database,
    })
}

// =============================================================================
// Authorization
// =============================================================================

/// Requires a valid access token whose subject is `user_id`.
fn authorize(state: &AppState, headers: &HeaderMap, user_id: &str) -> Result<Claims, CloudError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CloudError::AuthFailed("Missing authorization header".to_string()))?;

    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| CloudError::AuthFailed("Expected a bearer token".to_string()))?;

    let claims = state.jwt.validate_access_token(token)?;
    if claims.sub != user_id {
        return Err(CloudError::Unauthorized(
            "Token does not grant access to this user's records".to_string(),
        ));
    }

    Ok(claims)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{FederatedClaims, JwtManager};
    use crate::config::CloudConfig;
    use crate::db::Database;
    use subtrack_core::{Frequency, Priority};

    const PROVIDER_SECRET: &str = "test-federated-secret";

    async fn state() -> Arc<AppState> {
        let config = CloudConfig {
            http_port: 0,
            database_path: ":memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            federated_jwt_secret: PROVIDER_SECRET.to_string(),
            jwt_access_lifetime_secs: 3600,
            jwt_refresh_lifetime_secs: 86400,
        };
        let db = Database::connect(":memory:").await.unwrap();
        let jwt = JwtManager::new(config.jwt_secret.clone(), 3600, 86400);
        Arc::new(AppState { db, jwt, config })
    }

    fn password_credential() -> Credential {
        Credential::Password {
            password: "hunter2hunter2".to_string(),
        }
    }

    /// Mints the token an external identity provider would issue.
    fn provider_token(subject: &str, secret: &str) -> String {
        let claims = FederatedClaims {
            sub: subject.to_string(),
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn federated_credential(subject: &str, secret: &str) -> Credential {
        Credential::Federated {
            provider: "google".to_string(),
            subject: subject.to_string(),
            id_token: provider_token(subject, secret),
        }
    }

    async fn registered(state: &Arc<AppState>) -> AuthResponse {
        register(
            State(state.clone()),
            Json(RegisterRequest {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                credential: password_credential(),
            }),
        )
        .await
        .unwrap()
        .0
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let state = state().await;
        let auth = registered(&state).await;
        assert_eq!(auth.user.email, "alice@example.com");
        assert!(auth.user.last_login.is_none());

        let login = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "alice@example.com".to_string(),
                credential: password_credential(),
            }),
        )
        .await
        .unwrap()
        .0;

        assert_eq!(login.user.id, auth.user.id);
        assert!(login.user.last_login.is_some());
    }

    #[tokio::test]
    async fn test_bad_password_and_unknown_email_look_identical() {
        let state = state().await;
        registered(&state).await;

        let bad_password = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "alice@example.com".to_string(),
                credential: Credential::Password {
                    password: "wrong-password".to_string(),
                },
            }),
        )
        .await
        .unwrap_err();

        let unknown_email = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "nobody@example.com".to_string(),
                credential: password_credential(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(bad_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_federated_register_and_login() {
        let state = state().await;

        register(
            State(state.clone()),
            Json(RegisterRequest {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                credential: federated_credential("g-123", PROVIDER_SECRET),
            }),
        )
        .await
        .unwrap();

        let ok = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "bob@example.com".to_string(),
                credential: federated_credential("g-123", PROVIDER_SECRET),
            }),
        )
        .await;
        assert!(ok.is_ok());

        // A password can't log into a federated account
        let cross = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "bob@example.com".to_string(),
                credential: password_credential(),
            }),
        )
        .await;
        assert!(cross.is_err());
    }

    #[tokio::test]
    async fn test_federated_login_needs_a_provider_signed_token() {
        let state = state().await;

        register(
            State(state.clone()),
            Json(RegisterRequest {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                credential: federated_credential("g-123", PROVIDER_SECRET),
            }),
        )
        .await
        .unwrap();

        // The (provider, subject) pair is public; a token forged with the
        // wrong secret must not mint session tokens
        let forged = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "bob@example.com".to_string(),
                credential: federated_credential("g-123", "attacker-secret"),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(forged, CloudError::AuthFailed(_)));

        // A properly signed token for a different subject is just as useless
        let wrong_subject = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "bob@example.com".to_string(),
                credential: Credential::Federated {
                    provider: "google".to_string(),
                    subject: "g-123".to_string(),
                    id_token: provider_token("g-456", PROVIDER_SECRET),
                },
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(wrong_subject, CloudError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn test_federated_register_rejects_unverified_subject() {
        let state = state().await;

        // Registration must not store a subject the provider never attested
        let err = register(
            State(state.clone()),
            Json(RegisterRequest {
                name: "Mallory".to_string(),
                email: "mallory@example.com".to_string(),
                credential: Credential::Federated {
                    provider: "google".to_string(),
                    subject: "g-123".to_string(),
                    id_token: provider_token("g-999", PROVIDER_SECRET),
                },
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CloudError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn test_records_round_trip_with_token() {
        let state = state().await;
        let auth = registered(&state).await;
        let headers = bearer(&auth.access_token);
        let user_id = auth.user.id.clone();

        // Nothing saved yet: absent data is empty/zero, not an error
        let fresh = get_income(
            State(state.clone()),
            Path(user_id.clone()),
            headers.clone(),
        )
        .await
        .unwrap()
        .0;
        assert!(fresh.income.is_zero());

        let fresh = get_subscriptions(
            State(state.clone()),
            Path(user_id.clone()),
            headers.clone(),
        )
        .await
        .unwrap()
        .0;
        assert!(fresh.is_empty());

        put_income(
            State(state.clone()),
            Path(user_id.clone()),
            headers.clone(),
            Json(IncomeBody {
                income: Money::from_cents(250_000),
            }),
        )
        .await
        .unwrap();

        let got = get_income(State(state.clone()), Path(user_id.clone()), headers)
            .await
            .unwrap()
            .0;
        assert_eq!(got.income.cents(), 250_000);
    }

    #[tokio::test]
    async fn test_token_subject_must_match_path() {
        let state = state().await;
        let auth = registered(&state).await;
        let headers = bearer(&auth.access_token);

        let err = get_income(
            State(state.clone()),
            Path("someone-else".to_string()),
            headers,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CloudError::Unauthorized(_)));

        let err = get_income(
            State(state.clone()),
            Path(auth.user.id.clone()),
            HeaderMap::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CloudError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn test_put_subscriptions_rejects_duplicates_and_bad_amounts() {
        let state = state().await;
        let auth = registered(&state).await;
        let headers = bearer(&auth.access_token);
        let user_id = auth.user.id.clone();

        let mut a = Subscription::new(
            "Netflix",
            Money::from_cents(1500),
            Frequency::Monthly,
            Priority::Medium,
        );
        a.id = 1;
        let mut b = a.clone();
        b.name = "Gym".to_string();

        // b still has a's id
        let err = put_subscriptions(
            State(state.clone()),
            Path(user_id.clone()),
            headers.clone(),
            Json(vec![a.clone(), b]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CloudError::InvalidRequest(_)));

        a.amount = Money::from_cents(0);
        let err = put_subscriptions(
            State(state.clone()),
            Path(user_id),
            headers,
            Json(vec![a]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CloudError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let state = state().await;
        let response = health(State(state)).await.0;
        assert_eq!(response.status, "ok");
        assert_eq!(response.database, "ok");
    }
}
