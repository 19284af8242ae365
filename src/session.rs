//! Access/refresh token pairs and their rotation.
//!

use chrono::{Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::{self, AccessClaims, CryptError, RefreshClaims},
    config,
    model::{
        CrudRepository, DatabaseError, ModelManager,
        entity::{RefreshToken, UserEntity, UserEntityCreate},
    },
    web::AuthenticatedUser,
};

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("email already registered")]
    EmailTaken,
    #[error("unknown email or wrong password")]
    InvalidCredentials,
    #[error("refresh token invalid, expired or revoked")]
    RefreshInvalid,
    #[error("crypt error: {0}")]
    Crypt(#[from] CryptError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<jsonwebtoken::errors::Error> for SessionError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Crypt(CryptError::JwtError(value))
    }
}

#[derive(Debug)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserEntity,
}

pub fn issue_access_token(jwt: &config::Jwt, user: &UserEntity) -> SessionResult<String> {
    let claims = AccessClaims {
        sub: user.id().to_string(),
        role: user.role().to_string(),
        exp: (Utc::now() + Duration::seconds(jwt.access_ttl_seconds())).timestamp(),
    };

    Ok(auth::generate_access_token(claims, jwt.access_secret())?)
}

/// Signs a fresh refresh token, remembers its hash and signs an access token.
#[tracing::instrument(skip_all, fields(user_id = %user.id()))]
pub async fn issue(mm: &ModelManager, jwt: &config::Jwt, user: UserEntity) -> SessionResult<Session> {
    let expires_at = Utc::now() + Duration::seconds(jwt.refresh_ttl_seconds());
    let refresh_token = auth::generate_refresh_token(
        RefreshClaims {
            sub: user.id().to_string(),
            jti: auth::generate_token(),
            exp: expires_at.timestamp(),
        },
        jwt.refresh_secret(),
    )?;

    RefreshToken::create(
        mm.executor(),
        user.id(),
        &auth::sha256_hex(&refresh_token),
        expires_at,
    )
    .await?;

    let pruned = RefreshToken::cleanup_expired(mm.executor()).await?;
    if pruned > 0 {
        tracing::debug!("pruned {} dead refresh token(s)", pruned);
    }

    let access_token = issue_access_token(jwt, &user)?;

    Ok(Session {
        access_token,
        refresh_token,
        user,
    })
}

#[tracing::instrument(skip(mm, jwt, password))]
pub async fn register(
    mm: &ModelManager,
    jwt: &config::Jwt,
    email: &str,
    password: &str,
    name: Option<String>,
) -> SessionResult<Session> {
    let email = email.trim().to_lowercase();
    let actor = AuthenticatedUser::admin();

    if UserEntity::find_by_email(mm, &actor, &email).await?.is_some() {
        return Err(SessionError::EmailTaken);
    }

    let hash = auth::hash_password(password)?;
    let user = UserEntity::create(mm, &actor, UserEntityCreate::signup(email, name, hash))
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                SessionError::EmailTaken
            } else {
                SessionError::Database(e)
            }
        })?;

    tracing::info!("user {} registered", user.id());
    issue(mm, jwt, user).await
}

#[tracing::instrument(skip(mm, jwt, password))]
pub async fn login(
    mm: &ModelManager,
    jwt: &config::Jwt,
    email: &str,
    password: &str,
) -> SessionResult<Session> {
    let user = UserEntity::find_by_email(mm, &AuthenticatedUser::admin(), email.trim())
        .await?
        .ok_or(SessionError::InvalidCredentials)?;

    if !auth::verify_password(user.hash(), password)? {
        return Err(SessionError::InvalidCredentials);
    }

    issue(mm, jwt, user).await
}

/// Trades a refresh token for a new pair. The presented token is revoked
/// first, so replaying it fails.
#[tracing::instrument(skip_all)]
pub async fn rotate(
    mm: &ModelManager,
    jwt: &config::Jwt,
    refresh_token: &str,
) -> SessionResult<Session> {
    let claims = auth::process_refresh_token(refresh_token, jwt.refresh_secret())
        .map_err(|_| SessionError::RefreshInvalid)?
        .claims;

    let user_id: Uuid = claims
        .sub
        .parse()
        .map_err(|_| SessionError::RefreshInvalid)?;

    let record = RefreshToken::find_active(mm.executor(), user_id, &auth::sha256_hex(refresh_token))
        .await?
        .ok_or(SessionError::RefreshInvalid)?;

    if !RefreshToken::revoke(mm.executor(), record.id()).await? {
        return Err(SessionError::RefreshInvalid);
    }

    let user = UserEntity::find_by_id(mm, &AuthenticatedUser::admin(), user_id)
        .await?
        .ok_or(SessionError::RefreshInvalid)?;

    issue(mm, jwt, user).await
}

pub async fn revoke(mm: &ModelManager, refresh_token: &str) -> SessionResult<()> {
    let revoked = RefreshToken::revoke_by_hash(mm.executor(), &auth::sha256_hex(refresh_token)).await?;
    tracing::debug!("revoked {} refresh token(s)", revoked);
    Ok(())
}
