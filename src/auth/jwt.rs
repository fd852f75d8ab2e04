use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    auth::repo::{RefreshToken, User},
    config::JwtConfig,
    error::ApiError,
    state::AppState,
};

/// Token type used to distinguish Access and Refresh JWTs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload carried by both token classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub kind: TokenKind,
}

/// Signing and verification keys for the two token classes.
///
/// Access and refresh tokens are signed with distinct secrets; a token
/// minted in one key space never verifies in the other. The `kind` claim is
/// checked on top of the signature.
#[derive(Clone)]
pub struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(cfg.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(cfg.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            access_ttl: Duration::from_secs((cfg.access_ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((cfg.refresh_ttl_minutes as u64) * 60),
        }
    }

    fn sign_with_kind(
        &self,
        sub: Uuid,
        name: &str,
        email: &str,
        kind: TokenKind,
    ) -> anyhow::Result<(String, Claims)> {
        let now = OffsetDateTime::now_utc();
        let (ttl, key) = match kind {
            TokenKind::Access => (self.access_ttl, &self.access_encoding),
            TokenKind::Refresh => (self.refresh_ttl, &self.refresh_encoding),
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub,
            name: name.to_string(),
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            kind,
        };
        let token = encode(&Header::default(), &claims, key)?;
        debug!(user_id = %sub, kind = ?kind, "jwt signed");
        Ok((token, claims))
    }

    pub fn sign_access(&self, user: &User) -> anyhow::Result<(String, Claims)> {
        self.sign_with_kind(user.user_id, &user.name, &user.email, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user: &User) -> anyhow::Result<(String, Claims)> {
        self.sign_with_kind(user.user_id, &user.name, &user.email, TokenKind::Refresh)
    }

    /// Mint a fresh access token carrying the identity of an already
    /// verified refresh token.
    pub fn reissue_access(&self, claims: &Claims) -> anyhow::Result<(String, Claims)> {
        self.sign_with_kind(claims.sub, &claims.name, &claims.email, TokenKind::Access)
    }

    /// Verify signature and expiry against the given kind's key space.
    pub fn verify(&self, token: &str, kind: TokenKind) -> anyhow::Result<Claims> {
        let decoding = match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };
        let validation = Validation::default();
        let data = decode::<Claims>(token, decoding, &validation)?;
        if data.claims.kind != kind {
            anyhow::bail!("token kind mismatch");
        }
        debug!(user_id = %data.claims.sub, kind = ?kind, "jwt verified");
        Ok(data.claims)
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Auth("Missing Authorization header".into()))?;

    auth.strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Auth("Invalid Authorization header".into()))
}

/// Extracts and validates the Bearer access token.
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = bearer_token(parts)?;

        let claims = keys.verify(token, TokenKind::Access).map_err(|e| {
            warn!(error = %e, "access token rejected");
            ApiError::Auth("Invalid or expired token".into())
        })?;

        Ok(AuthUser(claims))
    }
}

/// Extracts the Bearer refresh token, verifying both the signature and that
/// the token row still exists in the store. Revoked tokens fail here even
/// though they still decode.
pub struct RefreshSession {
    pub claims: Claims,
    pub token: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RefreshSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let keys = JwtKeys::from_ref(&state);
        let token = bearer_token(parts)?.to_string();

        let claims = keys.verify(&token, TokenKind::Refresh).map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            ApiError::Auth("Invalid or expired token".into())
        })?;

        let known = RefreshToken::find(&state.db, &token).await.map_err(|e| {
            error!(error = %e, "refresh token lookup failed");
            ApiError::Storage("An error occurred while fetching data".into())
        })?;
        if known.is_none() {
            warn!(user_id = %claims.sub, "refresh token not in store");
            return Err(ApiError::Auth("Invalid or expired token".into()));
        }

        Ok(RefreshSession { claims, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            access_ttl_minutes: 60,
            refresh_ttl_minutes: 60 * 24 * 365,
        })
    }

    fn make_user() -> User {
        User {
            user_id: Uuid::new_v4(),
            name: "Test User".into(),
            email: "test@example.com".into(),
            password_hash: "unused".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user = make_user();
        let (token, _) = keys.sign_access(&user).expect("sign access");
        let claims = keys.verify(&token, TokenKind::Access).expect("verify token");
        assert_eq!(claims.sub, user.user_id);
        assert_eq!(claims.name, "Test User");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn sign_and_verify_refresh_token() {
        let keys = make_keys();
        let user = make_user();
        let (token, claims) = keys.sign_refresh(&user).expect("sign refresh");
        assert!(claims.exp > claims.iat);
        let verified = keys.verify(&token, TokenKind::Refresh).expect("verify refresh");
        assert_eq!(verified.sub, user.user_id);
        assert_eq!(verified.kind, TokenKind::Refresh);
    }

    #[test]
    fn key_spaces_are_disjoint() {
        let keys = make_keys();
        let user = make_user();
        let (access, _) = keys.sign_access(&user).expect("sign access");
        let (refresh, _) = keys.sign_refresh(&user).expect("sign refresh");
        assert!(keys.verify(&access, TokenKind::Refresh).is_err());
        assert!(keys.verify(&refresh, TokenKind::Access).is_err());
    }

    #[test]
    fn kind_claim_is_checked_even_with_shared_secret() {
        let keys = JwtKeys::from_config(&JwtConfig {
            access_secret: "same-secret".into(),
            refresh_secret: "same-secret".into(),
            access_ttl_minutes: 60,
            refresh_ttl_minutes: 60,
        });
        let user = make_user();
        let (access, _) = keys.sign_access(&user).expect("sign access");
        let err = keys.verify(&access, TokenKind::Refresh).unwrap_err();
        assert!(err.to_string().contains("token kind mismatch"));
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let user = make_user();
        let (token, _) = keys.sign_access(&user).expect("sign access");
        let mut tampered = token.into_bytes();
        let last = tampered.last_mut().unwrap();
        *last = if *last == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(keys.verify(&tampered, TokenKind::Access).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys();
        let user = make_user();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
            kind: TokenKind::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .expect("encode");
        assert!(keys.verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn reissue_access_carries_identity() {
        let keys = make_keys();
        let user = make_user();
        let (_, refresh_claims) = keys.sign_refresh(&user).expect("sign refresh");
        let (token, _) = keys.reissue_access(&refresh_claims).expect("reissue");
        let claims = keys.verify(&token, TokenKind::Access).expect("verify");
        assert_eq!(claims.sub, user.user_id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.kind, TokenKind::Access);
    }
}
