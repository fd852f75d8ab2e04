use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tokio::task;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AccessTokenData, LoginRequest, MessageData, RegisterRequest, TokenPairData},
        jwt::{JwtKeys, RefreshSession},
        password::{hash_password, verify_password},
        repo::{RefreshToken, User},
        validate::{is_valid_email, is_valid_password},
    },
    error::{is_unique_violation, ApiError},
    response::Envelope,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token", post(token))
        .route("/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<Envelope<MessageData>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    if name.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        warn!("register with missing attribute");
        return Err(ApiError::Validation("Missing attribute".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email format");
        return Err(ApiError::Validation("Invalid email format".into()));
    }

    if !is_valid_password(&payload.password) {
        warn!("password fails policy");
        return Err(ApiError::Validation(
            "The password must be between 8-16 characters and contain numbers".into(),
        ));
    }

    // Ensure email is not taken
    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::Conflict("Email already exist".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::Storage(
                "An error occurred while fetching data".into(),
            ));
        }
    }

    // Argon2 is deliberately slow; keep it off the async worker threads.
    // The plaintext moves into the closure and is dropped with it.
    let password = std::mem::take(&mut payload.password);
    let hash = task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "hash task failed");
            ApiError::Internal("Failed to hash password".into())
        })?
        .map_err(|e| {
            error!(error = %e, "hash_password failed");
            ApiError::Internal("Failed to hash password".into())
        })?;

    match User::create(&state.db, &name, &payload.email, &hash).await {
        Ok(user) => {
            info!(user_id = %user.user_id, email = %user.email, "user registered");
            Ok(Json(Envelope::success(MessageData {
                message: "Register success, please log in",
            })))
        }
        Err(e) if is_unique_violation(&e) => {
            // Lost the race against a concurrent register for the same email.
            warn!(email = %payload.email, "duplicate email on insert");
            Err(ApiError::Conflict("Email already exist".into()))
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            Err(ApiError::Storage("Fail to store data".into()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<Envelope<TokenPairData>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password answer identically so the endpoint
    // does not leak which accounts exist.
    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Auth("Incorrect email or password".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::Storage(
                "An error occurred while fetching data".into(),
            ));
        }
    };

    let password = std::mem::take(&mut payload.password);
    let stored_hash = user.password_hash.clone();
    let ok = task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| {
            error!(error = %e, "verify task failed");
            ApiError::Internal("Failed to verify password".into())
        })?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.user_id, "login invalid password");
        return Err(ApiError::Auth("Incorrect email or password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let (access_token, _) = keys.sign_access(&user).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        ApiError::Internal("Failed to issue tokens".into())
    })?;
    let (refresh_token, claims) = keys.sign_refresh(&user).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        ApiError::Internal("Failed to issue tokens".into())
    })?;

    // The stored row mirrors the token's own iat/exp claims rather than the
    // wall clock at insert time.
    let created_at = OffsetDateTime::from_unix_timestamp(claims.iat as i64).map_err(|e| {
        error!(error = %e, "refresh claims carry an invalid timestamp");
        ApiError::Internal("Failed to issue tokens".into())
    })?;
    let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp as i64).map_err(|e| {
        error!(error = %e, "refresh claims carry an invalid timestamp");
        ApiError::Internal("Failed to issue tokens".into())
    })?;

    if let Err(e) =
        RefreshToken::insert(&state.db, user.user_id, &refresh_token, created_at, expires_at).await
    {
        error!(error = %e, "persist refresh token failed");
        return Err(ApiError::Storage("Fail to store data".into()));
    }

    info!(user_id = %user.user_id, "user logged in");
    Ok(Json(Envelope::success(TokenPairData {
        access_token,
        refresh_token,
    })))
}

/// Exchange a live refresh token for a fresh access token. The refresh
/// token itself is neither rotated nor re-persisted.
#[instrument(skip(state, session))]
pub async fn token(
    State(state): State<AppState>,
    session: RefreshSession,
) -> Result<Json<Envelope<AccessTokenData>>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let (access_token, _) = keys.reissue_access(&session.claims).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        ApiError::Internal("Failed to issue access token".into())
    })?;

    info!(user_id = %session.claims.sub, "access token re-issued");
    Ok(Json(Envelope::success(AccessTokenData { access_token })))
}

/// Revoke the presented refresh token. Deleting a row that a concurrent
/// logout already removed still counts as signed out.
#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: RefreshSession,
) -> Result<Json<Envelope<MessageData>>, ApiError> {
    let deleted = RefreshToken::delete(&state.db, &session.token)
        .await
        .map_err(|e| {
            error!(error = %e, "delete refresh token failed");
            ApiError::Storage("An error occurred while fetching data".into())
        })?;

    if deleted == 0 {
        warn!(user_id = %session.claims.sub, "refresh token already deleted");
    }

    info!(user_id = %session.claims.sub, "user logged out");
    Ok(Json(Envelope::success(MessageData {
        message: "Sign out success",
    })))
}
