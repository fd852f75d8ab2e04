use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password. A duplicate email surfaces
    /// as the unique violation from the `users.email` constraint.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING user_id, name, email, password_hash, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}

/// Persisted refresh token; one row per issued token, so a user may hold
/// several concurrent sessions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub user_id: Uuid,
    pub token: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl RefreshToken {
    /// Persist a freshly issued refresh token. The timestamps come from the
    /// token's own iat/exp claims, not from the insert clock.
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        token: &str,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<RefreshToken> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO tokens (user_id, token, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, token, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(created_at)
        .bind(expires_at)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Look up a token by its string value. A row deleted at logout stays
    /// gone; the token is then invalid no matter what it decodes to.
    pub async fn find(db: &PgPool, token: &str) -> anyhow::Result<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT user_id, token, created_at, expires_at
            FROM tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Delete the row for a token, returning how many rows matched.
    pub async fn delete(db: &PgPool, token: &str) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM tokens WHERE token = $1"#)
            .bind(token)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
