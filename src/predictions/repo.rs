use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Static symptom reference row, read-only to this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Symptom {
    pub symptom_id: i32,
    pub name: String,
}

impl Symptom {
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Symptom>> {
        let rows = sqlx::query_as::<_, Symptom>(
            r#"
            SELECT symptom_id, name
            FROM symptoms
            ORDER BY symptom_id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

/// Prediction history record; immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct History {
    pub history_id: Uuid,
    pub user_id: Uuid,
    pub symptoms: String,
    pub result: String,
    pub created_at: OffsetDateTime,
}

/// History row joined with the owning user's display name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryWithUser {
    pub history_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub symptoms: String,
    pub result: String,
    pub created_at: OffsetDateTime,
}

impl History {
    /// Insert a prediction outcome; `symptoms` is the JSON-serialized
    /// ordered list the user submitted.
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        symptoms: &str,
        result: &str,
    ) -> anyhow::Result<History> {
        let row = sqlx::query_as::<_, History>(
            r#"
            INSERT INTO histories (user_id, symptoms, result)
            VALUES ($1, $2, $3)
            RETURNING history_id, user_id, symptoms, result, created_at
            "#,
        )
        .bind(user_id)
        .bind(symptoms)
        .bind(result)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// All history rows for a user with the display name joined in,
    /// oldest first.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<HistoryWithUser>> {
        let rows = sqlx::query_as::<_, HistoryWithUser>(
            r#"
            SELECT h.history_id, h.user_id, u.name, h.symptoms, h.result, h.created_at
            FROM histories h
            INNER JOIN users u ON u.user_id = h.user_id
            WHERE h.user_id = $1
            ORDER BY h.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
