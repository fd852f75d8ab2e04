use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::predictions::gateway::{HttpInference, InferenceClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub inference: Arc<dyn InferenceClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let inference = Arc::new(HttpInference::new(
            &config.inference.url,
            Duration::from_secs(config.inference.timeout_secs),
        )?) as Arc<dyn InferenceClient>;

        Ok(Self {
            db,
            config,
            inference,
        })
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        inference: Arc<dyn InferenceClient>,
    ) -> Self {
        Self {
            db,
            config,
            inference,
        }
    }
}
