use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// External ML inference endpoint: ordered symptom list in, predicted
/// condition out.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn predict(&self, symptoms: &[String]) -> anyhow::Result<String>;
}

/// Response body of the inference endpoint. The field name is capitalized
/// on the wire.
#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(rename = "Prediction")]
    prediction: String,
}

#[derive(Clone)]
pub struct HttpInference {
    client: reqwest::Client,
    url: String,
}

impl HttpInference {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build inference http client")?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl InferenceClient for HttpInference {
    async fn predict(&self, symptoms: &[String]) -> anyhow::Result<String> {
        let res = self
            .client
            .post(&self.url)
            .json(&json!({ "symptoms": symptoms }))
            .send()
            .await
            .context("send prediction request")?
            .error_for_status()
            .context("prediction endpoint returned error status")?;

        let body: PredictionResponse = res
            .json()
            .await
            .context("decode prediction response")?;
        debug!(result = %body.prediction, "inference response");
        Ok(body.prediction)
    }
}
