use serde::{Deserialize, Serialize};

use crate::predictions::repo::{History, Symptom};

/// Request body for prediction. The list defaults to empty so a missing
/// field reports through validation.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
}

/// Created history record, wrapped to match the documented response key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictData {
    pub user_histories: History,
}

/// The symptom list keeps its top-level key instead of nesting under
/// `data`; clients depend on this shape.
#[derive(Debug, Serialize)]
pub struct SymptomsResponse {
    pub code: u16,
    pub status: &'static str,
    pub symptoms: Vec<Symptom>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn predict_data_uses_documented_key() {
        let json = serde_json::to_value(PredictData {
            user_histories: History {
                history_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                symptoms: r#"["fever"]"#.into(),
                result: "Influenza".into(),
                created_at: OffsetDateTime::now_utc(),
            },
        })
        .unwrap();
        assert!(json.get("userHistories").is_some());
        assert_eq!(json["userHistories"]["result"], "Influenza");
    }

    #[test]
    fn predict_request_defaults_missing_symptoms() {
        let req: PredictRequest = serde_json::from_str("{}").unwrap();
        assert!(req.symptoms.is_empty());
    }

    #[test]
    fn symptoms_stay_top_level() {
        let json = serde_json::to_value(SymptomsResponse {
            code: 200,
            status: "success",
            symptoms: vec![Symptom {
                symptom_id: 1,
                name: "itching".into(),
            }],
        })
        .unwrap();
        assert_eq!(json["symptoms"][0]["name"], "itching");
        assert!(json.get("data").is_none());
    }
}
