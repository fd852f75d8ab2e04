use serde::{Deserialize, Serialize};

/// Request body for user registration. Fields default to empty so that a
/// missing attribute is reported through the validation path instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageData {
    pub message: &'static str,
}

/// Token pair returned exactly once at login; the refresh token is never
/// retrievable again except by re-login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
}

/// Fresh access token returned by the token endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenData {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_uses_camel_case_keys() {
        let json = serde_json::to_value(TokenPairData {
            access_token: "a".into(),
            refresh_token: "r".into(),
        })
        .unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
    }

    #[test]
    fn register_request_defaults_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert!(req.name.is_empty());
        assert_eq!(req.email, "a@b.c");
        assert!(req.password.is_empty());
    }
}
