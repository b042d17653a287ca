use serde::{Deserialize, Serialize};

/// `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub level: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl RegisterRequest {
    /// Builds a request whose confirmation repeats `password`.
    pub fn new(
        name: impl Into<String>,
        level: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            name: name.into(),
            level: level.into(),
            email: email.into(),
            password_confirmation: password.clone(),
            password,
        }
    }
}

/// Token issued by `/login` and `/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

// Keep the token out of logs.
impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_request_repeats_the_password() {
        let request = RegisterRequest::new("Ana", "2", "ana@example.com", "secret");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["password_confirmation"], "secret");
        assert_eq!(value["level"], "2");
    }

    #[test]
    fn auth_response_debug_hides_the_token() {
        let response: AuthResponse =
            serde_json::from_str(r#"{ "access_token": "tok-123" }"#).unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert!(!format!("{response:?}").contains("tok-123"));
    }
}
