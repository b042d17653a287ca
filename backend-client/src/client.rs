//! HTTP client for the taxonomy backend.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use verbnav_backend_models::{
    ApiErrorBody, AuthResponse, FamilyShowResponse, GroupShowResponse, GroupsResponse,
    LoginRequest, MessageResponse, RegisterRequest, SubfamilyShowResponse, User, UserEnvelope,
    UserUpdate, UsersEnvelope, VerbEnvelope, VerbRecord,
};

use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct VerbnavClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl VerbnavClient {
    pub fn new(config: &BackendConfig, session: Session) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────

    /// Logs in and stores the issued token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.send(Method::POST, "/login", Some(&body)).await?;
        self.session.store_token(&auth.access_token)?;
        tracing::info!(email = %email, "logged in");
        Ok(auth)
    }

    /// Registers a user and stores the issued token.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let auth: AuthResponse = self.send(Method::POST, "/register", Some(request)).await?;
        self.session.store_token(&auth.access_token)?;
        tracing::info!(email = %request.email, "registered");
        Ok(auth)
    }

    /// Ends the session server-side. The local token is removed whatever
    /// the backend answers.
    pub async fn logout(&self) -> Result<MessageResponse> {
        let result = self.send::<MessageResponse, ()>(Method::POST, "/logout", None).await;
        self.session.clear()?;
        result
    }

    pub async fn me(&self) -> Result<User> {
        let user: UserEnvelope = self.get("/me").await?;
        Ok(user.into_user())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    pub async fn users(&self) -> Result<Vec<User>> {
        let users: UsersEnvelope = self.get("/users").await?;
        Ok(users.into_users())
    }

    pub async fn user(&self, id: i64) -> Result<User> {
        let user: UserEnvelope = self.get(&format!("/users/{id}")).await?;
        Ok(user.into_user())
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User> {
        let user: UserEnvelope = self
            .send(Method::PUT, &format!("/users/{id}"), Some(update))
            .await?;
        Ok(user.into_user())
    }

    pub async fn delete_user(&self, id: i64) -> Result<MessageResponse> {
        self.send::<_, ()>(Method::DELETE, &format!("/users/{id}"), None)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Taxonomy
    // ─────────────────────────────────────────────────────────────────────

    pub async fn groups(&self) -> Result<GroupsResponse> {
        self.get("/groups").await
    }

    pub async fn group(&self, id: i64) -> Result<GroupShowResponse> {
        self.get(&format!("/groups/{id}")).await
    }

    pub async fn family(&self, id: i64) -> Result<FamilyShowResponse> {
        self.get(&format!("/families/{id}")).await
    }

    pub async fn subfamily(&self, id: i64) -> Result<SubfamilyShowResponse> {
        self.get(&format!("/subfamilies/{id}")).await
    }

    pub async fn verb(&self, id: i64) -> Result<VerbRecord> {
        let verb: VerbEnvelope = self.get(&format!("/verbs/{id}")).await?;
        Ok(verb.into_verb())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send::<T, ()>(Method::GET, path, None).await
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method.clone(), path)?;
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, path = %path, "sending request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match status {
            StatusCode::UNAUTHORIZED => {
                if let Err(err) = self.session.clear() {
                    tracing::warn!("failed to remove rejected session token: {err}");
                }
                Err(BackendError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(path.to_string())),
            status if !status.is_success() => {
                let message = serde_json::from_str::<ApiErrorBody>(&text)
                    .ok()
                    .and_then(|body| body.summary())
                    .unwrap_or_else(|| {
                        status
                            .canonical_reason()
                            .unwrap_or("unexpected status")
                            .to_string()
                    });
                tracing::debug!(
                    status = status.as_u16(),
                    path = %path,
                    "request failed: {message}"
                );
                Err(BackendError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
            status => serde_json::from_str(&text).map_err(|source| BackendError::Parse {
                status: status.as_u16(),
                source,
            }),
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.request(method, url);
        if let Some(token) = self.session.token()? {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }
}
