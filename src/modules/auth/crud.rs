use std::sync::Arc;

use crate::modules::auth::schema::{LoginRequest, LoginResponse, RegisterRequest, UserOut};
use crate::services::transport::{ApiRequest, CredentialStore, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,
    #[error("Wrong password")]
    WrongPassword,
    #[error("{}", .0.user_message())]
    Request(#[from] TransportError),
}

pub struct AuthCrud {
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
}

impl AuthCrud {
    pub fn new(transport: Arc<dyn Transport>, credentials: CredentialStore) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// On success the user and token become the session used by every later call
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let result = self
            .transport
            .send(ApiRequest::post("/auth/login").json(&body)?)
            .await;

        let response: LoginResponse = match result {
            Ok(response) => response.json()?,
            Err(e) if e.status() == Some(404) => return Err(AuthError::UserNotFound),
            Err(e) if e.status() == Some(403) => return Err(AuthError::WrongPassword),
            Err(e) => return Err(e.into()),
        };

        self.credentials
            .set(Some(response.usuario.clone()), response.token.clone());
        tracing::info!("Logged in as {}", response.usuario);

        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserOut, AuthError> {
        let user = self
            .transport
            .send(ApiRequest::post("/auth/register").json(request)?)
            .await?
            .json()?;
        Ok(user)
    }

    pub fn logout(&self) {
        self.credentials.clear();
    }
}
