use reqwest::RequestBuilder;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Credentials {
    user: Option<String>,
    token: Option<String>,
}

/// Locally held session: logged-in user and bearer token.
/// Cloning shares the same session.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Credentials>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Option<String>) -> Self {
        let store = Self::new();
        store.set(None, token);
        store
    }

    /// An empty token counts as no token
    pub fn set(&self, user: Option<String>, token: Option<String>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.user = user;
        guard.token = token.filter(|t| !t.trim().is_empty());
    }

    pub fn clear(&self) {
        self.set(None, None);
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .token
            .clone()
    }

    pub fn user(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .user
            .clone()
    }
}

/// Add `Authorization: Bearer` when a token is held; anonymous otherwise.
pub fn attach_credentials(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}
