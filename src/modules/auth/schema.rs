use serde::{Deserialize, Serialize};

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub usuario: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
}
