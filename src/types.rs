//! Shared request/response DTOs.

use serde::{Deserialize, Serialize};

use crate::provider::User;
use crate::todo::Todo;

/// POST /auth/signup and POST /auth/login request body.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /auth/forgot-password request body.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

/// POST /auth/update-password request body.
#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// GET /auth/confirm query parameters.
#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    pub token_hash: Option<String>,
    #[serde(rename = "type")]
    pub otp_type: Option<String>,
    pub next: Option<String>,
}

/// POST /todos form fields. Which ones are required depends on `intent`.
#[derive(Debug, Default, Deserialize)]
pub struct TodoForm {
    pub intent: Option<String>,
    pub text: Option<String>,
    pub id: Option<String>,
}

/// GET /todos response.
#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
    pub user: Option<User>,
}

/// GET /health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

/// GET /public response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Generic success response.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
