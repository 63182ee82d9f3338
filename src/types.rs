//! Request and response types of the storefront API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tokens returned by a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginTokens {
    pub access_token: String,
    /// Raw refresh token; the server keeps only its hash
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Account created by a registration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
}

/// Fields sent when creating or updating a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleAssignmentRequest {
    pub user_id: String,
    pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoleAssignment {
    pub user_id: String,
    pub role_id: i64,
}

/// Uniform result of a gateway request
///
/// Non-2xx statuses are reported here rather than as errors; callers check
/// `succeeded` or `status_code` themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    /// True for 2xx statuses
    pub succeeded: bool,
    pub status_code: u16,
    /// Parsed JSON body, `None` when the body was empty or not JSON
    pub body: Option<Value>,
}

impl NormalizedResponse {
    /// The backend's `detail` message, falling back to the raw body text
    pub fn detail(&self) -> String {
        match &self.body {
            Some(Value::Object(map)) => match map.get("detail") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => Value::Object(map.clone()).to_string(),
            },
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}
