//! Request and response bodies for the user API.

use serde::{Deserialize, Serialize};

use crate::db::User;

/// Registration body. Fields are optional so a missing field reports as
/// `blank` in the validation errors instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Raw pagination query. Values arrive as strings so out-of-range and
/// non-numeric input can be coerced instead of rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl PageQuery {
    /// Zero-based page index; anything unparseable or negative reads as 0.
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    /// Page size, valid range 1 to 25; anything else reads as the default 10.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .filter(|size| (1..=25).contains(size))
            .unwrap_or(10)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserPageResponse {
    pub content: Vec<UserResponse>,
    pub page: u64,
    pub size: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i32,
    pub username: String,
    pub token: String,
}
