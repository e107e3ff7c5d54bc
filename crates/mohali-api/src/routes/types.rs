//! Request/Response DTOs

use chrono::{DateTime, Utc};
use mohali_db::{ContactStatus, ContactSubmission, User, UserRole};
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Registration request
///
/// Fields are optional so that a missing value is reported with the
/// API's own wording rather than a deserialization rejection.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

/// Login request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of an account
#[derive(Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Registration response
#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

/// Plain acknowledgement
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ==================== Profile Types ====================

/// Profile view of the authenticated account
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

/// Profile response
#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: ProfileUser,
}

// ==================== Contact Types ====================

/// Contact form submission request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// Contact submission accepted
#[derive(Serialize)]
pub struct ContactCreatedResponse {
    pub success: bool,
    pub message: String,
    pub id: String,
}

/// Contact submission as returned to administrators
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContactSubmission> for ContactResponse {
    fn from(c: ContactSubmission) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            subject: c.subject,
            message: c.message,
            status: c.status,
            user_id: c.user_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// List of contact submissions
#[derive(Serialize)]
pub struct ContactListResponse {
    pub success: bool,
    pub data: Vec<ContactResponse>,
}

/// Single contact submission
#[derive(Serialize)]
pub struct ContactDetailResponse {
    pub success: bool,
    pub data: ContactResponse,
}

/// Status change request
#[derive(Deserialize)]
pub struct UpdateContactStatusRequest {
    pub status: String,
}

// ==================== Health Types ====================

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Database connectivity response
#[derive(Serialize)]
pub struct DatabaseCheckResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
