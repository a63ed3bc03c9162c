use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
///
/// Serializing a `User` yields its public shape: the password hash is
/// never written out.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: String,
    pub cohort: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string
    pub need_help: Option<bool>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated columns for a user insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: String,
    pub cohort: String,
    pub password_hash: String,
    pub need_help: Option<bool>,
}
