use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Rating record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub created_by: Uuid, // users.id
    pub pace: f64,
    pub concepts: f64,
    pub syntax: f64,
    pub confidence: f64,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated columns for a rating insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRating {
    pub created_by: Uuid,
    pub pace: f64,
    pub concepts: f64,
    pub syntax: f64,
    pub confidence: f64,
    pub message: Option<String>,
}
