use async_trait::async_trait;
use uuid::Uuid;

use crate::ratings::repo_types::{NewRating, Rating};
use crate::users::repo_types::{NewUser, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write; `field` is the public field name.
    #[error("duplicate value for {field}")]
    UniqueViolation { field: &'static str },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence for users and ratings.
///
/// Implementations must enforce email uniqueness atomically and report it as
/// [`StoreError::UniqueViolation`]. Ids and timestamps are assigned here.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    /// Writes every mutable column of `user`. Returns `None` if the id is unknown.
    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, StoreError>;
    /// Ratings authored by `user_id`, oldest first.
    async fn ratings_by_creator(&self, user_id: Uuid) -> Result<Vec<Rating>, StoreError>;
    /// Every rating, newest first.
    async fn list_ratings(&self) -> Result<Vec<Rating>, StoreError>;
}
