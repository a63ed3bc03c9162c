use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{FeedbackStore, StoreError};
use crate::ratings::repo_types::{NewRating, Rating};
use crate::users::repo_types::{NewUser, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    ratings: Vec<Rating>,
}

/// In-process store with the same uniqueness guarantees as [`super::PgStore`].
///
/// The email check and the insert happen under one lock, so concurrent
/// creates with the same email cannot both succeed.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("memory store lock poisoned")))
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation { field: "email" });
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            image: user.image,
            role: user.role,
            cohort: user.cohort,
            password_hash: user.password_hash,
            need_help: user.need_help,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::UniqueViolation { field: "email" });
        }
        let Some(stored) = tables.users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(None);
        };
        *stored = User {
            id: stored.id,
            created_at: stored.created_at,
            updated_at: OffsetDateTime::now_utc(),
            ..user.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, StoreError> {
        let now = OffsetDateTime::now_utc();
        let rating = Rating {
            id: Uuid::new_v4(),
            created_by: rating.created_by,
            pace: rating.pace,
            concepts: rating.concepts,
            syntax: rating.syntax,
            confidence: rating.confidence,
            message: rating.message,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn ratings_by_creator(&self, user_id: Uuid) -> Result<Vec<Rating>, StoreError> {
        // Insertion order is creation order.
        Ok(self
            .lock()?
            .ratings
            .iter()
            .filter(|r| r.created_by == user_id)
            .cloned()
            .collect())
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>, StoreError> {
        Ok(self.lock()?.ratings.iter().rev().cloned().collect())
    }
}
