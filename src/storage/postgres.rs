use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{FeedbackStore, StoreError};
use crate::config::AppConfig;
use crate::ratings::{
    repo,
    repo_types::{NewRating, Rating},
};
use crate::users::repo_types::{NewUser, User};

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

/// Maps a unique constraint name from the schema to the field it guards.
fn field_for_constraint(constraint: &str) -> Option<&'static str> {
    match constraint {
        "users_email_key" => Some("email"),
        _ => None,
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint().and_then(field_for_constraint) {
                Some(field) => return StoreError::UniqueViolation { field },
                None => warn!(constraint = ?db_err.constraint(), "unmapped unique violation"),
            }
        }
    }
    StoreError::Backend(anyhow::Error::new(err))
}

#[async_trait]
impl FeedbackStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let user = User::insert_row(&self.db, &user).await.map_err(map_sqlx_error)?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError> {
        User::update_row(&self.db, user).await.map_err(map_sqlx_error)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        User::select_by_id(&self.db, id).await.map_err(map_sqlx_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        User::select_by_email(&self.db, email)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, StoreError> {
        let rating = repo::insert(&self.db, &rating).await.map_err(map_sqlx_error)?;
        debug!(rating_id = %rating.id, user_id = %rating.created_by, "rating row inserted");
        Ok(rating)
    }

    async fn ratings_by_creator(&self, user_id: Uuid) -> Result<Vec<Rating>, StoreError> {
        repo::list_by_creator(&self.db, user_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>, StoreError> {
        repo::list_all(&self.db).await.map_err(map_sqlx_error)
    }
}
