use sqlx::PgPool;
use uuid::Uuid;

use crate::ratings::repo_types::{NewRating, Rating};

pub async fn insert(db: &PgPool, new: &NewRating) -> sqlx::Result<Rating> {
    sqlx::query_as::<_, Rating>(
        r#"
        INSERT INTO ratings (created_by, pace, concepts, syntax, confidence, message)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, created_by, pace, concepts, syntax, confidence, message, created_at, updated_at
        "#,
    )
    .bind(new.created_by)
    .bind(new.pace)
    .bind(new.concepts)
    .bind(new.syntax)
    .bind(new.confidence)
    .bind(&new.message)
    .fetch_one(db)
    .await
}

pub async fn list_by_creator(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Rating>> {
    sqlx::query_as::<_, Rating>(
        r#"
        SELECT id, created_by, pace, concepts, syntax, confidence, message, created_at, updated_at
          FROM ratings
         WHERE created_by = $1
         ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<Rating>> {
    sqlx::query_as::<_, Rating>(
        r#"
        SELECT id, created_by, pace, concepts, syntax, confidence, message, created_at, updated_at
          FROM ratings
         ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(db)
    .await
}
