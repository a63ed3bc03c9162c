use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User};

const USER_COLUMNS: &str = "id, first_name, last_name, email, image, role, cohort, \
                            password_hash, need_help, created_at, updated_at";

impl User {
    /// Find a user by id.
    pub async fn select_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a user by normalized email.
    pub async fn select_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await
    }

    /// Insert a validated user; `users_email_key` guards duplicate emails.
    pub async fn insert_row(db: &PgPool, new: &NewUser) -> sqlx::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, image, role, cohort, password_hash, need_help)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(&new.image)
            .bind(&new.role)
            .bind(&new.cohort)
            .bind(&new.password_hash)
            .bind(new.need_help)
            .fetch_one(db)
            .await
    }

    /// Overwrite the mutable columns of an existing user and bump `updated_at`.
    pub async fn update_row(db: &PgPool, user: &User) -> sqlx::Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
               SET first_name = $2, last_name = $3, email = $4, image = $5, role = $6,
                   cohort = $7, password_hash = $8, need_help = $9, updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.image)
            .bind(&user.role)
            .bind(&user.cohort)
            .bind(&user.password_hash)
            .bind(user.need_help)
            .fetch_optional(db)
            .await
    }
}
