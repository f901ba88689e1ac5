use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::user::{User, UserRole},
    use_cases::auth::{NewUser, UserRepo},
};

const USER_COLUMNS: &str = "id, email, password_hash, name, phone, interests, avatar_url, bio, role, created_at, updated_at";

fn row_to_user(row: sqlx::postgres::PgRow) -> User {
    let role: String = row.get("role");
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
        phone: row.get("phone"),
        interests: row.get("interests"),
        avatar_url: row.get("avatar_url"),
        bio: row.get("bio"),
        role: UserRole::from_db(&role),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, phone, interests)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.interests)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row_to_user(row))
    }

    async fn get_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(row.map(row_to_user))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_user))
    }

    async fn update_profile(
        &self,
        user_id: i64,
        name: &str,
        bio: Option<&str>,
        avatar_url: Option<&str>,
    ) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = $2, bio = $3, avatar_url = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(bio)
        .bind(avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_user))
    }
}
