use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::{PostgresPersistence, escape_like},
    app_error::{AppError, AppResult},
    domain::entities::place::Place,
    use_cases::place::{NewPlace, PlaceRepo},
};

fn row_to_place(row: sqlx::postgres::PgRow) -> Place {
    Place {
        id: row.get("id"),
        name: row.get("name"),
        address: row.get("address"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PlaceRepo for PostgresPersistence {
    async fn list(&self) -> AppResult<Vec<Place>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, address, latitude, longitude, description, image_url, created_at
            FROM places
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_place).collect())
    }

    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Place>> {
        let pattern = format!("%{}%", escape_like(term));
        let rows = sqlx::query(
            r#"
            SELECT id, name, address, latitude, longitude, description, image_url, created_at
            FROM places
            WHERE name ILIKE $1 ESCAPE '\' OR address ILIKE $1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_place).collect())
    }

    async fn create(&self, place: NewPlace) -> AppResult<Place> {
        let row = sqlx::query(
            r#"
            INSERT INTO places (name, address, latitude, longitude, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, address, latitude, longitude, description, image_url, created_at
            "#,
        )
        .bind(&place.name)
        .bind(&place.address)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(&place.description)
        .bind(&place.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row_to_place(row))
    }

    async fn exists(&self, place_id: i64) -> AppResult<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM places WHERE id = $1) AS exists")
            .bind(place_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(row.get("exists"))
    }
}
