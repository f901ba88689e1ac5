use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::meeting::{Meeting, MeetingStatus},
    use_cases::meeting::{MeetingDetails, MeetingRepo, MeetingSummary, NewMeeting},
};

const MEETING_COLUMNS: &str = "m.id, m.title, m.description, m.place_id, m.organizer_id, m.category, \
     m.budget, m.start_time, m.end_time, m.max_participants, m.status, m.created_at, m.updated_at";

const SUMMARY_SELECT: &str = r#"
    p.name AS place_name,
    p.address,
    u.name AS organizer_name,
    (SELECT COUNT(*) FROM meeting_participants mp WHERE mp.meeting_id = m.id) AS participants_count
    FROM meetings m
    LEFT JOIN places p ON p.id = m.place_id
    LEFT JOIN users u ON u.id = m.organizer_id
"#;

fn row_to_meeting(row: &PgRow) -> Meeting {
    let status: String = row.get("status");
    Meeting {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        place_id: row.get("place_id"),
        organizer_id: row.get("organizer_id"),
        category: row.get("category"),
        budget: row.get("budget"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        max_participants: row.get("max_participants"),
        status: MeetingStatus::from_db(&status),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_summary(row: PgRow) -> MeetingSummary {
    MeetingSummary {
        meeting: row_to_meeting(&row),
        place_name: row.get("place_name"),
        address: row.get("address"),
        organizer_name: row.get("organizer_name"),
        participants_count: row.get("participants_count"),
    }
}

fn row_to_details(row: PgRow) -> MeetingDetails {
    MeetingDetails {
        meeting: row_to_meeting(&row),
        place_name: row.get("place_name"),
        address: row.get("address"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        organizer_name: row.get("organizer_name"),
        organizer_avatar: row.get("organizer_avatar"),
    }
}

#[async_trait]
impl MeetingRepo for PostgresPersistence {
    async fn create_with_organizer(
        &self,
        organizer_id: i64,
        meeting: NewMeeting,
    ) -> AppResult<Meeting> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let row = sqlx::query(
            r#"
            INSERT INTO meetings AS m
                (title, description, place_id, organizer_id, category, budget,
                 start_time, end_time, max_participants)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING m.*
            "#,
        )
        .bind(&meeting.title)
        .bind(&meeting.description)
        .bind(meeting.place_id)
        .bind(organizer_id)
        .bind(&meeting.category)
        .bind(meeting.budget)
        .bind(meeting.start_time)
        .bind(meeting.end_time)
        .bind(meeting.max_participants)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;
        let created = row_to_meeting(&row);

        sqlx::query("INSERT INTO meeting_participants (meeting_id, user_id) VALUES ($1, $2)")
            .bind(created.id)
            .bind(organizer_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(created)
    }

    async fn get_by_id(&self, meeting_id: i64) -> AppResult<Option<Meeting>> {
        let row = sqlx::query(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings m WHERE m.id = $1"
        ))
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.as_ref().map(row_to_meeting))
    }

    async fn get_details(&self, meeting_id: i64) -> AppResult<Option<MeetingDetails>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {MEETING_COLUMNS},
                p.name AS place_name,
                p.address,
                p.latitude,
                p.longitude,
                u.name AS organizer_name,
                u.avatar_url AS organizer_avatar
            FROM meetings m
            LEFT JOIN places p ON p.id = m.place_id
            LEFT JOIN users u ON u.id = m.organizer_id
            WHERE m.id = $1
            "#
        ))
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_details))
    }

    async fn list_active(&self) -> AppResult<Vec<MeetingSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEETING_COLUMNS}, {SUMMARY_SELECT} WHERE m.status = 'active' ORDER BY m.start_time ASC, m.id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn list_by_organizer(&self, user_id: i64) -> AppResult<Vec<MeetingSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEETING_COLUMNS}, {SUMMARY_SELECT} WHERE m.organizer_id = $1 ORDER BY m.start_time DESC, m.id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn list_joined(&self, user_id: i64) -> AppResult<Vec<MeetingSummary>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MEETING_COLUMNS}, {SUMMARY_SELECT}
            WHERE EXISTS (
                SELECT 1 FROM meeting_participants j
                WHERE j.meeting_id = m.id AND j.user_id = $1
            )
            ORDER BY m.start_time DESC, m.id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn update_status(
        &self,
        meeting_id: i64,
        status: MeetingStatus,
    ) -> AppResult<Option<Meeting>> {
        let row = sqlx::query("UPDATE meetings AS m SET status = $2 WHERE m.id = $1 RETURNING m.*")
            .bind(meeting_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(row.as_ref().map(row_to_meeting))
    }

    async fn delete(&self, meeting_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(meeting_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
