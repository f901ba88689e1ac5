use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::meeting::{MeetingStatus, capacity_reached},
    use_cases::{
        meeting::ParticipantInfo,
        membership::{AdmissionSnapshot, InsertOutcome, ParticipantRepo},
    },
};

#[async_trait]
impl ParticipantRepo for PostgresPersistence {
    async fn admission_snapshot(
        &self,
        meeting_id: i64,
        user_id: i64,
    ) -> AppResult<Option<AdmissionSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT
                m.status,
                m.max_participants,
                (SELECT COUNT(*) FROM meeting_participants mp WHERE mp.meeting_id = m.id)
                    AS participant_count,
                EXISTS (
                    SELECT 1 FROM meeting_participants mp
                    WHERE mp.meeting_id = m.id AND mp.user_id = $2
                ) AS is_member
            FROM meetings m
            WHERE m.id = $1
            "#,
        )
        .bind(meeting_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(|row| {
            let status: String = row.get("status");
            AdmissionSnapshot {
                status: MeetingStatus::from_db(&status),
                max_participants: row.get("max_participants"),
                participant_count: row.get("participant_count"),
                is_member: row.get("is_member"),
            }
        }))
    }

    async fn insert_participant(&self, meeting_id: i64, user_id: i64) -> AppResult<InsertOutcome> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        // Locking the meeting row serializes concurrent joins of the same meeting.
        let Some(meeting) = sqlx::query(
            "SELECT status, max_participants FROM meetings WHERE id = $1 FOR UPDATE",
        )
        .bind(meeting_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?
        else {
            return Ok(InsertOutcome::Unavailable);
        };

        let status: String = meeting.get("status");
        if !MeetingStatus::from_db(&status).is_joinable() {
            return Ok(InsertOutcome::Unavailable);
        }
        let max_participants: Option<i32> = meeting.get("max_participants");

        let counts = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS participant_count,
                COALESCE(BOOL_OR(user_id = $2), FALSE) AS is_member
            FROM meeting_participants
            WHERE meeting_id = $1
            "#,
        )
        .bind(meeting_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        if counts.get::<bool, _>("is_member") {
            return Ok(InsertOutcome::AlreadyMember);
        }

        let participant_count: i64 = counts.get("participant_count");
        if let Some(limit) = capacity_reached(max_participants, participant_count) {
            return Ok(InsertOutcome::Full { limit });
        }

        sqlx::query(
            r#"
            INSERT INTO meeting_participants (meeting_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (meeting_id, user_id) DO NOTHING
            "#,
        )
        .bind(meeting_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(InsertOutcome::Inserted)
    }

    async fn remove_participant(&self, meeting_id: i64, user_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM meeting_participants WHERE meeting_id = $1 AND user_id = $2")
                .bind(meeting_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(AppError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_participants(&self, meeting_id: i64) -> AppResult<Vec<ParticipantInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.name, u.avatar_url, mp.joined_at
            FROM meeting_participants mp
            JOIN users u ON u.id = mp.user_id
            WHERE mp.meeting_id = $1
            ORDER BY mp.joined_at ASC, u.id ASC
            "#,
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| ParticipantInfo {
                id: row.get("id"),
                name: row.get("name"),
                avatar_url: row.get("avatar_url"),
                joined_at: row.get("joined_at"),
            })
            .collect())
    }
}
