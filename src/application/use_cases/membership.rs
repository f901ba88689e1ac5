use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::meeting::{MeetingStatus, capacity_reached},
    use_cases::{
        auth::UserRepo,
        listing::ListingUseCases,
        meeting::{MeetingRepo, MeetingView, ParticipantInfo, load_meeting_view},
    },
};

/// Everything admission needs to know about a meeting, read in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionSnapshot {
    pub status: MeetingStatus,
    pub max_participants: Option<i32>,
    pub participant_count: i64,
    pub is_member: bool,
}

/// Result of the guarded insert. The store re-checks status, membership and
/// capacity under a row lock, so concurrent joins cannot overshoot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyMember,
    Full { limit: i64 },
    Unavailable,
}

#[async_trait]
pub trait ParticipantRepo: Send + Sync {
    /// `None` when the meeting does not exist.
    async fn admission_snapshot(
        &self,
        meeting_id: i64,
        user_id: i64,
    ) -> AppResult<Option<AdmissionSnapshot>>;
    async fn insert_participant(&self, meeting_id: i64, user_id: i64) -> AppResult<InsertOutcome>;
    /// Returns false when the user was not a participant.
    async fn remove_participant(&self, meeting_id: i64, user_id: i64) -> AppResult<bool>;
    /// Ordered by join time.
    async fn list_participants(&self, meeting_id: i64) -> AppResult<Vec<ParticipantInfo>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipResult {
    /// False when the call was an idempotent no-op.
    pub changed: bool,
    pub meeting: MeetingView,
}

#[derive(Clone)]
pub struct MembershipUseCases {
    meetings: Arc<dyn MeetingRepo>,
    participants: Arc<dyn ParticipantRepo>,
    users: Arc<dyn UserRepo>,
    listing: Arc<ListingUseCases>,
}

impl MembershipUseCases {
    pub fn new(
        meetings: Arc<dyn MeetingRepo>,
        participants: Arc<dyn ParticipantRepo>,
        users: Arc<dyn UserRepo>,
        listing: Arc<ListingUseCases>,
    ) -> Self {
        Self {
            meetings,
            participants,
            users,
            listing,
        }
    }

    /// Adds the user to the meeting. Joining twice is a no-op success, even
    /// when the meeting has filled up in between.
    #[instrument(skip(self))]
    pub async fn join(&self, meeting_id: i64, user_id: i64) -> AppResult<MembershipResult> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let snapshot = self
            .participants
            .admission_snapshot(meeting_id, user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !snapshot.status.is_joinable() {
            tracing::debug!(meeting_id, status = snapshot.status.as_str(), "Join rejected, meeting not active");
            return Err(AppError::NotFound);
        }

        if snapshot.is_member {
            tracing::debug!(meeting_id, user_id, "Already a participant");
            return self.result(meeting_id, false).await;
        }

        if let Some(limit) =
            capacity_reached(snapshot.max_participants, snapshot.participant_count)
        {
            return Err(AppError::CapacityExceeded { limit });
        }

        match self
            .participants
            .insert_participant(meeting_id, user_id)
            .await?
        {
            InsertOutcome::Inserted => {
                self.listing.invalidate().await;
                tracing::info!(meeting_id, user_id, "Participant joined");
                self.result(meeting_id, true).await
            }
            InsertOutcome::AlreadyMember => self.result(meeting_id, false).await,
            InsertOutcome::Full { limit } => Err(AppError::CapacityExceeded { limit }),
            InsertOutcome::Unavailable => Err(AppError::NotFound),
        }
    }

    /// Removes the user from the meeting. The organizer may leave too.
    #[instrument(skip(self))]
    pub async fn leave(&self, meeting_id: i64, user_id: i64) -> AppResult<MembershipResult> {
        self.meetings
            .get_by_id(meeting_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !self
            .participants
            .remove_participant(meeting_id, user_id)
            .await?
        {
            return Err(AppError::NotMember);
        }

        self.listing.invalidate().await;
        tracing::info!(meeting_id, user_id, "Participant left");
        self.result(meeting_id, true).await
    }

    async fn result(&self, meeting_id: i64, changed: bool) -> AppResult<MembershipResult> {
        let meeting =
            load_meeting_view(self.meetings.as_ref(), self.participants.as_ref(), meeting_id)
                .await?;
        Ok(MembershipResult { changed, meeting })
    }
}
