use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{normalize_optional, require_text},
    domain::entities::meeting::{Meeting, MeetingStatus},
    use_cases::{
        auth::UserRepo, listing::ListingUseCases, membership::ParticipantRepo, place::PlaceRepo,
    },
};

const MAX_TITLE_CHARS: usize = 255;
const MAX_CATEGORY_CHARS: usize = 100;
const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

#[async_trait]
pub trait MeetingRepo: Send + Sync {
    /// Inserts the meeting and enrolls the organizer atomically.
    async fn create_with_organizer(&self, organizer_id: i64, meeting: NewMeeting)
    -> AppResult<Meeting>;
    async fn get_by_id(&self, meeting_id: i64) -> AppResult<Option<Meeting>>;
    async fn get_details(&self, meeting_id: i64) -> AppResult<Option<MeetingDetails>>;
    /// Active meetings ordered by start time ascending.
    async fn list_active(&self) -> AppResult<Vec<MeetingSummary>>;
    async fn list_by_organizer(&self, user_id: i64) -> AppResult<Vec<MeetingSummary>>;
    async fn list_joined(&self, user_id: i64) -> AppResult<Vec<MeetingSummary>>;
    async fn update_status(
        &self,
        meeting_id: i64,
        status: MeetingStatus,
    ) -> AppResult<Option<Meeting>>;
    /// Returns false when no row was deleted.
    async fn delete(&self, meeting_id: i64) -> AppResult<bool>;
}

/// Row shape of the meetings listing, also the cached payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub place_name: Option<String>,
    pub address: Option<String>,
    pub organizer_name: Option<String>,
    pub participants_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingDetails {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub place_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub organizer_name: Option<String>,
    pub organizer_avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantInfo {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub joined_at: NaiveDateTime,
}

/// Meeting fields plus organizer, place and the full participant list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingView {
    #[serde(flatten)]
    pub details: MeetingDetails,
    pub participants: Vec<ParticipantInfo>,
}

impl MeetingView {
    pub fn participant_ids(&self) -> Vec<i64> {
        self.participants.iter().map(|p| p.id).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateMeetingInput {
    pub title: String,
    pub description: Option<String>,
    pub place_id: Option<i64>,
    pub category: Option<String>,
    pub budget: Option<f64>,
    pub start_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    pub end_time: Option<NaiveDateTime>,
    pub max_participants: Option<i32>,
}

/// Validated meeting ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeeting {
    pub title: String,
    pub description: Option<String>,
    pub place_id: Option<i64>,
    pub category: Option<String>,
    pub budget: Option<f64>,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub max_participants: Option<i32>,
}

#[derive(Clone)]
pub struct MeetingUseCases {
    meetings: Arc<dyn MeetingRepo>,
    participants: Arc<dyn ParticipantRepo>,
    places: Arc<dyn PlaceRepo>,
    users: Arc<dyn UserRepo>,
    listing: Arc<ListingUseCases>,
}

impl MeetingUseCases {
    pub fn new(
        meetings: Arc<dyn MeetingRepo>,
        participants: Arc<dyn ParticipantRepo>,
        places: Arc<dyn PlaceRepo>,
        users: Arc<dyn UserRepo>,
        listing: Arc<ListingUseCases>,
    ) -> Self {
        Self {
            meetings,
            participants,
            places,
            users,
            listing,
        }
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, organizer_id: i64, input: CreateMeetingInput) -> AppResult<MeetingView> {
        self.users
            .get_by_id(organizer_id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let new_meeting = validate_new_meeting(input)?;

        if let Some(place_id) = new_meeting.place_id
            && !self.places.exists(place_id).await?
        {
            return Err(AppError::InvalidInput("Place not found".into()));
        }

        let meeting = self
            .meetings
            .create_with_organizer(organizer_id, new_meeting)
            .await?;
        self.listing.invalidate().await;

        tracing::info!(meeting_id = meeting.id, organizer_id, "Meeting created");
        self.view(meeting.id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, meeting_id: i64) -> AppResult<MeetingView> {
        self.view(meeting_id).await
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        actor_id: i64,
        meeting_id: i64,
        status: &str,
    ) -> AppResult<MeetingView> {
        let status = MeetingStatus::parse(status).ok_or_else(|| {
            AppError::InvalidInput(
                "Status must be one of: active, cancelled, completed, pending".into(),
            )
        })?;

        self.authorize_manage(actor_id, meeting_id).await?;

        self.meetings
            .update_status(meeting_id, status)
            .await?
            .ok_or(AppError::NotFound)?;
        self.listing.invalidate().await;

        tracing::info!(meeting_id, actor_id, status = status.as_str(), "Meeting status changed");
        self.view(meeting_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, actor_id: i64, meeting_id: i64) -> AppResult<()> {
        self.authorize_manage(actor_id, meeting_id).await?;

        if !self.meetings.delete(meeting_id).await? {
            return Err(AppError::NotFound);
        }
        self.listing.invalidate().await;

        tracing::info!(meeting_id, actor_id, "Meeting deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_created(&self, user_id: i64) -> AppResult<Vec<MeetingSummary>> {
        self.users.get_by_id(user_id).await?.ok_or(AppError::NotFound)?;
        self.meetings.list_by_organizer(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_joined(&self, user_id: i64) -> AppResult<Vec<MeetingSummary>> {
        self.users.get_by_id(user_id).await?.ok_or(AppError::NotFound)?;
        self.meetings.list_joined(user_id).await
    }

    async fn view(&self, meeting_id: i64) -> AppResult<MeetingView> {
        load_meeting_view(self.meetings.as_ref(), self.participants.as_ref(), meeting_id).await
    }

    /// Only the organizer or an admin may change or delete a meeting.
    async fn authorize_manage(&self, actor_id: i64, meeting_id: i64) -> AppResult<Meeting> {
        let meeting = self
            .meetings
            .get_by_id(meeting_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let actor = self
            .users
            .get_by_id(actor_id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if meeting.organizer_id != actor.id && !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        Ok(meeting)
    }
}

/// Re-reads the store to assemble the full meeting view.
pub async fn load_meeting_view(
    meetings: &dyn MeetingRepo,
    participants: &dyn ParticipantRepo,
    meeting_id: i64,
) -> AppResult<MeetingView> {
    let details = meetings
        .get_details(meeting_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let participants = participants.list_participants(meeting_id).await?;
    Ok(MeetingView {
        details,
        participants,
    })
}

fn validate_new_meeting(input: CreateMeetingInput) -> AppResult<NewMeeting> {
    let title = require_text("Title", &input.title, MAX_TITLE_CHARS).map_err(AppError::InvalidInput)?;

    let start_time = input
        .start_time
        .ok_or_else(|| AppError::InvalidInput("Start time is required".into()))?;

    let end_time = match (input.end_time, input.duration_minutes) {
        (Some(end), _) => {
            if end <= start_time {
                return Err(AppError::InvalidInput(
                    "End time must be after start time".into(),
                ));
            }
            Some(end)
        }
        (None, Some(minutes)) => {
            if !(1..=MAX_DURATION_MINUTES).contains(&minutes) {
                return Err(AppError::InvalidInput(format!(
                    "Duration must be between 1 and {MAX_DURATION_MINUTES} minutes"
                )));
            }
            Some(start_time + chrono::Duration::minutes(minutes))
        }
        (None, None) => None,
    };

    let max_participants = match input.max_participants {
        Some(n) if n < 0 => {
            return Err(AppError::InvalidInput(
                "Max participants cannot be negative".into(),
            ));
        }
        Some(0) | None => None,
        Some(n) => Some(n),
    };

    if let Some(budget) = input.budget
        && (!budget.is_finite() || budget < 0.0)
    {
        return Err(AppError::InvalidInput("Budget cannot be negative".into()));
    }

    let category = normalize_optional(input.category.as_deref());
    if let Some(category) = &category
        && category.chars().count() > MAX_CATEGORY_CHARS
    {
        return Err(AppError::InvalidInput(format!(
            "Category must be at most {MAX_CATEGORY_CHARS} characters"
        )));
    }

    Ok(NewMeeting {
        title,
        description: normalize_optional(input.description.as_deref()),
        place_id: input.place_id,
        category,
        budget: input.budget,
        start_time,
        end_time,
        max_participants,
    })
}
