use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Active,
    Cancelled,
    Completed,
    Pending,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Active => "active",
            MeetingStatus::Cancelled => "cancelled",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Pending => "pending",
        }
    }

    /// Strict parse for client input.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(MeetingStatus::Active),
            "cancelled" => Some(MeetingStatus::Cancelled),
            "completed" => Some(MeetingStatus::Completed),
            "pending" => Some(MeetingStatus::Pending),
            _ => None,
        }
    }

    /// Lenient conversion for stored values. Unknown values map to `Pending`,
    /// which is not joinable.
    pub fn from_db(s: &str) -> Self {
        Self::parse(s).unwrap_or(MeetingStatus::Pending)
    }

    pub fn is_joinable(&self) -> bool {
        matches!(self, MeetingStatus::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub place_id: Option<i64>,
    pub organizer_id: i64,
    pub category: Option<String>,
    pub budget: Option<f64>,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub max_participants: Option<i32>,
    pub status: MeetingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Upper bound on participants. Zero or unset means unlimited.
pub fn effective_capacity(max_participants: Option<i32>) -> Option<i64> {
    max_participants.filter(|c| *c > 0).map(i64::from)
}

/// The limit that blocks one more participant, if the meeting is already full.
pub fn capacity_reached(max_participants: Option<i32>, participant_count: i64) -> Option<i64> {
    effective_capacity(max_participants).filter(|limit| participant_count >= *limit)
}
