//! In-memory store implementing every repository trait.
//!
//! Mirrors the Postgres schema rules that matter to the use cases: unique
//! emails, one participant row per (meeting, user), and cascading deletes.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        meeting::{Meeting, MeetingStatus, capacity_reached},
        place::Place,
        user::{User, UserRole},
    },
    use_cases::{
        auth::{NewUser, UserRepo},
        meeting::{MeetingDetails, MeetingRepo, MeetingSummary, NewMeeting, ParticipantInfo},
        membership::{AdmissionSnapshot, InsertOutcome, ParticipantRepo},
        place::{NewPlace, PlaceRepo},
    },
};

/// Ids handed out by the store start above this so they never clash with seeded ones.
const FIRST_GENERATED_ID: i64 = 1000;

struct ParticipantRow {
    meeting_id: i64,
    user_id: i64,
    joined_at: NaiveDateTime,
}

#[derive(Default)]
struct StoreState {
    users: BTreeMap<i64, User>,
    places: BTreeMap<i64, Place>,
    meetings: BTreeMap<i64, Meeting>,
    /// Insertion order is join order.
    participants: Vec<ParticipantRow>,
    last_id: i64,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.last_id = self.last_id.max(FIRST_GENERATED_ID) + 1;
        self.last_id
    }

    fn count(&self, meeting_id: i64) -> i64 {
        self.participants
            .iter()
            .filter(|p| p.meeting_id == meeting_id)
            .count() as i64
    }

    fn is_member(&self, meeting_id: i64, user_id: i64) -> bool {
        self.participants
            .iter()
            .any(|p| p.meeting_id == meeting_id && p.user_id == user_id)
    }

    fn summary(&self, meeting: &Meeting) -> MeetingSummary {
        let place = meeting.place_id.and_then(|id| self.places.get(&id));
        MeetingSummary {
            meeting: meeting.clone(),
            place_name: place.map(|p| p.name.clone()),
            address: place.map(|p| p.address.clone()),
            organizer_name: self.users.get(&meeting.organizer_id).map(|u| u.name.clone()),
            participants_count: self.count(meeting.id),
        }
    }

    fn details(&self, meeting: &Meeting) -> MeetingDetails {
        let place = meeting.place_id.and_then(|id| self.places.get(&id));
        let organizer = self.users.get(&meeting.organizer_id);
        MeetingDetails {
            meeting: meeting.clone(),
            place_name: place.map(|p| p.name.clone()),
            address: place.map(|p| p.address.clone()),
            latitude: place.and_then(|p| p.latitude),
            longitude: place.and_then(|p| p.longitude),
            organizer_name: organizer.map(|u| u.name.clone()),
            organizer_avatar: organizer.and_then(|u| u.avatar_url.clone()),
        }
    }

    /// Summaries matching `filter`, newest start first.
    fn summaries_desc(&self, filter: impl Fn(&Meeting) -> bool) -> Vec<MeetingSummary> {
        let mut meetings: Vec<&Meeting> = self.meetings.values().filter(|m| filter(*m)).collect();
        meetings.sort_by(|a, b| (b.start_time, b.id).cmp(&(a.start_time, a.id)));
        meetings.into_iter().map(|m| self.summary(m)).collect()
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_user(&self, user: User) {
        self.state.lock().unwrap().users.insert(user.id, user);
    }

    pub fn seed_place(&self, place: Place) {
        self.state.lock().unwrap().places.insert(place.id, place);
    }

    /// Inserts the meeting as-is. The organizer is not enrolled automatically.
    pub fn seed_meeting(&self, meeting: Meeting) {
        self.state.lock().unwrap().meetings.insert(meeting.id, meeting);
    }

    pub fn seed_participant(&self, meeting_id: i64, user_id: i64) {
        let mut state = self.state.lock().unwrap();
        if !state.is_member(meeting_id, user_id) {
            state.participants.push(ParticipantRow {
                meeting_id,
                user_id,
                joined_at: crate::test_utils::test_datetime(),
            });
        }
    }

    pub fn set_status(&self, meeting_id: i64, status: MeetingStatus) {
        if let Some(m) = self.state.lock().unwrap().meetings.get_mut(&meeting_id) {
            m.status = status;
        }
    }

    pub fn meeting(&self, meeting_id: i64) -> Option<Meeting> {
        self.state.lock().unwrap().meetings.get(&meeting_id).cloned()
    }

    pub fn meeting_ids(&self) -> Vec<i64> {
        self.state.lock().unwrap().meetings.keys().copied().collect()
    }

    pub fn participant_count(&self, meeting_id: i64) -> usize {
        self.state.lock().unwrap().count(meeting_id) as usize
    }

    pub fn is_member(&self, meeting_id: i64, user_id: i64) -> bool {
        self.state.lock().unwrap().is_member(meeting_id, user_id)
    }
}

#[async_trait]
impl UserRepo for InMemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::InvalidInput(
                "A record with this value already exists".into(),
            ));
        }
        let now = chrono::Utc::now().naive_utc();
        let created = User {
            id: state.next_id(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            phone: user.phone,
            interests: user.interests,
            avatar_url: None,
            bio: None,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        name: &str,
        bio: Option<&str>,
        avatar_url: Option<&str>,
    ) -> AppResult<Option<User>> {
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.name = name.to_string();
        user.bio = bio.map(str::to_string);
        user.avatar_url = avatar_url.map(str::to_string);
        user.updated_at = chrono::Utc::now().naive_utc();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl PlaceRepo for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<Place>> {
        let state = self.state.lock().unwrap();
        let mut places: Vec<Place> = state.places.values().cloned().collect();
        places.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(places)
    }

    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Place>> {
        let needle = term.to_lowercase();
        let mut matches = self.list().await?;
        matches.retain(|p| {
            p.name.to_lowercase().contains(&needle) || p.address.to_lowercase().contains(&needle)
        });
        matches.truncate(limit.max(0) as usize);
        Ok(matches)
    }

    async fn create(&self, place: NewPlace) -> AppResult<Place> {
        let mut state = self.state.lock().unwrap();
        let created = Place {
            id: state.next_id(),
            name: place.name,
            address: place.address,
            latitude: place.latitude,
            longitude: place.longitude,
            description: place.description,
            image_url: place.image_url,
            created_at: chrono::Utc::now().naive_utc(),
        };
        state.places.insert(created.id, created.clone());
        Ok(created)
    }

    async fn exists(&self, place_id: i64) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().places.contains_key(&place_id))
    }
}

#[async_trait]
impl MeetingRepo for InMemoryStore {
    async fn create_with_organizer(
        &self,
        organizer_id: i64,
        meeting: NewMeeting,
    ) -> AppResult<Meeting> {
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&organizer_id) {
            return Err(AppError::InvalidInput("Referenced record not found".into()));
        }
        let now = chrono::Utc::now().naive_utc();
        let created = Meeting {
            id: state.next_id(),
            title: meeting.title,
            description: meeting.description,
            place_id: meeting.place_id,
            organizer_id,
            category: meeting.category,
            budget: meeting.budget,
            start_time: meeting.start_time,
            end_time: meeting.end_time,
            max_participants: meeting.max_participants,
            status: MeetingStatus::Active,
            created_at: now,
            updated_at: now,
        };
        state.meetings.insert(created.id, created.clone());
        state.participants.push(ParticipantRow {
            meeting_id: created.id,
            user_id: organizer_id,
            joined_at: now,
        });
        Ok(created)
    }

    async fn get_by_id(&self, meeting_id: i64) -> AppResult<Option<Meeting>> {
        Ok(self.meeting(meeting_id))
    }

    async fn get_details(&self, meeting_id: i64) -> AppResult<Option<MeetingDetails>> {
        let state = self.state.lock().unwrap();
        Ok(state.meetings.get(&meeting_id).map(|m| state.details(m)))
    }

    async fn list_active(&self) -> AppResult<Vec<MeetingSummary>> {
        let state = self.state.lock().unwrap();
        let mut active: Vec<&Meeting> = state
            .meetings
            .values()
            .filter(|m| m.status == MeetingStatus::Active)
            .collect();
        active.sort_by_key(|m| (m.start_time, m.id));
        Ok(active.into_iter().map(|m| state.summary(m)).collect())
    }

    async fn list_by_organizer(&self, user_id: i64) -> AppResult<Vec<MeetingSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state.summaries_desc(|m| m.organizer_id == user_id))
    }

    async fn list_joined(&self, user_id: i64) -> AppResult<Vec<MeetingSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state.summaries_desc(|m| state.is_member(m.id, user_id)))
    }

    async fn update_status(
        &self,
        meeting_id: i64,
        status: MeetingStatus,
    ) -> AppResult<Option<Meeting>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.meetings.get_mut(&meeting_id).map(|m| {
            m.status = status;
            m.updated_at = chrono::Utc::now().naive_utc();
            m.clone()
        }))
    }

    async fn delete(&self, meeting_id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        let removed = state.meetings.remove(&meeting_id).is_some();
        state.participants.retain(|p| p.meeting_id != meeting_id);
        Ok(removed)
    }
}

#[async_trait]
impl ParticipantRepo for InMemoryStore {
    async fn admission_snapshot(
        &self,
        meeting_id: i64,
        user_id: i64,
    ) -> AppResult<Option<AdmissionSnapshot>> {
        let state = self.state.lock().unwrap();
        Ok(state.meetings.get(&meeting_id).map(|m| AdmissionSnapshot {
            status: m.status,
            max_participants: m.max_participants,
            participant_count: state.count(meeting_id),
            is_member: state.is_member(meeting_id, user_id),
        }))
    }

    async fn insert_participant(&self, meeting_id: i64, user_id: i64) -> AppResult<InsertOutcome> {
        let mut state = self.state.lock().unwrap();
        let Some(meeting) = state.meetings.get(&meeting_id) else {
            return Ok(InsertOutcome::Unavailable);
        };
        if !meeting.status.is_joinable() {
            return Ok(InsertOutcome::Unavailable);
        }
        let max_participants = meeting.max_participants;
        if state.is_member(meeting_id, user_id) {
            return Ok(InsertOutcome::AlreadyMember);
        }
        if let Some(limit) = capacity_reached(max_participants, state.count(meeting_id)) {
            return Ok(InsertOutcome::Full { limit });
        }
        state.participants.push(ParticipantRow {
            meeting_id,
            user_id,
            joined_at: chrono::Utc::now().naive_utc(),
        });
        Ok(InsertOutcome::Inserted)
    }

    async fn remove_participant(&self, meeting_id: i64, user_id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.participants.len();
        state
            .participants
            .retain(|p| !(p.meeting_id == meeting_id && p.user_id == user_id));
        Ok(state.participants.len() < before)
    }

    async fn list_participants(&self, meeting_id: i64) -> AppResult<Vec<ParticipantInfo>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .participants
            .iter()
            .filter(|p| p.meeting_id == meeting_id)
            .filter_map(|p| {
                state.users.get(&p.user_id).map(|u| ParticipantInfo {
                    id: u.id,
                    name: u.name.clone(),
                    avatar_url: u.avatar_url.clone(),
                    joined_at: p.joined_at,
                })
            })
            .collect())
    }
}
