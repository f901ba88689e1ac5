//! Test data factories.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::entities::{
    meeting::{Meeting, MeetingStatus},
    place::Place,
    user::{User, UserRole},
};

/// Fixed timestamp so assertions are deterministic.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 11, 1)
        .and_then(|d| d.and_hms_opt(18, 0, 0))
        .expect("valid test date")
}

/// Create a test user. The password hash matches `PlainPasswordHasher` for "password123".
pub fn create_test_user(id: i64, overrides: impl FnOnce(&mut User)) -> User {
    let mut user = User {
        id,
        email: format!("user{id}@example.com"),
        password_hash: "plain:password123".to_string(),
        name: format!("User {id}"),
        phone: None,
        interests: None,
        avatar_url: None,
        bio: None,
        role: UserRole::User,
        created_at: test_datetime(),
        updated_at: test_datetime(),
    };
    overrides(&mut user);
    user
}

/// Create an active meeting with no capacity limit.
pub fn create_test_meeting(
    id: i64,
    organizer_id: i64,
    overrides: impl FnOnce(&mut Meeting),
) -> Meeting {
    let mut meeting = Meeting {
        id,
        title: format!("Meeting {id}"),
        description: None,
        place_id: None,
        organizer_id,
        category: None,
        budget: None,
        start_time: test_datetime(),
        end_time: None,
        max_participants: None,
        status: MeetingStatus::Active,
        created_at: test_datetime(),
        updated_at: test_datetime(),
    };
    overrides(&mut meeting);
    meeting
}

pub fn create_test_place(id: i64, overrides: impl FnOnce(&mut Place)) -> Place {
    let mut place = Place {
        id,
        name: format!("Place {id}"),
        address: format!("Address {id}"),
        latitude: None,
        longitude: None,
        description: None,
        image_url: None,
        created_at: test_datetime(),
    };
    overrides(&mut place);
    place
}
