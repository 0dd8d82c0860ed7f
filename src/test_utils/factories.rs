//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    entities::waitlist_entry::{WaitlistEntry, WaitlistStatus},
    identity::AuthUser,
    use_cases::waitlist::JoinRequest,
};

/// Create a pending waitlist entry with sensible defaults.
pub fn create_test_entry(overrides: impl FnOnce(&mut WaitlistEntry)) -> WaitlistEntry {
    let mut entry = WaitlistEntry {
        id: Uuid::new_v4(),
        email: format!("user-{}@example.com", Uuid::new_v4().simple()),
        full_name: "Test User".to_string(),
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        waitlisted_at: test_datetime(),
        approved: false,
        approved_at: None,
        external_user_id: None,
        metadata: json!({}),
        status: WaitlistStatus::Pending,
        created_at: test_datetime(),
        updated_at: test_datetime(),
    };
    overrides(&mut entry);
    entry
}

/// Join request with the two required fields set.
pub fn join_request(email: &str, full_name: &str) -> JoinRequest {
    JoinRequest {
        email: Some(email.to_string()),
        full_name: Some(full_name.to_string()),
        ..Default::default()
    }
}

/// Authenticated user without any role.
pub fn create_test_user(overrides: impl FnOnce(&mut AuthUser)) -> AuthUser {
    let mut user = AuthUser {
        id: Uuid::new_v4().to_string(),
        email: Some("member@example.com".to_string()),
        email_verified: true,
        public_metadata: json!({}),
        unsafe_metadata: json!({}),
    };
    overrides(&mut user);
    user
}

/// Authenticated user carrying the admin role.
pub fn create_test_admin() -> AuthUser {
    create_test_user(|u| {
        u.email = Some("admin@example.com".to_string());
        u.public_metadata = json!({ "role": "admin" });
    })
}

/// Fixed datetime for reproducible tests.
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}
