//! Caller input for create and edit.

use serde::{Deserialize, Serialize};
use validator::Validate;

use mrbs_core::error::AppError;
use mrbs_core::result::AppResult;
use mrbs_core::types::time::parse_datetime;
use mrbs_core::types::{BookingPolicy, RoomId, TimeInterval, UserId};
use mrbs_entity::booking::NewBooking;

/// Create or edit request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingRequest {
    /// Room to book.
    pub room_id: RoomId,
    /// Local start, `YYYY-MM-DD HH:MM`.
    #[validate(length(min = 1, message = "Start time is required"))]
    pub start_time: String,
    /// Length in slots.
    #[validate(range(min = 1, message = "Duration must be at least one slot"))]
    pub duration_slots: u32,
    /// Title.
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    /// Description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl BookingRequest {
    /// Validate and turn the request into a candidate owned by `owner`.
    pub fn into_candidate(self, owner: UserId, policy: &BookingPolicy) -> AppResult<NewBooking> {
        self.validate()?;
        if self.duration_slots > policy.max_slots {
            return Err(AppError::validation(format!(
                "Duration must be between 1 and {} slots",
                policy.max_slots
            )));
        }

        let start = parse_datetime(&self.start_time, policy.offset())?;
        let end = policy.slot.end_after(start, self.duration_slots);
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(NewBooking {
            user_id: owner,
            room_id: self.room_id,
            interval: TimeInterval::new(start, end)?,
            title: self.title.trim().to_string(),
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mrbs_core::error::ErrorKind;

    fn request(start: &str, slots: u32) -> BookingRequest {
        BookingRequest {
            room_id: RoomId(3),
            start_time: start.to_string(),
            duration_slots: slots,
            title: " Design review ".to_string(),
            description: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_builds_candidate_in_local_time() {
        let owner = UserId::new();
        let candidate = request("2025-03-10 08:00", 2)
            .into_candidate(owner, &BookingPolicy::default())
            .unwrap();

        assert_eq!(candidate.user_id, owner);
        assert_eq!(candidate.interval.start(), Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(candidate.interval.end(), Utc.with_ymd_and_hms(2025, 3, 10, 1, 0, 0).unwrap());
        assert_eq!(candidate.title, "Design review");
        assert_eq!(candidate.description, None);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let policy = BookingPolicy::default();
        let cases = [
            request("2025-03-10 08:00", 0),
            request("2025-03-10 08:00", 37),
            request("10/03/2025 08:00", 2),
            request("", 2),
            BookingRequest {
                title: String::new(),
                ..request("2025-03-10 08:00", 2)
            },
            BookingRequest {
                title: "x".repeat(101),
                ..request("2025-03-10 08:00", 2)
            },
        ];

        for case in cases {
            let err = case.into_candidate(UserId::new(), &policy).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
        }
    }

    #[test]
    fn test_deserializes_from_json() {
        let req: BookingRequest = serde_json::from_str(
            r#"{"room_id": 4, "start_time": "2025-03-10 09:30", "duration_slots": 3, "title": "1:1", "description": null}"#,
        )
        .unwrap();
        assert_eq!(req.room_id, RoomId(4));
        assert_eq!(req.duration_slots, 3);
    }
}
