//! Guest capture completeness gate.
//!
//! Check-in readiness is measured purely on identity fields: a guest counts
//! once name and mobile are on file. Biometric images are tracked for
//! display but never block the gate.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::db::{CaptureKind, Guest, GuestCapture};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GateStatus {
    pub expected_guests: i64,
    pub captured_count: i64,
    pub satisfied: bool,
}

/// Evaluates the gate for a party of `adults + children` (never below one)
/// against the guests currently attached to the reservation.
pub fn evaluate(adults: i32, children: i32, guests: &[Guest]) -> GateStatus {
    let expected_guests = i64::from(adults + children).max(1);
    let captured_count = guests.iter().filter(|g| g.has_identity()).count() as i64;
    GateStatus {
        expected_guests,
        captured_count,
        satisfied: captured_count >= expected_guests,
    }
}

/// Which of the three capture kinds exist per guest. Display-only; not part
/// of the readiness decision.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturePresence {
    pub face: Option<String>,
    pub id_front: Option<String>,
    pub id_back: Option<String>,
}

pub fn presence_by_guest(captures: &[GuestCapture]) -> HashMap<Uuid, CapturePresence> {
    let mut by_guest: HashMap<Uuid, CapturePresence> = HashMap::new();
    for capture in captures {
        let entry = by_guest.entry(capture.guest_id).or_default();
        let slot = match capture.kind {
            CaptureKind::Face => &mut entry.face,
            CaptureKind::IdFront => &mut entry.id_front,
            CaptureKind::IdBack => &mut entry.id_back,
        };
        *slot = Some(capture.image_ref.clone());
    }
    by_guest
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn guest(name: &str, mobile: Option<&str>) -> Guest {
        Guest {
            id: Uuid::now_v7(),
            reservation_id: Uuid::now_v7(),
            name: name.to_string(),
            mobile: mobile.map(str::to_string),
            email: None,
            nationality: None,
            gender: None,
            age: None,
            address: None,
            id_type: None,
            id_number: None,
            relation: "Main".to_string(),
            is_main: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn expected_guests_never_below_one() {
        let status = evaluate(0, 0, &[]);
        assert_eq!(status.expected_guests, 1);
        assert!(!status.satisfied);
    }

    #[test]
    fn single_adult_with_complete_guest_satisfies_gate_without_biometrics() {
        let guests = vec![guest("Asha Rao", Some("555-0101"))];
        let status = evaluate(1, 0, &guests);
        assert_eq!(status.expected_guests, 1);
        assert_eq!(status.captured_count, 1);
        assert!(status.satisfied);
    }

    #[test]
    fn party_of_three_needs_three_complete_records() {
        let mut guests = vec![
            guest("Asha Rao", Some("555-0101")),
            guest("Dev Rao", Some("555-0102")),
        ];
        let status = evaluate(2, 1, &guests);
        assert_eq!(status.expected_guests, 3);
        assert_eq!(status.captured_count, 2);
        assert!(!status.satisfied);

        guests.push(guest("Mira Rao", Some("555-0103")));
        assert!(evaluate(2, 1, &guests).satisfied);
    }

    #[test]
    fn guest_without_mobile_does_not_count() {
        let guests = vec![guest("Asha Rao", None), guest("Dev Rao", Some("  "))];
        let status = evaluate(1, 0, &guests);
        assert_eq!(status.captured_count, 0);
    }

    #[test]
    fn presence_tracks_latest_ref_per_kind() {
        let guest_id = Uuid::now_v7();
        let make = |kind, image_ref: &str| GuestCapture {
            id: Uuid::now_v7(),
            guest_id,
            kind,
            image_ref: image_ref.to_string(),
            captured_at: OffsetDateTime::now_utc(),
        };
        let captures = vec![
            make(CaptureKind::Face, "a/face-1.jpg"),
            make(CaptureKind::IdFront, "a/front-1.jpg"),
        ];
        let presence = presence_by_guest(&captures);
        let entry = &presence[&guest_id];
        assert_eq!(entry.face.as_deref(), Some("a/face-1.jpg"));
        assert_eq!(entry.id_front.as_deref(), Some("a/front-1.jpg"));
        assert!(entry.id_back.is_none());
    }
}
