//! Room-stay conflict checking.
//!
//! Date ranges are half-open `[check_in, check_out)`: the check-out day is
//! not occupied, so a same-day turnover is never a conflict. The database
//! read feeding [`find_conflict`] happens under lock in the same
//! transaction as the insert; see `RoomStayRepository`.

use time::Date;
use uuid::Uuid;

use super::error::ReservationError;
use crate::db::RoomStayBooking;

/// Half-open interval overlap: `[a1, a2)` and `[b1, b2)` overlap iff
/// `a1 < b2 && b1 < a2`.
pub fn overlaps(a1: Date, a2: Date, b1: Date, b2: Date) -> bool {
    a1 < b2 && b1 < a2
}

/// Tests a candidate stay against a room's existing bookings. Bookings
/// belonging to terminal reservations are filtered out upstream; sibling
/// stays of the owning reservation are exempt (a multi-room booking checks
/// against other reservations, not against itself).
pub fn find_conflict(
    room_id: &str,
    reservation_id: Uuid,
    check_in: Date,
    check_out: Date,
    existing: &[RoomStayBooking],
) -> Result<(), ReservationError> {
    for booking in existing {
        if booking.reservation_id == reservation_id {
            continue;
        }
        if overlaps(check_in, check_out, booking.check_in, booking.check_out) {
            return Err(ReservationError::RoomConflict {
                room_id: room_id.to_string(),
                conflicting_code: booking.reservation_code.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ReservationStatus;
    use time::macros::date;

    fn booking(code: &str, check_in: Date, check_out: Date) -> RoomStayBooking {
        RoomStayBooking {
            reservation_id: Uuid::now_v7(),
            reservation_code: code.to_string(),
            status: ReservationStatus::Confirmed,
            check_in,
            check_out,
        }
    }

    #[test]
    fn overlap_is_half_open() {
        // Shared interior night.
        assert!(overlaps(
            date!(2025 - 04 - 04),
            date!(2025 - 04 - 06),
            date!(2025 - 04 - 05),
            date!(2025 - 04 - 08)
        ));
        // Back-to-back turnover: checkout day equals the next check-in.
        assert!(!overlaps(
            date!(2025 - 04 - 01),
            date!(2025 - 04 - 05),
            date!(2025 - 04 - 05),
            date!(2025 - 04 - 08)
        ));
        // Fully disjoint.
        assert!(!overlaps(
            date!(2025 - 04 - 01),
            date!(2025 - 04 - 03),
            date!(2025 - 04 - 10),
            date!(2025 - 04 - 12)
        ));
        // Containment.
        assert!(overlaps(
            date!(2025 - 04 - 01),
            date!(2025 - 04 - 10),
            date!(2025 - 04 - 04),
            date!(2025 - 04 - 05)
        ));
    }

    #[test]
    fn adjacent_stays_coexist_then_straddler_conflicts() {
        let existing = vec![
            booking("RSV-A", date!(2025 - 04 - 01), date!(2025 - 04 - 05)),
            booking("RSV-B", date!(2025 - 04 - 05), date!(2025 - 04 - 08)),
        ];

        // The two existing stays are adjacent, so a third booking outside
        // both ranges is fine.
        find_conflict(
            "101",
            Uuid::now_v7(),
            date!(2025 - 04 - 08),
            date!(2025 - 04 - 10),
            &existing,
        )
        .unwrap();

        // A stay straddling the turnover night conflicts with the first.
        let err = find_conflict(
            "101",
            Uuid::now_v7(),
            date!(2025 - 04 - 04),
            date!(2025 - 04 - 06),
            &existing,
        )
        .unwrap_err();
        match err {
            ReservationError::RoomConflict {
                room_id,
                conflicting_code,
            } => {
                assert_eq!(room_id, "101");
                assert_eq!(conflicting_code, "RSV-A");
            }
            other => panic!("expected RoomConflict, got {other:?}"),
        }
    }

    #[test]
    fn sibling_stays_of_the_same_reservation_are_exempt() {
        let reservation_id = Uuid::now_v7();
        let mut sibling = booking("RSV-SELF", date!(2025 - 05 - 01), date!(2025 - 05 - 04));
        sibling.reservation_id = reservation_id;

        find_conflict(
            "202",
            reservation_id,
            date!(2025 - 05 - 02),
            date!(2025 - 05 - 03),
            &[sibling],
        )
        .unwrap();
    }
}
