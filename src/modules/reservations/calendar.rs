//! Calendar index: a pure month-grid projection of reservations.
//!
//! Derived on every read, never stored. Identical inputs yield identical
//! output, and the reservations passed in are never mutated.

use serde::Serialize;
use time::{Date, Duration, Month};

use super::error::ReservationError;
use crate::db::{Reservation, ReservationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPosition {
    /// First occupied night of the stay.
    Start,
    /// Last occupied night (the day before check-out).
    End,
    Middle,
    /// One-night stay: start and end coincide.
    Single,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub reservation_id: uuid::Uuid,
    pub code: String,
    pub guest_name: String,
    pub status: ReservationStatus,
    pub position: DayPosition,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub day: u8,
    pub date: Date,
    pub events: Vec<CalendarEvent>,
}

/// ISO Monday-start grid. Cells outside the month are `None`.
#[derive(Debug, Clone, Serialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u8,
    pub weeks: Vec<Vec<Option<CalendarDay>>>,
}

/// Parses a `YYYY-MM` query value.
pub fn parse_ym(ym: &str) -> Result<(i32, Month), ReservationError> {
    let invalid = || ReservationError::Validation(format!("'{ym}' is not a valid YYYY-MM month"));

    let (year_s, month_s) = ym.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year_s.parse().map_err(|_| invalid())?;
    let month_num: u8 = month_s.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month_num).map_err(|_| invalid())?;
    Ok((year, month))
}

/// Half-open day range `[first, first_of_next_month)` covered by the month.
pub fn month_bounds(year: i32, month: Month) -> Result<(Date, Date), ReservationError> {
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|_| ReservationError::Validation(format!("{year}-{month:?} is out of range")))?;
    let days = i64::from(time::util::days_in_year_month(year, month));
    Ok((first, first + Duration::days(days)))
}

/// Projects the given reservations onto the month grid. `status` narrows
/// the displayed events without touching the input set.
pub fn project(
    year: i32,
    month: Month,
    reservations: &[Reservation],
    status: Option<ReservationStatus>,
) -> Result<MonthCalendar, ReservationError> {
    let (first, _) = month_bounds(year, month)?;
    let days_in_month = time::util::days_in_year_month(year, month);

    let visible: Vec<&Reservation> = reservations
        .iter()
        .filter(|r| status.is_none_or(|s| r.status == s))
        .collect();

    let mut days: Vec<CalendarDay> = Vec::with_capacity(usize::from(days_in_month));
    for offset in 0..i64::from(days_in_month) {
        let date = first + Duration::days(offset);
        let mut events: Vec<CalendarEvent> = visible
            .iter()
            .filter_map(|r| position_on(r, date).map(|position| (r, position)))
            .map(|(r, position)| CalendarEvent {
                reservation_id: r.id,
                code: r.code.clone(),
                guest_name: r.guest_name.clone(),
                status: r.status,
                position,
            })
            .collect();
        events.sort_by(|a, b| a.code.cmp(&b.code));
        days.push(CalendarDay {
            day: date.day(),
            date,
            events,
        });
    }

    // ISO weekday of the 1st, Monday = 1; the grid pads the first row with
    // that many blanks and fills whole weeks.
    let leading_blanks = usize::from(first.weekday().number_from_monday() - 1);
    let total_cells = (leading_blanks + usize::from(days_in_month)).div_ceil(7) * 7;

    let mut cells: Vec<Option<CalendarDay>> = Vec::with_capacity(total_cells);
    cells.extend(std::iter::repeat_with(|| None).take(leading_blanks));
    cells.extend(days.into_iter().map(Some));
    cells.extend(std::iter::repeat_with(|| None).take(total_cells - cells.len()));

    let weeks = cells
        .chunks(7)
        .map(|week| week.to_vec())
        .collect::<Vec<_>>();

    Ok(MonthCalendar {
        year,
        month: u8::from(month),
        weeks,
    })
}

/// Where `day` falls within the stay, or `None` when the day is not
/// occupied. The check-out day itself carries nothing.
fn position_on(reservation: &Reservation, day: Date) -> Option<DayPosition> {
    if day < reservation.check_in || day >= reservation.check_out {
        return None;
    }
    let last_night = reservation.check_out - Duration::days(1);
    Some(if reservation.check_in == last_night {
        DayPosition::Single
    } else if day == reservation.check_in {
        DayPosition::Start
    } else if day == last_night {
        DayPosition::End
    } else {
        DayPosition::Middle
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ReservationChannel;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn reservation(code: &str, check_in: Date, check_out: Date) -> Reservation {
        Reservation {
            id: Uuid::now_v7(),
            org_id: Uuid::now_v7(),
            code: code.to_string(),
            guest_name: "Asha Rao".to_string(),
            guest_contact: None,
            channel: ReservationChannel::Direct,
            status: ReservationStatus::Confirmed,
            check_in,
            check_out,
            adults: 2,
            children: 0,
            notes: None,
            balance_due: 0,
            currency: "USD".to_string(),
            group_block_id: None,
            prearrival_token: None,
            checked_in_at: None,
            checked_out_at: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn events_on(calendar: &MonthCalendar, day: u8) -> Vec<CalendarEvent> {
        calendar
            .weeks
            .iter()
            .flatten()
            .flatten()
            .find(|d| d.day == day)
            .map(|d| d.events.clone())
            .unwrap_or_default()
    }

    #[test]
    fn two_night_stay_renders_start_then_end_and_skips_checkout_day() {
        let stays = vec![reservation(
            "RSV-1",
            date!(2025 - 03 - 10),
            date!(2025 - 03 - 12),
        )];
        let calendar = project(2025, Month::March, &stays, None).unwrap();

        let mar10 = events_on(&calendar, 10);
        assert_eq!(mar10.len(), 1);
        assert_eq!(mar10[0].position, DayPosition::Start);

        let mar11 = events_on(&calendar, 11);
        assert_eq!(mar11[0].position, DayPosition::End);

        assert!(events_on(&calendar, 12).is_empty());
    }

    #[test]
    fn one_night_stay_is_single() {
        let stays = vec![reservation(
            "RSV-1",
            date!(2025 - 03 - 10),
            date!(2025 - 03 - 11),
        )];
        let calendar = project(2025, Month::March, &stays, None).unwrap();
        assert_eq!(events_on(&calendar, 10)[0].position, DayPosition::Single);
    }

    #[test]
    fn grid_geometry_is_iso_monday_start() {
        // March 2025 starts on a Saturday: 5 leading blanks, 36 cells, 6 rows.
        let calendar = project(2025, Month::March, &[], None).unwrap();
        assert_eq!(calendar.weeks.len(), 6);
        assert!(calendar.weeks.iter().all(|w| w.len() == 7));
        let first_week = &calendar.weeks[0];
        assert!(first_week[..5].iter().all(Option::is_none));
        assert_eq!(first_week[5].as_ref().map(|d| d.day), Some(1));

        // September 2025 starts on a Monday: no blanks, exactly 5 rows.
        let september = project(2025, Month::September, &[], None).unwrap();
        assert_eq!(september.weeks.len(), 5);
        assert_eq!(september.weeks[0][0].as_ref().map(|d| d.day), Some(1));
    }

    #[test]
    fn projection_is_pure_and_deterministic() {
        let stays = vec![
            reservation("RSV-B", date!(2025 - 03 - 05), date!(2025 - 03 - 08)),
            reservation("RSV-A", date!(2025 - 03 - 06), date!(2025 - 03 - 09)),
        ];
        let before = serde_json::to_string(&stays).unwrap();

        let once = project(2025, Month::March, &stays, None).unwrap();
        let twice = project(2025, Month::March, &stays, None).unwrap();
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );

        // Inputs untouched, events ordered by code within a day.
        assert_eq!(serde_json::to_string(&stays).unwrap(), before);
        let mar6: Vec<String> = events_on(&once, 6).iter().map(|e| e.code.clone()).collect();
        assert_eq!(mar6, vec!["RSV-A".to_string(), "RSV-B".to_string()]);
    }

    #[test]
    fn status_filter_narrows_without_mutating() {
        let mut cancelled = reservation("RSV-C", date!(2025 - 03 - 05), date!(2025 - 03 - 08));
        cancelled.status = ReservationStatus::Cancelled;
        let stays = vec![
            cancelled,
            reservation("RSV-D", date!(2025 - 03 - 05), date!(2025 - 03 - 08)),
        ];

        let filtered = project(
            2025,
            Month::March,
            &stays,
            Some(ReservationStatus::Confirmed),
        )
        .unwrap();
        let mar5 = events_on(&filtered, 5);
        assert_eq!(mar5.len(), 1);
        assert_eq!(mar5[0].code, "RSV-D");
        assert_eq!(stays.len(), 2);
    }

    #[test]
    fn parse_ym_rejects_malformed_values() {
        assert!(parse_ym("2025-03").is_ok());
        for bad in ["2025", "2025-13", "2025-00", "march", "2025-3x"] {
            assert!(parse_ym(bad).is_err(), "{bad} should be rejected");
        }
    }
}
