// utils/schedule.rs
//
// Slot arithmetic for the consultation scheduler. Kept free of database
// access so the conflict rules can be tested directly.
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::consultationmodel::DaySchedule;

/// An existing booking occupying the calendar.
#[derive(Debug, Clone, Copy)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl BusyInterval {
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(self.duration_minutes as i64)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

/// True when a booking at `start` would collide with `busy`, applying the
/// buffer on both sides: the candidate occupies
/// `[start - buffer, start + duration + buffer)`.
pub fn conflicts(
    start: DateTime<Utc>,
    duration_minutes: i32,
    buffer_minutes: i32,
    busy: &BusyInterval,
) -> bool {
    let padded_start = start - Duration::minutes(buffer_minutes as i64);
    let padded_end =
        start + Duration::minutes((duration_minutes + buffer_minutes) as i64);
    padded_start < busy.end() && busy.start < padded_end
}

pub fn has_conflict(
    start: DateTime<Utc>,
    duration_minutes: i32,
    buffer_minutes: i32,
    busy: &[BusyInterval],
) -> bool {
    busy.iter()
        .any(|b| conflicts(start, duration_minutes, buffer_minutes, b))
}

/// True when `[start, start + duration)` falls inside one of the day's
/// configured windows.
pub fn fits_schedule(
    day: &DaySchedule,
    date: NaiveDate,
    start: DateTime<Utc>,
    duration_minutes: i32,
) -> bool {
    if !day.enabled {
        return false;
    }
    let end = start + Duration::minutes(duration_minutes as i64);
    day.windows.iter().any(|w| {
        let window_start = Utc.from_utc_datetime(&date.and_time(w.start));
        let window_end = Utc.from_utc_datetime(&date.and_time(w.end));
        start >= window_start && end <= window_end
    })
}

/// Walk each window in steps of `duration + buffer`, marking slots that
/// collide with an existing booking as unavailable.
pub fn generate_day_slots(
    day: &DaySchedule,
    date: NaiveDate,
    duration_minutes: i32,
    buffer_minutes: i32,
    busy: &[BusyInterval],
) -> Vec<Slot> {
    if !day.enabled {
        return Vec::new();
    }

    let step = Duration::minutes((duration_minutes + buffer_minutes) as i64);
    let duration = Duration::minutes(duration_minutes as i64);
    let mut slots = Vec::new();

    for window in &day.windows {
        let window_end = Utc.from_utc_datetime(&date.and_time(window.end));
        let mut cursor = Utc.from_utc_datetime(&date.and_time(window.start));

        while cursor + duration <= window_end {
            slots.push(Slot {
                start: cursor,
                end: cursor + duration,
                available: !has_conflict(cursor, duration_minutes, buffer_minutes, busy),
            });
            cursor += step;
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::consultationmodel::TimeWindow;
    use chrono::NaiveTime;

    fn day(windows: &[(&str, &str)]) -> DaySchedule {
        DaySchedule {
            enabled: true,
            windows: windows
                .iter()
                .map(|(s, e)| TimeWindow {
                    start: NaiveTime::parse_from_str(s, "%H:%M").unwrap(),
                    end: NaiveTime::parse_from_str(e, "%H:%M").unwrap(),
                })
                .collect(),
        }
    }

    fn at(date: NaiveDate, hhmm: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &date.and_time(NaiveTime::parse_from_str(hhmm, "%H:%M").unwrap()),
        )
    }

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn test_disabled_day_yields_no_slots() {
        let mut d = day(&[("09:00", "17:00")]);
        d.enabled = false;
        assert!(generate_day_slots(&d, test_date(), 30, 15, &[]).is_empty());
    }

    #[test]
    fn test_slots_step_by_duration_plus_buffer() {
        let d = day(&[("09:00", "11:00")]);
        let slots = generate_day_slots(&d, test_date(), 30, 15, &[]);
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![
                at(test_date(), "09:00"),
                at(test_date(), "09:45"),
                at(test_date(), "10:30"),
            ]
        );
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_slot_must_fit_inside_window() {
        // 10:30 + 30min exceeds a 10:45 close, so the last slot is 09:45.
        let d = day(&[("09:00", "10:45")]);
        let slots = generate_day_slots(&d, test_date(), 30, 15, &[]);
        assert_eq!(slots.last().unwrap().start, at(test_date(), "09:45"));
    }

    #[test]
    fn test_buffered_conflict_window() {
        // Existing confirmed slot 10:00-10:30, duration 30, buffer 15. A
        // 10:40 request pads to [10:25, 11:25) which still overlaps.
        let busy = BusyInterval {
            start: at(test_date(), "10:00"),
            duration_minutes: 30,
        };
        assert!(conflicts(at(test_date(), "10:40"), 30, 15, &busy));
        // 10:45 clears the buffer: [10:30, 11:30) vs [10:00, 10:30).
        assert!(!conflicts(at(test_date(), "10:45"), 30, 15, &busy));
        // Directly overlapping.
        assert!(conflicts(at(test_date(), "10:00"), 30, 15, &busy));
        // Ending into the leading buffer.
        assert!(conflicts(at(test_date(), "09:45"), 30, 15, &busy));
    }

    #[test]
    fn test_existing_booking_marks_slot_unavailable() {
        let d = day(&[("09:00", "12:00")]);
        let busy = [BusyInterval {
            start: at(test_date(), "09:45"),
            duration_minutes: 30,
        }];
        let slots = generate_day_slots(&d, test_date(), 30, 15, &busy);
        let by_start = |hhmm: &str| {
            slots
                .iter()
                .find(|s| s.start == at(test_date(), hhmm))
                .unwrap()
        };
        assert!(by_start("09:00").available); // [08:45, 09:45) just clears
        assert!(!by_start("09:45").available);
        assert!(by_start("10:30").available);
    }

    #[test]
    fn test_fits_schedule() {
        let d = day(&[("09:00", "12:00"), ("14:00", "17:00")]);
        assert!(fits_schedule(&d, test_date(), at(test_date(), "09:00"), 30));
        assert!(fits_schedule(&d, test_date(), at(test_date(), "16:30"), 30));
        // Ends past the window close.
        assert!(!fits_schedule(&d, test_date(), at(test_date(), "11:45"), 30));
        // Falls in the lunch gap.
        assert!(!fits_schedule(&d, test_date(), at(test_date(), "12:30"), 30));
    }

    #[test]
    fn test_previous_day_booking_masks_midnight_slot() {
        // Booking the evening before runs 23:45-00:15. With buffer 15 the
        // 00:00 slot pads to [23:45, 00:45) and must show unavailable; the
        // busy set therefore has to include bookings from beyond the
        // calendar-day boundary.
        let prev = test_date().pred_opt().unwrap();
        let d = day(&[("00:00", "02:00")]);
        let busy = [BusyInterval {
            start: at(prev, "23:45"),
            duration_minutes: 30,
        }];
        let slots = generate_day_slots(&d, test_date(), 30, 15, &busy);
        assert!(!slots[0].available);
        assert!(slots.iter().skip(1).all(|s| s.available));
    }

    #[test]
    fn test_no_overlap_among_generated_available_slots() {
        let d = day(&[("09:00", "17:00")]);
        let slots = generate_day_slots(&d, test_date(), 60, 10, &[]);
        for pair in slots.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }
}
