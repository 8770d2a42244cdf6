// libs/scheduling-cell/src/services/slots.rs
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

// ==============================================================================
// CLOCK
// ==============================================================================

/// Wall-clock seam. Slot math is a pure function of `now`, so tests pin time
/// with `FixedClock` while production reads the salon's local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Local salon time. The walk-in window and the past-slot cutoff follow the
/// clock on the wall, not UTC.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Pinned point in time for tests.
pub struct FixedClock {
    at: NaiveDateTime,
}

impl FixedClock {
    pub fn at(at: NaiveDateTime) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.at
    }
}

// ==============================================================================
// SLOT GRID
// ==============================================================================

const OPENING_MINUTES: u32 = 9 * 60;

pub const SLOT_INTERVAL_MINUTES: u32 = 30;
pub const SLOTS_PER_DAY: usize = 18;

/// The bookable slot times for any working day, 09:00 through 17:30.
pub fn slot_times() -> Vec<NaiveTime> {
    (0..SLOTS_PER_DAY)
        .filter_map(|index| {
            let minutes = OPENING_MINUTES + index as u32 * SLOT_INTERVAL_MINUTES;
            NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        })
        .collect()
}

/// Whether `time` lands exactly on the slot grid.
pub fn is_slot_time(time: NaiveTime) -> bool {
    slot_times().contains(&time)
}

/// Bookings are taken for today and tomorrow only, and never for a Sunday.
pub fn in_booking_window(date: NaiveDate, today: NaiveDate) -> bool {
    if date.weekday() == Weekday::Sun {
        return false;
    }
    date == today || Some(date) == today.succ_opt()
}

/// On the current day a slot closes the moment its start time passes.
pub fn is_past_slot(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> bool {
    date == now.date() && time <= now.time()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn grid_runs_nine_to_half_five() {
        let times = slot_times();
        assert_eq!(times.len(), SLOTS_PER_DAY);
        assert_eq!(times[0], time(9, 0));
        assert_eq!(times[times.len() - 1], time(17, 30));
        // Every step is exactly half an hour.
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::minutes(30));
        }
    }

    #[test]
    fn off_grid_times_are_rejected() {
        assert!(is_slot_time(time(9, 0)));
        assert!(is_slot_time(time(17, 30)));
        assert!(!is_slot_time(time(9, 15)));
        assert!(!is_slot_time(time(8, 30)));
        assert!(!is_slot_time(time(18, 0)));
    }

    #[test]
    fn window_covers_today_and_tomorrow_only() {
        // 2024-06-03 is a Monday.
        let today = date(2024, 6, 3);
        assert!(in_booking_window(today, today));
        assert!(in_booking_window(date(2024, 6, 4), today));
        assert!(!in_booking_window(date(2024, 6, 5), today));
        assert!(!in_booking_window(date(2024, 6, 2), today));
    }

    #[test]
    fn sundays_are_never_bookable() {
        // 2024-06-01 is a Saturday, so "tomorrow" falls on a Sunday.
        let saturday = date(2024, 6, 1);
        let sunday = date(2024, 6, 2);
        assert!(in_booking_window(saturday, saturday));
        assert!(!in_booking_window(sunday, saturday));
        // Even when the queried date itself is today.
        assert!(!in_booking_window(sunday, sunday));
    }

    #[test]
    fn slot_is_past_once_start_time_passes() {
        let today = date(2024, 6, 3);
        let now = today.and_hms_opt(15, 5, 0).unwrap();

        assert!(is_past_slot(today, time(15, 0), now));
        assert!(is_past_slot(today, time(9, 0), now));
        assert!(!is_past_slot(today, time(15, 30), now));
        // Tomorrow's slots never count as past.
        assert!(!is_past_slot(date(2024, 6, 4), time(9, 0), now));
    }

    #[test]
    fn slot_closes_exactly_at_start() {
        let today = date(2024, 6, 3);
        let now = today.and_hms_opt(15, 0, 0).unwrap();
        assert!(is_past_slot(today, time(15, 0), now));
    }
}
