//! Dashboard counts and the 24-hour timeline of one day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use scm_shared::{BookingRequest, JobStatus};
use serde::Serialize;

const MINUTES_PER_DAY: f64 = 1440.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: JobStatus,
    pub count: usize,
}

/// Count per status, in lifecycle order, including zeros.
pub fn status_summary(bookings: &[BookingRequest]) -> Vec<StatusCount> {
    JobStatus::LIFECYCLE
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: bookings.iter().filter(|b| b.status == status).count(),
        })
        .collect()
}

/// Position of a time of day on a 0–100 scale.
pub fn time_to_percent(time: NaiveTime) -> f64 {
    let minutes = time.hour() * 60 + time.minute();
    f64::from(minutes) / MINUTES_PER_DAY * 100.0
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub booking: BookingRequest,
    pub start_pct: f64,
    pub end_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub entries: Vec<ScheduleEntry>,
    /// Current-time marker, only when `date` is today.
    pub now_pct: Option<f64>,
}

pub fn day_schedule(bookings: &[BookingRequest], date: NaiveDate, now: NaiveDateTime) -> DaySchedule {
    let mut entries: Vec<ScheduleEntry> = bookings
        .iter()
        .filter(|b| b.date == date)
        .map(|b| ScheduleEntry {
            booking: b.clone(),
            start_pct: time_to_percent(b.start_time),
            end_pct: time_to_percent(b.end_time),
        })
        .collect();
    entries.sort_by(|a, b| {
        a.booking
            .start_time
            .cmp(&b.booking.start_time)
            .then_with(|| a.booking.id.cmp(&b.booking.id))
    });

    let now_pct = (now.date() == date).then(|| time_to_percent(now.time()));

    DaySchedule {
        date,
        entries,
        now_pct,
    }
}
