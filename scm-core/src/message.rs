//! Text of group announcements and bot replies.

use scm_shared::{BookingId, BookingRequest, JobStatus};

use crate::command::Directive;

pub const COMMAND_HINT: &str = "Reply /CLOSE [ID], /PENDING [ID] or /CANCEL [ID].";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    NewBooking,
    Updated,
}

impl Announcement {
    fn header(&self) -> &'static str {
        match self {
            Announcement::NewBooking => "*[NEW BOOKING]*",
            Announcement::Updated => "*[UPDATED]*",
        }
    }
}

pub fn announcement(kind: Announcement, booking: &BookingRequest) -> String {
    format!(
        "{}\nID: {}\nUnit: {}\nJob: {}\nTime: {}\nDate: {}\n\n{}",
        kind.header(),
        booking.id,
        booking.unit,
        booking.details,
        booking.time_range(),
        booking.date.format("%Y-%m-%d"),
        COMMAND_HINT,
    )
}

pub fn status_changed(id: &BookingId, status: JobStatus) -> String {
    let emoji = match status {
        JobStatus::Close => "✅",
        JobStatus::Pending => "⏳",
        JobStatus::OnProgress => "🚚",
        JobStatus::Requested => "📝",
    };
    format!("{} Status of request {} changed to {}.", emoji, id, status.label().to_uppercase())
}

pub fn deleted(id: &BookingId) -> String {
    format!("🗑️ Request {} has been DELETED from the list.", id)
}

/// Bot reply after a chat directive was carried out.
pub fn confirmation(directive: Directive, id: &BookingId) -> String {
    match directive.target_status() {
        Some(status) => status_changed(id, status),
        None => deleted(id),
    }
}

pub fn not_found(target: &str) -> String {
    format!("❌ Failed: Request ID \"{}\" was not found.", target)
}

pub fn closed_cannot_delete(id: &BookingId) -> String {
    format!("❌ Failed: Request {} is already closed and cannot be deleted.", id)
}

pub fn usage(directive: Directive) -> String {
    format!(
        "❌ Use the format: {} [REQ-ID]\nExample: {} REQ-00001",
        directive.token(),
        directive.token()
    )
}

pub fn help() -> String {
    let commands: Vec<String> = [Directive::Close, Directive::Pending, Directive::Cancel]
        .iter()
        .map(|d| format!("{} [ID]", d.token()))
        .collect();
    format!("🤖 Unknown command. Use:\n{}", commands.join("\n"))
}

pub fn connection_test() -> String {
    "🔔 Test message from SCM Heavy Transport dispatch.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use scm_shared::{BookingDraft, EquipmentType};

    #[test]
    fn test_new_booking_announcement() {
        let booking = BookingRequest::new(
            BookingId::from("REQ-00007"),
            BookingDraft {
                unit: EquipmentType::Crane,
                details: "Lift transformer".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            },
        );

        let text = announcement(Announcement::NewBooking, &booking);
        assert!(text.starts_with("*[NEW BOOKING]*\nID: REQ-00007\n"));
        assert!(text.contains("Unit: Crane"));
        assert!(text.contains("Time: 08:00 - 12:00"));
        assert!(text.contains("Date: 2024-05-20"));
        assert!(text.ends_with(COMMAND_HINT));

        assert!(announcement(Announcement::Updated, &booking).starts_with("*[UPDATED]*"));
    }

    #[test]
    fn test_bot_replies() {
        let id = BookingId::from("REQ-00001");
        assert_eq!(
            confirmation(Directive::Close, &id),
            "✅ Status of request REQ-00001 changed to CLOSE."
        );
        assert!(confirmation(Directive::Cancel, &id).contains("DELETED"));
        assert!(usage(Directive::Pending).contains("/PENDING [REQ-ID]"));
        assert!(help().contains("/CLOSE [ID]\n/PENDING [ID]\n/CANCEL [ID]"));
        assert!(not_found("REQ-9").contains("\"REQ-9\""));
    }
}
