use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::booking::BookingId;

pub const OPERATOR_CHAT: &str = "USER-CHAT";
pub const ERROR: &str = "ERROR";
pub const HELP: &str = "HELP";
pub const SYSTEM: &str = "SYSTEM";

/// What a notification is about: a booking, or one of the chat sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Correlation {
    Booking(BookingId),
    OperatorChat,
    Error,
    Help,
    System,
}

impl Correlation {
    pub fn booking_id(&self) -> Option<&BookingId> {
        match self {
            Correlation::Booking(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correlation::Booking(id) => f.write_str(id.as_str()),
            Correlation::OperatorChat => f.write_str(OPERATOR_CHAT),
            Correlation::Error => f.write_str(ERROR),
            Correlation::Help => f.write_str(HELP),
            Correlation::System => f.write_str(SYSTEM),
        }
    }
}

impl From<String> for Correlation {
    fn from(value: String) -> Self {
        match value.as_str() {
            OPERATOR_CHAT => Correlation::OperatorChat,
            ERROR => Correlation::Error,
            HELP => Correlation::Help,
            SYSTEM => Correlation::System,
            _ => Correlation::Booking(BookingId(value)),
        }
    }
}

impl From<Correlation> for String {
    fn from(value: Correlation) -> Self {
        value.to_string()
    }
}

/// A line in the operations group chat, human-entered or system-generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub request_id: Correlation,
    pub sender: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_system: bool,
}

impl Notification {
    pub fn system(id: String, request_id: Correlation, sender: &str, content: String) -> Self {
        Self {
            id,
            request_id,
            sender: sender.to_string(),
            content,
            timestamp: Utc::now(),
            is_system: true,
        }
    }

    pub fn operator(content: String) -> Self {
        Self {
            id: new_notification_id("USR"),
            request_id: Correlation::OperatorChat,
            sender: "Operator".to_string(),
            content,
            timestamp: Utc::now(),
            is_system: false,
        }
    }
}

/// `WA-…` for announcements, `SYS-…` for bot replies, `USR-…` for operator lines.
pub fn new_notification_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}", prefix, &raw[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_sentinels() {
        assert_eq!(Correlation::from("USER-CHAT".to_string()), Correlation::OperatorChat);
        assert_eq!(Correlation::from("HELP".to_string()), Correlation::Help);
        assert_eq!(
            Correlation::from("REQ-00004".to_string()),
            Correlation::Booking(BookingId::from("REQ-00004"))
        );
        assert_eq!(Correlation::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_operator_line_is_not_system() {
        let line = Notification::operator("morning all".to_string());
        assert!(!line.is_system);
        assert_eq!(line.request_id, Correlation::OperatorChat);
        assert!(line.id.starts_with("USR-"));

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["request_id"], "USER-CHAT");
    }
}
