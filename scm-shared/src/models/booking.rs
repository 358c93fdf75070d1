use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Human-readable booking identifier, e.g. `REQ-00001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl BookingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentType {
    Crane,
    #[serde(rename = "Foco Crane")]
    FocoCrane,
    Primemover,
    Picker,
}

impl EquipmentType {
    pub const ALL: [EquipmentType; 4] = [
        EquipmentType::Crane,
        EquipmentType::FocoCrane,
        EquipmentType::Primemover,
        EquipmentType::Picker,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentType::Crane => "Crane",
            EquipmentType::FocoCrane => "Foco Crane",
            EquipmentType::Primemover => "Primemover",
            EquipmentType::Picker => "Picker",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EquipmentType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EquipmentType::ALL
            .into_iter()
            .find(|unit| unit.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownEquipment(wanted.to_string()))
    }
}

/// Lifecycle of a transport job: Requested → On Progress / Pending → Close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Requested,
    #[serde(rename = "On Progress")]
    OnProgress,
    Pending,
    Close,
}

impl JobStatus {
    pub const LIFECYCLE: [JobStatus; 4] = [
        JobStatus::Requested,
        JobStatus::OnProgress,
        JobStatus::Pending,
        JobStatus::Close,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Requested => "Requested",
            JobStatus::OnProgress => "On Progress",
            JobStatus::Pending => "Pending",
            JobStatus::Close => "Close",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, JobStatus::Close)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for JobStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        JobStatus::LIFECYCLE
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownStatus(wanted.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: BookingId,
    pub unit: EquipmentType,
    pub details: String,
    pub date: NaiveDate,
    #[serde(with = "super::clock")]
    pub start_time: NaiveTime,
    #[serde(with = "super::clock")]
    pub end_time: NaiveTime,
    pub status: JobStatus,
    pub requested_at: DateTime<Utc>,
    pub wa_message_id: Option<String>,
}

impl BookingRequest {
    pub fn new(id: BookingId, draft: BookingDraft) -> Self {
        Self {
            id,
            unit: draft.unit,
            details: draft.details,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            status: JobStatus::Requested,
            requested_at: Utc::now(),
            wa_message_id: None,
        }
    }

    /// Replace the editable fields, keeping id, status and timestamps.
    pub fn apply_draft(&mut self, draft: BookingDraft) {
        self.unit = draft.unit;
        self.details = draft.details;
        self.date = draft.date;
        self.start_time = draft.start_time;
        self.end_time = draft.end_time;
    }

    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format(super::clock::FORMAT),
            self.end_time.format(super::clock::FORMAT)
        )
    }
}

/// Raw form submission. Every field is optional so that missing input is
/// reported as a validation error instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// A validated form: the editable part of a [`BookingRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub unit: EquipmentType,
    pub details: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookingRequest {
        BookingRequest::new(
            BookingId::from("REQ-00001"),
            BookingDraft {
                unit: EquipmentType::FocoCrane,
                details: "Lift generator set at Area A".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            },
        )
    }

    #[test]
    fn test_labels_parse_case_insensitively() {
        assert_eq!("foco crane".parse::<EquipmentType>().unwrap(), EquipmentType::FocoCrane);
        assert_eq!("ON PROGRESS".parse::<JobStatus>().unwrap(), JobStatus::OnProgress);
        assert_eq!(
            "Forklift".parse::<EquipmentType>(),
            Err(ModelError::UnknownEquipment("Forklift".to_string()))
        );
        assert!("Done".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_new_booking_starts_requested() {
        let booking = sample();
        assert_eq!(booking.status, JobStatus::Requested);
        assert_eq!(booking.time_range(), "08:00 - 12:00");
        assert!(booking.wa_message_id.is_none());
    }

    #[test]
    fn test_wire_format() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["id"], "REQ-00001");
        assert_eq!(value["unit"], "Foco Crane");
        assert_eq!(value["status"], "Requested");
        assert_eq!(value["date"], "2024-05-20");
        assert_eq!(value["start_time"], "08:00");
        assert_eq!(value["end_time"], "12:00");

        let back: BookingRequest = serde_json::from_value(value).unwrap();
        assert_eq!(back, sample_with_stamp(back.requested_at));
    }

    fn sample_with_stamp(stamp: DateTime<Utc>) -> BookingRequest {
        let mut booking = sample();
        booking.requested_at = stamp;
        booking
    }
}
