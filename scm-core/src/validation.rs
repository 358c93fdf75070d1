use chrono::NaiveDate;
use scm_shared::models::clock;
use scm_shared::{BookingDraft, BookingForm, EquipmentType};

use crate::{CoreError, CoreResult};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Turn a raw form into a draft, rejecting it before anything is written.
pub fn validate_form(form: &BookingForm) -> CoreResult<BookingDraft> {
    let fields = [
        ("unit", present(&form.unit)),
        ("details", present(&form.details)),
        ("date", present(&form.date)),
        ("start_time", present(&form.start_time)),
        ("end_time", present(&form.end_time)),
    ];
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::ValidationError(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let unit: EquipmentType = present(&form.unit).unwrap_or_default().parse()?;
    let details = present(&form.details).unwrap_or_default().to_string();

    let raw_date = present(&form.date).unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
        .map_err(|_| CoreError::ValidationError(format!("Invalid date: {}", raw_date)))?;

    let raw_start = present(&form.start_time).unwrap_or_default();
    let start_time = clock::parse(raw_start)
        .ok_or_else(|| CoreError::ValidationError(format!("Invalid start time: {}", raw_start)))?;

    let raw_end = present(&form.end_time).unwrap_or_default();
    let end_time = clock::parse(raw_end)
        .ok_or_else(|| CoreError::ValidationError(format!("Invalid end time: {}", raw_end)))?;

    if end_time <= start_time {
        return Err(CoreError::ValidationError(
            "End time must be after start time".to_string(),
        ));
    }

    Ok(BookingDraft {
        unit,
        details,
        date,
        start_time,
        end_time,
    })
}
