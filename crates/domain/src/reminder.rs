use crate::{
    shared::{entity::Entity, recurrence::Frequency},
    time_of_day::TimeOfDay,
    ID,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A `Reminder` represents a medication the user should take at a nominal
/// time of day, repeated according to its `Frequency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ID,
    /// Display name of the medication
    pub name: String,
    /// Free text dosage, e.g. "2 pills" or "5ml"
    pub dosage: String,
    pub time: TimeOfDay,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub last_taken: Option<DateTime<Utc>>,
}

#[derive(Error, Debug, PartialEq)]
pub enum ReminderValidationError {
    #[error("Medication name is required")]
    MissingName,
    #[error("Dosage is required")]
    MissingDosage,
    #[error("Time is required")]
    MissingTime,
    #[error("Invalid time: {0}")]
    InvalidTime(String),
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),
}

/// Parses the raw time field of a reminder form
pub fn parse_time_field(raw: &str) -> Result<TimeOfDay, ReminderValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ReminderValidationError::MissingTime);
    }
    raw.parse::<TimeOfDay>()
        .map_err(|e| ReminderValidationError::InvalidTime(e.to_string()))
}

pub fn parse_frequency_field(raw: Option<&str>) -> Result<Frequency, ReminderValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Frequency::default()),
        Some(raw) => raw
            .parse::<Frequency>()
            .map_err(|e| ReminderValidationError::InvalidFrequency(e.to_string())),
    }
}

/// Trims optional free text and treats blank input as absent
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let notes = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_notes(notes.as_deref()))
}

impl Reminder {
    pub fn new(
        name: &str,
        dosage: &str,
        time: TimeOfDay,
        frequency: Frequency,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ReminderValidationError> {
        let reminder = Self {
            id: ID::from_timestamp(now.timestamp_millis()),
            name: name.trim().to_string(),
            dosage: dosage.trim().to_string(),
            time,
            frequency,
            notes: normalize_notes(notes),
            created: now,
            last_taken: None,
        };
        reminder.validate()?;
        Ok(reminder)
    }

    /// Checks the invariants every persisted reminder must hold
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.name.trim().is_empty() {
            return Err(ReminderValidationError::MissingName);
        }
        if self.dosage.trim().is_empty() {
            return Err(ReminderValidationError::MissingDosage);
        }
        Ok(())
    }

    pub fn mark_taken(&mut self, at: DateTime<Utc>) {
        self.last_taken = Some(at);
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}
