use chrono::{DateTime, NaiveDateTime, Utc};
use medremind_domain::{
    describe_next_dose, format_last_taken, local_offset, next_occurrence, time_until, Frequency,
    Reminder, TimeOfDay, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDTO {
    pub id: ID,
    pub name: String,
    pub dosage: String,
    pub time: TimeOfDay,
    pub frequency: Frequency,
    pub notes: Option<String>,
    pub created: DateTime<Utc>,
    pub last_taken: Option<DateTime<Utc>>,
}

impl ReminderDTO {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            id: reminder.id,
            name: reminder.name,
            dosage: reminder.dosage,
            time: reminder.time,
            frequency: reminder.frequency,
            notes: reminder.notes,
            created: reminder.created,
            last_taken: reminder.last_taken,
        }
    }
}

/// A reminder as shown in the reminders list, rendered against the clock
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRowDTO {
    pub reminder: ReminderDTO,
    /// e.g. `8:00 AM`
    pub time_display: String,
    pub frequency_label: String,
    pub next_dose: Option<NaiveDateTime>,
    /// e.g. `Next dose in 1h 30m`
    pub countdown: String,
    pub last_taken_display: Option<String>,
}

pub const NO_UPCOMING_DOSE: &str = "No upcoming dose";

impl ReminderRowDTO {
    pub fn new(reminder: Reminder, local_now: NaiveDateTime, utc_now: DateTime<Utc>) -> Self {
        let next_dose = next_occurrence(reminder.time, reminder.frequency, local_now);
        let countdown = match next_dose {
            Some(next) => describe_next_dose(time_until(next, local_now)),
            None => NO_UPCOMING_DOSE.to_string(),
        };
        let offset = local_offset(local_now, utc_now);
        let last_taken_display = reminder.last_taken.map(|taken| {
            format_last_taken(
                &taken.with_timezone(&offset),
                &utc_now.with_timezone(&offset),
            )
        });

        Self {
            time_display: reminder.time.to_12_hour_string(),
            frequency_label: reminder.frequency.label().to_string(),
            next_dose,
            countdown,
            last_taken_display,
            reminder: ReminderDTO::new(reminder),
        }
    }
}
