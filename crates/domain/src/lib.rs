mod date;
mod occurrence;
mod reminder;
mod shared;
mod time_of_day;

pub use date::{format_last_taken, local_offset};
pub use occurrence::{
    describe_next_dose, format_countdown, next_occurrence, occurrence_after_fire, time_until,
};
pub use reminder::{
    normalize_notes, parse_frequency_field, parse_time_field, Reminder, ReminderValidationError,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::recurrence::{Frequency, InvalidFrequencyError};
pub use time_of_day::{InvalidTimeOfDayError, TimeOfDay};
