mod recurrence;
mod registry;

pub use recurrence::RecurrenceScheduler;
pub use registry::{AlarmHandle, AlarmRegistry, ArmedAlarm, FireOutcome, Generation};
