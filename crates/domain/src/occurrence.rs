use crate::{shared::recurrence::Frequency, time_of_day::TimeOfDay};
use chrono::{Duration, NaiveDateTime};

/// Computes the next instant strictly after `now` at which a reminder with
/// the given time of day and frequency should fire.
///
/// Returns `None` only for `Frequency::Once` when today's time has already
/// passed: a one time reminder never rolls over to the following day.
pub fn next_occurrence(
    time: TimeOfDay,
    frequency: Frequency,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let today = now.date();
    let at_today = time.on(today);

    match frequency {
        Frequency::Once => Some(at_today).filter(|at| *at > now),
        Frequency::Daily | Frequency::Custom => {
            if at_today > now {
                Some(at_today)
            } else {
                today.succ_opt().map(|tomorrow| time.on(tomorrow))
            }
        }
        Frequency::TwiceDaily => [at_today, time.complement().on(today)]
            .iter()
            .copied()
            .filter(|at| *at > now)
            .min()
            .or_else(|| today.succ_opt().map(|tomorrow| time.on(tomorrow))),
    }
}

/// The occurrence that follows one that just fired, or `None` when the
/// frequency does not re-arm by itself.
///
/// Twice daily reminders continue from the complement of the slot that fired,
/// so the chain alternates between both halves of the day. The reference is
/// never earlier than `fired`, so a clock reading slightly early can not land
/// on the same slot again.
pub fn occurrence_after_fire(
    time: TimeOfDay,
    frequency: Frequency,
    fired: NaiveDateTime,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if !frequency.rearms_after_fire() {
        return None;
    }
    let slot = match frequency {
        Frequency::TwiceDaily => TimeOfDay::at(fired).complement(),
        _ => time,
    };
    next_occurrence(slot, frequency, now.max(fired))
}

/// Time left until `occurrence`, never negative
pub fn time_until(occurrence: NaiveDateTime, now: NaiveDateTime) -> Duration {
    let left = occurrence - now;
    if left > Duration::zero() {
        left
    } else {
        Duration::zero()
    }
}

/// Renders a countdown as `Due now`, `1h 30m` or `45m`. Seconds are dropped.
pub fn format_countdown(left: Duration) -> String {
    if left <= Duration::zero() {
        return "Due now".into();
    }
    let minutes = left.num_minutes();
    let hours = minutes / 60;
    let minutes = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// The list row caption for the next dose
pub fn describe_next_dose(left: Duration) -> String {
    if left <= Duration::zero() {
        "Due now".into()
    } else {
        format!("Next dose in {}", format_countdown(left))
    }
}
