use super::registry::{AlarmHandle, AlarmRegistry, ArmedAlarm, FireOutcome, Generation};
use crate::services::{deliver, DeliverySink, Notification};
use crate::system::ISys;
use chrono::NaiveDateTime;
use medremind_domain::{next_occurrence, occurrence_after_fire, time_until, Reminder, ID};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Postponed {
    generation: Generation,
    task: JoinHandle<()>,
}

struct Inner {
    registry: AlarmRegistry,
    postponed: Mutex<HashMap<ID, Postponed>>,
    last_postpone: Mutex<Generation>,
    sink: Arc<dyn DeliverySink>,
    sys: Arc<dyn ISys>,
}

impl Inner {
    fn postponed(&self) -> MutexGuard<'_, HashMap<ID, Postponed>> {
        self.postponed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, postponed) in self.postponed().drain() {
            postponed.task.abort();
        }
    }
}

/// Keeps one alarm armed per reminder and re-arms recurring reminders every
/// time they fire. Alarms are tokio tasks, so this has to be used from within
/// a tokio runtime. Dropping the last clone cancels every alarm.
#[derive(Clone)]
pub struct RecurrenceScheduler {
    inner: Arc<Inner>,
}

impl RecurrenceScheduler {
    pub fn new(sink: Arc<dyn DeliverySink>, sys: Arc<dyn ISys>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: AlarmRegistry::new(),
                postponed: Mutex::new(HashMap::new()),
                last_postpone: Mutex::new(0),
                sink,
                sys,
            }),
        }
    }

    /// Arms the next occurrence of `reminder` after `now`, replacing any alarm
    /// it already had. A reminder without a next occurrence ends up unarmed.
    pub fn arm(&self, reminder: &Reminder, now: NaiveDateTime) -> Option<ArmedAlarm> {
        match next_occurrence(reminder.time, reminder.frequency, now) {
            Some(occurrence) => {
                let delay = to_std(time_until(occurrence, now));
                let alarm = self
                    .inner
                    .registry
                    .set(reminder.id, self.alarm_builder(reminder.clone(), occurrence, delay));
                info!(
                    "Armed reminder {} ({}) for {}",
                    reminder.id, reminder.name, occurrence
                );
                Some(alarm)
            }
            None => {
                self.inner.registry.clear(&reminder.id);
                debug!(
                    "Reminder {} ({}) has no upcoming occurrence",
                    reminder.id, reminder.name
                );
                None
            }
        }
    }

    /// Cancels the alarm and any postponed delivery of the reminder.
    /// Returns true when anything was pending.
    pub fn disarm(&self, reminder_id: &ID) -> bool {
        let alarm = self.inner.registry.clear(reminder_id);
        let postponed = self.cancel_postponed(reminder_id);
        if alarm || postponed {
            debug!("Disarmed reminder {}", reminder_id);
        }
        alarm || postponed
    }

    /// Cancels everything that is pending and returns the number of alarms cancelled
    pub fn disarm_all(&self) -> usize {
        for (_, postponed) in self.inner.postponed().drain() {
            postponed.task.abort();
        }
        self.inner.registry.clear_all()
    }

    /// Delivers `reminder` once more after `delay`, outside its recurrence.
    /// A newer postpone of the same reminder replaces this one.
    pub fn postpone(&self, reminder: &Reminder, delay: Duration) {
        let mut postponed = self.inner.postponed();
        let generation = {
            let mut last = self
                .inner
                .last_postpone
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            *last += 1;
            *last
        };

        let weak = Arc::downgrade(&self.inner);
        let reminder = reminder.clone();
        let reminder_id = reminder.id;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                let current = {
                    let mut postponed = inner.postponed();
                    match postponed.get(&reminder.id) {
                        Some(p) if p.generation == generation => {
                            postponed.remove(&reminder.id);
                            true
                        }
                        _ => false,
                    }
                };
                if current {
                    info!("Delivering postponed reminder {}", reminder.id);
                    deliver(inner.sink.as_ref(), &Notification::for_reminder(&reminder));
                }
            }
        });
        if let Some(previous) = postponed.insert(reminder_id, Postponed { generation, task }) {
            previous.task.abort();
        }
        info!("Postponed reminder {} by {:?}", reminder_id, delay);
    }

    /// Cancels a pending postponed delivery, leaving the recurrence alone
    pub fn cancel_postponed(&self, reminder_id: &ID) -> bool {
        match self.inner.postponed().remove(reminder_id) {
            Some(postponed) => {
                postponed.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn armed(&self, reminder_id: &ID) -> Option<ArmedAlarm> {
        self.inner.registry.get(reminder_id)
    }

    pub fn armed_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_postponed(&self, reminder_id: &ID) -> bool {
        self.inner.postponed().contains_key(reminder_id)
    }

    fn alarm_builder(
        &self,
        reminder: Reminder,
        occurrence: NaiveDateTime,
        delay: Duration,
    ) -> impl FnOnce(Generation) -> AlarmHandle {
        let weak = Arc::downgrade(&self.inner);
        move |generation| {
            let alarm = ArmedAlarm {
                reminder_id: reminder.id,
                occurrence,
                generation,
            };
            let task = tokio::spawn(run_alarm(weak, reminder, alarm, delay));
            AlarmHandle::new(alarm, task)
        }
    }

    fn fire(&self, reminder: &Reminder, alarm: ArmedAlarm) -> FireOutcome {
        if !self
            .inner
            .registry
            .begin_fire(&reminder.id, alarm.generation)
        {
            debug!("Dropping stale alarm of reminder {}", reminder.id);
            return FireOutcome::Stale;
        }

        info!(
            "Reminder {} ({}) is due at {}",
            reminder.id, reminder.name, alarm.occurrence
        );
        let delivered = deliver(
            self.inner.sink.as_ref(),
            &Notification::for_reminder(reminder),
        );
        debug!("Delivery of reminder {} ended as {:?}", reminder.id, delivered);

        let now = self.inner.sys.local_now();
        let rearm = occurrence_after_fire(reminder.time, reminder.frequency, alarm.occurrence, now)
            .map(|next| {
                let delay = to_std(time_until(next, now));
                self.alarm_builder(reminder.clone(), next, delay)
            });
        let outcome = self
            .inner
            .registry
            .finish_fire(&reminder.id, alarm.generation, rearm);
        match outcome {
            FireOutcome::Rearmed(next) => {
                info!("Re-armed reminder {} for {}", reminder.id, next.occurrence)
            }
            FireOutcome::Completed => debug!("Reminder {} will not fire again", reminder.id),
            FireOutcome::Superseded => {
                debug!("Reminder {} changed while it was firing", reminder.id)
            }
            FireOutcome::Stale => {}
        }
        outcome
    }
}

async fn run_alarm(inner: Weak<Inner>, reminder: Reminder, alarm: ArmedAlarm, delay: Duration) {
    tokio::time::sleep(delay).await;
    match inner.upgrade() {
        Some(inner) => {
            RecurrenceScheduler { inner }.fire(&reminder, alarm);
        }
        None => warn!(
            "Alarm of reminder {} fired after its scheduler was dropped",
            reminder.id
        ),
    }
}

fn to_std(duration: chrono::Duration) -> Duration {
    duration.to_std().unwrap_or(Duration::ZERO)
}
