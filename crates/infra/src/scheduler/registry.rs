use chrono::NaiveDateTime;
use medremind_domain::ID;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// Issued by the registry every time an alarm is set. A firing task only acts
/// while its generation is the one registered for its reminder.
pub type Generation = u64;

/// Snapshot of a live alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedAlarm {
    pub reminder_id: ID,
    pub occurrence: NaiveDateTime,
    pub generation: Generation,
}

/// The task that will fire an alarm, together with what it fires for
#[derive(Debug)]
pub struct AlarmHandle {
    alarm: ArmedAlarm,
    task: JoinHandle<()>,
}

impl AlarmHandle {
    pub fn new(alarm: ArmedAlarm, task: JoinHandle<()>) -> Self {
        Self { alarm, task }
    }

    pub fn alarm(&self) -> ArmedAlarm {
        self.alarm
    }

    fn cancel(self) {
        self.task.abort();
    }
}

#[derive(Debug)]
enum Slot {
    Armed(AlarmHandle),
    /// The task of this generation is delivering right now
    Fired(Generation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// The firing task had already been replaced or cleared
    Stale,
    Rearmed(ArmedAlarm),
    Completed,
    /// The reminder was armed or cleared while it was being delivered
    Superseded,
}

#[derive(Debug, Default)]
struct State {
    slots: HashMap<ID, Slot>,
    last_generation: Generation,
}

impl State {
    fn next_generation(&mut self) -> Generation {
        self.last_generation += 1;
        self.last_generation
    }

    fn build<F>(&mut self, reminder_id: ID, build: F) -> ArmedAlarm
    where
        F: FnOnce(Generation) -> AlarmHandle,
    {
        let handle = build(self.next_generation());
        let alarm = handle.alarm();
        if let Some(Slot::Armed(previous)) = self.slots.insert(reminder_id, Slot::Armed(handle)) {
            previous.cancel();
        }
        alarm
    }
}

/// At most one live alarm per reminder
#[derive(Debug, Default)]
pub struct AlarmRegistry {
    state: Mutex<State>,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces whatever is registered for `reminder_id` with the handle `build`
    /// returns for a fresh generation. The previous handle is cancelled.
    /// `build` runs under the registry lock, so a task it spawns can not fire
    /// before it is registered.
    pub fn set<F>(&self, reminder_id: ID, build: F) -> ArmedAlarm
    where
        F: FnOnce(Generation) -> AlarmHandle,
    {
        self.lock().build(reminder_id, build)
    }

    /// Cancels and forgets the alarm of `reminder_id`. Returns true when a
    /// pending alarm was cancelled.
    pub fn clear(&self, reminder_id: &ID) -> bool {
        match self.lock().slots.remove(reminder_id) {
            Some(Slot::Armed(handle)) => {
                handle.cancel();
                true
            }
            Some(Slot::Fired(_)) | None => false,
        }
    }

    /// Cancels every alarm and returns how many were pending
    pub fn clear_all(&self) -> usize {
        let mut state = self.lock();
        let mut cancelled = 0;
        for (_, slot) in state.slots.drain() {
            if let Slot::Armed(handle) = slot {
                handle.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    pub fn get(&self, reminder_id: &ID) -> Option<ArmedAlarm> {
        match self.lock().slots.get(reminder_id) {
            Some(Slot::Armed(handle)) => Some(handle.alarm()),
            _ => None,
        }
    }

    /// Number of pending alarms
    pub fn len(&self) -> usize {
        self.lock()
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Armed(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks the alarm of `generation` as firing. Returns false when that
    /// generation is no longer the registered one.
    pub fn begin_fire(&self, reminder_id: &ID, generation: Generation) -> bool {
        let mut state = self.lock();
        match state.slots.get(reminder_id) {
            Some(Slot::Armed(handle)) if handle.alarm().generation == generation => {
                // The firing task is the one holding this handle, so it is dropped, not aborted
                state.slots.insert(*reminder_id, Slot::Fired(generation));
                true
            }
            _ => false,
        }
    }

    /// Ends a fire started with `begin_fire`, setting the next alarm from
    /// `rearm` if given. Nothing is set when the reminder was armed or cleared
    /// since the fire began.
    pub fn finish_fire<F>(
        &self,
        reminder_id: &ID,
        generation: Generation,
        rearm: Option<F>,
    ) -> FireOutcome
    where
        F: FnOnce(Generation) -> AlarmHandle,
    {
        let mut state = self.lock();
        match state.slots.get(reminder_id) {
            Some(Slot::Fired(fired)) if *fired == generation => {}
            _ => return FireOutcome::Superseded,
        }
        state.slots.remove(reminder_id);
        match rearm {
            Some(build) => FireOutcome::Rearmed(state.build(*reminder_id, build)),
            None => FireOutcome::Completed,
        }
    }
}

impl Drop for AlarmRegistry {
    fn drop(&mut self) {
        self.clear_all();
    }
}
