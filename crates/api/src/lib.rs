mod error;
mod job_schedulers;
mod reminder;
mod shared;

pub use error::MedRemindError;
pub use job_schedulers::{get_start_delay, start_countdown_refresh_job};
pub use reminder::*;
pub use shared::usecase::{execute, Subscriber, UseCase};

use medremind_api_structs::dtos::ReminderDTO;
use medremind_api_structs::{get_reminders, mark_taken, postpone_reminder};
use medremind_infra::{MedRemindContext, UserAction, UserActionKind};
use tokio::task::JoinHandle;
use tracing::info;

pub struct Application {
    context: MedRemindContext,
}

impl Application {
    /// Arms every reminder already in the store
    pub async fn new(context: MedRemindContext) -> Self {
        match execute(ArmRemindersUseCase {}, &context).await {
            Ok(armed) => info!("Application started with {} armed reminders", armed),
            Err(e) => match e {},
        }
        Self { context }
    }

    pub fn context(&self) -> &MedRemindContext {
        &self.context
    }

    /// Must be called from within a `LocalSet`
    pub fn start_job_schedulers<F>(&self, on_refresh: F) -> JoinHandle<()>
    where
        F: Fn(get_reminders::APIResponse) + 'static,
    {
        start_countdown_refresh_job(self.context.clone(), on_refresh)
    }

    /// Reacts to the user answering a delivered reminder
    pub async fn handle_action(&self, action: UserAction) -> Result<ReminderDTO, MedRemindError> {
        handle_user_action(action, &self.context).await
    }

    /// Handles the actions the user clicks on delivered notifications and
    /// reports each outcome to `on_handled`. Must be called from within a
    /// `LocalSet`. `None` when the actions are already being listened to.
    pub fn listen_for_actions<F>(&self, on_handled: F) -> Option<JoinHandle<()>>
    where
        F: Fn(UserAction, Result<ReminderDTO, MedRemindError>) + 'static,
    {
        let mut actions = self.context.sink.take_actions()?;
        let ctx = self.context.clone();
        Some(tokio::task::spawn_local(async move {
            while let Some(action) = actions.recv().await {
                on_handled(action, handle_user_action(action, &ctx).await);
            }
        }))
    }

    /// Cancels every pending alarm
    pub fn stop(&self) {
        let cancelled = self.context.scheduler.disarm_all();
        info!("Stopped, cancelled {} alarms", cancelled);
    }
}

/// Changes other processes made to the store are armed first, as writing the
/// answer reads them in as well
async fn handle_user_action(
    action: UserAction,
    ctx: &MedRemindContext,
) -> Result<ReminderDTO, MedRemindError> {
    info!("Handling {:?} for reminder {}", action.kind, action.reminder_id);
    let _ = execute(SyncRemindersUseCase {}, ctx).await;
    match action.kind {
        UserActionKind::Acknowledge => {
            let path = mark_taken::PathParams {
                reminder_id: action.reminder_id,
            };
            mark_taken_controller(path, ctx).await.map(|res| res.reminder)
        }
        UserActionKind::Postpone => {
            let path = postpone_reminder::PathParams {
                reminder_id: action.reminder_id,
            };
            postpone_reminder_controller(path, ctx)
                .await
                .map(|res| res.reminder)
        }
    }
}


#[cfg(test)]
mod test_helpers {
    use crate::shared::usecase::execute;
    use crate::CreateReminderUseCase;
    use chrono::{NaiveDate, NaiveDateTime};
    use medremind_domain::Reminder;
    use medremind_infra::{DeliveryChannel, FakeSys, MedRemindContext, RecordingSink};
    use std::sync::Arc;

    pub fn local(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    pub fn setup(now: NaiveDateTime) -> (MedRemindContext, Arc<FakeSys>, Arc<RecordingSink>) {
        let sys = Arc::new(FakeSys::new(now));
        let sink = Arc::new(RecordingSink::new(DeliveryChannel::Granted));
        let ctx = MedRemindContext::create_inmemory_with(sys.clone(), sink.clone());
        (ctx, sys, sink)
    }

    pub async fn create_reminder(
        ctx: &MedRemindContext,
        name: &str,
        time: &str,
        frequency: &str,
    ) -> Reminder {
        let usecase = CreateReminderUseCase {
            name: name.into(),
            dosage: "1 pill".into(),
            time: time.into(),
            frequency: Some(frequency.into()),
            notes: None,
        };
        execute(usecase, ctx).await.unwrap()
    }

    /// Moves the fake clock and tokio's paused clock forward together
    pub async fn elapse(sys: &FakeSys, by: chrono::Duration) {
        sys.advance(by);
        tokio::time::advance(by.to_std().unwrap()).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}
