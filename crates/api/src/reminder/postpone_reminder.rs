use crate::error::MedRemindError;
use crate::shared::usecase::{execute, UseCase};
use medremind_api_structs::postpone_reminder::{APIResponse, PathParams};
use medremind_domain::{Reminder, ID};
use medremind_infra::MedRemindContext;
use std::time::Duration;

pub async fn postpone_reminder_controller(
    path: PathParams,
    ctx: &MedRemindContext,
) -> Result<APIResponse, MedRemindError> {
    let usecase = PostponeReminderUseCase {
        reminder_id: path.reminder_id,
        delay: ctx.config.snooze_delay(),
    };

    execute(usecase, ctx)
        .await
        .map(|reminder| APIResponse::new(reminder, ctx.config.snooze_minutes))
        .map_err(MedRemindError::from)
}

/// Delivers the reminder once more after `delay`
#[derive(Debug)]
pub struct PostponeReminderUseCase {
    pub reminder_id: ID,
    pub delay: Duration,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for MedRemindError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(reminder_id) => Self::NotFound(format!(
                "The reminder with id: {}, was not found.",
                reminder_id
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for PostponeReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "PostponeReminder";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        let reminder = ctx
            .repos
            .reminder_repo
            .find(&self.reminder_id)
            .await
            .ok_or(UseCaseError::NotFound(self.reminder_id))?;

        ctx.scheduler.postpone(&reminder, self.delay);
        Ok(reminder)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{create_reminder, elapse, local, setup};

    #[tokio::test(start_paused = true)]
    async fn delivers_again_after_delay() {
        let (ctx, sys, sink) = setup(local(8, 0));
        let reminder = create_reminder(&ctx, "Aspirin", "08:00", "once").await;
        assert_eq!(ctx.scheduler.armed_count(), 0);

        let usecase = PostponeReminderUseCase {
            reminder_id: reminder.id,
            delay: Duration::from_secs(600),
        };
        execute(usecase, &ctx).await.unwrap();

        elapse(&sys, chrono::Duration::minutes(9)).await;
        assert!(sink.notifications().is_empty());
        elapse(&sys, chrono::Duration::minutes(1)).await;
        assert_eq!(sink.notifications().len(), 1);
        assert_eq!(sink.notifications()[0].reminder_id, reminder.id);
    }
}
