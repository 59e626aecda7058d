use super::subscribers::DisarmAlarmOnReminderDeleted;
use crate::error::MedRemindError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use medremind_api_structs::delete_reminder::{APIResponse, PathParams};
use medremind_domain::{Reminder, ID};
use medremind_infra::MedRemindContext;

pub async fn delete_reminder_controller(
    path: PathParams,
    ctx: &MedRemindContext,
) -> Result<APIResponse, MedRemindError> {
    let usecase = DeleteReminderUseCase {
        reminder_id: path.reminder_id,
    };

    execute(usecase, ctx)
        .await
        .map(APIResponse::new)
        .map_err(MedRemindError::from)
}

#[derive(Debug)]
pub struct DeleteReminderUseCase {
    pub reminder_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    UnableToDelete,
}

impl From<UseCaseError> for MedRemindError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(reminder_id) => Self::NotFound(format!(
                "The reminder with id: {}, was not found.",
                reminder_id
            )),
            UseCaseError::UnableToDelete => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteReminder";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        match ctx.repos.reminder_repo.delete(&self.reminder_id).await {
            Ok(Some(reminder)) => Ok(reminder),
            Ok(None) => Err(UseCaseError::NotFound(self.reminder_id)),
            Err(_) => Err(UseCaseError::UnableToDelete),
        }
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(DisarmAlarmOnReminderDeleted)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{create_reminder, local, setup};

    #[tokio::test(start_paused = true)]
    async fn deletes_and_disarms_reminder() {
        let (ctx, _, _) = setup(local(7, 0));
        let reminder = create_reminder(&ctx, "Aspirin", "08:00", "daily").await;
        assert_eq!(ctx.scheduler.armed_count(), 1);

        let usecase = DeleteReminderUseCase {
            reminder_id: reminder.id,
        };
        assert_eq!(execute(usecase, &ctx).await.unwrap(), reminder);
        assert!(ctx.repos.reminder_repo.find_all().await.is_empty());
        assert_eq!(ctx.scheduler.armed_count(), 0);

        let usecase = DeleteReminderUseCase {
            reminder_id: reminder.id,
        };
        assert!(matches!(
            execute(usecase, &ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }
}
