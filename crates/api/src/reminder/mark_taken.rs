use super::subscribers::CancelPostponedOnReminderTaken;
use crate::error::MedRemindError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use medremind_api_structs::mark_taken::{APIResponse, PathParams};
use medremind_domain::{Reminder, ID};
use medremind_infra::MedRemindContext;

pub async fn mark_taken_controller(
    path: PathParams,
    ctx: &MedRemindContext,
) -> Result<APIResponse, MedRemindError> {
    let usecase = MarkTakenUseCase {
        reminder_id: path.reminder_id,
    };

    execute(usecase, ctx)
        .await
        .map(APIResponse::new)
        .map_err(MedRemindError::from)
}

/// Records that the dose was taken now. The recurrence is not affected.
#[derive(Debug)]
pub struct MarkTakenUseCase {
    pub reminder_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for MedRemindError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(reminder_id) => Self::NotFound(format!(
                "The reminder with id: {}, was not found.",
                reminder_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for MarkTakenUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "MarkTaken";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = match ctx.repos.reminder_repo.find(&self.reminder_id).await {
            Some(reminder) => reminder,
            None => return Err(UseCaseError::NotFound(self.reminder_id)),
        };

        reminder.mark_taken(ctx.sys.utc_now());
        ctx.repos
            .reminder_repo
            .save(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(CancelPostponedOnReminderTaken)]
    }
}
