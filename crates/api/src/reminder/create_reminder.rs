use super::subscribers::ArmAlarmOnReminderCreated;
use crate::error::MedRemindError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use medremind_api_structs::create_reminder::{APIResponse, RequestBody};
use medremind_domain::{parse_frequency_field, parse_time_field, Reminder, ReminderValidationError};
use medremind_infra::MedRemindContext;

pub async fn create_reminder_controller(
    body: RequestBody,
    ctx: &MedRemindContext,
) -> Result<APIResponse, MedRemindError> {
    let usecase = CreateReminderUseCase {
        name: body.name,
        dosage: body.dosage,
        time: body.time,
        frequency: body.frequency,
        notes: body.notes,
    };

    execute(usecase, ctx)
        .await
        .map(APIResponse::new)
        .map_err(MedRemindError::from)
}

#[derive(Debug)]
pub struct CreateReminderUseCase {
    pub name: String,
    pub dosage: String,
    pub time: String,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidReminder(ReminderValidationError),
    StorageError,
}

impl From<UseCaseError> for MedRemindError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidReminder(e) => Self::BadClientData(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

impl From<ReminderValidationError> for UseCaseError {
    fn from(e: ReminderValidationError) -> Self {
        Self::InvalidReminder(e)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        let time = parse_time_field(&self.time)?;
        let frequency = parse_frequency_field(self.frequency.as_deref())?;
        let reminder = Reminder::new(
            &self.name,
            &self.dosage,
            time,
            frequency,
            self.notes.as_deref(),
            ctx.sys.utc_now(),
        )?;

        ctx.repos
            .reminder_repo
            .insert(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(ArmAlarmOnReminderCreated)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{local, setup};
    use medremind_domain::Frequency;

    fn usecase(name: &str, time: &str) -> CreateReminderUseCase {
        CreateReminderUseCase {
            name: name.into(),
            dosage: "100mg".into(),
            time: time.into(),
            frequency: Some("twice-daily".into()),
            notes: Some("  ".into()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn creates_and_arms_reminder() {
        let (ctx, _, _) = setup(local(9, 0));

        let reminder = execute(usecase("Aspirin", "08:00"), &ctx).await.unwrap();
        assert_eq!(reminder.frequency, Frequency::TwiceDaily);
        assert_eq!(reminder.notes, None);
        assert_eq!(
            ctx.repos.reminder_repo.find(&reminder.id).await,
            Some(reminder.clone())
        );
        assert_eq!(
            ctx.scheduler.armed(&reminder.id).unwrap().occurrence,
            local(20, 0)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_invalid_forms_without_side_effects() {
        let (ctx, _, _) = setup(local(9, 0));

        let res = execute(usecase("", "08:00"), &ctx).await;
        assert!(matches!(
            res,
            Err(UseCaseError::InvalidReminder(ReminderValidationError::MissingName))
        ));
        let res = execute(usecase("Aspirin", "25:00"), &ctx).await;
        assert!(matches!(
            res,
            Err(UseCaseError::InvalidReminder(ReminderValidationError::InvalidTime(_)))
        ));
        let res = execute(usecase("Aspirin", ""), &ctx).await;
        assert!(matches!(
            res,
            Err(UseCaseError::InvalidReminder(ReminderValidationError::MissingTime))
        ));

        assert!(ctx.repos.reminder_repo.find_all().await.is_empty());
        assert_eq!(ctx.scheduler.armed_count(), 0);
    }
}
