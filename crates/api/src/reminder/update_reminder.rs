use super::subscribers::RearmAlarmOnReminderUpdated;
use crate::error::MedRemindError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use medremind_api_structs::update_reminder::{APIResponse, PathParams, RequestBody};
use medremind_domain::{
    normalize_notes, parse_frequency_field, parse_time_field, Reminder, ReminderValidationError,
    ID,
};
use medremind_infra::MedRemindContext;

pub async fn update_reminder_controller(
    path: PathParams,
    body: RequestBody,
    ctx: &MedRemindContext,
) -> Result<APIResponse, MedRemindError> {
    let usecase = UpdateReminderUseCase {
        reminder_id: path.reminder_id,
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

/// Replaces the editable fields of a reminder. Identity, creation time and
/// last taken are kept.
#[derive(Debug)]
pub struct UpdateReminderUseCase {
    pub reminder_id: ID,
    pub name: String,
    pub dosage: String,
    pub time: String,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidReminder(ReminderValidationError),
    StorageError,
}

impl From<UseCaseError> for MedRemindError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(reminder_id) => Self::NotFound(format!(
                "The reminder with id: {}, was not found.",
                reminder_id
            )),
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
impl UseCase for UpdateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateReminder";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = match ctx.repos.reminder_repo.find(&self.reminder_id).await {
            Some(reminder) => reminder,
            None => return Err(UseCaseError::NotFound(self.reminder_id)),
        };

        reminder.time = parse_time_field(&self.time)?;
        reminder.frequency = parse_frequency_field(self.frequency.as_deref())?;
        reminder.name = self.name.trim().to_string();
        reminder.dosage = self.dosage.trim().to_string();
        reminder.notes = normalize_notes(self.notes.as_deref());
        reminder.validate()?;

        ctx.repos
            .reminder_repo
            .save(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(RearmAlarmOnReminderUpdated)]
    }
}
