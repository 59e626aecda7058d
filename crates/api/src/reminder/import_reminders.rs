use super::subscribers::RearmAlarmsOnRemindersImported;
use crate::error::MedRemindError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use medremind_api_structs::import_reminders::{APIResponse, RequestBody};
use medremind_domain::Reminder;
use medremind_infra::MedRemindContext;
use std::collections::HashSet;

pub async fn import_reminders_controller(
    body: RequestBody,
    ctx: &MedRemindContext,
) -> Result<APIResponse, MedRemindError> {
    let usecase = ImportRemindersUseCase {
        payload: body.payload,
    };

    execute(usecase, ctx)
        .await
        .map(|res| APIResponse::new(res.imported))
        .map_err(MedRemindError::from)
}

/// Replaces the whole collection with the reminders in `payload`, a JSON
/// array in the exported format. Nothing is changed unless every entry is valid.
#[derive(Debug)]
pub struct ImportRemindersUseCase {
    pub payload: String,
}

#[derive(Debug, PartialEq)]
pub struct ImportedReminders {
    pub previous: Vec<Reminder>,
    pub imported: Vec<Reminder>,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidFormat(String),
    StorageError,
}

impl From<UseCaseError> for MedRemindError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidFormat(e) => Self::ImportFormat(e),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

fn parse_payload(payload: &str) -> Result<Vec<Reminder>, UseCaseError> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| UseCaseError::InvalidFormat(format!("Not valid JSON: {}", e)))?;
    if !value.is_array() {
        return Err(UseCaseError::InvalidFormat(
            "Expected a JSON array of reminders".into(),
        ));
    }

    let reminders: Vec<Reminder> = serde_json::from_value(value)
        .map_err(|e| UseCaseError::InvalidFormat(format!("Invalid reminder: {}", e)))?;

    let mut ids = HashSet::new();
    for reminder in &reminders {
        reminder.validate().map_err(|e| {
            UseCaseError::InvalidFormat(format!("Reminder {}: {}", reminder.id, e))
        })?;
        if !ids.insert(reminder.id) {
            return Err(UseCaseError::InvalidFormat(format!(
                "Reminder id {} appears more than once",
                reminder.id
            )));
        }
    }
    Ok(reminders)
}

#[async_trait::async_trait(?Send)]
impl UseCase for ImportRemindersUseCase {
    type Response = ImportedReminders;

    type Error = UseCaseError;

    const NAME: &'static str = "ImportReminders";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        let imported = parse_payload(&self.payload)?;
        let previous = ctx
            .repos
            .reminder_repo
            .replace_all(imported.clone())
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(ImportedReminders { previous, imported })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(RearmAlarmsOnRemindersImported)]
    }
}
