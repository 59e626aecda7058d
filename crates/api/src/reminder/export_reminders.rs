use crate::error::MedRemindError;
use crate::shared::usecase::{execute, UseCase};
use medremind_api_structs::export_reminders::APIResponse;
use medremind_infra::{encode_reminders, MedRemindContext};

pub async fn export_reminders_controller(
    ctx: &MedRemindContext,
) -> Result<APIResponse, MedRemindError> {
    let usecase = ExportRemindersUseCase {};

    execute(usecase, ctx)
        .await
        .map(|(payload, count)| APIResponse { payload, count })
        .map_err(MedRemindError::from)
}

/// Serializes the whole collection in the same format it is persisted in
#[derive(Debug)]
pub struct ExportRemindersUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    SerializationFailed(String),
}

impl From<UseCaseError> for MedRemindError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::SerializationFailed(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ExportRemindersUseCase {
    type Response = (String, usize);

    type Error = UseCaseError;

    const NAME: &'static str = "ExportReminders";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        let reminders = ctx.repos.reminder_repo.find_all().await;
        encode_reminders(&reminders)
            .map(|payload| (payload, reminders.len()))
            .map_err(|e| UseCaseError::SerializationFailed(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{create_reminder, local, setup};

    #[tokio::test(start_paused = true)]
    async fn exports_json_array_with_stored_keys() {
        let (ctx, _, _) = setup(local(7, 0));
        let reminder = create_reminder(&ctx, "Aspirin", "08:00", "twice-daily").await;

        let res = export_reminders_controller(&ctx).await.unwrap();
        assert_eq!(res.count, 1);
        let exported: serde_json::Value = serde_json::from_str(&res.payload).unwrap();
        let entry = &exported.as_array().unwrap()[0];
        assert_eq!(entry["id"], reminder.id.inner());
        assert_eq!(entry["time"], "08:00");
        assert_eq!(entry["frequency"], "twice-daily");
        assert_eq!(entry["lastTaken"], serde_json::Value::Null);
    }
}
