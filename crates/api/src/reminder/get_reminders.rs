use crate::error::MedRemindError;
use crate::shared::usecase::{execute, UseCase};
use medremind_api_structs::dtos::ReminderRowDTO;
use medremind_api_structs::get_reminders::APIResponse;
use medremind_domain::Reminder;
use medremind_infra::MedRemindContext;

pub async fn get_reminders_controller(
    ctx: &MedRemindContext,
) -> Result<APIResponse, MedRemindError> {
    let usecase = GetRemindersUseCase {};

    execute(usecase, ctx)
        .await
        .map(|reminders| {
            let local_now = ctx.sys.local_now();
            let utc_now = ctx.sys.utc_now();
            APIResponse {
                reminders: reminders
                    .into_iter()
                    .map(|r| ReminderRowDTO::new(r, local_now, utc_now))
                    .collect(),
            }
        })
        .map_err(MedRemindError::from)
}

#[derive(Debug)]
pub struct GetRemindersUseCase {}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for MedRemindError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminders";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        Ok(ctx.repos.reminder_repo.find_all().await)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{create_reminder, local, setup};

    #[tokio::test(start_paused = true)]
    async fn lists_reminders_by_time_with_countdowns() {
        let (ctx, _, _) = setup(local(7, 15));
        create_reminder(&ctx, "Evening", "20:00", "daily").await;
        create_reminder(&ctx, "Morning", "08:00", "twice-daily").await;
        create_reminder(&ctx, "Early", "06:00", "once").await;

        let res = get_reminders_controller(&ctx).await.unwrap();
        let rows: Vec<_> = res
            .reminders
            .iter()
            .map(|r| (r.reminder.name.as_str(), r.countdown.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Early", "No upcoming dose"),
                ("Morning", "Next dose in 45m"),
                ("Evening", "Next dose in 12h 45m"),
            ]
        );
    }
}
