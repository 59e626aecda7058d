use crate::shared::usecase::UseCase;
use medremind_infra::MedRemindContext;
use tracing::info;

/// Arms every stored reminder, e.g. right after the collection has been loaded
#[derive(Debug)]
pub struct ArmRemindersUseCase {}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for ArmRemindersUseCase {
    /// Number of reminders that got an alarm
    type Response = usize;

    type Error = UseCaseError;

    const NAME: &'static str = "ArmReminders";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        let reminders = ctx.repos.reminder_repo.find_all().await;
        let now = ctx.sys.local_now();
        let armed = reminders
            .iter()
            .filter_map(|reminder| ctx.scheduler.arm(reminder, now))
            .count();
        info!("Armed {} of {} reminders", armed, reminders.len());
        Ok(armed)
    }
}
