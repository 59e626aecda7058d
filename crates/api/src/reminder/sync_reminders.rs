use super::subscribers::RearmAlarmsOnRemindersSynced;
use crate::shared::usecase::{Subscriber, UseCase};
use medremind_domain::Reminder;
use medremind_infra::MedRemindContext;
use tracing::info;

/// Picks up reminders that another process added, changed or deleted in the
/// shared store since this process last read it. Triggered by the job scheduler.
#[derive(Debug)]
pub struct SyncRemindersUseCase {}

#[derive(Debug, Default, PartialEq)]
pub struct SyncedReminders {
    pub removed: Vec<Reminder>,
    /// Added or changed elsewhere
    pub changed: Vec<Reminder>,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for SyncRemindersUseCase {
    type Response = SyncedReminders;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncReminders";

    async fn execute(&mut self, ctx: &MedRemindContext) -> Result<Self::Response, Self::Error> {
        let previous = match ctx.repos.reminder_repo.reload().await {
            Some(previous) => previous,
            None => return Ok(SyncedReminders::default()),
        };
        let current = ctx.repos.reminder_repo.find_all().await;

        let removed: Vec<_> = previous
            .iter()
            .filter(|old| !current.iter().any(|r| r.id == old.id))
            .cloned()
            .collect();
        let changed: Vec<_> = current
            .into_iter()
            .filter(|r| !previous.contains(r))
            .collect();
        info!(
            "Synced reminders, {} removed and {} changed elsewhere",
            removed.len(),
            changed.len()
        );

        Ok(SyncedReminders { removed, changed })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(RearmAlarmsOnRemindersSynced)]
    }
}
