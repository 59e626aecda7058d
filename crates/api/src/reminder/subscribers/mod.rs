use super::{
    create_reminder::CreateReminderUseCase,
    delete_reminder::DeleteReminderUseCase,
    import_reminders::{ImportRemindersUseCase, ImportedReminders},
    mark_taken::MarkTakenUseCase,
    sync_reminders::{SyncRemindersUseCase, SyncedReminders},
    update_reminder::UpdateReminderUseCase,
};
use crate::shared::usecase::Subscriber;
use medremind_domain::Reminder;
use medremind_infra::MedRemindContext;

pub struct ArmAlarmOnReminderCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateReminderUseCase> for ArmAlarmOnReminderCreated {
    async fn notify(&self, e: &Reminder, ctx: &MedRemindContext) {
        ctx.scheduler.arm(e, ctx.sys.local_now());
    }
}

pub struct RearmAlarmOnReminderUpdated;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateReminderUseCase> for RearmAlarmOnReminderUpdated {
    async fn notify(&self, e: &Reminder, ctx: &MedRemindContext) {
        // A pending snooze belongs to the old version of the reminder
        ctx.scheduler.disarm(&e.id);
        ctx.scheduler.arm(e, ctx.sys.local_now());
    }
}

pub struct DisarmAlarmOnReminderDeleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteReminderUseCase> for DisarmAlarmOnReminderDeleted {
    async fn notify(&self, e: &Reminder, ctx: &MedRemindContext) {
        ctx.scheduler.disarm(&e.id);
    }
}

pub struct CancelPostponedOnReminderTaken;

#[async_trait::async_trait(?Send)]
impl Subscriber<MarkTakenUseCase> for CancelPostponedOnReminderTaken {
    async fn notify(&self, e: &Reminder, ctx: &MedRemindContext) {
        ctx.scheduler.cancel_postponed(&e.id);
    }
}

pub struct RearmAlarmsOnRemindersImported;

#[async_trait::async_trait(?Send)]
impl Subscriber<ImportRemindersUseCase> for RearmAlarmsOnRemindersImported {
    async fn notify(&self, e: &ImportedReminders, ctx: &MedRemindContext) {
        for reminder in &e.previous {
            ctx.scheduler.disarm(&reminder.id);
        }
        let now = ctx.sys.local_now();
        for reminder in &e.imported {
            ctx.scheduler.arm(reminder, now);
        }
    }
}

pub struct RearmAlarmsOnRemindersSynced;

#[async_trait::async_trait(?Send)]
impl Subscriber<SyncRemindersUseCase> for RearmAlarmsOnRemindersSynced {
    async fn notify(&self, e: &SyncedReminders, ctx: &MedRemindContext) {
        for reminder in &e.removed {
            ctx.scheduler.disarm(&reminder.id);
        }
        let now = ctx.sys.local_now();
        for reminder in &e.changed {
            ctx.scheduler.disarm(&reminder.id);
            ctx.scheduler.arm(reminder, now);
        }
    }
}
