mod arm_reminders;
mod create_reminder;
mod delete_reminder;
mod export_reminders;
mod get_reminders;
mod import_reminders;
mod mark_taken;
mod postpone_reminder;
mod subscribers;
mod sync_reminders;
mod update_reminder;

pub use arm_reminders::ArmRemindersUseCase;
pub use create_reminder::{create_reminder_controller, CreateReminderUseCase};
pub use delete_reminder::{delete_reminder_controller, DeleteReminderUseCase};
pub use export_reminders::{export_reminders_controller, ExportRemindersUseCase};
pub use get_reminders::{get_reminders_controller, GetRemindersUseCase};
pub use import_reminders::{import_reminders_controller, ImportRemindersUseCase};
pub use mark_taken::{mark_taken_controller, MarkTakenUseCase};
pub use postpone_reminder::{postpone_reminder_controller, PostponeReminderUseCase};
pub use sync_reminders::{SyncRemindersUseCase, SyncedReminders};
pub use update_reminder::{update_reminder_controller, UpdateReminderUseCase};
