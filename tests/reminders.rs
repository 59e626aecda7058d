mod helpers;

use chrono::{Duration, TimeZone, Utc};
use helpers::setup::{elapse, local, spawn_app, spawn_app_in};
use medremind_api::{
    create_reminder_controller, delete_reminder_controller, export_reminders_controller,
    get_reminders_controller, import_reminders_controller, MedRemindError,
};
use medremind_api_structs::{delete_reminder, import_reminders, ReminderForm};
use medremind_domain::ID;
use medremind_infra::{KeyValue, Repos, UserAction, UserActionKind};

fn form(name: &str, time: &str, frequency: &str) -> ReminderForm {
    ReminderForm {
        name: name.into(),
        dosage: "1 pill".into(),
        time: time.into(),
        frequency: Some(frequency.into()),
        notes: None,
    }
}

async fn add(app: &helpers::setup::TestApp, name: &str, time: &str, frequency: &str) -> ID {
    create_reminder_controller(form(name, time, frequency), app.ctx())
        .await
        .unwrap()
        .reminder
        .id
}

#[tokio::test(start_paused = true)]
async fn test_day_of_reminders() {
    let app = spawn_app(local(1, 7, 0)).await;
    let morning = add(&app, "Vitamin D", "08:00", "daily").await;
    let insulin = add(&app, "Insulin", "09:00", "twice-daily").await;
    assert_eq!(app.ctx().scheduler.armed_count(), 2);

    elapse(&app, Duration::hours(1)).await;
    let delivered = app.sink.notifications();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].body, "Time to take Vitamin D - 1 pill");

    // Take Now
    let taken = app
        .app
        .handle_action(UserAction {
            reminder_id: morning,
            kind: UserActionKind::Acknowledge,
        })
        .await
        .unwrap();
    assert_eq!(taken.last_taken, Some(Utc.from_utc_datetime(&local(1, 8, 0))));

    elapse(&app, Duration::hours(1)).await;
    assert_eq!(app.sink.notifications().len(), 2);

    // Snooze
    app.app
        .handle_action(UserAction {
            reminder_id: insulin,
            kind: UserActionKind::Postpone,
        })
        .await
        .unwrap();
    elapse(&app, Duration::minutes(10)).await;
    let delivered = app.sink.notifications();
    assert_eq!(delivered.len(), 3);
    assert_eq!(delivered[2].reminder_id, insulin);

    // Both recurrences are still armed for their next slot
    assert_eq!(app.ctx().scheduler.armed_count(), 2);
    assert_eq!(
        app.ctx().scheduler.armed(&morning).unwrap().occurrence,
        local(2, 8, 0)
    );
    assert_eq!(
        app.ctx().scheduler.armed(&insulin).unwrap().occurrence,
        local(1, 21, 0)
    );

    let rows = get_reminders_controller(app.ctx()).await.unwrap().reminders;
    assert_eq!(rows[0].countdown, "Next dose in 22h 50m");
    assert_eq!(rows[0].last_taken_display.as_deref(), Some("08:00"));
    assert_eq!(rows[1].countdown, "Next dose in 11h 50m");
}

#[tokio::test(start_paused = true)]
async fn test_deleted_reminder_stays_silent() {
    let app = spawn_app(local(1, 7, 0)).await;
    let id = add(&app, "Aspirin", "08:00", "daily").await;

    delete_reminder_controller(delete_reminder::PathParams { reminder_id: id }, app.ctx())
        .await
        .unwrap();
    assert_eq!(app.ctx().scheduler.armed_count(), 0);

    elapse(&app, Duration::hours(48)).await;
    assert!(app.sink.calls().is_empty());

    let res =
        delete_reminder_controller(delete_reminder::PathParams { reminder_id: id }, app.ctx())
            .await;
    assert!(matches!(res, Err(MedRemindError::NotFound(_))));
}

#[tokio::test(start_paused = true)]
async fn test_reminders_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = spawn_app_in(dir.path(), local(1, 7, 0)).await;
        add(&app, "Vitamin D", "08:00", "daily").await;
        add(&app, "Antibiotic", "06:00", "once").await;
        app.app.stop();
    }
    assert!(dir.path().join("medReminders.json").exists());

    let app = spawn_app_in(dir.path(), local(1, 7, 30)).await;
    let rows = get_reminders_controller(app.ctx()).await.unwrap().reminders;
    assert_eq!(rows.len(), 2);
    // Only the daily reminder still has an occurrence ahead
    assert_eq!(app.ctx().scheduler.armed_count(), 1);

    elapse(&app, Duration::minutes(30)).await;
    assert_eq!(app.sink.notifications().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let repos = Repos::create_file(dir.path(), "medReminders");
    repos
        .kv_repo
        .set(&KeyValue::new("medReminders", "{\"not\": \"an array\"}"))
        .await
        .unwrap();

    let app = spawn_app_in(dir.path(), local(1, 7, 0)).await;
    assert!(get_reminders_controller(app.ctx())
        .await
        .unwrap()
        .reminders
        .is_empty());
    assert_eq!(app.ctx().scheduler.armed_count(), 0);

    // The store is usable again after the first write
    add(&app, "Aspirin", "08:00", "daily").await;
    let reopened = spawn_app_in(dir.path(), local(1, 7, 0)).await;
    assert_eq!(
        get_reminders_controller(reopened.ctx())
            .await
            .unwrap()
            .reminders
            .len(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_export_then_import() {
    let source = spawn_app(local(1, 7, 0)).await;
    add(&source, "Vitamin D", "08:00", "daily").await;
    add(&source, "Insulin", "09:00", "twice-daily").await;
    let exported = export_reminders_controller(source.ctx()).await.unwrap();
    assert_eq!(exported.count, 2);

    let target = spawn_app(local(1, 7, 0)).await;
    add(&target, "Old", "10:00", "daily").await;

    let bad = import_reminders_controller(
        import_reminders::RequestBody {
            payload: "{\"reminders\": []}".into(),
        },
        target.ctx(),
    )
    .await;
    assert!(matches!(bad, Err(MedRemindError::ImportFormat(_))));
    assert_eq!(
        get_reminders_controller(target.ctx())
            .await
            .unwrap()
            .reminders
            .len(),
        1
    );

    let imported = import_reminders_controller(
        import_reminders::RequestBody {
            payload: exported.payload,
        },
        target.ctx(),
    )
    .await
    .unwrap();
    assert_eq!(imported.reminders.len(), 2);

    let names: Vec<_> = get_reminders_controller(target.ctx())
        .await
        .unwrap()
        .reminders
        .into_iter()
        .map(|r| r.reminder.name)
        .collect();
    assert_eq!(names, vec!["Vitamin D", "Insulin"]);
    assert_eq!(target.ctx().scheduler.armed_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_running_app_keeps_reminders_added_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    let running = spawn_app_in(dir.path(), local(1, 7, 0)).await;
    let morning = add(&running, "Vitamin D", "08:00", "daily").await;

    // A one-shot command adding a reminder while the app keeps running
    let other = spawn_app_in(dir.path(), local(1, 7, 0)).await;
    let evening = add(&other, "Magnesium", "20:00", "daily").await;
    other.app.stop();

    running
        .app
        .handle_action(UserAction {
            reminder_id: morning,
            kind: UserActionKind::Acknowledge,
        })
        .await
        .unwrap();

    let reopened = spawn_app_in(dir.path(), local(1, 7, 5)).await;
    let names: Vec<_> = get_reminders_controller(reopened.ctx())
        .await
        .unwrap()
        .reminders
        .into_iter()
        .map(|r| r.reminder.name)
        .collect();
    assert_eq!(names, vec!["Vitamin D", "Magnesium"]);
    reopened.app.stop();

    assert_eq!(
        running.ctx().scheduler.armed(&evening).unwrap().occurrence,
        local(1, 20, 0)
    );
    elapse(&running, Duration::hours(13)).await;
    let delivered: Vec<_> = running
        .sink
        .notifications()
        .into_iter()
        .map(|n| n.reminder_id)
        .collect();
    assert_eq!(delivered, vec![morning, evening]);
}
