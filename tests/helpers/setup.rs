use chrono::{NaiveDate, NaiveDateTime};
use medremind_api::Application;
use medremind_infra::{
    Config, DeliveryChannel, FakeSys, MedRemindContext, RecordingSink, Repos,
};
use std::path::Path;
use std::sync::Arc;

pub struct TestApp {
    pub app: Application,
    pub sys: Arc<FakeSys>,
    pub sink: Arc<RecordingSink>,
}

impl TestApp {
    pub fn ctx(&self) -> &MedRemindContext {
        self.app.context()
    }
}

pub fn local(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

async fn start(repos: Repos, now: NaiveDateTime) -> TestApp {
    repos.reminder_repo.load().await;
    let sys = Arc::new(FakeSys::new(now));
    let sink = Arc::new(RecordingSink::new(DeliveryChannel::Granted));
    let mut config = Config::new();
    config.snooze_minutes = 10;
    let ctx = MedRemindContext::new(repos, config, sys.clone(), sink.clone());
    let app = Application::new(ctx).await;
    TestApp { app, sys, sink }
}

// Launch the application on an in memory store
pub async fn spawn_app(now: NaiveDateTime) -> TestApp {
    start(Repos::create_inmemory(), now).await
}

// Launch the application on a store persisted in `dir`
pub async fn spawn_app_in(dir: &Path, now: NaiveDateTime) -> TestApp {
    start(Repos::create_file(dir, "medReminders"), now).await
}

/// Moves the fake clock and tokio's paused clock forward together
pub async fn elapse(app: &TestApp, by: chrono::Duration) {
    app.sys.advance(by);
    tokio::time::advance(by.to_std().unwrap()).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
