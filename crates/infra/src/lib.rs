mod config;
mod repos;
mod scheduler;
mod services;
mod system;

pub use config::{Config, DEFAULT_STORE_KEY, MAX_SNOOZE_MINUTES};
pub use repos::*;
pub use scheduler::*;
pub use services::*;
use std::sync::Arc;
pub use system::{FakeSys, ISys, RealSys};

#[derive(Clone)]
pub struct MedRemindContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub sink: Arc<dyn DeliverySink>,
    pub scheduler: RecurrenceScheduler,
}

impl MedRemindContext {
    pub fn new(
        repos: Repos,
        config: Config,
        sys: Arc<dyn ISys>,
        sink: Arc<dyn DeliverySink>,
    ) -> Self {
        let scheduler = RecurrenceScheduler::new(sink.clone(), sys.clone());
        Self {
            repos,
            config,
            sys,
            sink,
            scheduler,
        }
    }

    pub fn create_inmemory() -> Self {
        let config = Config::new();
        let sink = Arc::new(DesktopSink::new(config.delivery_channel));
        Self::new(Repos::create_inmemory(), config, Arc::new(RealSys {}), sink)
    }

    /// In memory context driven by the given clock and delivery sink
    pub fn create_inmemory_with(sys: Arc<dyn ISys>, sink: Arc<dyn DeliverySink>) -> Self {
        Self::new(Repos::create_inmemory(), Config::new(), sys, sink)
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> MedRemindContext {
    let config = Config::new();
    let repos = Repos::create_file(&config.data_dir, &config.store_key);
    repos.reminder_repo.load().await;
    let sink = Arc::new(DesktopSink::new(config.delivery_channel));
    MedRemindContext::new(repos, config, Arc::new(RealSys {}), sink)
}
