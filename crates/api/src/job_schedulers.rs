use crate::reminder::{get_reminders_controller, SyncRemindersUseCase};
use crate::shared::usecase::execute;
use medremind_api_structs::get_reminders::APIResponse;
use medremind_infra::MedRemindContext;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::error;

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// On every minute boundary picks up changes other processes made to the
/// store, then renders the reminders list and hands it to `on_refresh`, so
/// the countdowns stay current. Must be called from within a
/// `LocalSet`.
pub fn start_countdown_refresh_job<F>(ctx: MedRemindContext, on_refresh: F) -> JoinHandle<()>
where
    F: Fn(APIResponse) + 'static,
{
    tokio::task::spawn_local(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);

        let period = Duration::from_secs(ctx.config.refresh_interval_secs.max(1));
        let mut minutely_interval = interval_at(start, period);
        loop {
            minutely_interval.tick().await;
            let _ = execute(SyncRemindersUseCase {}, &ctx).await;
            match get_reminders_controller(&ctx).await {
                Ok(res) => on_refresh(res),
                Err(e) => error!("Unable to refresh the reminders list: {:?}", e),
            }
        }
    })
}
