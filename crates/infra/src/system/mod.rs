use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use std::sync::Mutex;

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current instant
    fn utc_now(&self) -> DateTime<Utc>;
    /// The current wall clock reading of the device, without timezone
    fn local_now(&self) -> NaiveDateTime;
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64 {
        self.utc_now().timestamp_millis()
    }
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock. The device is treated as running on UTC, so
/// `local_now` and `utc_now` always agree.
pub struct FakeSys {
    now: Mutex<NaiveDateTime>,
}

impl FakeSys {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        // A poisoned clock still holds a valid reading
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ISys for FakeSys {
    fn utc_now(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.lock())
    }

    fn local_now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn fake_sys_is_settable() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let sys = FakeSys::new(start);
        assert_eq!(sys.local_now(), start);
        assert_eq!(sys.get_timestamp_millis(), 1_709_280_000_000);

        sys.advance(Duration::minutes(90));
        assert_eq!(sys.local_now(), start + Duration::minutes(90));
    }
}
