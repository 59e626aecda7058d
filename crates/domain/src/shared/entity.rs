use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    str::FromStr,
    sync::atomic::{AtomicI64, Ordering},
};
use thiserror::Error;

pub trait Entity {
    fn id(&self) -> &ID;
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

/// Last identifier handed out by `ID::from_timestamp` in this process
static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Identity of a `Reminder`.
///
/// Derived from the creation timestamp in millis, so ids sort in creation
/// order. Two ids issued in the same millisecond are still distinct because
/// the issuer never hands out a value lower than or equal to a previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ID(i64);

impl ID {
    pub fn from_timestamp(timestamp_millis: i64) -> Self {
        let mut last = LAST_ISSUED.load(Ordering::SeqCst);
        loop {
            let candidate = timestamp_millis.max(last + 1);
            match LAST_ISSUED.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return Self(candidate),
                Err(current) => last = current,
            }
        }
    }

    /// Makes sure `from_timestamp` never hands out this id, e.g. for ids
    /// that were loaded or imported rather than issued here
    pub fn mark_issued(self) {
        LAST_ISSUED.fetch_max(self.0, Ordering::SeqCst);
    }

    pub fn inner(self) -> i64 {
        self.0
    }
}

impl From<i64> for ID {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl Display for ID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug)]
pub enum InvalidIDError {
    #[error("ID: {0} is malformed")]
    Malformed(String),
}

impl FromStr for ID {
    type Err = InvalidIDError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| InvalidIDError::Malformed(s.to_string()))
    }
}
