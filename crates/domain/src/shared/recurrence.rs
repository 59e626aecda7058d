use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// How often a `Reminder` should fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Once,
    #[default]
    Daily,
    TwiceDaily,
    /// Caller driven. Treated like `Daily` when computing the next occurrence,
    /// but the scheduler never re-arms it on its own.
    Custom,
}

impl Frequency {
    /// Whether the scheduler arms the following occurrence right after a fire
    pub fn rearms_after_fire(&self) -> bool {
        matches!(self, Self::Daily | Self::TwiceDaily)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Once => "One time",
            Self::Daily => "Daily",
            Self::TwiceDaily => "Twice daily",
            Self::Custom => "Custom schedule",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::TwiceDaily => "twice-daily",
            Self::Custom => "custom",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidFrequencyError {
    #[error("Invalid frequency specified: {0}")]
    Unknown(String),
}

impl FromStr for Frequency {
    type Err = InvalidFrequencyError;

    fn from_str(freq: &str) -> Result<Self, Self::Err> {
        match freq.trim().to_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "twice-daily" | "twice_daily" | "twicedaily" => Ok(Self::TwiceDaily),
            "custom" => Ok(Self::Custom),
            _ => Err(InvalidFrequencyError::Unknown(freq.to_string())),
        }
    }
}
