use crate::dtos::{ReminderDTO, ReminderRowDTO};
use medremind_domain::{Reminder, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub reminder: ReminderDTO,
}

impl ReminderResponse {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            reminder: ReminderDTO::new(reminder),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemindersResponse {
    pub reminders: Vec<ReminderDTO>,
}

impl RemindersResponse {
    pub fn new(reminders: Vec<Reminder>) -> Self {
        Self {
            reminders: reminders.into_iter().map(ReminderDTO::new).collect(),
        }
    }
}

/// The raw fields of the reminder form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderForm {
    pub name: String,
    pub dosage: String,
    pub time: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub mod create_reminder {
    use super::*;

    pub type RequestBody = ReminderForm;

    pub type APIResponse = ReminderResponse;
}

pub mod update_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type RequestBody = ReminderForm;

    pub type APIResponse = ReminderResponse;
}

pub mod delete_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod mark_taken {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod postpone_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminder: ReminderDTO,
        pub delay_minutes: i64,
    }

    impl APIResponse {
        pub fn new(reminder: Reminder, delay_minutes: i64) -> Self {
            Self {
                reminder: ReminderDTO::new(reminder),
                delay_minutes,
            }
        }
    }
}

pub mod get_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminders: Vec<ReminderRowDTO>,
    }
}

pub mod export_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// The whole collection as a JSON array
        pub payload: String,
        pub count: usize,
    }
}

pub mod import_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub payload: String,
    }

    pub type APIResponse = RemindersResponse;
}
