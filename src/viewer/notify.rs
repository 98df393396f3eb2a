//! User-facing notifications.
//!
//! These report status and errors unrelated to the windowing itself, such as a
//! failed fetch. Hosts subscribe with `TableView::on_notification`.

use serde::Serialize;

use crate::error::GridviewError;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Nothing on screen is affected
    Warning,
    Error,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn from_error(title: impl Into<String>, error: &GridviewError) -> Self {
        Self::error(title, error.to_string())
    }
}

pub(crate) type Listener = Box<dyn FnMut(&Notification)>;
