//! Notification payloads and delivery

use std::path::PathBuf;

#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use tracing::info;

use crate::monitor::project::{Category, display_name};

/// Label of the single action attached to every notification
pub const SHOW_ACTION: &str = "Show";

/// A desktop notification raised by a scheduled check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub icon: Option<PathBuf>,
    pub actions: Vec<String>,
    /// Project the notification is about
    pub project: String,
    pub category: Category,
}

impl Notification {
    pub fn outdated(project: &str, count: usize, icon: Option<PathBuf>) -> Self {
        Self {
            title: "Outdated Priority Dependencies".to_string(),
            message: format!(
                "You have {} priority update(s) for the {} project.",
                count,
                display_name(project)
            ),
            icon,
            actions: vec![SHOW_ACTION.to_string()],
            project: project.to_string(),
            category: Category::Outdated,
        }
    }

    pub fn vulnerabilities(project: &str, count: usize, icon: Option<PathBuf>) -> Self {
        Self {
            title: "Vulnerabilities Detected".to_string(),
            message: format!(
                "{} has {} vulnerability(ies).",
                display_name(project),
                count
            ),
            icon,
            actions: vec![SHOW_ACTION.to_string()],
            project: project.to_string(),
            category: Category::Vulnerabilities,
        }
    }

    pub fn for_category(
        category: Category,
        project: &str,
        count: usize,
        icon: Option<PathBuf>,
    ) -> Self {
        match category {
            Category::Outdated => Self::outdated(project, count, icon),
            Category::Vulnerabilities => Self::vulnerabilities(project, count, icon),
        }
    }

    /// Click event routed back when the user activates this notification
    pub fn click(&self) -> ClickEvent {
        ClickEvent {
            project: self.project.clone(),
            category: self.category,
        }
    }
}

/// User activation of a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub project: String,
    pub category: Category,
}

/// Trait for delivering notifications to the user
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification, returning the click if the user activated it
    async fn notify(&self, notification: &Notification) -> Option<ClickEvent>;
}

/// Prints notifications to stdout; never reports clicks
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait::async_trait]
impl NotificationSink for ConsoleNotifier {
    async fn notify(&self, notification: &Notification) -> Option<ClickEvent> {
        info!(
            "Notification for {} ({}): {}",
            notification.project, notification.category, notification.message
        );
        println!("[{}] {}", notification.title, notification.message);
        None
    }
}
