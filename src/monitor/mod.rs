//! Project monitoring
//!
//! ```text
//! Monitor ──┬─ FileExtractor ──> ExtractedFiles ──> reconcile ──> compute_updates ──> OutdatedReport
//!           ├─ AuditRunner   ──> check_vulnerabilities ──> Vec<VulnerabilityRecord>
//!           ├─ Scheduler     ──> periodic checks ──> NotificationSink ──> ClickEvent
//!           └─ ProjectStore  ──> saved project list
//! ```

pub mod aggregator;
pub mod error;
pub mod extract;
pub mod notifier;
pub mod priority;
pub mod project;
pub mod scheduler;
pub mod service;
pub mod store;

pub use aggregator::{DependencyUpdate, OutdatedReport, analyze_outdated, compute_updates};
pub use error::{MonitorError, StoreError};
pub use extract::{FileExtractor, FsExtractor};
pub use notifier::{ClickEvent, ConsoleNotifier, Notification, NotificationSink};
pub use priority::PrioritySet;
pub use project::{Category, CategorySettings, ExtractedFiles, Project, display_name};
pub use scheduler::{CancelSignal, Scheduler};
pub use service::{Monitor, MonitorDeps, ProjectTab};
pub use store::{ProjectStore, SqliteProjectStore};
