//! Monitor facade: the project list and every operation on it

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::audit::{AuditRunner, VulnerabilityRecord, check_vulnerabilities};
use crate::config::{MAX_NOTIFICATION_PERIOD_SECS, MIN_NOTIFICATION_PERIOD_SECS};
use crate::monitor::aggregator::{OutdatedReport, analyze_outdated};
use crate::monitor::error::MonitorError;
use crate::monitor::extract::FileExtractor;
use crate::monitor::notifier::{ClickEvent, Notification, NotificationSink};
use crate::monitor::project::{Category, Project};
use crate::monitor::scheduler::{CancelSignal, Scheduler};
use crate::monitor::store::ProjectStore;
use crate::parser::reconcile;
use crate::version::lookup::PackageLookup;

/// Collaborators the monitor works through
pub struct MonitorDeps {
    pub store: Arc<dyn ProjectStore>,
    pub extractor: Arc<dyn FileExtractor>,
    pub lookup: PackageLookup,
    pub auditor: Arc<dyn AuditRunner>,
    pub notifier: Arc<dyn NotificationSink>,
    pub icon: Option<PathBuf>,
}

/// Where a click sends the user: the project's view, on the clicked tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTab {
    pub project: Project,
    pub category: Category,
}

/// State shared between the facade and running timers
struct MonitorContext {
    projects: Mutex<IndexMap<String, Project>>,
    /// Serializes snapshot-and-save so the last save wins
    save_lock: Mutex<()>,
    deps: MonitorDeps,
    clicks: mpsc::UnboundedSender<ClickEvent>,
}

impl MonitorContext {
    fn lock_projects(&self) -> MutexGuard<'_, IndexMap<String, Project>> {
        self.projects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self, name: &str) -> Result<Project, MonitorError> {
        self.lock_projects()
            .get(name)
            .cloned()
            .ok_or_else(|| MonitorError::ProjectNotFound(name.to_string()))
    }

    /// Save the current list; failures keep the in-memory state
    fn persist(&self) {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let projects: Vec<Project> = self.lock_projects().values().cloned().collect();

        if let Err(e) = self.deps.store.save(&projects) {
            warn!("Failed to save projects: {}", e);
        }
    }

    /// Re-read the project's files and store them on the project
    async fn refresh_files(&self, name: &str) -> Result<Project, MonitorError> {
        let path = self.snapshot(name)?.path;
        let files = self.deps.extractor.read_project_files(&path).await;

        let project = {
            let mut projects = self.lock_projects();
            let project = projects
                .get_mut(name)
                .ok_or_else(|| MonitorError::ProjectNotFound(name.to_string()))?;
            project.files = files;
            project.clone()
        };

        self.persist();
        Ok(project)
    }

    /// Number of findings that warrant a notification
    async fn count_findings(&self, project: &Project, category: Category) -> Option<usize> {
        match category {
            Category::Outdated => {
                let report =
                    analyze_outdated(&self.deps.lookup, &project.files, &project.priority).await;
                Some(report.priority.len())
            }
            Category::Vulnerabilities => {
                match check_vulnerabilities(self.deps.auditor.as_ref(), &project.path).await {
                    Ok(records) => Some(records.len()),
                    Err(e) => {
                        warn!("Scheduled audit of {} failed: {}", project.name, e);
                        None
                    }
                }
            }
        }
    }

    /// One scheduled pass: refresh files, analyze, notify if anything was found
    async fn run_check(&self, name: &str, category: Category, signal: &CancelSignal) {
        let project = match self.refresh_files(name).await {
            Ok(project) => project,
            Err(e) => {
                warn!("Skipping {} check: {}", category, e);
                return;
            }
        };

        let Some(count) = self.count_findings(&project, category).await else {
            return;
        };
        if count == 0 {
            debug!("No {} findings for {}", category, name);
            return;
        }
        if signal.is_cancelled() {
            debug!("{} check for {} cancelled before notifying", category, name);
            return;
        }

        let notification =
            Notification::for_category(category, name, count, self.deps.icon.clone());

        if let Some(project) = self.lock_projects().get_mut(name) {
            project.notifications.get_mut(category).last_notified_ms =
                Some(chrono::Utc::now().timestamp_millis());
        }
        self.persist();

        if signal.is_cancelled() {
            debug!("{} check for {} cancelled while saving", category, name);
            return;
        }
        info!("Raising {} notification for {}", category, name);
        if let Some(click) = self.deps.notifier.notify(&notification).await {
            let _ = self.clicks.send(click);
        }
    }
}

/// Owns the project list and the check timers
pub struct Monitor {
    ctx: Arc<MonitorContext>,
    scheduler: Scheduler,
    clicks: Mutex<Option<mpsc::UnboundedReceiver<ClickEvent>>>,
}

impl Monitor {
    pub fn new(deps: MonitorDeps) -> Self {
        let (clicks_tx, clicks_rx) = mpsc::unbounded_channel();
        Self {
            ctx: Arc::new(MonitorContext {
                projects: Mutex::new(IndexMap::new()),
                save_lock: Mutex::new(()),
                deps,
                clicks: clicks_tx,
            }),
            scheduler: Scheduler::new(),
            clicks: Mutex::new(Some(clicks_rx)),
        }
    }

    /// Replace the in-memory list with the stored one
    pub fn load(&self) -> Result<usize, MonitorError> {
        let stored = self.ctx.deps.store.load()?;
        let mut projects = self.ctx.lock_projects();
        projects.clear();

        for project in stored {
            if projects.contains_key(&project.name) {
                warn!("Ignoring duplicate stored project {}", project.name);
                continue;
            }
            projects.insert(project.name.clone(), project);
        }

        info!("Loaded {} projects", projects.len());
        Ok(projects.len())
    }

    pub fn projects(&self) -> Vec<Project> {
        self.ctx.lock_projects().values().cloned().collect()
    }

    pub fn project(&self, name: &str) -> Result<Project, MonitorError> {
        self.ctx.snapshot(name)
    }

    /// Add the directory at `path` as a project named after its base name
    pub async fn add_project(&self, path: &Path) -> Result<Project, MonitorError> {
        let is_dir = tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        let mut project = Project::from_dir(path)
            .filter(|_| is_dir)
            .ok_or_else(|| MonitorError::InvalidProjectPath(path.to_path_buf()))?;

        if self.ctx.lock_projects().contains_key(&project.name) {
            return Err(MonitorError::DuplicateProject(project.name));
        }

        project.files = self.ctx.deps.extractor.read_project_files(path).await;

        {
            let mut projects = self.ctx.lock_projects();
            if projects.contains_key(&project.name) {
                return Err(MonitorError::DuplicateProject(project.name));
            }
            projects.insert(project.name.clone(), project.clone());
        }
        self.ctx.persist();

        info!("Added project {} at {:?}", project.name, project.path);
        Ok(project)
    }

    /// Remove a project and disarm its timers
    pub fn remove_project(&self, name: &str) -> Result<Project, MonitorError> {
        self.scheduler.cancel_project(name);

        let removed = self
            .ctx
            .lock_projects()
            .shift_remove(name)
            .ok_or_else(|| MonitorError::ProjectNotFound(name.to_string()))?;
        self.ctx.persist();

        info!("Removed project {}", name);
        Ok(removed)
    }

    /// Re-read the project's files, as when the user opens it
    pub async fn open_project(&self, name: &str) -> Result<Project, MonitorError> {
        self.ctx.refresh_files(name).await
    }

    /// Outdated report from the stored files
    pub async fn outdated(&self, name: &str) -> Result<OutdatedReport, MonitorError> {
        let project = self.ctx.snapshot(name)?;
        Ok(analyze_outdated(&self.ctx.deps.lookup, &project.files, &project.priority).await)
    }

    /// Run the audit tool in the project directory
    pub async fn vulnerabilities(
        &self,
        name: &str,
    ) -> Result<Vec<VulnerabilityRecord>, MonitorError> {
        let project = self.ctx.snapshot(name)?;
        Ok(check_vulnerabilities(self.ctx.deps.auditor.as_ref(), &project.path).await?)
    }

    /// Flag a dependency of the project as a priority.
    ///
    /// Only packages the stored files declare are accepted. When the change is
    /// new, the list is saved and `displayed` (if any) regroups the row in
    /// place. Returns true if the package was not already a priority.
    pub fn add_priority(
        &self,
        name: &str,
        package: &str,
        displayed: Option<&mut OutdatedReport>,
    ) -> Result<bool, MonitorError> {
        let changed = {
            let mut projects = self.ctx.lock_projects();
            let project = projects
                .get_mut(name)
                .ok_or_else(|| MonitorError::ProjectNotFound(name.to_string()))?;

            let resolved = reconcile(
                project.files.lockfile.as_deref(),
                project.files.manifest.as_deref(),
            );
            if !resolved.dependencies.contains_key(package) {
                return Err(MonitorError::UnknownDependency {
                    project: name.to_string(),
                    package: package.to_string(),
                });
            }
            project.priority.add(package)
        };

        self.apply_priority_change(changed, package, true, displayed);
        Ok(changed)
    }

    /// Unflag a priority package; stale entries can always be removed.
    ///
    /// Returns true if the package was a priority.
    pub fn remove_priority(
        &self,
        name: &str,
        package: &str,
        displayed: Option<&mut OutdatedReport>,
    ) -> Result<bool, MonitorError> {
        let changed = self
            .ctx
            .lock_projects()
            .get_mut(name)
            .ok_or_else(|| MonitorError::ProjectNotFound(name.to_string()))?
            .priority
            .remove(package);

        self.apply_priority_change(changed, package, false, displayed);
        Ok(changed)
    }

    fn apply_priority_change(
        &self,
        changed: bool,
        package: &str,
        is_priority: bool,
        displayed: Option<&mut OutdatedReport>,
    ) {
        if !changed {
            return;
        }
        self.ctx.persist();

        let Some(report) = displayed else {
            return;
        };
        if !report.mark_priority(package, is_priority) {
            debug!("{} has no row to move in the displayed report", package);
        }
    }

    /// Store the check period for a category and re-arm its timer
    ///
    /// 0 disables the category. Any other value outside the allowed range is
    /// rejected.
    pub fn set_notification_period(
        &self,
        name: &str,
        category: Category,
        period_secs: u64,
    ) -> Result<(), MonitorError> {
        let allowed = MIN_NOTIFICATION_PERIOD_SECS..=MAX_NOTIFICATION_PERIOD_SECS;
        if period_secs != 0 && !allowed.contains(&period_secs) {
            return Err(MonitorError::InvalidPeriod {
                value: period_secs,
                min: MIN_NOTIFICATION_PERIOD_SECS,
                max: MAX_NOTIFICATION_PERIOD_SECS,
            });
        }

        {
            let mut projects = self.ctx.lock_projects();
            let project = projects
                .get_mut(name)
                .ok_or_else(|| MonitorError::ProjectNotFound(name.to_string()))?;
            project.notifications.get_mut(category).period_secs = period_secs;
        }
        self.ctx.persist();

        self.arm(name, category, period_secs);
        Ok(())
    }

    /// Arm a timer for every stored non-zero period; returns how many armed
    pub fn resume_schedules(&self) -> usize {
        let periods: Vec<(String, Category, u64)> = self
            .ctx
            .lock_projects()
            .values()
            .flat_map(|project| {
                Category::ALL.into_iter().map(|category| {
                    (
                        project.name.clone(),
                        category,
                        project.notifications.get(category).period_secs,
                    )
                })
            })
            .filter(|(_, _, period_secs)| *period_secs > 0)
            .collect();

        let mut armed = 0;
        for (name, category, period_secs) in &periods {
            if self.arm(name, *category, *period_secs) {
                armed += 1;
            }
        }
        armed
    }

    fn arm(&self, name: &str, category: Category, period_secs: u64) -> bool {
        let ctx = Arc::clone(&self.ctx);
        let project = name.to_string();

        self.scheduler
            .configure(name, category, period_secs, move |signal| {
                let ctx = Arc::clone(&ctx);
                let project = project.clone();
                async move { ctx.run_check(&project, category, &signal).await }
            })
    }

    pub fn is_scheduled(&self, name: &str, category: Category) -> bool {
        self.scheduler.is_armed(name, category)
    }

    /// Receiver of notification clicks; only the first caller gets it
    pub fn take_clicks(&self) -> Option<mpsc::UnboundedReceiver<ClickEvent>> {
        self.clicks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Route a click to the project's view, refreshing its files first
    pub async fn handle_click(&self, click: &ClickEvent) -> Result<ProjectTab, MonitorError> {
        let project = self.ctx.refresh_files(&click.project).await?;
        Ok(ProjectTab {
            project,
            category: click.category,
        })
    }

    /// Disarm every timer
    pub fn shutdown(&self) {
        self.scheduler.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditOutput;
    use crate::audit::runner::MockAuditRunner;
    use crate::monitor::extract::MockFileExtractor;
    use crate::monitor::notifier::MockNotificationSink;
    use crate::monitor::project::ExtractedFiles;
    use crate::monitor::store::MockProjectStore;
    use crate::version::registry::{MockRegistry, MockReleaseHost};

    const ADVISORY: &str = r#"{"type":"auditAdvisory","data":{"advisory":{"title":"ReDoS","severity":"high","module_name":"ms","patched_versions":">=2.0.0","url":"https://npmjs.com/advisories/46","findings":[{"version":"0.7.0","paths":["debug>ms"]}]}}}"#;

    fn context(store: MockProjectStore, notifier: MockNotificationSink) -> MonitorContext {
        let mut extractor = MockFileExtractor::new();
        extractor
            .expect_read_project_files()
            .returning(|_| ExtractedFiles::default());

        let mut auditor = MockAuditRunner::new();
        auditor.expect_run_audit().returning(|_| {
            Ok(AuditOutput {
                stdout: ADVISORY.to_string(),
                stderr: String::new(),
                exit_code: Some(4),
            })
        });

        let (clicks, _) = mpsc::unbounded_channel();
        let ctx = MonitorContext {
            projects: Mutex::new(IndexMap::new()),
            save_lock: Mutex::new(()),
            deps: MonitorDeps {
                store: Arc::new(store),
                extractor: Arc::new(extractor),
                lookup: PackageLookup::new(
                    Arc::new(MockRegistry::new()),
                    Arc::new(MockReleaseHost::new()),
                ),
                auditor: Arc::new(auditor),
                notifier: Arc::new(notifier),
                icon: None,
            },
            clicks,
        };
        ctx.lock_projects()
            .insert("web".to_string(), Project::new("web", "/work/web"));
        ctx
    }

    fn notified(projects: &[Project]) -> bool {
        projects[0]
            .notifications
            .get(Category::Vulnerabilities)
            .last_notified_ms
            .is_some()
    }

    #[tokio::test]
    async fn run_check_notifies_when_findings_exist() {
        let mut store = MockProjectStore::new();
        store.expect_save().returning(|_| Ok(()));
        let mut notifier = MockNotificationSink::new();
        notifier
            .expect_notify()
            .withf(|n| n.category == Category::Vulnerabilities && n.project == "web")
            .times(1)
            .returning(|_| None);
        let ctx = context(store, notifier);
        let (_cancel, signal) = CancelSignal::channel();

        ctx.run_check("web", Category::Vulnerabilities, &signal).await;
    }

    #[tokio::test]
    async fn run_check_does_not_notify_when_cancelled_while_saving() {
        let (cancel, signal) = CancelSignal::channel();
        let mut store = MockProjectStore::new();
        store.expect_save().returning(move |projects| {
            if notified(projects) {
                let _ = cancel.send(true);
            }
            Ok(())
        });
        let mut notifier = MockNotificationSink::new();
        notifier.expect_notify().never();
        let ctx = context(store, notifier);

        ctx.run_check("web", Category::Vulnerabilities, &signal).await;

        assert!(signal.is_cancelled());
    }
}
