//! Fakes for the monitor's collaborators

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use package_monitor::audit::{AuditError, AuditOutput, AuditRunner};
use package_monitor::monitor::{
    ClickEvent, ExtractedFiles, FileExtractor, Monitor, MonitorDeps, Notification,
    NotificationSink, Project, ProjectStore, StoreError,
};
use package_monitor::version::error::RegistryError;
use package_monitor::version::lookup::PackageLookup;
use package_monitor::version::registry::{Registry, ReleaseHost};
use package_monitor::version::types::{PackageMetadata, RepositoryRef};

/// Registry answering from a fixed table of latest versions
#[derive(Default)]
pub struct FakeRegistry {
    latest: Mutex<HashMap<String, String>>,
    fetches: AtomicUsize,
}

impl FakeRegistry {
    pub fn with_latest(self, package: &str, version: &str) -> Self {
        self.set_latest(package, version);
        self
    }

    pub fn set_latest(&self, package: &str, version: &str) {
        self.latest
            .lock()
            .unwrap()
            .insert(package.to_string(), version.to_string());
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn fetch_package(&self, package_name: &str) -> Result<PackageMetadata, RegistryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.latest.lock().unwrap().get(package_name) {
            Some(version) => Ok(PackageMetadata::new(Some(version.clone()), None)),
            None => Err(RegistryError::NotFound(package_name.to_string())),
        }
    }

    fn package_page_url(&self, package_name: &str) -> String {
        format!(
            "https://www.npmjs.com/package/{}?activeTab=versions",
            package_name
        )
    }
}

pub struct NoReleases;

#[async_trait]
impl ReleaseHost for NoReleases {
    async fn has_releases(&self, _repository: &RepositoryRef) -> Result<bool, RegistryError> {
        Ok(false)
    }
}

/// In-memory store recording every save
#[derive(Default)]
pub struct MemoryStore {
    projects: Mutex<Vec<Project>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
            ..Default::default()
        }
    }

    pub fn saved(&self) -> Vec<Project> {
        self.projects.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.saved())
    }

    fn save(&self, projects: &[Project]) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::LockPoisoned);
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.projects.lock().unwrap() = projects.to_vec();
        Ok(())
    }
}

/// File contents keyed by project directory
#[derive(Default)]
pub struct FakeExtractor {
    files: Mutex<HashMap<PathBuf, ExtractedFiles>>,
    reads: AtomicUsize,
}

impl FakeExtractor {
    pub fn set_files(&self, path: &Path, manifest: Option<&str>, lockfile: Option<&str>) {
        self.files.lock().unwrap().insert(
            path.to_path_buf(),
            ExtractedFiles {
                manifest: manifest.map(str::to_string),
                lockfile: lockfile.map(str::to_string),
            },
        );
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileExtractor for FakeExtractor {
    async fn read_project_files(&self, project_path: &Path) -> ExtractedFiles {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(project_path)
            .cloned()
            .unwrap_or_default()
    }
}

/// Audit runner replaying a canned output
#[derive(Default)]
pub struct FakeAuditRunner {
    output: Mutex<AuditOutput>,
}

impl FakeAuditRunner {
    pub fn set_stdout(&self, stdout: &str, exit_code: i32) {
        *self.output.lock().unwrap() = AuditOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(exit_code),
        };
    }
}

#[async_trait]
impl AuditRunner for FakeAuditRunner {
    async fn run_audit(&self, _project_path: &Path) -> Result<AuditOutput, AuditError> {
        Ok(self.output.lock().unwrap().clone())
    }
}

/// Records notifications and optionally "clicks" each one
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    click: AtomicBool,
}

impl RecordingNotifier {
    pub fn clicking(self) -> Self {
        self.click.store(true, Ordering::SeqCst);
        self
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Option<ClickEvent> {
        self.sent.lock().unwrap().push(notification.clone());
        self.click
            .load(Ordering::SeqCst)
            .then(|| notification.click())
    }
}

pub fn advisory_line(title: &str, severity: &str, package: &str, path: &str) -> String {
    serde_json::json!({
        "type": "auditAdvisory",
        "data": { "advisory": {
            "title": title,
            "severity": severity,
            "module_name": package,
            "patched_versions": ">=9.9.9",
            "url": "https://github.com/advisories/GHSA-test",
            "findings": [{ "version": "1.0.0", "paths": [path] }]
        }}
    })
    .to_string()
}

/// A monitor wired to fakes, plus a scratch directory for project folders
pub struct TestMonitor {
    pub monitor: Monitor,
    pub registry: Arc<FakeRegistry>,
    pub store: Arc<MemoryStore>,
    pub extractor: Arc<FakeExtractor>,
    pub auditor: Arc<FakeAuditRunner>,
    pub notifier: Arc<RecordingNotifier>,
    pub workspace: TempDir,
}

impl TestMonitor {
    pub fn new() -> Self {
        Self::build(MemoryStore::default(), RecordingNotifier::default())
    }

    pub fn build(store: MemoryStore, notifier: RecordingNotifier) -> Self {
        let registry = Arc::new(FakeRegistry::default());
        let store = Arc::new(store);
        let extractor = Arc::new(FakeExtractor::default());
        let auditor = Arc::new(FakeAuditRunner::default());
        let notifier = Arc::new(notifier);

        let monitor = Monitor::new(MonitorDeps {
            store: store.clone(),
            extractor: extractor.clone(),
            lookup: PackageLookup::new(registry.clone(), Arc::new(NoReleases)),
            auditor: auditor.clone(),
            notifier: notifier.clone(),
            icon: None,
        });

        Self {
            monitor,
            registry,
            store,
            extractor,
            auditor,
            notifier,
            workspace: TempDir::new().unwrap(),
        }
    }

    /// Create a project directory in the workspace and return its path
    pub fn project_dir(&self, name: &str) -> PathBuf {
        let path = self.workspace.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        path
    }
}
