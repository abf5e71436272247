//! Project model

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::monitor::priority::PrioritySet;

/// Kind of finding a project is monitored for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Outdated,
    Vulnerabilities,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Outdated, Category::Vulnerabilities];

    /// Returns the string representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Outdated => "outdated",
            Category::Vulnerabilities => "vulnerabilities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outdated" => Ok(Category::Outdated),
            "vulnerabilities" => Ok(Category::Vulnerabilities),
            _ => Err(()),
        }
    }
}

/// Last-read raw content of the files the analysis works from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractedFiles {
    /// package.json
    pub manifest: Option<String>,
    /// yarn.lock
    pub lockfile: Option<String>,
}

/// Notification configuration of one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategorySettings {
    /// Check period in seconds, 0 = disabled
    pub period_secs: u64,
    /// Epoch milliseconds of the last raised notification
    pub last_notified_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub outdated: CategorySettings,
    pub vulnerabilities: CategorySettings,
}

impl NotificationSettings {
    pub fn get(&self, category: Category) -> &CategorySettings {
        match category {
            Category::Outdated => &self.outdated,
            Category::Vulnerabilities => &self.vulnerabilities,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategorySettings {
        match category {
            Category::Outdated => &mut self.outdated,
            Category::Vulnerabilities => &mut self.vulnerabilities,
        }
    }
}

/// A locally checked-out project under monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub files: ExtractedFiles,
    #[serde(default)]
    pub priority: PrioritySet,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            files: ExtractedFiles::default(),
            priority: PrioritySet::default(),
            notifications: NotificationSettings::default(),
        }
    }

    /// Project named after the directory's base name
    pub fn from_dir(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Some(Self::new(name, path))
    }

    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Human-facing project name: `my-cool_app` -> `My Cool App`
pub fn display_name(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
