use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::monitor::error::StoreError;
use crate::monitor::project::Project;

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: updated_at column
    &["ALTER TABLE projects ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0"],
];

/// Trait for persisting the full project list
#[cfg_attr(test, automock)]
pub trait ProjectStore: Send + Sync {
    /// Projects in their saved order
    fn load(&self) -> Result<Vec<Project>, StoreError>;

    /// Replace the saved list with `projects`
    fn save(&self, projects: &[Project]) -> Result<(), StoreError>;
}

/// Project list stored as one JSON document per row
pub struct SqliteProjectStore {
    conn: Mutex<Connection>,
}

impl SqliteProjectStore {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Initializing project database at {:?}", db_path);

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        Ok(store)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                name TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                data TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Project schema ready");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), StoreError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    match conn.execute(sql, []) {
                        Ok(_) => {}
                        Err(rusqlite::Error::SqliteFailure(_, Some(ref msg)))
                            if msg.contains("duplicate column name") =>
                        {
                            debug!("Column already exists, skipping: {}", sql);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
        }

        Ok(())
    }
}

impl ProjectStore for SqliteProjectStore {
    fn load(&self) -> Result<Vec<Project>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT name, data FROM projects ORDER BY position")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        // A corrupt row costs that project only
        let projects: Vec<Project> = rows
            .into_iter()
            .filter_map(|(name, data)| {
                serde_json::from_str(&data)
                    .inspect_err(|e| warn!("Skipping unreadable project {}: {}", name, e))
                    .ok()
            })
            .collect();

        debug!("Loaded {} projects", projects.len());
        Ok(projects)
    }

    fn save(&self, projects: &[Project]) -> Result<(), StoreError> {
        let rows = projects
            .iter()
            .map(|project| Ok((project.name.as_str(), serde_json::to_string(project)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;

        let now = Self::current_timestamp_ms();
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM projects", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO projects (name, position, data, updated_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, (name, data)) in rows.iter().enumerate() {
                stmt.execute((name, position as i64, data, now))?;
            }
        }

        tx.commit()?;
        debug!("Saved {} projects", projects.len());
        Ok(())
    }
}
