//! Runtime configuration
//!
//! Read from the environment once at startup and shared by the server and
//! the maintenance binaries.

use std::path::{Path, PathBuf};

use crate::db::connection::DEFAULT_POOL_SIZE;
use crate::db::{Database, DbResult};

pub const DATABASE_PATH_VAR: &str = "NUTRIPLAN_DATABASE_PATH";
pub const POOL_SIZE_VAR: &str = "NUTRIPLAN_POOL_SIZE";
pub const DATABASE_FILE_NAME: &str = "nutriplan.db";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(DATABASE_PATH_VAR).ok(),
            std::env::var(POOL_SIZE_VAR).ok(),
        )
    }

    fn from_vars(database_path: Option<String>, pool_size: Option<String>) -> Self {
        let database_path = database_path
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let pool_size = match pool_size.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(value = raw, "ignoring invalid {}", POOL_SIZE_VAR);
                    DEFAULT_POOL_SIZE
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        Self { database_path, pool_size }
    }

    /// Open the configured database with the configured pool size
    pub fn open_database(&self) -> DbResult<Database> {
        Database::with_pool_size(&self.database_path, self.pool_size)
    }
}

/// `data/nutriplan.db` under the project root, found relative to the executable
pub fn default_database_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    database_path_for_exe_dir(&exe_dir)
}

fn database_path_for_exe_dir(exe_dir: &Path) -> PathBuf {
    let mut path = exe_dir.to_path_buf();

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(Path::parent) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push(DATABASE_FILE_NAME);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let config = Config::from_vars(Some("/tmp/plan.db".to_string()), None);
        assert_eq!(config.database_path, PathBuf::from("/tmp/plan.db"));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_pool_size_parsing() {
        assert_eq!(Config::from_vars(None, Some(" 4 ".to_string())).pool_size, 4);
        assert_eq!(Config::from_vars(None, Some("0".to_string())).pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(Config::from_vars(None, Some("many".to_string())).pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_default_path_walks_out_of_target() {
        let path = database_path_for_exe_dir(Path::new("/work/nutriplan/target/release"));
        assert_eq!(path, PathBuf::from("/work/nutriplan/data/nutriplan.db"));

        let path = database_path_for_exe_dir(Path::new("/opt/nutriplan/bin"));
        assert_eq!(path, PathBuf::from("/opt/nutriplan/bin/data/nutriplan.db"));
    }

    #[test]
    fn test_blank_path_falls_back_to_default() {
        let config = Config::from_vars(Some("  ".to_string()), None);
        assert!(config.database_path.ends_with("data/nutriplan.db"));
    }

    #[test]
    fn test_open_database_uses_pool_size() {
        let path = std::env::temp_dir().join(format!("nutriplan-config-{}.db", std::process::id()));
        let config = Config { database_path: path.clone(), pool_size: 3 };

        let db = config.open_database().unwrap();
        assert_eq!(db.max_size(), 3);

        drop(db);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
