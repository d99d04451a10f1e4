use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DEVKIT_DIR: &str = ".devkit";
pub const CONFIG_FILE: &str = ".devkit/config.yaml";

pub const DEFAULT_MIGRATIONS_DIR: &str = "src/config/migrations";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the migrations directory. Relative `dir` values are taken from `root`.
pub fn migrations_dir(root: &Path, dir: &str) -> PathBuf {
    root.join(dir)
}

pub fn migration_path(root: &Path, dir: &str, file_name: &str) -> PathBuf {
    migrations_dir(root, dir).join(file_name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.devkit/config.yaml")
        );
        assert_eq!(
            migration_path(root, DEFAULT_MIGRATIONS_DIR, "20240101000000_AddIndex.php"),
            PathBuf::from("/tmp/proj/src/config/migrations/20240101000000_AddIndex.php")
        );
    }

    #[test]
    fn absolute_migrations_dir_is_kept() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            migrations_dir(root, "/var/migrations"),
            PathBuf::from("/var/migrations")
        );
    }
}
