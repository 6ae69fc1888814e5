// src/infra/paths.rs — Config and state path management
//
// All paths respect the CATG_HOME environment variable for isolation.
// When CATG_HOME is set, config and state live under that directory.
// When unset, they live under ~/.catg/.

use std::path::PathBuf;

/// Returns the CATG_HOME override, if set.
fn catg_home() -> Option<PathBuf> {
    std::env::var_os("CATG_HOME").map(PathBuf::from)
}

/// Configuration directory: $CATG_HOME/ or ~/.catg/
pub fn config_dir() -> PathBuf {
    if let Some(home) = catg_home() {
        return home;
    }
    dirs_home().join(".catg")
}

/// Home directory, falling back to the current directory when none is known.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// State directory: ~/.catg/state/ (current-session.json, session-history.jsonl)
pub fn state_dir() -> PathBuf {
    config_dir().join("state")
}

/// Lock file guarding a working directory: a sibling named `<dir>.lock`.
pub fn lock_path_for(work_dir: &std::path::Path) -> PathBuf {
    let mut name = work_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "workspace".into());
    name.push(".lock");
    work_dir.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_lock_path_is_sibling() {
        let lock = lock_path_for(Path::new("/tmp/run/catg_tmp"));
        assert_eq!(lock, PathBuf::from("/tmp/run/catg_tmp.lock"));
    }

    #[test]
    fn test_lock_path_relative() {
        assert_eq!(
            lock_path_for(Path::new("catg_tmp")),
            PathBuf::from("catg_tmp.lock")
        );
    }

    #[test]
    fn test_state_dir_under_config_dir() {
        assert!(state_dir().starts_with(config_dir()));
        assert_eq!(config_file_path().file_name().unwrap(), "config.toml");
    }
}
