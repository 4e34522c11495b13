use std::path::PathBuf;

/// Returns the user's home directory using common environment variables.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("COUNTDOWN_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(PathBuf::from)
        })
}

/// Returns the directory holding the default config and run logs.
pub fn data_dir() -> PathBuf {
    match home_dir() {
        Some(dir) => dir.join(".countdown"),
        None => PathBuf::from(".countdown"),
    }
}

/// Config file picked up when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    data_dir().join("config.yaml")
}
