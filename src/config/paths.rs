use std::path::PathBuf;

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_dir() -> PathBuf {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(base) => PathBuf::from(base).join("rdash"),
        None => home_dir().join(".config").join("rdash"),
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn cache_dir() -> PathBuf {
    match std::env::var_os("XDG_CACHE_HOME") {
        Some(base) => PathBuf::from(base).join("rdash"),
        None => home_dir().join(".cache").join("rdash"),
    }
}

pub fn state_dir() -> PathBuf {
    match std::env::var_os("XDG_STATE_HOME") {
        Some(base) => PathBuf::from(base).join("rdash"),
        None => home_dir().join(".local").join("state").join("rdash"),
    }
}

pub fn log_path() -> PathBuf {
    state_dir().join("rdash.log")
}
