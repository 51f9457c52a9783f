use crate::core::error::JerjerrodError;
use std::path::PathBuf;

pub fn get_config_directory() -> Result<PathBuf, JerjerrodError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".config")),
        "macos" => dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Application Support"),
        _ => dirs::config_dir().ok_or(JerjerrodError::CacheDirectoryNotFound)?,
    };

    Ok(base.join("jerjerrod"))
}

pub fn get_cache_directory() -> Result<PathBuf, JerjerrodError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".cache")),
        "macos" => dirs::home_dir().unwrap_or_default().join("Library/Caches"),
        _ => dirs::cache_dir().ok_or(JerjerrodError::CacheDirectoryNotFound)?,
    };

    Ok(base.join("jerjerrod"))
}

/// Location of the user's `jerjerrod.conf`
pub fn get_config_file() -> Result<PathBuf, JerjerrodError> {
    Ok(get_config_directory()?.join("jerjerrod.conf"))
}

/// Location of the "not today" ignore list
pub fn get_ignore_file() -> Result<PathBuf, JerjerrodError> {
    Ok(get_config_directory()?.join("ignore.json"))
}
