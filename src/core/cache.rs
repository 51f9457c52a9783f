//! Disk-backed, path-keyed result cache with lazy TTL eviction.
//!
//! Every key maps to one JSON file in the cache directory. The file's
//! modification time is the entry's timestamp: a read with a `max_age` shorter
//! than the entry's age deletes the file and reports a miss, so revisited keys
//! never accumulate stale data. Unreadable or corrupt entries are misses too.
//!
//! # Public API
//! - [`ResultCache`]: get/set/clear of arbitrary serde values plus the
//!   "not today" ignore list
//! - [`cache_file_name`]: key sanitization used for file names
//! - Expiry constants shared by [`crate::core::repo::Repo`]
//!
//! Writes go to a temporary file in the cache directory and are renamed into
//! place, so readers only ever observe whole entries.

use crate::core::{
    clock::{Clock, SystemClock},
    dirs::{get_cache_directory, get_ignore_file},
    error::{JerjerrodError, Result},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Re-check projects on the hour
pub const PROJECT_EXPIRY: Duration = Duration::from_secs(60 * 60);
/// Only re-check expensive outgoing status every 4 hours
pub const OUTGOING_EXPIRY: Duration = Duration::from_secs(4 * 60 * 60);
/// Read any entry regardless of age, for stale fallbacks
pub const STALE_EXPIRY: Duration = Duration::MAX;

/// Suffix appended to a repo path to key its outgoing status
pub const OUTGOING_SUFFIX: &str = "...outgoing";

const ENCODED_PREFIX: char = '%';
const DIGEST_PREFIX: char = '#';

/// Longest file name most filesystems accept
pub const MAX_FILE_NAME: usize = 255;

/// Convert a logical key into a file name without path separators.
///
/// Keys without a `:` have their `/` mapped to `:`. Anything else is encoded
/// whole as URL-safe base64 behind a `%` marker, which a plain key can never
/// start with, so distinct keys always get distinct names. Names that would
/// exceed [`MAX_FILE_NAME`] become an md5 digest of the key behind a `#`.
pub fn cache_file_name(key: &str) -> String {
    let needs_encoding = key.is_empty()
        || key.contains(':')
        || key.starts_with(ENCODED_PREFIX)
        || key.starts_with(DIGEST_PREFIX)
        || key == "."
        || key == "..";

    let name = if needs_encoding {
        format!("{ENCODED_PREFIX}{}", URL_SAFE_NO_PAD.encode(key.as_bytes()))
    } else {
        key.replace('/', ":")
    };

    if name.len() > MAX_FILE_NAME {
        format!("{DIGEST_PREFIX}{:x}", md5::compute(key.as_bytes()))
    } else {
        name
    }
}

/// Key for a filesystem path. A path that isn't valid UTF-8 is keyed by its
/// raw bytes, base64-encoded behind the `%` marker (absolute paths never
/// start with one).
pub fn path_key(path: &Path) -> String {
    match path.to_str() {
        Some(text) => text.to_string(),
        None => format!(
            "{ENCODED_PREFIX}{}",
            URL_SAFE_NO_PAD.encode(path.as_os_str().as_encoded_bytes())
        ),
    }
}

/// Key under which a repo's outgoing status is cached
pub fn outgoing_key(repo_path: &str) -> String {
    format!("{repo_path}{OUTGOING_SUFFIX}")
}

/// A cached value together with its age
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub age: Duration,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.age <= max_age
    }
}

#[derive(Clone)]
pub struct ResultCache {
    dir: PathBuf,
    ignore_file: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("dir", &self.dir)
            .field("ignore_file", &self.ignore_file)
            .finish()
    }
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>, ignore_file: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ignore_file: ignore_file.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Cache rooted in the user's XDG cache directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(get_cache_directory()?, get_ignore_file()?))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// A cache sharing this one's clock and ignore list, storing its entries
    /// in a subdirectory
    pub fn subcache(&self, name: &str) -> Self {
        Self {
            dir: self.dir.join(name),
            ignore_file: self.ignore_file.clone(),
            clock: Arc::clone(&self.clock),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(cache_file_name(key))
    }

    /// Age of the entry at `path`, or `None` if there isn't one
    fn age_of(&self, key: &str, path: &Path) -> Option<Duration> {
        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                log::debug!("Cache miss for {key}: {e}");
                return None;
            }
        };
        // an mtime in the future counts as brand new
        Some(
            self.clock
                .now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    fn load<T: DeserializeOwned>(&self, key: &str, path: &Path) -> Option<T> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read cache file '{}': {e}", path.display());
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => {
                log::debug!("Cache hit for {key}");
                Some(value)
            }
            Err(e) => {
                log::warn!("Discarding corrupt cache file '{}': {e}", path.display());
                remove_quietly(path);
                None
            }
        }
    }

    /// The value stored under `key`, unless it is older than `max_age`, in
    /// which case the entry is deleted
    pub fn get<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Option<T> {
        let path = self.entry_path(key);
        let age = self.age_of(key, &path)?;

        if age > max_age {
            log::debug!("Cache entry for {key} expired, removing {}", path.display());
            remove_quietly(&path);
            return None;
        }

        self.load(key, &path)
    }

    /// Read an entry of any age without evicting it
    pub fn peek<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let path = self.entry_path(key);
        let age = self.age_of(key, &path)?;
        let value = self.load(key, &path)?;
        Some(CacheEntry { value, age })
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let data =
            serde_json::to_vec(value).map_err(JerjerrodError::cache_serialization_failed)?;
        let path = self.entry_path(key);
        write_atomic(&self.dir, &path, &data)?;
        log::debug!("Cached {key} at {}", path.display());
        Ok(())
    }

    pub fn clear(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Cleared cache entry {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Project paths the user asked not to hear about until tomorrow
    pub fn ignore_list(&self) -> BTreeSet<String> {
        let modified = match fs::metadata(&self.ignore_file).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return BTreeSet::new(),
        };

        if modified < self.clock.start_of_today() {
            log::debug!("Ignore list predates today, removing it");
            remove_quietly(&self.ignore_file);
            return BTreeSet::new();
        }

        fs::read_to_string(&self.ignore_file)
            .ok()
            .and_then(|content| serde_json::from_str::<Vec<String>>(&content).ok())
            .map(|names| names.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn set_ignore_list(&self, paths: &BTreeSet<String>) -> Result<()> {
        let things: Vec<&str> = paths.iter().map(String::as_str).collect();
        let data =
            serde_json::to_vec(&things).map_err(JerjerrodError::cache_serialization_failed)?;
        let dir = self
            .ignore_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.dir.clone());
        write_atomic(&dir, &self.ignore_file, &data)
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::debug!("Could not remove '{}': {e}", path.display());
    }
}

fn write_atomic(dir: &Path, path: &Path, data: &[u8]) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| JerjerrodError::cache_directory_creation_failed(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| JerjerrodError::cache_write_failed(path, e))?;
    tmp.write_all(data)
        .map_err(|e| JerjerrodError::cache_write_failed(path, e))?;
    tmp.persist(path)
        .map_err(|e| JerjerrodError::cache_write_failed(path, e.error))?;
    Ok(())
}
