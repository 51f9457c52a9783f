//! The `jerjerrod.conf` file.
//!
//! One directive per line, `#` comments and blank lines ignored:
//!
//! ```text
//! WORKSPACE ~/src/* IGNORE=node_modules IGNORE=.venv
//! PROJECT "$HOME/my dotfiles" SPOTLIGHT
//! FORGET ~/src/old-thing
//! ```
//!
//! The path argument may be double-quoted; `~` and `$VAR` / `${VAR}` are
//! expanded. Glob patterns are validated here but expanded by the
//! enumerator.

use crate::core::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// How often [`ConfigCache`] looks at the config file's mtime
pub const CONFIG_CHECK_INTERVAL: Duration = Duration::from_secs(3);

const IGNORE_FLAG: &str = "IGNORE=";
const SPOTLIGHT_FLAG: &str = "SPOTLIGHT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Workspace { pattern: String, ignore: Vec<String> },
    Project { pattern: String, spotlight: bool },
    Forget { path: String },
}

pub fn parse_config(text: &str) -> std::result::Result<Vec<Directive>, ConfigError> {
    parse_config_with(text, dirs::home_dir().as_deref(), |name| {
        std::env::var(name).ok()
    })
}

/// [`parse_config`] with an explicit home directory and variable lookup
pub fn parse_config_with<F>(
    text: &str,
    home: Option<&Path>,
    lookup: F,
) -> std::result::Result<Vec<Directive>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut directives = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        directives.push(parse_line(index + 1, line, home, &lookup)?);
    }

    Ok(directives)
}

fn parse_line<F>(
    number: usize,
    line: &str,
    home: Option<&Path>,
    lookup: &F,
) -> std::result::Result<Directive, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let invalid = || ConfigError::InvalidLine {
        line: number,
        text: line.to_string(),
    };

    let (keyword, remaining) = line.split_once(' ').ok_or_else(invalid)?;
    let remaining = remaining.trim_start();

    let (raw_path, rest) = if let Some(quoted) = remaining.strip_prefix('"') {
        let end = quoted.find('"').ok_or_else(invalid)?;
        (&quoted[..end], &quoted[end + 1..])
    } else {
        let end = remaining.find(char::is_whitespace).unwrap_or(remaining.len());
        (&remaining[..end], &remaining[end..])
    };
    if raw_path.is_empty() {
        return Err(invalid());
    }

    let path = expand_path(raw_path, home, lookup);
    let flags: Vec<&str> = rest.split_whitespace().collect();
    let bad_flag = |flag: &str| ConfigError::InvalidFlag {
        line: number,
        flag: flag.to_string(),
    };

    match keyword {
        "WORKSPACE" => {
            validate_glob(number, &path)?;
            let mut ignore = Vec::new();
            for flag in flags {
                match flag.strip_prefix(IGNORE_FLAG) {
                    Some(name) if !name.is_empty() => ignore.push(name.to_string()),
                    _ => return Err(bad_flag(flag)),
                }
            }
            Ok(Directive::Workspace {
                pattern: path,
                ignore,
            })
        }
        "PROJECT" => {
            validate_glob(number, &path)?;
            let mut spotlight = false;
            for flag in flags {
                if flag != SPOTLIGHT_FLAG {
                    return Err(bad_flag(flag));
                }
                spotlight = true;
            }
            Ok(Directive::Project {
                pattern: path,
                spotlight,
            })
        }
        "FORGET" => match flags.first() {
            Some(flag) => Err(bad_flag(flag)),
            None => Ok(Directive::Forget { path }),
        },
        _ => Err(ConfigError::UnknownKeyword {
            line: number,
            keyword: keyword.to_string(),
        }),
    }
}

fn validate_glob(number: usize, pattern: &str) -> std::result::Result<(), ConfigError> {
    glob::Pattern::new(pattern)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidGlob {
            line: number,
            pattern: pattern.to_string(),
        })
}

/// Expand `$VAR`, `${VAR}` and a leading `~`; unknown variables are left as
/// written
pub fn expand_path<F>(raw: &str, home: Option<&Path>, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let expanded = expand_vars(raw, lookup);

    match (home, expanded.strip_prefix('~')) {
        (Some(home), Some(rest)) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{rest}", home.display())
        }
        _ => expanded,
    }
}

fn expand_vars<F>(raw: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let is_name_char = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after.find(|c| !is_name_char(c)).unwrap_or(after.len());
            (&after[..end], end)
        };

        match lookup(name).filter(|_| !name.is_empty()) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[dollar..dollar + 1 + consumed]),
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}

/// Read and parse the config file; a missing file declares nothing
pub fn load_config(path: &Path) -> Result<Vec<Directive>> {
    if !path.exists() {
        log::debug!("No config file at {}", path.display());
        return Ok(Vec::new());
    }

    let text = std::fs::read_to_string(path)?;
    Ok(parse_config(&text)?)
}

#[derive(Debug)]
struct Loaded {
    mtime: Option<SystemTime>,
    checked_at: Instant,
    directives: Vec<Directive>,
}

/// Config directives kept in memory for a long-running process, reparsed
/// only when the file's mtime changes
#[derive(Debug)]
pub struct ConfigCache {
    path: PathBuf,
    check_interval: Duration,
    loaded: Option<Loaded>,
    generation: u64,
}

impl ConfigCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            check_interval: CONFIG_CHECK_INTERVAL,
            loaded: None,
            generation: 0,
        }
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bumped every time the file is (re)parsed; 0 before the first load
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn mtime(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
    }

    pub fn directives(&mut self) -> Result<&[Directive]> {
        let reload = match &mut self.loaded {
            None => true,
            Some(loaded) if loaded.checked_at.elapsed() < self.check_interval => false,
            Some(loaded) => {
                let mtime = std::fs::metadata(&self.path)
                    .and_then(|meta| meta.modified())
                    .ok();
                loaded.checked_at = Instant::now();
                mtime != loaded.mtime
            }
        };

        if reload {
            log::debug!("Loading config from {}", self.path.display());
            let mtime = self.mtime();
            let directives = load_config(&self.path)?;
            self.loaded = Some(Loaded {
                mtime,
                checked_at: Instant::now(),
                directives,
            });
            self.generation += 1;
        }

        Ok(self
            .loaded
            .as_ref()
            .map(|loaded| loaded.directives.as_slice())
            .unwrap_or_default())
    }
}
