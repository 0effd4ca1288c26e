//! Versioned, file-backed state container.
//!
//! A [`PersistStore`] owns one state value, remembers which schema version it
//! was loaded at, runs the state's migration hook once on open, and writes
//! the state back as a TOML envelope when asked to flush after a mutation was
//! marked.

use crate::core::config::path_display;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// State that can live inside a [`PersistStore`].
pub trait PersistedState: Serialize + DeserializeOwned + Default + Clone {
    /// Namespace key; also the default file stem.
    const NAME: &'static str;
    /// Schema version written with every flush.
    const VERSION: f64;
    /// Whatever the migration hook needs beyond the state itself.
    type MigrationContext;

    /// Bring `state`, persisted at `from_version`, up to [`Self::VERSION`].
    fn migrate(state: Self, from_version: f64, context: &Self::MigrationContext) -> Self;
}

#[derive(Serialize, Deserialize)]
#[serde(bound(deserialize = "S: DeserializeOwned + Default"))]
struct Envelope<S> {
    #[serde(default)]
    version: f64,
    #[serde(default)]
    last_update: i64,
    #[serde(default)]
    state: S,
}

#[derive(Debug)]
pub enum PersistError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Serialize {
        name: &'static str,
        source: toml::ser::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Read { path, source } => {
                write!(f, "Failed to read store at {}: {}", path_display(path), source)
            }
            PersistError::Parse { path, source } => {
                write!(f, "Failed to parse store at {}: {}", path_display(path), source)
            }
            PersistError::Serialize { name, source } => {
                write!(f, "Failed to serialize store '{}': {}", name, source)
            }
            PersistError::Write { path, source } => {
                write!(f, "Failed to write store at {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for PersistError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PersistError::Read { source, .. } => Some(source),
            PersistError::Parse { source, .. } => Some(source),
            PersistError::Serialize { source, .. } => Some(source),
            PersistError::Write { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Box<dyn FnMut(&S)>;

pub struct PersistStore<S: PersistedState> {
    path: Option<PathBuf>,
    state: S,
    version: f64,
    last_update: i64,
    dirty: bool,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
    next_subscription: u64,
}

impl<S: PersistedState> PersistStore<S> {
    /// Container with no backing file; flushes are no-ops.
    pub fn in_memory() -> Self {
        Self::from_state(None, S::default(), false)
    }

    /// Wrap an already-built state without touching disk.
    pub fn with_state(state: S) -> Self {
        Self::from_state(None, state, false)
    }

    /// Load the state stored at `path`, migrating it if it is older than [`PersistedState::VERSION`].
    ///
    /// A missing file yields the default state, flagged dirty so the first
    /// flush creates it.
    pub fn open(
        path: impl Into<PathBuf>,
        context: &S::MigrationContext,
    ) -> Result<Self, PersistError> {
        let path = path.into();
        if !path.exists() {
            debug!(store = S::NAME, path = %path_display(&path), "No persisted state; starting fresh");
            return Ok(Self::from_state(Some(path), S::default(), true));
        }

        let contents = fs::read_to_string(&path).map_err(|source| PersistError::Read {
            path: path.clone(),
            source,
        })?;
        let envelope: Envelope<S> =
            toml::from_str(&contents).map_err(|source| PersistError::Parse {
                path: path.clone(),
                source,
            })?;

        let mut store = Self::from_state(Some(path), envelope.state, false);
        store.last_update = envelope.last_update;

        if envelope.version < S::VERSION {
            info!(
                store = S::NAME,
                from = envelope.version,
                to = S::VERSION,
                "Migrating persisted state"
            );
            store.state = S::migrate(store.state, envelope.version, context);
            store.mark_update();
        } else if envelope.version > S::VERSION {
            warn!(
                store = S::NAME,
                found = envelope.version,
                supported = S::VERSION,
                "Persisted state was written by a newer version; loading as-is"
            );
            store.version = envelope.version;
        }

        Ok(store)
    }

    fn from_state(path: Option<PathBuf>, state: S, dirty: bool) -> Self {
        Self {
            path,
            state,
            version: S::VERSION,
            last_update: 0,
            dirty,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn get(&self) -> &S {
        &self.state
    }

    /// Mutate the state in place and notify subscribers.
    ///
    /// This does not mark the state for persistence; call [`Self::mark_update`].
    pub fn set<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut S),
    {
        updater(&mut self.state);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }

    /// Request a durable write on the next flush.
    pub fn mark_update(&mut self) {
        self.last_update = Utc::now().timestamp_millis();
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_update(&self) -> i64 {
        self.last_update
    }

    pub fn version(&self) -> f64 {
        self.version
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the state if it is dirty and file-backed. Returns whether anything was written.
    pub fn flush(&mut self) -> Result<bool, PersistError> {
        if !self.dirty {
            return Ok(false);
        }
        let Some(path) = self.path.clone() else {
            self.dirty = false;
            return Ok(false);
        };

        let envelope = Envelope {
            version: self.version,
            last_update: self.last_update,
            state: self.state.clone(),
        };
        let contents =
            toml::to_string_pretty(&envelope).map_err(|source| PersistError::Serialize {
                name: S::NAME,
                source,
            })?;
        write_atomically(&path, contents.as_bytes())
            .map_err(|source| PersistError::Write { path: path.clone(), source })?;

        self.dirty = false;
        info!(store = S::NAME, path = %path_display(&path), "Flushed state");
        Ok(true)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&S) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }
}

/// Write `contents` to a temp file next to `path`, sync it, then rename it into place.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir)?;
    }

    let mut temp_file = match parent {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    temp_file.write_all(contents)?;
    temp_file.as_file_mut().sync_all()?;
    temp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
