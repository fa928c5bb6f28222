//! File-backed storage scope.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, trace};

use timeclock_core::error::{Error, StorageError};
use timeclock_core::{KeyValueScope, Result, Scope};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

type Entries = BTreeMap<String, String>;

/// A storage scope persisted as a JSON object in one file.
///
/// Reads take a shared lock and writes an exclusive one, so two processes
/// sharing the file never observe a half-written token. On Unix the file is
/// created with `0600` permissions.
#[derive(Debug, Clone)]
pub struct FileScope {
    path: PathBuf,
    scope: Scope,
}

impl FileScope {
    pub fn new(path: impl AsRef<Path>, scope: Scope) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            scope,
        }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> Error {
        StorageError::Io {
            scope: self.scope.to_string(),
            message: format!("{}: {}", self.path.display(), err),
        }
        .into()
    }

    fn parse(&self, contents: &str) -> Result<Entries> {
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(contents).map_err(|e| {
            StorageError::Corrupt {
                scope: self.scope.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn load(&self) -> Result<Entries> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        FileExt::lock_shared(&file).map_err(|e| self.io_error(e))?;
        let mut contents = String::new();
        let read = file.read_to_string(&mut contents);
        FileExt::unlock(&file).map_err(|e| self.io_error(e))?;
        read.map_err(|e| self.io_error(e))?;

        self.parse(&contents)
    }

    /// Apply a mutation under an exclusive lock held across read and write.
    fn update(&self, mutate: impl FnOnce(&mut Entries)) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).map_err(|e| self.io_error(e))?;
        FileExt::lock_exclusive(&file).map_err(|e| self.io_error(e))?;
        let result = self.rewrite(&mut file, mutate);
        FileExt::unlock(&file).map_err(|e| self.io_error(e))?;
        result
    }

    fn rewrite(&self, file: &mut File, mutate: impl FnOnce(&mut Entries)) -> Result<()> {
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| self.io_error(e))?;
        let mut entries = self.parse(&contents)?;

        mutate(&mut entries);

        let json = serde_json::to_string_pretty(&entries).map_err(|e| StorageError::Corrupt {
            scope: self.scope.to_string(),
            message: e.to_string(),
        })?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| self.io_error(e))?;
        file.set_len(0).map_err(|e| self.io_error(e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| self.io_error(e))?;
        file.sync_data().map_err(|e| self.io_error(e))?;

        trace!(path = %self.path.display(), entries = entries.len(), "Rewrote scope file");
        Ok(())
    }
}

impl KeyValueScope for FileScope {
    fn scope(&self) -> Scope {
        self.scope
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(scope = %self.scope, key, "Writing scope entry");
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
