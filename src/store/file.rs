use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::error::{Result, TaskError};
use crate::models::{Task, TaskId};
use crate::store::codec::{self, CodecError};

/// Flat-file task store
///
/// Owns the backing file: every load reads the whole file, every save
/// replaces the whole file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record, creating an empty backing file if none exists
    ///
    /// Stops at the first malformed line. A repeated id counts as malformed.
    pub fn load(&self) -> Result<Vec<Task>> {
        self.ensure_exists()?;

        let bytes = fs::read(&self.path).map_err(|e| TaskError::io(&self.path, e))?;

        let mut tasks = Vec::new();
        let mut seen = HashSet::new();
        for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            let line_no = index + 1;
            let decoded = std::str::from_utf8(raw)
                .map_err(|e| CodecError::BadEncoding(e.valid_up_to()))
                .and_then(codec::decode);
            let task = match decoded {
                Ok(Some(task)) => task,
                Ok(None) => continue,
                Err(source) => return Err(TaskError::MalformedRecord { line: line_no, source }),
            };
            if !seen.insert(task.id) {
                return Err(TaskError::MalformedRecord {
                    line: line_no,
                    source: CodecError::BadId(format!("{} (duplicate)", task.id)),
                });
            }
            tasks.push(task);
        }

        debug!("Loaded {} task(s) from {}", tasks.len(), self.path.display());
        Ok(tasks)
    }

    /// Replace the backing file with `tasks`
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        self.stage(tasks)?.commit()
    }

    /// Write `tasks` to a temporary file next to the backing file
    ///
    /// Nothing is visible to [`Store::load`] until [`StagedSave::commit`] runs.
    pub fn stage(&self, tasks: &[Task]) -> Result<StagedSave> {
        let target = self.resolve_target()?;
        let dir = parent_dir(&target);
        fs::create_dir_all(&dir).map_err(|e| TaskError::io(&dir, e))?;

        let mut temp = tempfile::Builder::new()
            .prefix(".tdl-")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| TaskError::io(&dir, e))?;

        // Keep the existing file's mode
        if let Ok(meta) = fs::metadata(&target) {
            temp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| TaskError::io(temp.path(), e))?;
        }

        let mut content = String::new();
        for task in tasks {
            content.push_str(&codec::encode(task));
            content.push('\n');
        }
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| TaskError::io(temp.path(), e))?;

        Ok(StagedSave {
            temp,
            target,
            count: tasks.len(),
        })
    }

    /// The file a save must replace
    ///
    /// A symlinked backing file is followed so the rename lands on the link
    /// target and the link itself survives.
    fn resolve_target(&self) -> Result<PathBuf> {
        match fs::symlink_metadata(&self.path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let resolved = fs::canonicalize(&self.path).map_err(|e| TaskError::io(&self.path, e))?;
                debug!("{} resolves to {}", self.path.display(), resolved.display());
                Ok(resolved)
            }
            _ => Ok(self.path.clone()),
        }
    }

    fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        let dir = parent_dir(&self.path);
        fs::create_dir_all(&dir).map_err(|e| TaskError::io(&dir, e))?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TaskError::io(&self.path, e))?;
        debug!("Created empty task file {}", self.path.display());
        Ok(())
    }
}

/// A fully written snapshot waiting to be renamed over the backing file
///
/// Dropping it without calling [`StagedSave::commit`] removes the temp file
/// and leaves the backing file as it was.
#[derive(Debug)]
pub struct StagedSave {
    temp: NamedTempFile,
    target: PathBuf,
    count: usize,
}

impl StagedSave {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Atomically move the snapshot into place
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| TaskError::io(&target, e.error))?;
        debug!("Saved {} task(s) to {}", self.count, target.display());
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Smallest positive id not used by any task
pub fn next_id(tasks: &[Task]) -> Result<TaskId> {
    let used: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();
    (1..=TaskId::MAX)
        .find(|id| !used.contains(id))
        .ok_or(TaskError::IdsExhausted)
}
