use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;

use crate::error::{Error, StoreError};
use crate::models::{RecurringTaskDefinition, Task};

/// Durable home of the tasks.
///
/// Implementations must run `update_tasks` as one indivisible
/// read-modify-write: no other update may interleave between the read that
/// `f` sees and the write of its result.
pub trait TaskStore: Send + Sync {
    /// Loads all tasks. A store that was never written is empty.
    fn load_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Runs `f` against the task list and persists the list only if `f`
    /// returns `Ok` and changed it.
    fn update_tasks<R, F>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<R, Error>;
}

/// Append-only home of the recurring definitions.
pub trait DefinitionStore: Send + Sync {
    /// Loads the definitions in the order they were appended.
    fn load_definitions(&self) -> Result<Vec<RecurringTaskDefinition>, StoreError>;

    /// Appends the record `build` derives from the current list. Concurrent
    /// appends are serialized, so `build` always sees every earlier record.
    fn append_definition<F>(&self, build: F) -> Result<RecurringTaskDefinition, StoreError>
    where
        F: FnOnce(&[RecurringTaskDefinition]) -> RecurringTaskDefinition;
}

/// Stores tasks in `tasks.json` and definitions in `definitions.jsonl`
/// under one data directory.
///
/// Every access holds the store lock: a mutex for threads sharing this
/// value and an exclusive lock on `<dir>/.lock` for other handles and other
/// processes on the same directory. That is what makes the dedup
/// check-then-insert and the registrar max-plus-one atomic.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Opens (and creates if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(FileStore { dir, lock: Mutex::new(()) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path to the tasks database file (`tasks.json`).
    pub fn tasks_path(&self) -> PathBuf {
        self.dir.join("tasks.json")
    }

    /// Returns the path to the definition list (`definitions.jsonl`).
    pub fn definitions_path(&self) -> PathBuf {
        self.dir.join("definitions.jsonl")
    }

    /// Returns the path to the lock file shared by every handle on `dir`.
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(".lock")
    }

    fn guard(&self) -> Result<StoreGuard<'_>, StoreError> {
        // The guarded data is the files themselves; a panic elsewhere leaves them intact.
        let thread = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        file.lock().map_err(|e| StoreError::io(&path, e))?;
        Ok(StoreGuard { _file: file, _thread: thread })
    }

    fn read_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let path = self.tasks_path();
        let s = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&s).map_err(|source| StoreError::Malformed { path, line: None, source })
    }

    /// Overwrites `tasks.json` through a uniquely named temporary file so
    /// readers never see a half-written list.
    fn write_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let path = self.tasks_path();
        let s = serde_json::to_string_pretty(tasks).map_err(|source| StoreError::Malformed {
            path: path.clone(),
            line: None,
            source,
        })?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        tmp.write_all(s.as_bytes()).map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| StoreError::io(&path, e.error))?;
        Ok(())
    }

    fn read_definitions_file(&self) -> Result<(String, Vec<RecurringTaskDefinition>), StoreError> {
        let path = self.definitions_path();
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((String::new(), Vec::new())),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        let defs = parse_definitions(&path, &raw)?;
        Ok((raw, defs))
    }
}

/// Held for the whole of a store access. The file lock is released when
/// `_file` is closed.
struct StoreGuard<'a> {
    _file: File,
    _thread: MutexGuard<'a, ()>,
}

/// Parses definition-list JSONL. Blank lines are skipped; `path` only
/// labels errors.
pub fn parse_definitions(path: &Path, raw: &str) -> Result<Vec<RecurringTaskDefinition>, StoreError> {
    let mut defs = Vec::new();
    for (i, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let def = serde_json::from_str(line).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            line: Some(i + 1),
            source,
        })?;
        defs.push(def);
    }
    Ok(defs)
}

impl TaskStore for FileStore {
    fn load_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let _guard = self.guard()?;
        self.read_tasks()
    }

    fn update_tasks<R, F>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<R, Error>,
    {
        let _guard = self.guard()?;
        let mut tasks = self.read_tasks()?;
        let before = tasks.clone();
        let result = f(&mut tasks)?;
        if tasks != before {
            self.write_tasks(&tasks)?;
        }
        Ok(result)
    }
}

impl DefinitionStore for FileStore {
    fn load_definitions(&self) -> Result<Vec<RecurringTaskDefinition>, StoreError> {
        let _guard = self.guard()?;
        self.read_definitions_file().map(|(_, defs)| defs)
    }

    fn append_definition<F>(&self, build: F) -> Result<RecurringTaskDefinition, StoreError>
    where
        F: FnOnce(&[RecurringTaskDefinition]) -> RecurringTaskDefinition,
    {
        let _guard = self.guard()?;
        let (raw, defs) = self.read_definitions_file()?;
        let def = build(&defs);

        let path = self.definitions_path();
        let mut line = serde_json::to_string(&def).map_err(|source| StoreError::Malformed {
            path: path.clone(),
            line: None,
            source,
        })?;
        line.push('\n');
        // A hand-edited file may lack its final newline.
        if !raw.is_empty() && !raw.ends_with('\n') {
            line.insert(0, '\n');
        }

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        f.write_all(line.as_bytes()).map_err(|e| StoreError::io(&path, e))?;
        f.flush().map_err(|e| StoreError::io(&path, e))?;
        Ok(def)
    }
}
