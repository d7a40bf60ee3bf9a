//! File-system facade used by the stores
//!
//! A [`Backend`] offers the four primitives a store needs (read, replace,
//! remove, size) over named files in one private directory, plus the lock
//! that serializes read-modify-write cycles on a given file.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Lock guarding one file's read-modify-write cycle
pub type FileLock = Arc<Mutex<()>>;

/// Acquire a file lock, ignoring poisoning left by a panicked writer
pub fn acquire(lock: &FileLock) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lazily populated map of file key -> lock
#[derive(Debug, Default)]
pub struct LockTable {
    locks: Mutex<HashMap<String, FileLock>>,
}

impl LockTable {
    /// The lock for `key`, created on first use
    pub fn get(&self, key: &str) -> FileLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(key.to_string()).or_default().clone()
    }
}

/// Storage primitives over named files
pub trait Backend: Send + Sync {
    /// Full contents, or `None` when the file does not exist
    fn read(&self, name: &str) -> io::Result<Option<String>>;

    /// Replace the whole file; readers never observe a partial write
    fn write(&self, name: &str, contents: &str) -> io::Result<()>;

    /// Delete the file; deleting a missing file succeeds
    fn remove(&self, name: &str) -> io::Result<()>;

    /// Size in bytes, or `None` when the file does not exist
    fn size(&self, name: &str) -> Option<u64>;

    /// Lock shared by every store bound to the same file
    fn lock(&self, name: &str) -> FileLock;
}

/// Files in a directory on disk
#[derive(Debug, Clone)]
pub struct LocalDir {
    root: PathBuf,
}

/// Locks are process-wide so that two `LocalDir` values pointing at the
/// same directory still exclude each other
fn local_locks() -> &'static LockTable {
    static LOCKS: OnceLock<LockTable> = OnceLock::new();
    LOCKS.get_or_init(LockTable::default)
}

impl LocalDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Temp file unique to this process and this write
    fn temp_path(&self, name: &str) -> PathBuf {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let seq = NEXT.fetch_add(1, Ordering::Relaxed);
        self.path(&format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }
}

impl Backend for LocalDir {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write to a sibling temp file, sync it, then rename over the target
    fn write(&self, name: &str, contents: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let target = self.path(name);
        let temp = self.temp_path(name);

        let written = fs::File::create(&temp).and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        });
        let result = written.and_then(|()| fs::rename(&temp, &target));
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        match fs::remove_file(self.path(name)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn size(&self, name: &str) -> Option<u64> {
        fs::metadata(self.path(name)).ok().map(|m| m.len())
    }

    fn lock(&self, name: &str) -> FileLock {
        let key = absolute(&self.path(name)).to_string_lossy().into_owned();
        local_locks().get(&key)
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Files held in memory, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryDir {
    files: Mutex<HashMap<String, String>>,
    locks: LockTable,
    read_only: bool,
}

impl MemoryDir {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose writes always fail with `PermissionDenied`
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Seed a file directly, bypassing the read-only flag
    pub fn insert(&self, name: &str, contents: &str) {
        self.files()
            .insert(name.to_string(), contents.to_string());
    }

    fn files(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryDir {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        Ok(self.files().get(name).cloned())
    }

    fn write(&self, name: &str, contents: &str) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "memory directory is read-only",
            ));
        }
        self.insert(name, contents);
        Ok(())
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "memory directory is read-only",
            ));
        }
        self.files().remove(name);
        Ok(())
    }

    fn size(&self, name: &str) -> Option<u64> {
        self.files().get(name).map(|c| c.len() as u64)
    }

    fn lock(&self, name: &str) -> FileLock {
        self.locks.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_local_read_missing_file() {
        let dir = tempdir().unwrap();
        let backend = LocalDir::new(dir.path());
        assert!(backend.read("clients.json").unwrap().is_none());
        assert!(backend.size("clients.json").is_none());
    }

    #[test]
    fn test_local_write_replaces_contents() {
        let dir = tempdir().unwrap();
        let backend = LocalDir::new(dir.path().join("nested"));
        backend.write("a.json", "[1, 2, 3]").unwrap();
        backend.write("a.json", "[]").unwrap();
        assert_eq!(backend.read("a.json").unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.size("a.json"), Some(2));
        let names: Vec<_> = fs::read_dir(backend.root())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["a.json"]);
    }

    #[test]
    fn test_local_temp_paths_are_unique_per_write() {
        let dir = tempdir().unwrap();
        let backend = LocalDir::new(dir.path());
        let first = backend.temp_path("a.json");
        let second = backend.temp_path("a.json");
        assert_ne!(first, second);
        assert!(first
            .to_string_lossy()
            .contains(&std::process::id().to_string()));
    }

    #[test]
    fn test_local_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let backend = LocalDir::new(dir.path());
        backend.write("a.json", "[]").unwrap();
        backend.remove("a.json").unwrap();
        backend.remove("a.json").unwrap();
        assert!(backend.read("a.json").unwrap().is_none());
    }

    #[test]
    fn test_local_locks_shared_across_instances() {
        let dir = tempdir().unwrap();
        let a = LocalDir::new(dir.path());
        let b = LocalDir::new(dir.path());
        a.write("x.json", "[]").unwrap();
        assert!(Arc::ptr_eq(&a.lock("x.json"), &b.lock("x.json")));
        assert!(!Arc::ptr_eq(&a.lock("x.json"), &a.lock("y.json")));
    }

    #[test]
    fn test_memory_read_only_rejects_writes() {
        let backend = MemoryDir::read_only();
        backend.insert("a.json", "[]");
        assert!(backend.write("a.json", "[1]").is_err());
        assert_eq!(backend.read("a.json").unwrap().as_deref(), Some("[]"));
    }
}
