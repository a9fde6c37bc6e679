use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::storage::location::is_hidden_object;
use crate::storage::{ObjectBytes, StoredObject};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;

/// Filesystem-backed object store.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    use_mmap: bool,
}

impl LocalStore {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Read a single file, or every visible file of a directory in name order.
    pub fn read_objects(&self, path: &Path) -> Result<Vec<StoredObject>> {
        if !path.exists() {
            return Err(ProcessingError::storage(path.display(), "path does not exist"));
        }

        let files = if path.is_dir() {
            self.list_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        files.iter().map(|file| self.read_file(file)).collect()
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if is_hidden_object(&name.to_string_lossy()) || !entry.file_type()?.is_file() {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> Result<StoredObject> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        debug!(path = %path.display(), bytes = len, mmap = self.use_mmap, "reading local object");

        // Zero-length files cannot be mapped on every platform.
        let bytes = if self.use_mmap && len > 0 {
            let mmap = unsafe { Mmap::map(&file)? };
            ObjectBytes::Mapped(mmap)
        } else {
            let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
            let mut buf = Vec::with_capacity(len as usize);
            reader.read_to_end(&mut buf)?;
            ObjectBytes::Owned(buf)
        };

        Ok(StoredObject {
            location: path.display().to_string(),
            bytes,
        })
    }

    /// Write `bytes` to `path`, creating parent directories.
    pub fn write_object(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote local object");
        Ok(())
    }
}
