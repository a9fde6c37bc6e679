pub mod local;
pub mod location;
pub mod s3;

pub use local::LocalStore;
pub use location::StorageLocation;
pub use s3::S3Store;

use memmap2::Mmap;
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::{ProcessingError, Result};

/// Contents of a stored object, owned or memory-mapped.
#[derive(Debug)]
pub enum ObjectBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl ObjectBytes {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            ObjectBytes::Owned(buf) => buf.as_slice(),
            ObjectBytes::Mapped(mmap) => &mmap[..],
        }
    }
}

#[derive(Debug)]
pub struct StoredObject {
    pub location: String,
    pub bytes: ObjectBytes,
}

/// Storage handle shared by the reader and writer of a run.
///
/// The S3 client is only built the first time an `s3://` location is touched,
/// so local runs never load AWS configuration.
pub struct ObjectStorage {
    local: LocalStore,
    s3: OnceCell<S3Store>,
}

impl ObjectStorage {
    pub fn new(local: LocalStore) -> Self {
        Self {
            local,
            s3: OnceCell::new(),
        }
    }

    async fn s3(&self) -> &S3Store {
        self.s3.get_or_init(S3Store::from_env).await
    }

    /// Fetch every object at `location`. An empty prefix is an error.
    pub async fn read(&self, location: &StorageLocation) -> Result<Vec<StoredObject>> {
        let objects = match location {
            StorageLocation::Local(path) => {
                let local = self.local.clone();
                let path = path.clone();
                tokio::task::spawn_blocking(move || local.read_objects(&path)).await??
            }
            StorageLocation::S3 { bucket, key } => {
                self.s3()
                    .await
                    .read_objects(bucket, key, location.is_prefix())
                    .await?
            }
        };

        if objects.is_empty() {
            return Err(ProcessingError::storage(location, "no objects found"));
        }

        info!(location = %location, objects = objects.len(), "read source objects");
        Ok(objects)
    }

    /// Store `bytes` as the single object at `location`.
    pub async fn write(&self, location: &StorageLocation, bytes: Vec<u8>) -> Result<()> {
        match location {
            StorageLocation::Local(path) => {
                let local = self.local.clone();
                let path = path.clone();
                tokio::task::spawn_blocking(move || local.write_object(&path, &bytes)).await??;
            }
            StorageLocation::S3 { bucket, key } => {
                self.s3().await.write_object(bucket, key, bytes).await?;
            }
        }

        info!(location = %location, "wrote output object");
        Ok(())
    }
}

impl Default for ObjectStorage {
    fn default() -> Self {
        Self::new(LocalStore::new())
    }
}
