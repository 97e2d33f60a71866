use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use fs2::FileExt;
use tracing::{debug, info};

use super::error::{Result, StoreError};
use super::partitions::{CATALOG_PARTITION, validate_partition_name};

const LOCK_FILE: &str = "tally.lock";
const KEYSPACE_DIR: &str = "keyspace";

/// Ordered (key, value) pairs of one partition
pub type PartitionEntries = Vec<(Vec<u8>, Vec<u8>)>;

/// Fjall-backed durable store with named partitions
///
/// All writes go through [`DurableStore::update`], which stages them in a
/// single fjall batch and commits it atomically. The store directory is
/// guarded by an exclusive lock file for as long as the handle lives.
pub struct DurableStore {
    keyspace: Keyspace,
    catalog: PartitionHandle,
    path: PathBuf,
    // Dropped last so the keyspace is closed before the lock is released
    _lock: File,
}

impl DurableStore {
    /// Open or create a store at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening tally store at: {}", path.display());

        std::fs::create_dir_all(path)?;
        let lock = acquire_lock(path)?;

        let keyspace = Config::new(path.join(KEYSPACE_DIR)).open()?;
        let catalog =
            keyspace.open_partition(CATALOG_PARTITION, PartitionCreateOptions::default())?;

        info!("Tally store opened successfully");
        Ok(Self {
            keyspace,
            catalog,
            path: path.to_path_buf(),
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a write batch; commit only if it returns `Ok`
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteBatch<'_>) -> Result<T>,
    {
        let mut batch = WriteBatch {
            store: self,
            inner: self.keyspace.batch(),
            created: BTreeSet::new(),
            writes: 0,
        };

        let value = f(&mut batch)?;

        let writes = batch.writes;
        if writes > 0 {
            batch.inner.commit()?;
            self.keyspace.persist(PersistMode::SyncAll)?;
        }
        debug!(writes, "Write batch committed");

        Ok(value)
    }

    /// Run `f` with read access to the store
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadView<'_>) -> Result<T>,
    {
        f(&ReadView { store: self })
    }

    /// Ordered entries of a partition, or `None` if it was never created
    pub fn get_partition(&self, name: &str) -> Result<Option<PartitionEntries>> {
        self.view(|view| view.get_partition(name))
    }

    /// Create a partition if absent
    pub fn put_partition(&self, name: &str) -> Result<()> {
        self.update(|batch| batch.put_partition(name))
    }

    fn is_cataloged(&self, name: &str) -> Result<bool> {
        Ok(self.catalog.get(name.as_bytes())?.is_some())
    }

    fn handle(&self, name: &str) -> Result<PartitionHandle> {
        Ok(self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())?)
    }
}

fn acquire_lock(dir: &Path) -> Result<File> {
    let lock_path = dir.join(LOCK_FILE);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
            Err(StoreError::Locked(dir.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Staged writes for one atomic commit
pub struct WriteBatch<'a> {
    store: &'a DurableStore,
    inner: fjall::Batch,
    created: BTreeSet<String>,
    writes: usize,
}

impl WriteBatch<'_> {
    /// Create a partition if absent (idempotent)
    pub fn put_partition(&mut self, name: &str) -> Result<()> {
        validate_partition_name(name)?;
        if self.exists(name)? {
            return Ok(());
        }

        self.store.handle(name)?;
        self.inner
            .insert(&self.store.catalog, name.as_bytes().to_vec(), vec![1u8]);
        self.created.insert(name.to_string());
        self.writes += 1;
        debug!(partition = name, "Partition created");
        Ok(())
    }

    /// Stage a value; the partition must already exist
    pub fn insert(&mut self, partition: &str, key: &[u8], value: &[u8]) -> Result<()> {
        if !self.exists(partition)? {
            return Err(StoreError::PartitionNotFound(partition.to_string()));
        }

        let handle = self.store.handle(partition)?;
        self.inner.insert(&handle, key.to_vec(), value.to_vec());
        self.writes += 1;
        Ok(())
    }

    /// Read through to committed state
    pub fn get(&self, partition: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        ReadView { store: self.store }.get(partition, key)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.created.contains(name) || self.store.is_cataloged(name)?)
    }
}

/// Read access to committed state
pub struct ReadView<'a> {
    store: &'a DurableStore,
}

impl ReadView<'_> {
    /// Ordered entries of a partition, or `None` if it was never created
    pub fn get_partition(&self, name: &str) -> Result<Option<PartitionEntries>> {
        if !self.store.is_cataloged(name)? {
            return Ok(None);
        }

        let handle = self.store.handle(name)?;
        let mut entries = Vec::new();
        for item in handle.iter() {
            let (key, value) = item?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(Some(entries))
    }

    /// Single value lookup; `None` if the partition or key is absent
    pub fn get(&self, partition: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if !self.store.is_cataloged(partition)? {
            return Ok(None);
        }

        let handle = self.store.handle(partition)?;
        Ok(handle.get(key)?.map(|value| value.to_vec()))
    }

    /// Names of all created partitions starting with `prefix`, sorted
    pub fn partitions_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for item in self.store.catalog.prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            names.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(names)
    }
}
