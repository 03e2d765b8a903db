//! File-backed object store.
//!
//! Layout on disk, for a store opened with base name `world`:
//! ```text
//! world.yaml       - the document stream, one `---` document per object
//! world.yaml.tmp   - transient, only present during save_atomic
//! ```

use crate::bootstrap;
use crate::decode::decode_stream;
use crate::error::StoreError;
use crate::persister::write_documents;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{Dispatch, error, info, warn};
use worldstore_objects::{Identified, ObjectId, ObjectKind, StoredObject};

/// Extension appended to the base name to form the backing file path.
pub const BACKING_EXTENSION: &str = ".yaml";

/// Per-kind counts, as reported by [`ObjectStore::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub total: usize,
    pub by_kind: BTreeMap<ObjectKind, usize>,
    pub high_water_id: Option<ObjectId>,
}

/// In-memory object database loaded from, and saved to, a YAML stream.
///
/// Construction is all-or-nothing: [`ObjectStore::open`] either returns a
/// fully populated store or an error. After that every read and write is
/// purely in memory until [`ObjectStore::save`].
///
/// Uses BTreeMap so iteration, and therefore saved files, are ordered by id.
#[derive(Debug)]
pub struct ObjectStore {
    path: PathBuf,
    objects: BTreeMap<ObjectId, StoredObject>,
    /// Highest id seen at load, raised only by `allocate_id`.
    high_water: Option<ObjectId>,
    logger: Dispatch,
}

impl ObjectStore {
    /// Open the store backed by `<base>.yaml`, creating a seed world if absent.
    ///
    /// Logs through the caller's current `tracing` dispatcher.
    pub fn open(base: impl AsRef<Path>) -> Result<Self, StoreError> {
        let logger = tracing::dispatcher::get_default(Dispatch::clone);
        Self::open_with_logger(base, logger)
    }

    /// Like [`ObjectStore::open`], but all logging from this store goes to
    /// `logger`.
    pub fn open_with_logger(base: impl AsRef<Path>, logger: Dispatch) -> Result<Self, StoreError> {
        let path = backing_path(base.as_ref());
        let (objects, high_water) = tracing::dispatcher::with_default(&logger, || {
            load(&path).inspect_err(|e| {
                error!(path = %path.display(), error = %e, "error loading database");
            })
        })?;

        Ok(Self {
            path,
            objects,
            high_water,
            logger,
        })
    }

    /// Insert or replace the object under its own id.
    pub fn put(&mut self, obj: impl Into<StoredObject>) -> &StoredObject {
        let obj = obj.into();
        let id = obj.id();
        self.objects.insert(id, obj);
        &self.objects[&id]
    }

    /// Remove the object with `id`. A missing id is not an error.
    pub fn delete(&mut self, id: ObjectId) -> Option<StoredObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&StoredObject> {
        self.objects.get(&id)
    }

    pub fn check(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Iterate over every stored object in id order.
    pub fn each(&self) -> impl Iterator<Item = &StoredObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Highest id observed while loading, or handed out by `allocate_id`.
    pub fn high_water_id(&self) -> Option<ObjectId> {
        self.high_water
    }

    /// Reserve a fresh id above the high-water mark.
    ///
    /// Skips ids already present so an object `put` under an unreserved id is
    /// never shadowed. Fails, leaving the mark untouched, once no id above it
    /// is free.
    pub fn allocate_id(&mut self) -> Result<ObjectId, StoreError> {
        let mut candidate = match self.high_water {
            Some(id) => id.checked_next(),
            None => Some(ObjectId(0)),
        };
        while let Some(id) = candidate {
            if !self.objects.contains_key(&id) {
                self.high_water = Some(id);
                return Ok(id);
            }
            candidate = id.checked_next();
        }
        Err(StoreError::IdsExhausted {
            high_water: self.high_water.unwrap_or(ObjectId(u64::MAX)),
        })
    }

    pub fn stats(&self) -> StoreStats {
        let mut by_kind = BTreeMap::new();
        for obj in self.each() {
            *by_kind.entry(obj.kind()).or_insert(0) += 1;
        }
        StoreStats {
            total: self.len(),
            by_kind,
            high_water_id: self.high_water,
        }
    }

    /// Overwrite the backing file with the current contents.
    ///
    /// Writes in place: an interrupted save can leave a truncated file. Use
    /// [`ObjectStore::save_atomic`] when that matters.
    pub fn save(&self) -> Result<(), StoreError> {
        tracing::dispatcher::with_default(&self.logger, || {
            let file = File::create(&self.path).map_err(StoreError::io(&self.path))?;
            let count = write_documents(&mut BufWriter::new(file), self.each())
                .map_err(StoreError::io(&self.path))?;
            info!(path = %self.path.display(), count, "database saved");
            Ok(())
        })
    }

    /// Save to a sibling temp file, sync it, then rename it over the backing
    /// file. Readers see either the old stream or the new one.
    pub fn save_atomic(&self) -> Result<(), StoreError> {
        tracing::dispatcher::with_default(&self.logger, || {
            let tmp = with_suffix(&self.path, ".tmp");
            let result = self.write_synced(&tmp).and_then(|count| {
                std::fs::rename(&tmp, &self.path).map_err(StoreError::io(&self.path))?;
                Ok(count)
            });
            match result {
                Ok(count) => {
                    info!(path = %self.path.display(), count, "database saved atomically");
                    Ok(())
                }
                Err(e) => {
                    warn!(path = %tmp.display(), error = %e, "atomic save failed, removing temp file");
                    let _ = std::fs::remove_file(&tmp);
                    Err(e)
                }
            }
        })
    }

    fn write_synced(&self, path: &Path) -> Result<usize, StoreError> {
        let mut out = BufWriter::new(File::create(path).map_err(StoreError::io(path))?);
        let count = write_documents(&mut out, self.each()).map_err(StoreError::io(path))?;
        let file = out
            .into_inner()
            .map_err(|e| StoreError::io(path)(e.into_error()))?;
        file.sync_all().map_err(StoreError::io(path))?;
        Ok(count)
    }
}

/// `<base>.yaml`. The extension is appended, never substituted, so base
/// names containing dots keep them.
pub fn backing_path(base: &Path) -> PathBuf {
    with_suffix(base, BACKING_EXTENSION)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

type Loaded = (BTreeMap<ObjectId, StoredObject>, Option<ObjectId>);

fn load(path: &Path) -> Result<Loaded, StoreError> {
    bootstrap::ensure_exists(path)?;

    info!(path = %path.display(), "loading world");
    let bytes = std::fs::read(path).map_err(StoreError::io(path))?;
    let decoded = decode_stream(&bytes).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let mut objects = BTreeMap::new();
    let mut high_water = None;
    for obj in decoded {
        let id = obj.id();
        high_water = high_water.max(Some(id));
        if let Some(previous) = objects.insert(id, obj) {
            warn!(%id, replaced = %previous.kind(), "duplicate object id, keeping the later document");
        }
    }

    info!(
        path = %path.display(),
        count = objects.len(),
        highest = ?high_water,
        "database loaded"
    );
    Ok((objects, high_water))
}
