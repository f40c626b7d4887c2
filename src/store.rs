//! The reference store: dataset slot → `(path, key)` persisted in one file.
//!
//! Every call reads or writes the backing file directly; nothing is cached
//! between calls. Stores opened on the same path see each other's writes on
//! their next call. There is no locking, so concurrent writers race and the
//! last one wins.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StoreOptions;
use crate::container;
use crate::data::inspect::{self, KeyedFormat};
use crate::data::model::{ListSlot, Reference, ScalarSlot, Slot};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct ReferenceStore {
    path: PathBuf,
    options: StoreOptions,
}

impl ReferenceStore {
    /// Open the store at `path` with default options.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open the store at `path`.
    ///
    /// A missing file is not an error; it is created by the first write.
    /// An existing file must parse as a store document.
    pub fn open_with(path: impl Into<PathBuf>, options: StoreOptions) -> StoreResult<Self> {
        let path = path.into();
        let doc = container::load(&path)?;
        log::debug!(
            "opened reference store {} ({} train features, {} predict features)",
            path.display(),
            doc.train.features.len(),
            doc.predict.features.len()
        );
        Ok(Self { path, options })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a reference in a scalar slot, replacing any previous one.
    ///
    /// With no key (or an empty one) the key is read from the file at
    /// `path`, which must then hold exactly one internal key. Returns the
    /// reference as stored.
    pub fn set(
        &self,
        slot: ScalarSlot,
        path: impl AsRef<Path>,
        key: Option<&str>,
    ) -> StoreResult<Reference> {
        let reference = self.resolve(path.as_ref(), key)?;

        let mut doc = container::load(&self.path)?;
        doc.set_scalar(slot, reference.clone());
        container::save(&self.path, &doc)?;

        log::info!("{slot} = {} [{}]", reference.path.display(), reference.key);
        Ok(reference)
    }

    /// Append a reference to a list slot. Key resolution as in [`set`](Self::set).
    pub fn add(
        &self,
        slot: ListSlot,
        path: impl AsRef<Path>,
        key: Option<&str>,
    ) -> StoreResult<Reference> {
        let reference = self.resolve(path.as_ref(), key)?;

        let mut doc = container::load(&self.path)?;
        let index = doc.push(slot, reference.clone());
        container::save(&self.path, &doc)?;

        log::info!(
            "{slot}[{index}] = {} [{}]",
            reference.path.display(),
            reference.key
        );
        Ok(reference)
    }

    /// [`set`](Self::set) or [`add`](Self::add), depending on the slot kind.
    pub fn record(
        &self,
        slot: Slot,
        path: impl AsRef<Path>,
        key: Option<&str>,
    ) -> StoreResult<Reference> {
        match slot {
            Slot::Scalar(s) => self.set(s, path, key),
            Slot::List(l) => self.add(l, path, key),
        }
    }

    /// The reference in a scalar slot. The referenced file is not checked.
    pub fn get(&self, slot: ScalarSlot) -> StoreResult<Reference> {
        container::load(&self.path)?
            .scalar(slot)
            .cloned()
            .ok_or(StoreError::SlotNotSet(slot))
    }

    /// The reference at `index` of a list slot.
    pub fn get_at(&self, slot: ListSlot, index: usize) -> StoreResult<Reference> {
        let doc = container::load(&self.path)?;
        let list = doc.list(slot);
        list.get(index)
            .cloned()
            .ok_or(StoreError::IndexOutOfRange {
                slot,
                index,
                len: list.len(),
            })
    }

    /// The reference in any slot. `index` picks a list entry (default 0)
    /// and is refused for scalar slots.
    pub fn lookup(&self, slot: Slot, index: Option<usize>) -> StoreResult<Reference> {
        match (slot, index) {
            (Slot::Scalar(s), None) => self.get(s),
            (Slot::Scalar(s), Some(_)) => Err(StoreError::IndexOnScalar(s)),
            (Slot::List(l), index) => self.get_at(l, index.unwrap_or(0)),
        }
    }

    /// Number of references in a list slot; 0 if never written.
    pub fn list_length(&self, slot: ListSlot) -> StoreResult<usize> {
        Ok(container::load(&self.path)?.list(slot).len())
    }

    /// Every stored reference: scalar slots first, then list entries in
    /// index order.
    pub fn entries(&self) -> StoreResult<Vec<(Slot, Reference)>> {
        let doc = container::load(&self.path)?;
        let mut out = Vec::new();
        for slot in ScalarSlot::ALL {
            if let Some(r) = doc.scalar(slot) {
                out.push((Slot::Scalar(slot), r.clone()));
            }
        }
        for slot in ListSlot::ALL {
            for r in doc.list(slot) {
                out.push((Slot::List(slot), r.clone()));
            }
        }
        Ok(out)
    }

    fn resolve(&self, path: &Path, key: Option<&str>) -> StoreResult<Reference> {
        if !path.is_file() {
            return Err(StoreError::FileNotFound(path.to_path_buf()));
        }
        if path.to_str().is_none() {
            return Err(StoreError::NonUtf8Path(path.to_path_buf()));
        }

        let key = match key.filter(|k| !k.is_empty()) {
            Some(k) => k.to_string(),
            None => default_key(path)?,
        };

        let path = if self.options.absolute_paths {
            let absolute = fs::canonicalize(path).map_err(|source| StoreError::Canonicalize {
                path: path.to_path_buf(),
                source,
            })?;
            if absolute.to_str().is_none() {
                return Err(StoreError::NonUtf8Path(absolute));
            }
            absolute
        } else {
            path.to_path_buf()
        };

        Ok(Reference { path, key })
    }
}

/// The single internal key of the file at `path`.
///
/// Fails with [`StoreError::EmptyFile`] when the file has no keys and with
/// [`StoreError::AmbiguousKey`] when it has several.
pub fn default_key(path: &Path) -> StoreResult<String> {
    let format =
        KeyedFormat::from_path(path).ok_or_else(|| StoreError::UnsupportedFormat(path.to_path_buf()))?;
    let mut keys = inspect::list_keys(path, format).map_err(|source| StoreError::Inspect {
        path: path.to_path_buf(),
        source,
    })?;

    match keys.len() {
        0 => Err(StoreError::EmptyFile(path.to_path_buf())),
        1 => {
            let key = keys.remove(0);
            log::debug!("{}: using its only key '{key}'", path.display());
            Ok(key)
        }
        _ => Err(StoreError::AmbiguousKey {
            path: path.to_path_buf(),
            candidates: keys,
        }),
    }
}
