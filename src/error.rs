use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::{ListSlot, ScalarSlot};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not a file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{} contains no internal keys, a key must be given", .0.display())]
    EmptyFile(PathBuf),

    #[error(
        "{} contains {} internal keys, choose one of: {}",
        .path.display(),
        .candidates.len(),
        .candidates.join(", ")
    )]
    AmbiguousKey {
        path: PathBuf,
        candidates: Vec<String>,
    },

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("cannot resolve {}: {source}", .path.display())]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot list internal keys of {}: unsupported file type", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("cannot list internal keys of {}: {source:#}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0} has not been set")]
    SlotNotSet(ScalarSlot),

    #[error("{0} holds a single reference and takes no index")]
    IndexOnScalar(ScalarSlot),

    #[error("index {index} out of range for {slot} (length {len})")]
    IndexOutOfRange {
        slot: ListSlot,
        index: usize,
        len: usize,
    },

    #[error("{} is not a valid reference store: {source}", .path.display())]
    InvalidContainer {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the error comes from the store file itself rather than from
    /// the referenced dataset file.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, StoreError::InvalidContainer { .. } | StoreError::Io(_))
    }
}
