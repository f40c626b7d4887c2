//! Train/predict data references.
//!
//! A `.tpd` file records where each dataset of a train/predict workflow
//! lives: an external file plus the internal key inside it. Scripts open
//! the `.tpd` file instead of hard-coding dataset paths.
//!
//! ```no_run
//! use trainpredict::{ReferenceStore, ScalarSlot};
//!
//! let store = ReferenceStore::open("experiment.tpd")?;
//! store.set(ScalarSlot::TrainRaw, "raw.json", None)?;
//! let raw = store.get(ScalarSlot::TrainRaw)?;
//! println!("{} [{}]", raw.path.display(), raw.key);
//! # Ok::<(), trainpredict::StoreError>(())
//! ```

pub mod config;
pub mod container;
pub mod data;
pub mod error;
pub mod provision;
pub mod store;

pub use config::StoreOptions;
pub use data::model::{ListSlot, Phase, Reference, ScalarSlot, Slot};
pub use error::{StoreError, StoreResult};
pub use store::ReferenceStore;
