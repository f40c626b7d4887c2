use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reference – where one dataset lives
// ---------------------------------------------------------------------------

/// An external file plus the internal key inside it that holds the dataset.
///
/// Deserializing rejects an empty path or key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReferenceFields")]
pub struct Reference {
    pub path: PathBuf,
    pub key: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceFields {
    path: PathBuf,
    key: String,
}

impl TryFrom<ReferenceFields> for Reference {
    type Error = String;

    fn try_from(fields: ReferenceFields) -> Result<Self, Self::Error> {
        if fields.path.as_os_str().is_empty() {
            return Err("reference has an empty path".to_string());
        }
        if fields.key.is_empty() {
            return Err(format!(
                "reference to {} has an empty key",
                fields.path.display()
            ));
        }
        Ok(Self {
            path: fields.path,
            key: fields.key,
        })
    }
}

impl Reference {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.path.display(), self.key)
    }
}

// ---------------------------------------------------------------------------
// Slot vocabulary
// ---------------------------------------------------------------------------

/// Workflow phase a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Train,
    Predict,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Train, Phase::Predict];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Predict => "predict",
        }
    }
}

/// Slots holding at most one reference. Writing overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarSlot {
    TrainRaw,
    TrainGt,
    TrainPred,
    PredictRaw,
    PredictGt,
    PredictPred,
}

impl ScalarSlot {
    pub const ALL: [ScalarSlot; 6] = [
        ScalarSlot::TrainRaw,
        ScalarSlot::TrainGt,
        ScalarSlot::TrainPred,
        ScalarSlot::PredictRaw,
        ScalarSlot::PredictGt,
        ScalarSlot::PredictPred,
    ];

    pub fn phase(self) -> Phase {
        match self {
            ScalarSlot::TrainRaw | ScalarSlot::TrainGt | ScalarSlot::TrainPred => Phase::Train,
            ScalarSlot::PredictRaw | ScalarSlot::PredictGt | ScalarSlot::PredictPred => {
                Phase::Predict
            }
        }
    }

    /// Dotted slot name, e.g. `train.gt`.
    pub fn name(self) -> &'static str {
        match self {
            ScalarSlot::TrainRaw => "train.raw",
            ScalarSlot::TrainGt => "train.gt",
            ScalarSlot::TrainPred => "train.pred",
            ScalarSlot::PredictRaw => "predict.raw",
            ScalarSlot::PredictGt => "predict.gt",
            ScalarSlot::PredictPred => "predict.pred",
        }
    }
}

/// Append-only slots holding an ordered list of references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSlot {
    TrainFeature,
    PredictFeature,
}

impl ListSlot {
    pub const ALL: [ListSlot; 2] = [ListSlot::TrainFeature, ListSlot::PredictFeature];

    pub fn phase(self) -> Phase {
        match self {
            ListSlot::TrainFeature => Phase::Train,
            ListSlot::PredictFeature => Phase::Predict,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ListSlot::TrainFeature => "train.feature",
            ListSlot::PredictFeature => "predict.feature",
        }
    }
}

impl fmt::Display for ScalarSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ListSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any slot of the vocabulary, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Scalar(ScalarSlot),
    List(ListSlot),
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Scalar(s) => s.name(),
            Slot::List(l) => l.name(),
        }
    }

    /// Every slot name, in the order they are documented and displayed.
    pub fn names() -> impl Iterator<Item = &'static str> {
        ScalarSlot::ALL
            .into_iter()
            .map(ScalarSlot::name)
            .chain(ListSlot::ALL.into_iter().map(ListSlot::name))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSlot(pub String);

impl fmt::Display for UnknownSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = Slot::names().collect();
        write!(
            f,
            "unknown slot '{}' (expected one of: {})",
            self.0,
            known.join(", ")
        )
    }
}

impl std::error::Error for UnknownSlot {}

impl FromStr for Slot {
    type Err = UnknownSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if let Some(slot) = ScalarSlot::ALL.into_iter().find(|x| x.name() == name) {
            return Ok(Slot::Scalar(slot));
        }
        if let Some(slot) = ListSlot::ALL.into_iter().find(|x| x.name() == name) {
            return Ok(Slot::List(slot));
        }
        Err(UnknownSlot(s.to_string()))
    }
}
