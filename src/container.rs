//! On-disk document behind a [`ReferenceStore`](crate::store::ReferenceStore).
//!
//! The document is read fresh for every operation and replaced whole on
//! every write. A missing file reads as an empty document; the file is only
//! created by the first [`save`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::{ListSlot, Phase, Reference, ScalarSlot};
use crate::error::{StoreError, StoreResult};

/// References of one workflow phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseRefs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pred: Option<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Reference>,
}

/// The whole store document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Document {
    pub train: PhaseRefs,
    pub predict: PhaseRefs,
}

impl Document {
    fn phase(&self, phase: Phase) -> &PhaseRefs {
        match phase {
            Phase::Train => &self.train,
            Phase::Predict => &self.predict,
        }
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut PhaseRefs {
        match phase {
            Phase::Train => &mut self.train,
            Phase::Predict => &mut self.predict,
        }
    }

    pub fn scalar(&self, slot: ScalarSlot) -> Option<&Reference> {
        let refs = self.phase(slot.phase());
        match slot {
            ScalarSlot::TrainRaw | ScalarSlot::PredictRaw => refs.raw.as_ref(),
            ScalarSlot::TrainGt | ScalarSlot::PredictGt => refs.gt.as_ref(),
            ScalarSlot::TrainPred | ScalarSlot::PredictPred => refs.pred.as_ref(),
        }
    }

    pub fn set_scalar(&mut self, slot: ScalarSlot, reference: Reference) {
        let refs = self.phase_mut(slot.phase());
        let field = match slot {
            ScalarSlot::TrainRaw | ScalarSlot::PredictRaw => &mut refs.raw,
            ScalarSlot::TrainGt | ScalarSlot::PredictGt => &mut refs.gt,
            ScalarSlot::TrainPred | ScalarSlot::PredictPred => &mut refs.pred,
        };
        *field = Some(reference);
    }

    pub fn list(&self, slot: ListSlot) -> &[Reference] {
        &self.phase(slot.phase()).features
    }

    pub fn push(&mut self, slot: ListSlot, reference: Reference) -> usize {
        let features = &mut self.phase_mut(slot.phase()).features;
        features.push(reference);
        features.len() - 1
    }
}

/// Read the document at `path`. A missing file is an empty document.
pub fn load(path: &Path) -> StoreResult<Document> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::default()),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&text).map_err(|source| StoreError::InvalidContainer {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the document to `path`, creating the file if needed.
///
/// The new content goes to a sibling temporary file that is then renamed
/// over `path`, so readers see either the old or the new document.
pub fn save(path: &Path, doc: &Document) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(doc)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp = temp_path(path);
    let written = fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_is_empty_document() {
        let dir = TempDir::new().unwrap();
        let doc = load(&dir.path().join("none.tpd")).unwrap();
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn empty_slots_are_omitted_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.tpd");
        let mut doc = Document::default();
        doc.set_scalar(ScalarSlot::PredictGt, Reference::new("gt.json", "labels"));
        save(&path, &doc).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "train": {},
                "predict": { "gt": { "path": "gt.json", "key": "labels" } }
            })
        );
        assert!(!temp_path(&path).exists());
        assert_eq!(load(&path).unwrap(), doc);
    }

    #[test]
    fn unknown_fields_are_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.tpd");
        fs::write(&path, r#"{"train": {"labels": 3}}"#).unwrap();

        assert!(matches!(
            load(&path),
            Err(StoreError::InvalidContainer { .. })
        ));
    }

    #[test]
    fn empty_path_or_key_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.tpd");

        for text in [
            r#"{"train": {"raw": {"path": "", "key": "raw"}}}"#,
            r#"{"predict": {"features": [{"path": "f.json", "key": ""}]}}"#,
        ] {
            fs::write(&path, text).unwrap();
            match load(&path) {
                Err(StoreError::InvalidContainer { source, .. }) => {
                    assert!(source.to_string().contains("empty"));
                }
                other => panic!("expected InvalidContainer, got {other:?}"),
            }
        }
    }

    #[test]
    fn push_returns_index() {
        let mut doc = Document::default();
        assert_eq!(doc.push(ListSlot::TrainFeature, Reference::new("a", "k")), 0);
        assert_eq!(doc.push(ListSlot::TrainFeature, Reference::new("b", "k")), 1);
        assert!(doc.list(ListSlot::PredictFeature).is_empty());
    }
}
