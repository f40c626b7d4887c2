//! Interactive filling of a reference store.
//!
//! Slots are asked for phase by phase: raw, gt and pred once each, then
//! features until an empty answer. Empty input skips a slot.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::data::model::{ListSlot, Phase, Reference, ScalarSlot, Slot};
use crate::error::StoreError;
use crate::store::ReferenceStore;

/// Line-oriented user interaction.
pub trait Prompter {
    /// Ask a question and return the trimmed answer; empty means no answer.
    fn ask(&mut self, message: &str) -> Result<String>;

    /// Show a message that needs no answer.
    fn say(&mut self, message: &str);
}

/// [`Prompter`] on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, message: &str) -> Result<String> {
        let answer = inquire::Text::new(message)
            .prompt()
            .context("Failed to read user input")?;
        Ok(answer.trim().to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}

/// What a session stored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub scalars: usize,
    pub features: usize,
}

/// Ask for the store file until a usable path is entered.
pub fn ask_store_path(prompter: &mut dyn Prompter) -> Result<PathBuf> {
    loop {
        let answer = prompter.ask("Name of the tpd file:")?;
        if answer.is_empty() {
            continue;
        }
        let path = PathBuf::from(answer);
        if path.is_dir() {
            prompter.say(&format!("Is a directory: {}", path.display()));
            continue;
        }
        return Ok(path);
    }
}

/// Walk every slot of the vocabulary and record what the user enters.
pub fn run_session(store: &ReferenceStore, prompter: &mut dyn Prompter) -> Result<Summary> {
    let mut summary = Summary::default();

    for phase in Phase::ALL {
        for slot in ScalarSlot::ALL.into_iter().filter(|s| s.phase() == phase) {
            if provision_slot(store, prompter, Slot::Scalar(slot))?.is_some() {
                summary.scalars += 1;
            }
        }

        for slot in ListSlot::ALL.into_iter().filter(|s| s.phase() == phase) {
            while provision_slot(store, prompter, Slot::List(slot))?.is_some() {
                summary.features += 1;
            }
        }
    }

    log::info!(
        "provisioned {}: {} scalar slots, {} features",
        store.path().display(),
        summary.scalars,
        summary.features
    );
    Ok(summary)
}

/// One slot: ask for a path until it can be recorded or the user skips.
///
/// Problems with the entered file are shown and the path is asked again;
/// only failures of the store file itself end the session.
fn provision_slot(
    store: &ReferenceStore,
    prompter: &mut dyn Prompter,
    slot: Slot,
) -> Result<Option<Reference>> {
    loop {
        let answer = prompter.ask(&format!("{slot} path (empty to skip):"))?;
        if answer.is_empty() {
            return Ok(None);
        }
        let path = PathBuf::from(answer);

        let key = match store.record(slot, &path, None) {
            Ok(reference) => return Ok(Some(reference)),
            Err(StoreError::AmbiguousKey { candidates, .. }) => {
                choose_key(prompter, slot, &candidates)?
            }
            Err(
                e @ (StoreError::EmptyFile(_)
                | StoreError::UnsupportedFormat(_)
                | StoreError::Inspect { .. }),
            ) => {
                prompter.say(&e.to_string());
                match enter_key(prompter, slot)? {
                    Some(key) => key,
                    None => continue,
                }
            }
            Err(e) => {
                reject(prompter, slot, e)?;
                continue;
            }
        };

        match store.record(slot, &path, Some(&key)) {
            Ok(reference) => return Ok(Some(reference)),
            Err(e) => reject(prompter, slot, e)?,
        }
    }
}

/// Show a recoverable error, or end the session on a store failure.
fn reject(prompter: &mut dyn Prompter, slot: Slot, err: StoreError) -> Result<()> {
    if err.is_store_failure() {
        return Err(anyhow::Error::new(err).context(format!("recording {slot}")));
    }
    prompter.say(&err.to_string());
    Ok(())
}

fn choose_key(prompter: &mut dyn Prompter, slot: Slot, candidates: &[String]) -> Result<String> {
    if candidates.is_empty() {
        bail!("no candidate keys for {slot}");
    }
    loop {
        prompter.say(&format!("Choose one of the keys: {}", candidates.join(", ")));
        let answer = prompter.ask(&format!("{slot} key:"))?;
        if candidates.iter().any(|c| *c == answer) {
            return Ok(answer);
        }
    }
}

/// `None` when the user gives up on this file.
fn enter_key(prompter: &mut dyn Prompter, slot: Slot) -> Result<Option<String>> {
    let answer = prompter.ask(&format!("{slot} key (empty to pick another file):"))?;
    Ok((!answer.is_empty()).then_some(answer))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use tempfile::TempDir;

    use super::*;

    /// Answers from a fixed script, recording everything shown.
    #[derive(Default)]
    struct ScriptedPrompter {
        answers: VecDeque<String>,
        questions: Vec<String>,
        said: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, message: &str) -> Result<String> {
            self.questions.push(message.to_string());
            match self.answers.pop_front() {
                Some(answer) => Ok(answer),
                None => bail!("script exhausted at '{message}'"),
            }
        }

        fn say(&mut self, message: &str) {
            self.said.push(message.to_string());
        }
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn skipping_everything_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let store = ReferenceStore::open(dir.path().join("refs.tpd")).unwrap();
        // raw, gt, pred, feature for each phase
        let mut prompter = ScriptedPrompter::new(&[""; 8]);

        let summary = run_session(&store, &mut prompter).unwrap();
        assert_eq!(summary, Summary::default());
        assert!(!store.path().exists());
        assert_eq!(prompter.questions[0], "train.raw path (empty to skip):");
        assert_eq!(prompter.questions[3], "train.feature path (empty to skip):");
        assert_eq!(prompter.questions[4], "predict.raw path (empty to skip):");
    }

    #[test]
    fn full_session_records_every_answer() {
        let dir = TempDir::new().unwrap();
        let raw = write(&dir, "raw.json", r#"{"raw": 1}"#);
        let gt = write(&dir, "gt.csv", "label\n1\n");
        let feats = write(&dir, "feats.json", r#"{"edges": 1, "texture": 2}"#);
        let blob = write(&dir, "volume.h5", "opaque");
        let missing = dir.path().join("missing.json").to_string_lossy().into_owned();
        let store = ReferenceStore::open(dir.path().join("refs.tpd")).unwrap();

        let mut prompter = ScriptedPrompter::new(&[
            // train
            missing.as_str(), raw.as_str(), // raw: re-asked after a bad path
            gt.as_str(),    // gt
            "",             // pred skipped
            feats.as_str(), "nope", "texture", // feature 0: ambiguous, chosen
            feats.as_str(), "edges", // feature 1
            "",             // end of features
            // predict
            blob.as_str(), "volume", // raw: uninspectable, key typed
            "", "", "",
        ]);

        let summary = run_session(&store, &mut prompter).unwrap();
        assert_eq!(summary, Summary { scalars: 3, features: 2 });

        assert_eq!(store.get(ScalarSlot::TrainRaw).unwrap(), Reference::new(&raw, "raw"));
        assert_eq!(store.get(ScalarSlot::TrainGt).unwrap(), Reference::new(&gt, "label"));
        assert!(store.get(ScalarSlot::TrainPred).is_err());
        assert_eq!(
            store.get_at(ListSlot::TrainFeature, 0).unwrap(),
            Reference::new(&feats, "texture")
        );
        assert_eq!(
            store.get_at(ListSlot::TrainFeature, 1).unwrap(),
            Reference::new(&feats, "edges")
        );
        assert_eq!(
            store.get(ScalarSlot::PredictRaw).unwrap(),
            Reference::new(&blob, "volume")
        );
        assert_eq!(store.list_length(ListSlot::PredictFeature).unwrap(), 0);

        assert!(prompter.said.iter().any(|m| m.starts_with("not a file:")));
        assert!(prompter
            .said
            .iter()
            .any(|m| m == "Choose one of the keys: edges, texture"));
    }

    #[test]
    fn empty_key_answer_asks_for_another_file() {
        let dir = TempDir::new().unwrap();
        let empty = write(&dir, "empty.json", "{}");
        let raw = write(&dir, "raw.json", r#"{"raw": 1}"#);
        let store = ReferenceStore::open(dir.path().join("refs.tpd")).unwrap();

        let mut prompter = ScriptedPrompter::new(&[empty.as_str(), "", raw.as_str()]);
        let stored = provision_slot(&store, &mut prompter, Slot::Scalar(ScalarSlot::TrainRaw))
            .unwrap()
            .unwrap();
        assert_eq!(stored, Reference::new(&raw, "raw"));
    }

    #[test]
    fn failing_paths_are_reasked() {
        let dir = TempDir::new().unwrap();
        let raw = write(&dir, "raw.json", r#"{"raw": 1}"#);
        let missing = dir.path().join("missing.json").to_string_lossy().into_owned();
        let as_dir = dir.path().to_string_lossy().into_owned();
        let store = ReferenceStore::open(dir.path().join("refs.tpd")).unwrap();

        let mut prompter =
            ScriptedPrompter::new(&[missing.as_str(), as_dir.as_str(), raw.as_str()]);
        let stored = provision_slot(&store, &mut prompter, Slot::List(ListSlot::TrainFeature))
            .unwrap()
            .unwrap();

        assert_eq!(stored, Reference::new(&raw, "raw"));
        assert_eq!(prompter.questions.len(), 3);
        assert_eq!(prompter.said.len(), 2);
        assert!(prompter.said.iter().all(|m| m.starts_with("not a file:")));
    }

    #[test]
    fn corrupt_store_file_ends_session() {
        let dir = TempDir::new().unwrap();
        let raw = write(&dir, "raw.json", r#"{"raw": 1}"#);
        let feats = write(&dir, "feats.json", r#"{"edges": 1, "texture": 2}"#);
        let store_path = dir.path().join("refs.tpd");
        let store = ReferenceStore::open(&store_path).unwrap();
        std::fs::write(&store_path, "not a store").unwrap();

        let mut prompter = ScriptedPrompter::new(&[raw.as_str()]);
        let err = run_session(&store, &mut prompter).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::InvalidContainer { .. })
        ));
        assert!(err.to_string().contains("train.raw"));
        assert!(prompter.said.is_empty());

        let mut prompter = ScriptedPrompter::new(&[feats.as_str(), "edges"]);
        let err = provision_slot(&store, &mut prompter, Slot::List(ListSlot::TrainFeature))
            .unwrap_err();
        assert!(err.downcast_ref::<StoreError>().is_some());
    }

    #[test]
    fn store_path_skips_directories() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("refs.tpd");
        let dir_str = dir.path().to_string_lossy().into_owned();
        let target_str = target.to_string_lossy().into_owned();

        let mut prompter = ScriptedPrompter::new(&["", dir_str.as_str(), target_str.as_str()]);
        assert_eq!(ask_store_path(&mut prompter).unwrap(), target);
        assert_eq!(prompter.said.len(), 1);
    }
}
