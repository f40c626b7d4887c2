use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use trainpredict::provision::{self, TerminalPrompter};
use trainpredict::{ReferenceStore, Slot, StoreOptions};

#[derive(Parser)]
#[command(name = "trainpredict", version, about = "Manage train/predict data reference files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactively create or update a .tpd file
    Create {
        /// The .tpd file; asked for when omitted
        file: Option<PathBuf>,
        /// Record absolute paths (also TPD_ABSOLUTE_PATHS=1)
        #[arg(long)]
        absolute_paths: bool,
    },
    /// Set a slot, or append to a feature slot
    Set {
        file: PathBuf,
        /// Slot name, e.g. train.raw or predict.feature
        slot: Slot,
        /// Dataset file
        path: PathBuf,
        /// Internal key; detected when the file has exactly one
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        absolute_paths: bool,
    },
    /// Print the reference in a slot as `path<TAB>key`
    Get {
        file: PathBuf,
        slot: Slot,
        /// Entry of a feature slot (default 0); not allowed for other slots
        #[arg(long)]
        index: Option<usize>,
    },
    /// Print every reference in the file
    Show { file: PathBuf },
}

fn options(absolute_paths: bool) -> StoreOptions {
    let opts = StoreOptions::from_env();
    if absolute_paths {
        opts.with_absolute_paths(true)
    } else {
        opts
    }
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Create {
            file,
            absolute_paths,
        } => {
            let mut prompter = TerminalPrompter;
            let file = match file {
                Some(file) => file,
                None => provision::ask_store_path(&mut prompter)?,
            };
            let store = ReferenceStore::open_with(&file, options(absolute_paths))
                .with_context(|| format!("opening {}", file.display()))?;
            let summary = provision::run_session(&store, &mut prompter)?;
            println!(
                "Wrote {} slots and {} features to {}",
                summary.scalars,
                summary.features,
                file.display()
            );
        }
        Command::Set {
            file,
            slot,
            path,
            key,
            absolute_paths,
        } => {
            let store = ReferenceStore::open_with(&file, options(absolute_paths))?;
            let stored = store.record(slot, &path, key.as_deref())?;
            println!("{slot}\t{stored}");
        }
        Command::Get { file, slot, index } => {
            let store = ReferenceStore::open(&file)?;
            println!("{}", store.lookup(slot, index)?);
        }
        Command::Show { file } => {
            let store = ReferenceStore::open(&file)?;
            let entries = store.entries()?;
            if entries.is_empty() {
                log::warn!("{} holds no references", file.display());
            }
            for (slot, reference) in entries {
                println!("{slot}\t{reference}");
            }
        }
    }

    Ok(())
}
