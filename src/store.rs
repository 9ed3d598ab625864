// 🗄️ History Store - flat JSON file of BMI records
// Read in full on open, rewritten in full on every append

use crate::record::BmiRecord;
use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Why a history file produced no records
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// File read and parsed
    Loaded(usize),
    /// No file yet, or the file was empty
    Missing,
    /// File could not be read or parsed. `None` means it is still in place
    /// and the store will not write over it.
    Corrupt { moved_to: Option<PathBuf> },
}

pub struct HistoryStore {
    path: PathBuf,
    records: Vec<BmiRecord>,
    outcome: LoadOutcome,
}

impl HistoryStore {
    /// Open the history at `path`. A missing, empty or unreadable file is an
    /// empty history, never an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let (records, outcome) = load_history(&path);

        info!(path = %path.display(), records = records.len(), "history opened");

        HistoryStore {
            path,
            records,
            outcome,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// All records, oldest first
    pub fn records(&self) -> &[BmiRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&BmiRecord> {
        self.records.last()
    }

    /// Append one record and rewrite the file
    pub fn append(&mut self, record: BmiRecord) -> Result<()> {
        self.records.push(record);

        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }

        debug!(total = self.records.len(), "record appended");
        Ok(())
    }

    /// Drop every record and delete the file
    pub fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to remove history file: {:?}", self.path))
            }
        }

        let removed = self.records.len();
        self.records.clear();
        self.outcome = LoadOutcome::Missing;
        info!(removed, "history cleared");
        Ok(())
    }

    /// Write every record to `csv_path` with a header row. Returns the row count.
    pub fn export_csv<P: AsRef<Path>>(&self, csv_path: P) -> Result<usize> {
        let csv_path = csv_path.as_ref();
        let mut writer = csv::Writer::from_path(csv_path)
            .with_context(|| format!("Failed to create CSV file: {:?}", csv_path))?;

        for record in &self.records {
            writer
                .serialize(record)
                .context("Failed to write CSV row")?;
        }
        writer.flush().context("Failed to flush CSV file")?;

        info!(path = %csv_path.display(), rows = self.records.len(), "history exported");
        Ok(self.records.len())
    }

    /// Write to a sibling temp file then rename over the history file
    fn persist(&self) -> Result<()> {
        if let LoadOutcome::Corrupt { moved_to: None } = self.outcome {
            bail!(
                "History file {:?} could not be loaded or moved aside; refusing to overwrite it",
                self.path
            );
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create history directory: {:?}", parent))?;
            }
        }

        let tmp_path = sibling_with_suffix(&self.path, "tmp");
        {
            let file = fs::File::create(&tmp_path)
                .with_context(|| format!("Failed to create temp file: {:?}", tmp_path))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.records)
                .context("Failed to serialize history")?;
            writer.flush().context("Failed to write history")?;
        }

        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace history file: {:?}", self.path))?;

        Ok(())
    }
}

fn load_history(path: &Path) -> (Vec<BmiRecord>, LoadOutcome) {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no history file yet");
            return (Vec::new(), LoadOutcome::Missing);
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "history file unreadable, starting empty");
            return (Vec::new(), LoadOutcome::Corrupt { moved_to: None });
        }
    };

    if content.iter().all(u8::is_ascii_whitespace) {
        return (Vec::new(), LoadOutcome::Missing);
    }

    match serde_json::from_slice::<Vec<BmiRecord>>(&content) {
        Ok(records) => {
            let count = records.len();
            (records, LoadOutcome::Loaded(count))
        }
        Err(err) => {
            let moved_to = quarantine(path);
            warn!(
                path = %path.display(),
                error = %err,
                moved_to = ?moved_to,
                "history file is corrupt, starting empty"
            );
            (Vec::new(), LoadOutcome::Corrupt { moved_to })
        }
    }
}

/// Move a corrupt file out of the way so the next append cannot overwrite it
fn quarantine(path: &Path) -> Option<PathBuf> {
    let target = sibling_with_suffix(path, "corrupt");
    match fs::rename(path, &target) {
        Ok(()) => Some(target),
        Err(err) => {
            warn!(error = %err, "could not move corrupt history aside");
            None
        }
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

// ============================================================================
// TESTS
// ============================================================================
