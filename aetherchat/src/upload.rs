//! Local upload simulator for documents offered to the tutor.
//!
//! Nothing is transmitted. Files are checked against the accepted types and
//! size limit, then each accepted file reports fake progress on a timer until
//! it completes or the deadline forces it to.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::distr::Alphanumeric;
use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::debug;

/// File extensions the tutor accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".pdf", ".txt", ".docx", ".md"];

/// Largest accepted file, 10 MiB.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

const TICK: Duration = Duration::from_millis(200);
const TICKS_UNTIL_DONE: u32 = 10;
const MAX_STEP: f64 = 30.0;
const ID_LEN: usize = 9;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{name}: unsupported file type (accepted: {})", ACCEPTED_EXTENSIONS.join(", "))]
    UnsupportedType { name: String },

    #[error("{name}: {} exceeds the {} limit", format_size(*size), format_size(MAX_FILE_BYTES))]
    TooLarge { name: String, size: u64 },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub size: u64,
}

impl Candidate {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Describe a file on disk from its metadata. The contents are not read.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let metadata = std::fs::metadata(path).map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.file_name().map_or_else(
            || path.to_string_lossy().to_string(),
            |n| n.to_string_lossy().to_string(),
        );
        Ok(Self::new(name, metadata.len()))
    }

    /// Check type and size limits.
    pub fn validate(&self) -> Result<(), UploadError> {
        let lower = self.name.to_lowercase();
        if !ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Err(UploadError::UnsupportedType {
                name: self.name.clone(),
            });
        }
        if self.size > MAX_FILE_BYTES {
            return Err(UploadError::TooLarge {
                name: self.name.clone(),
                size: self.size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Completed,
}

/// An accepted file and its simulated progress.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub status: UploadStatus,
    /// Percent complete, 0 to 100.
    pub progress: f64,
}

/// Progress notifications from the simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// A file was accepted and starts at 0%.
    Started(UploadedFile),
    /// Progress moved forward.
    Progress { id: String, progress: f64 },
    /// The file reached 100%. Carries its final state.
    Completed(UploadedFile),
}

/// Result of handing files to the simulator.
#[derive(Debug)]
pub struct UploadBatch {
    /// Files that failed validation.
    pub rejected: Vec<UploadError>,
    /// Events for accepted files. Closes once every file completes.
    pub events: mpsc::Receiver<UploadEvent>,
}

/// Validate the candidates and start simulated uploads for the valid ones.
///
/// Must be called within a tokio runtime.
pub fn simulate(candidates: Vec<Candidate>) -> UploadBatch {
    let (tx, rx) = mpsc::channel(64);
    let mut rejected = Vec::new();

    for candidate in candidates {
        if let Err(e) = candidate.validate() {
            debug!(error = %e, "rejecting upload");
            rejected.push(e);
            continue;
        }

        let file = UploadedFile {
            id: short_id(),
            name: candidate.name,
            size: candidate.size,
            status: UploadStatus::Uploading,
            progress: 0.0,
        };
        tokio::spawn(run_upload(file, tx.clone()));
    }

    UploadBatch {
        rejected,
        events: rx,
    }
}

async fn run_upload(mut file: UploadedFile, tx: mpsc::Sender<UploadEvent>) {
    let id = file.id.clone();
    let mut progress = file.progress;
    if tx.send(UploadEvent::Started(file.clone())).await.is_err() {
        return;
    }

    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    for tick in 1..=TICKS_UNTIL_DONE {
        ticker.tick().await;

        progress = if tick == TICKS_UNTIL_DONE {
            100.0
        } else {
            (progress + rand::random_range(0.0..MAX_STEP)).min(100.0)
        };

        let event = UploadEvent::Progress {
            id: id.clone(),
            progress,
        };
        if tx.send(event).await.is_err() {
            return;
        }
        if progress >= 100.0 {
            break;
        }
    }

    file.progress = progress;
    file.status = UploadStatus::Completed;
    let _ = tx.send(UploadEvent::Completed(file)).await;
}

fn short_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

/// Human-readable size, base 1024, at most two decimals.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    const K: f64 = 1024.0;

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let bytes = bytes as f64;
    let exp = ((bytes.ln() / K.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes / K.powi(exp as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[exp])
}
