//! Artist storage sinks.
//!
//! [`ArtistStorage`] is the capability the ingestion strategy saves through.
//! Two implementations are provided: [`MemoryStorage`] for tests and embedding,
//! and [`JsonLinesStorage`] which appends one JSON record per artist to a file.

use crate::{Artist, IngestError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait ArtistStorage {
    /// Persist a newly discovered artist
    async fn save_artist(&mut self, artist: &Artist) -> Result<()>;

    /// Ids of every artist already persisted, for seeding a visited-set
    async fn load_artist_ids(&self) -> Result<HashSet<String>>;
}

/// In-memory storage implementation, keeps artists in save order
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    artists: Vec<Artist>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }
}

#[async_trait(?Send)]
impl ArtistStorage for MemoryStorage {
    async fn save_artist(&mut self, artist: &Artist) -> Result<()> {
        self.artists.push(artist.clone());
        Ok(())
    }

    async fn load_artist_ids(&self) -> Result<HashSet<String>> {
        Ok(self.artists.iter().map(|a| a.id.clone()).collect())
    }
}

/// One line of a [`JsonLinesStorage`] file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    #[serde(flatten)]
    pub artist: Artist,
    pub ingested_at: DateTime<Utc>,
}

/// File-based storage writing newline-delimited JSON.
///
/// Records are appended, so the file doubles as an ingestion log. The default
/// location is `~/.local/share/verse-ingest/artists.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonLinesStorage {
    path: PathBuf,
}

impl JsonLinesStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the default XDG data location
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            IngestError::Storage("Cannot determine XDG data directory".to_string())
        })?;
        Ok(data_dir.join("verse-ingest").join("artists.jsonl"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the file. A missing file yields no records.
    pub fn load_records(&self) -> Result<Vec<ArtistRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&self.path)?);
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ArtistRecord = serde_json::from_str(&line).map_err(|e| {
                IngestError::Storage(format!(
                    "{}:{}: malformed record: {e}",
                    self.path.display(),
                    index + 1
                ))
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait(?Send)]
impl ArtistStorage for JsonLinesStorage {
    async fn save_artist(&mut self, artist: &Artist) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let record = ArtistRecord {
            artist: artist.clone(),
            ingested_at: Utc::now(),
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| IngestError::Storage(format!("Failed to serialize artist: {e}")))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;

        log::debug!("Appended artist {} to {}", artist.id, self.path.display());
        Ok(())
    }

    async fn load_artist_ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .load_records()?
            .into_iter()
            .map(|record| record.artist.id)
            .collect())
    }
}
