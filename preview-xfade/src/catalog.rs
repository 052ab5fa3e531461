//! Artist list loading
//!
//! Reads the top-artists JSON shape served to the dashboard. Only the fields
//! the preview controller needs are kept; everything else (images, follower
//! counts, popularity) is ignored.
//!
//! ```json
//! [
//!   {
//!     "id": "4Z8W4fKeB5YxbusRsdQVPb",
//!     "name": "Radiohead",
//!     "topTrackName": "Creep",
//!     "topTrackPreview": "https://p.scdn.co/mp3-preview/..."
//!   }
//! ]
//! ```

use crate::Result;
use preview_common::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// One card of the artist list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistEntry {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub top_track_name: Option<String>,
    #[serde(default)]
    pub top_track_preview: Option<String>,
}

impl ArtistEntry {
    /// Preview clip URL, if the artist has a non-blank one
    pub fn preview_url(&self) -> Option<&str> {
        self.top_track_preview
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// The active item list, in display order
#[derive(Debug, Clone, Default)]
pub struct ArtistList {
    entries: Vec<ArtistEntry>,
}

impl ArtistList {
    /// Parse a JSON array of artists
    ///
    /// Item ids must be unique within the list; later duplicates are dropped.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: Vec<ArtistEntry> = serde_json::from_str(content)?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(raw.len());
        for entry in raw {
            if seen.insert(entry.id.clone()) {
                entries.push(entry);
            } else {
                warn!("Dropping duplicate artist id {}", entry.id);
            }
        }

        Ok(Self { entries })
    }

    /// Read and parse an artist list file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    pub fn get(&self, id: &ItemId) -> Option<&ArtistEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Preview URL for an item, if it exists and has one
    pub fn preview_url(&self, id: &ItemId) -> Option<&str> {
        self.get(id).and_then(ArtistEntry::preview_url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtistEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
