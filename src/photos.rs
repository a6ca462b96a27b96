//! Locally stored photos.
//!
//! The store is a JSONL file with one record per photo, the image inlined as
//! a base64 `data:` URL. The display only reads it; the `photos` CLI
//! subcommands add and remove entries out-of-band.

use crate::error::{BoardError, Result};
use crate::item::Photo;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Accepted image extensions and their MIME types.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
];

/// Read access to the stored photos.
pub trait PhotoStore: Send + Sync {
    /// All photos in insertion order. A missing store is empty.
    fn list(&self) -> Result<Vec<Photo>>;
}

/// Which photo to remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSelector {
    /// Zero-based position in the store.
    Index(usize),
    /// First photo with this name.
    Name(String),
}

impl PhotoSelector {
    /// A purely numeric argument is a position; anything else is a name.
    pub fn parse(arg: &str) -> Self {
        match arg.trim().parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(arg.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhotoRecord {
    name: String,
    data_url: String,
    added_at: DateTime<Utc>,
}

impl From<PhotoRecord> for Photo {
    fn from(r: PhotoRecord) -> Self {
        Self {
            name: r.name,
            data_url: r.data_url,
            added_at: r.added_at,
        }
    }
}

impl From<&Photo> for PhotoRecord {
    fn from(p: &Photo) -> Self {
        Self {
            name: p.name.clone(),
            data_url: p.data_url.clone(),
            added_at: p.added_at,
        }
    }
}

/// A photo store backed by a JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlPhotoStore {
    path: PathBuf,
}

impl JsonlPhotoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode the image at `image_path` and append it to the store.
    pub fn add(&self, image_path: &Path) -> Result<Photo> {
        let mime = mime_for(image_path)?;
        let bytes = std::fs::read(image_path).map_err(|e| {
            BoardError::PhotoStore(format!("cannot read '{}': {e}", image_path.display()))
        })?;
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BoardError::Input("image path has no file name".to_owned()))?;

        let photo = Photo {
            name,
            data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            added_at: Utc::now(),
        };
        self.append(&photo)?;
        tracing::info!(name = %photo.name, "photo added");
        Ok(photo)
    }

    /// Remove one photo and rewrite the store. Returns the removed photo.
    pub fn remove(&self, selector: &PhotoSelector) -> Result<Photo> {
        let mut photos = self.list()?;
        let index = match selector {
            PhotoSelector::Index(index) => Some(*index).filter(|i| *i < photos.len()),
            PhotoSelector::Name(name) => photos.iter().position(|p| &p.name == name),
        };
        let Some(index) = index else {
            return Err(BoardError::PhotoStore(format!(
                "photo not found: {}",
                match selector {
                    PhotoSelector::Index(i) => i.to_string(),
                    PhotoSelector::Name(n) => n.clone(),
                }
            )));
        };
        let removed = photos.remove(index);
        self.rewrite(&photos)?;
        tracing::info!(name = %removed.name, remaining = photos.len(), "photo removed");
        Ok(removed)
    }

    fn append(&self, photo: &Photo) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(&PhotoRecord::from(photo))
            .map_err(|e| BoardError::PhotoStore(format!("photo serialization failed: {e}")))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        Ok(())
    }

    /// Replace the whole store (temp file → fsync → rename).
    fn rewrite(&self, photos: &[Photo]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("jsonl.tmp");
        let mut file = std::fs::File::create(&tmp_path)?;
        for photo in photos {
            let line = serde_json::to_string(&PhotoRecord::from(photo))
                .map_err(|e| BoardError::PhotoStore(format!("photo serialization failed: {e}")))?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        file.sync_all()?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            BoardError::PhotoStore(format!(
                "failed to rename '{}' to '{}': {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })?;
        Ok(())
    }
}

impl PhotoStore for JsonlPhotoStore {
    fn list(&self) -> Result<Vec<Photo>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BoardError::Io(e)),
        };

        let mut photos = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<PhotoRecord>(trimmed) {
                Ok(record) => photos.push(record.into()),
                Err(e) => {
                    tracing::warn!(line = number + 1, error = %e, "photos: skipping malformed record");
                }
            }
        }
        Ok(photos)
    }
}

fn mime_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| {
            let supported: Vec<&str> = IMAGE_TYPES.iter().map(|(e, _)| *e).collect();
            BoardError::Input(format!(
                "unsupported image format '{}'; supported: {}",
                path.display(),
                supported.join(", ")
            ))
        })
}
