//! Persisted high-water mark of delivered posts.
//!
//! The mark is a single decimal scalar in a text file, either the Unix date
//! or the id of the last delivered post. It only moves forward.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::vk::Post;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("failed to read watermark {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("watermark {path} is not an integer: {value:?}")]
    Parse { path: PathBuf, value: String },
    #[error("failed to write watermark {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which post field the watermark tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkKey {
    Date,
    Id,
}

impl WatermarkKey {
    /// The value of this key on `post`.
    #[must_use]
    pub fn of(self, post: &Post) -> i64 {
        match self {
            Self::Date => post.date,
            Self::Id => post.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Watermark {
    key: WatermarkKey,
    value: Option<i64>,
    path: PathBuf,
}

impl Watermark {
    /// Watermark with no value, persisted to `path`.
    #[must_use]
    pub fn unset(key: WatermarkKey, path: impl Into<PathBuf>) -> Self {
        Self {
            key,
            value: None,
            path: path.into(),
        }
    }

    /// Load the watermark stored at `path`.
    ///
    /// A missing or empty file yields an unset watermark.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(key: WatermarkKey, path: impl Into<PathBuf>) -> Result<Self, WatermarkError> {
        let path = path.into();
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "No watermark file, every fetched post is new");
                return Ok(Self::unset(key, path));
            }
            Err(source) => return Err(WatermarkError::Read { path, source }),
        };

        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(Self::unset(key, path));
        }
        let value: i64 = trimmed.parse().map_err(|_| WatermarkError::Parse {
            path: path.clone(),
            value: trimmed.to_string(),
        })?;

        info!(path = %path.display(), value, "Watermark loaded");
        Ok(Self {
            key,
            value: Some(value),
            path,
        })
    }

    #[must_use]
    pub fn value(&self) -> Option<i64> {
        self.value
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `post` is at or below the mark.
    #[must_use]
    pub fn covers(&self, post: &Post) -> bool {
        self.value.is_some_and(|mark| self.key.of(post) <= mark)
    }

    /// Move the mark up to `post` and persist it.
    ///
    /// The in-memory mark advances even when the write fails, so a write error
    /// only risks redelivery after a restart. Never moves the mark backwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the file could not be written.
    pub async fn advance(&mut self, post: &Post) -> Result<(), WatermarkError> {
        let candidate = self.key.of(post);
        if self.value.is_some_and(|mark| candidate <= mark) {
            debug!(value = candidate, "Watermark already past post");
            return Ok(());
        }
        self.value = Some(candidate);
        self.persist().await?;
        info!(value = candidate, "Watermark updated");
        Ok(())
    }

    async fn persist(&self) -> Result<(), WatermarkError> {
        let Some(value) = self.value else {
            return Ok(());
        };
        let write_err = |source| WatermarkError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        tokio::fs::write(&self.path, value.to_string())
            .await
            .map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: i64, date: i64) -> Post {
        Post {
            id,
            owner_id: -1,
            date,
            ..Post::default()
        }
    }

    #[test]
    fn test_unset_covers_nothing() {
        let mark = Watermark::unset(WatermarkKey::Date, "unused");
        assert!(!mark.covers(&post(1, 0)));
    }

    #[test]
    fn test_covers_is_inclusive() {
        let mark = Watermark {
            key: WatermarkKey::Date,
            value: Some(1000),
            path: PathBuf::from("unused"),
        };
        assert!(mark.covers(&post(1, 999)));
        assert!(mark.covers(&post(1, 1000)));
        assert!(!mark.covers(&post(1, 1001)));
    }

    #[test]
    fn test_id_key_compares_ids() {
        let mark = Watermark {
            key: WatermarkKey::Id,
            value: Some(50),
            path: PathBuf::from("unused"),
        };
        assert!(mark.covers(&post(50, 9_999_999)));
        assert!(!mark.covers(&post(51, 0)));
    }
}
