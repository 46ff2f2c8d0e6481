/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the GraphQL layer and the UI layer.
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A single poster shown in the marquee
///
/// Duplicates are allowed: repeating the same asset is how the
/// marquee produces a seamless loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Filename relative to the poster directory (e.g., "Desafio.jpg")
    pub identifier: String,
}

impl ImageAsset {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// Path handed to the image delivery layer: `<base-dir>/<identifier>`
    pub fn path(&self, base_dir: &str) -> String {
        format!("{}/{}", base_dir.trim_end_matches('/'), self.identifier)
    }
}

/// One selectable avatar, as returned by `getAvatars`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarOption {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// The authenticated user, as returned by `me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// Currently chosen avatar URL (None until one has been picked)
    pub profile_image: Option<String>,
}

/// Outcome of a remote read
///
/// Replaces loading/data flag pairs: there is no state in which a
/// request has finished but produced neither data nor an error.
#[derive(Debug, Clone)]
pub enum Fetch<T> {
    Pending,
    Ready(T),
    Failed(ApiError),
}

impl<T> Default for Fetch<T> {
    fn default() -> Self {
        Fetch::Pending
    }
}

impl<T> Fetch<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Fetch::Ready(value),
            Err(err) => Fetch::Failed(err),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Fetch::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Fetch::Pending)
    }
}
