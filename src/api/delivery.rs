use iced::widget::image::Handle;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::ApiError;

/// Get the resized image cache directory
/// Returns ~/.cache/fest-portal/images on Linux, None if it cannot be created
pub fn default_cache_dir() -> Option<PathBuf> {
    let mut path = dirs_next::cache_dir().or_else(dirs_next::home_dir)?;
    path.push("fest-portal");
    path.push("images");

    match fs::create_dir_all(&path) {
        Ok(()) => Some(path),
        Err(err) => {
            log::warn!("Image cache disabled, cannot create {}: {}", path.display(), err);
            None
        }
    }
}

/// Loads posters and avatars, resizes them to the requested box and
/// keeps a resized copy on disk.
///
/// Local paths are read from disk. `http(s)` URLs and root-relative paths
/// (when an asset base URL is configured) are downloaded.
#[derive(Debug, Clone)]
pub struct ImageDelivery {
    http: reqwest::Client,
    asset_base_url: Option<String>,
    cache_dir: Option<PathBuf>,
}

impl ImageDelivery {
    pub fn new(
        http: reqwest::Client,
        asset_base_url: Option<String>,
        cache_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            http,
            asset_base_url: asset_base_url.map(|u| u.trim_end_matches('/').to_string()),
            cache_dir,
        }
    }

    /// Resolve `path` to something renderable, at most `width`×`height`.
    pub async fn request(&self, path: &str, width: u32, height: u32) -> Result<Handle, ApiError> {
        let cached = self.cached_path(path, width, height);
        if let Some(cached) = cached.clone() {
            if cached.exists() {
                let hit = tokio::task::spawn_blocking(move || load_cached(&cached))
                    .await
                    .map_err(|err| ApiError::Image(err.to_string()))?;
                if let Some((w, h, pixels)) = hit {
                    return Ok(Handle::from_rgba(w, h, pixels));
                }
            }
        }

        let bytes = match self.remote_url(path) {
            Some(url) => {
                log::debug!("Downloading image {}", url);
                let response = self.http.get(&url).send().await?.error_for_status()?;
                response.bytes().await?.to_vec()
            }
            None => tokio::fs::read(path).await?,
        };

        let (w, h, pixels) = tokio::task::spawn_blocking(move || {
            resize_and_store(&bytes, width, height, cached.as_deref())
        })
        .await
        .map_err(|err| ApiError::Image(err.to_string()))??;

        Ok(Handle::from_rgba(w, h, pixels))
    }

    fn remote_url(&self, path: &str) -> Option<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        match (&self.asset_base_url, path.starts_with('/')) {
            (Some(base), true) => Some(format!("{}{}", base, path)),
            _ => None,
        }
    }

    /// Where the resized copy of `path` lives
    fn cached_path(&self, path: &str, width: u32, height: u32) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.png", cache_key(path, width, height))))
    }
}

/// Hex SHA-256 of the source and the requested box
fn cache_key(path: &str, width: u32, height: u32) -> String {
    hex::encode(Sha256::digest(format!("{path}:{width}x{height}").as_bytes()))
}

/// Decode a cached copy. An unreadable entry is removed so the next
/// request rebuilds it.
fn load_cached(cached: &Path) -> Option<(u32, u32, Vec<u8>)> {
    match image::open(cached) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            Some((rgba.width(), rgba.height(), rgba.into_raw()))
        }
        Err(err) => {
            log::warn!("Discarding broken cache entry {}: {}", cached.display(), err);
            let _ = fs::remove_file(cached);
            None
        }
    }
}

/// Encode to PNG in memory, then tmp + rename so a reader never sees a
/// partial file.
fn store_cached(img: &DynamicImage, target: &Path) -> Result<(), ApiError> {
    let mut encoded = Cursor::new(Vec::new());
    img.write_to(&mut encoded, ImageFormat::Png)?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = target.with_file_name(format!("{file_name}.tmp-{}", Uuid::new_v4().simple()));

    fs::write(&tmp, encoded.into_inner())?;
    if let Err(err) = fs::rename(&tmp, target) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

/// Decode, fit into `width`×`height`, and write a PNG copy if `cache` is set.
/// A failed cache write is logged, not returned.
fn resize_and_store(
    bytes: &[u8],
    width: u32,
    height: u32,
    cache: Option<&Path>,
) -> Result<(u32, u32, Vec<u8>), ApiError> {
    let img = image::load_from_memory(bytes)?;
    let resized = img.resize(width, height, FilterType::Lanczos3);

    if let Some(target) = cache {
        if let Err(err) = store_cached(&resized, target) {
            log::warn!("Could not cache {}: {}", target.display(), err);
        }
    }

    let rgba = resized.to_rgba8();
    Ok((rgba.width(), rgba.height(), rgba.into_raw()))
}
