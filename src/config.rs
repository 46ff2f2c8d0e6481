//! Runtime configuration read from the environment.
//!
//! | Variable              | Default                          |
//! |-----------------------|----------------------------------|
//! | `FEST_GRAPHQL_URL`    | `http://localhost:4000/graphql`  |
//! | `FEST_AUTH_TOKEN`     | none                             |
//! | `FEST_ASSET_BASE_URL` | none                             |
//! | `FEST_POSTER_DIR`     | `assets/Core_Event_Posters`      |
//! | `FEST_POSTERS`        | discovered, else built-in list   |
//! | `FEST_MARQUEE_SPEED`  | `2`                              |
//! | `FEST_VIEWPORT_WIDTH` | measured from the main window    |
//! | `FEST_MODAL_SIZE`     | `md`                             |
//! | `FEST_MODAL_ROUNDED`  | `2xl`                            |
//!
//! Invalid values are logged and replaced by their default.

use std::path::Path;
use walkdir::WalkDir;

use crate::error::ConfigError;
use crate::state::data::ImageAsset;
use crate::state::modal::{ModalSize, Rounded};

pub const DEFAULT_GRAPHQL_URL: &str = "http://localhost:4000/graphql";
pub const DEFAULT_POSTER_DIR: &str = "assets/Core_Event_Posters";
pub const DEFAULT_MARQUEE_SPEED: f32 = 2.0;
pub const DEFAULT_MODAL_SIZE: ModalSize = ModalSize::Md;

const DEFAULT_POSTERS: [&str; 10] = [
    "Battle_of_Bands_WEB.jpg",
    "Copy of NAVARASA_WithoutContact.png",
    "Desafio.jpg",
    "Stomp That.jpg",
    "VibeV3.jpg",
    "COUTURE_WEB.jpg",
    "Knuckle Down.jpg",
    "TULU_POSTER_WEB.jpg",
    "usaravalli@3x.jpg",
    "Hogathon.jpg",
];

const POSTER_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub graphql_url: String,
    pub auth_token: Option<String>,
    /// Prefix for root-relative image paths returned by the server
    pub asset_base_url: Option<String>,
    pub poster_dir: String,
    pub posters: Vec<ImageAsset>,
    pub marquee_speed: f32,
    /// Skips measuring the window when set
    pub viewport_width: Option<f32>,
    /// Width preset of the avatar modal
    pub modal_size: ModalSize,
    /// Corner preset of modal panels
    pub modal_rounded: Rounded,
}

impl AppConfig {
    pub fn from_environment() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `lookup` returns None for unset names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let graphql_url = var("FEST_GRAPHQL_URL").unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string());
        let poster_dir = var("FEST_POSTER_DIR").unwrap_or_else(|| DEFAULT_POSTER_DIR.to_string());

        let marquee_speed = var("FEST_MARQUEE_SPEED")
            .map(|raw| parse_number("FEST_MARQUEE_SPEED", &raw))
            .transpose()
            .unwrap_or_else(|err| {
                log::warn!("{}; using {}", err, DEFAULT_MARQUEE_SPEED);
                None
            })
            .unwrap_or(DEFAULT_MARQUEE_SPEED);

        let viewport_width = var("FEST_VIEWPORT_WIDTH")
            .map(|raw| parse_number("FEST_VIEWPORT_WIDTH", &raw))
            .transpose()
            .unwrap_or_else(|err| {
                log::warn!("{}; measuring the window instead", err);
                None
            });

        let posters = match var("FEST_POSTERS").map(|raw| parse_posters(&raw)) {
            Some(Ok(list)) => list,
            Some(Err(err)) => {
                log::warn!("{}; discovering posters instead", err);
                discover_or_default(&poster_dir)
            }
            None => discover_or_default(&poster_dir),
        };

        Self {
            graphql_url,
            auth_token: var("FEST_AUTH_TOKEN"),
            asset_base_url: var("FEST_ASSET_BASE_URL"),
            poster_dir,
            posters,
            marquee_speed,
            viewport_width,
            modal_size: var("FEST_MODAL_SIZE")
                .map(|raw| parse_modal_size(raw.trim()))
                .unwrap_or(DEFAULT_MODAL_SIZE),
            modal_rounded: var("FEST_MODAL_ROUNDED")
                .map(|raw| Rounded::parse(raw.trim()))
                .unwrap_or_default(),
        }
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<f32, ConfigError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        })
}

fn parse_modal_size(raw: &str) -> ModalSize {
    ModalSize::parse(raw).unwrap_or_else(|| {
        log::warn!("Unknown modal size {:?}, using md", raw);
        DEFAULT_MODAL_SIZE
    })
}

/// Comma separated identifiers, order kept, duplicates kept
fn parse_posters(raw: &str) -> Result<Vec<ImageAsset>, ConfigError> {
    let posters: Vec<ImageAsset> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ImageAsset::new)
        .collect();
    if posters.is_empty() {
        return Err(ConfigError::Empty { name: "FEST_POSTERS" });
    }
    Ok(posters)
}

fn discover_or_default(poster_dir: &str) -> Vec<ImageAsset> {
    let found = discover_posters(Path::new(poster_dir));
    if found.is_empty() {
        log::debug!("No posters under {}, using built-in list", poster_dir);
        return default_posters();
    }
    log::info!("Found {} posters under {}", found.len() / 2, poster_dir);
    found
}

/// The built-in poster list, repeated once for a seamless loop
pub fn default_posters() -> Vec<ImageAsset> {
    DEFAULT_POSTERS
        .iter()
        .chain(DEFAULT_POSTERS.iter())
        .map(|name| ImageAsset::new(*name))
        .collect()
}

/// Image files directly inside `dir`, sorted by name and repeated once.
/// Missing or unreadable directories yield nothing.
pub fn discover_posters(dir: &Path) -> Vec<ImageAsset> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .map_or(false, |ext| POSTER_EXTENSIONS.contains(&ext.as_str()))
        })
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();

    names
        .iter()
        .chain(names.iter())
        .map(|name| ImageAsset::new(name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[("FEST_POSTER_DIR", "/nonexistent/posters")]);
        assert_eq!(config.graphql_url, DEFAULT_GRAPHQL_URL);
        assert_eq!(config.auth_token, None);
        assert_eq!(config.marquee_speed, DEFAULT_MARQUEE_SPEED);
        assert_eq!(config.viewport_width, None);
        assert_eq!(config.modal_rounded, Rounded::Xl2);
        assert_eq!(config.modal_size, ModalSize::Md);
        assert_eq!(config.posters, default_posters());
        assert_eq!(config.posters.len(), 20);
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            ("FEST_GRAPHQL_URL", "https://api.example.org/graphql"),
            ("FEST_AUTH_TOKEN", "abc"),
            ("FEST_MARQUEE_SPEED", " -3.5 "),
            ("FEST_VIEWPORT_WIDTH", "390"),
            ("FEST_POSTERS", "a.jpg, b.jpg,,a.jpg"),
            ("FEST_MODAL_ROUNDED", "lg"),
            ("FEST_MODAL_SIZE", "small"),
        ]);
        assert_eq!(config.modal_rounded, Rounded::Lg);
        assert_eq!(config.modal_size, ModalSize::Small);
        assert_eq!(config.graphql_url, "https://api.example.org/graphql");
        assert_eq!(config.auth_token.as_deref(), Some("abc"));
        assert_eq!(config.marquee_speed, -3.5);
        assert_eq!(config.viewport_width, Some(390.0));
        assert_eq!(
            config.posters,
            vec![ImageAsset::new("a.jpg"), ImageAsset::new("b.jpg"), ImageAsset::new("a.jpg")]
        );
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("FEST_MARQUEE_SPEED", "fast"),
            ("FEST_VIEWPORT_WIDTH", "NaN"),
            ("FEST_MODAL_SIZE", "huge"),
            ("FEST_POSTER_DIR", "/nonexistent/posters"),
        ]);
        assert_eq!(config.modal_size, ModalSize::Md);
        assert_eq!(config.marquee_speed, DEFAULT_MARQUEE_SPEED);
        assert_eq!(config.viewport_width, None);
    }

    #[test]
    fn test_parse_number_reports_name() {
        assert_eq!(
            parse_number("FEST_MARQUEE_SPEED", "x"),
            Err(ConfigError::InvalidNumber {
                name: "FEST_MARQUEE_SPEED",
                value: "x".into()
            })
        );
    }

    #[test]
    fn test_discovers_images_sorted_and_doubled() {
        let dir = TempDir::new().unwrap();
        for name in ["b.png", "a.JPG", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.jpg"), b"x").unwrap();

        let found = discover_posters(dir.path());
        let names: Vec<&str> = found.iter().map(|a| a.identifier.as_str()).collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "a.JPG", "b.png"]);
    }

    #[test]
    fn test_poster_dir_discovery_is_used() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Hogathon.jpg"), b"x").unwrap();
        let dir_str = dir.path().to_string_lossy().to_string();

        let config = config_from(&[("FEST_POSTER_DIR", dir_str.as_str())]);
        assert_eq!(config.posters.len(), 2);
        assert_eq!(config.poster_dir, dir_str);
    }
}
