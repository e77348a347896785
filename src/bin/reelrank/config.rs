use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// One named bundle of dataset paths and engine tunables.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub movies: Option<PathBuf>,
    pub reviews: Option<PathBuf>,
    pub similarity_threshold: Option<f64>,
    pub min_reviews: Option<usize>,
    pub movie_weight: Option<f64>,
    pub limit: Option<usize>,
}

/// The CLI config file: `[datasets]` defaults plus named
/// `[profiles.<name>]` sections. Loaded once, never written.
#[derive(Debug, Default)]
pub struct CliConfig {
    data: RawConfig,
    profiles: HashMap<String, Profile>,
}

impl CliConfig {
    /// Loads the config file, `explicit` taking priority over the
    /// default location. A broken file at the default location only
    /// warns; a broken file the user named is an error.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let named = explicit.is_some();
        let path = explicit.or_else(default_config_path);
        let data = match path.as_ref() {
            Some(config_path) if config_path.exists() => match read_file(config_path) {
                Ok(data) => data,
                Err(err) if named => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        path = %config_path.display(),
                        error = %err,
                        "cli.config.invalid"
                    );
                    RawConfig::default()
                }
            },
            _ => RawConfig::default(),
        };
        let profiles = parse_profiles(&data)?;
        Ok(Self { data, profiles })
    }

    pub fn default_movies(&self) -> Option<&PathBuf> {
        self.data.datasets.movies.as_ref()
    }

    pub fn default_reviews(&self) -> Option<&PathBuf> {
        self.data.datasets.reviews.as_ref()
    }

    pub fn default_profile_name(&self) -> Option<&str> {
        self.data
            .default_profile
            .as_deref()
            .filter(|name| self.profiles.contains_key(*name))
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_profiles(data: &RawConfig) -> Result<HashMap<String, Profile>, ConfigError> {
    let mut profiles = HashMap::new();
    for (name, raw) in &data.profiles {
        profiles.insert(
            name.clone(),
            Profile {
                name: name.clone(),
                movies: raw.movies.clone(),
                reviews: raw.reviews.clone(),
                similarity_threshold: raw.similarity_threshold,
                min_reviews: raw.min_reviews,
                movie_weight: raw.movie_weight,
                limit: raw.limit,
            },
        );
    }
    if let Some(default_name) = data.default_profile.as_ref() {
        if !profiles.contains_key(default_name) {
            return Err(ConfigError::ProfileNotFound {
                name: default_name.clone(),
            });
        }
    }
    Ok(profiles)
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    datasets: DatasetSection,
    #[serde(default)]
    profiles: HashMap<String, RawProfile>,
    #[serde(default)]
    default_profile: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DatasetSection {
    movies: Option<PathBuf>,
    reviews: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    movies: Option<PathBuf>,
    reviews: Option<PathBuf>,
    similarity_threshold: Option<f64>,
    min_reviews: Option<usize>,
    movie_weight: Option<f64>,
    limit: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read CLI config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse CLI config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("reelrank").join("cli.toml"))
}
