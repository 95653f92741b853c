use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::dashboard::PipelineSettings;
use crate::data::filter::PopularityRange;
use crate::data::model::Field;
use crate::error::DashboardError;

/// Overrides the configuration file location.
pub const CONFIG_ENV: &str = "TRACK_DASHBOARD_CONFIG";
/// Overrides the dataset path from the configuration file.
pub const DATA_ENV: &str = "TRACK_DASHBOARD_DATA";
/// Looked up in the working directory when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "track-dashboard.toml";
/// Upper bound on `histogram_bins`; the bins are rebuilt on every recompute.
pub const MAX_HISTOGRAM_BINS: usize = 1000;

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Source column name for each track attribute. Every column is required.
///
/// Defaults match the Spotify playlist exports the dashboard was built for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMap {
    pub album_name: String,
    pub artist: String,
    pub popularity: String,
    pub danceability: String,
    pub energy: String,
    pub tempo: String,
    pub valence: String,
    pub acousticness: String,
    pub instrumentalness: String,
    pub genre: String,
    pub release_date: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            album_name: "track_album_name".into(),
            artist: "track_artist".into(),
            popularity: "track_popularity".into(),
            danceability: "danceability".into(),
            energy: "energy".into(),
            tempo: "tempo".into(),
            valence: "valence".into(),
            acousticness: "acousticness".into(),
            instrumentalness: "instrumentalness".into(),
            genre: "playlist_genre".into(),
            release_date: "track_album_release_date".into(),
        }
    }
}

impl ColumnMap {
    pub fn column_for(&self, field: Field) -> &str {
        match field {
            Field::AlbumName => &self.album_name,
            Field::Artist => &self.artist,
            Field::Popularity => &self.popularity,
            Field::Danceability => &self.danceability,
            Field::Energy => &self.energy,
            Field::Tempo => &self.tempo,
            Field::Valence => &self.valence,
            Field::Acousticness => &self.acousticness,
            Field::Instrumentalness => &self.instrumentalness,
            Field::Genre => &self.genre,
            Field::ReleaseDate => &self.release_date,
        }
    }

    /// Find every mapped column in `headers`, in [`Field::ALL`] order.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<Vec<(Field, usize)>, DashboardError> {
        Field::ALL
            .iter()
            .map(|&field| {
                let column = self.column_for(field);
                headers
                    .iter()
                    .position(|h| h.as_ref() == column)
                    .map(|idx| (field, idx))
                    .ok_or_else(|| DashboardError::MissingColumn {
                        column: column.to_string(),
                        field: field.label().to_string(),
                    })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Dataset to load; [`DATA_ENV`] takes precedence.
    pub data_path: Option<PathBuf>,
    /// Bin count of the popularity histogram.
    pub histogram_bins: usize,
    /// Initial popularity slider range, `[low, high]`.
    pub default_popularity_range: [i64; 2],
    pub columns: ColumnMap,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            histogram_bins: 30,
            default_popularity_range: [20, 80],
            columns: ColumnMap::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from [`CONFIG_ENV`] or [`DEFAULT_CONFIG_FILE`].
    ///
    /// A missing default file means defaults; a missing file named explicitly
    /// through the environment is an error.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    log::info!("No {DEFAULT_CONFIG_FILE} found, using default configuration");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("loading configuration file {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, DashboardError> {
        let config: Self =
            toml::from_str(text).map_err(|e| DashboardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), DashboardError> {
        if !(1..=MAX_HISTOGRAM_BINS).contains(&self.histogram_bins) {
            return Err(DashboardError::Config(format!(
                "histogram_bins must be between 1 and {MAX_HISTOGRAM_BINS}, got {}",
                self.histogram_bins
            )));
        }
        self.popularity_range()
            .map_err(|e| DashboardError::Config(e.to_string()))?;
        Ok(())
    }

    pub fn popularity_range(&self) -> Result<PopularityRange, DashboardError> {
        let [low, high] = self.default_popularity_range;
        PopularityRange::new(low, high)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            histogram_bins: self.histogram_bins,
        }
    }

    /// Dataset path from [`DATA_ENV`] or the file; `None` when neither is set.
    pub fn resolve_data_path(&self) -> Option<PathBuf> {
        pick_data_path(std::env::var_os(DATA_ENV), self.data_path.as_deref())
    }
}

fn pick_data_path(env: Option<OsString>, configured: Option<&Path>) -> Option<PathBuf> {
    env.filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| configured.map(Path::to_path_buf))
}
