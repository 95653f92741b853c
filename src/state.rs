use std::sync::Arc;

use crate::color::GenreColors;
use crate::config::DashboardConfig;
use crate::data::dashboard::{Dashboard, PipelineSettings};
use crate::data::filter::{FilterSpec, PopularityRange};
use crate::data::model::TrackDataset;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Widget values of the filter panel. Mutated freely by the UI; turned into
/// an immutable [`FilterSpec`] once per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInput {
    pub popularity_low: i64,
    pub popularity_high: i64,
    pub genre: String,
    pub artist: String,
    pub show_time_series: bool,
}

impl From<&FilterSpec> for FilterInput {
    fn from(spec: &FilterSpec) -> Self {
        FilterInput {
            popularity_low: spec.popularity_range.low(),
            popularity_high: spec.popularity_range.high(),
            genre: spec.genre.clone(),
            artist: spec.artist.clone(),
            show_time_series: spec.show_time_series,
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, shared read-only by every frame.
    pub dataset: Arc<TrackDataset>,

    /// Current filter widget values.
    pub input: FilterInput,

    /// Search text narrowing the artist combo box.
    pub artist_query: String,

    /// Bar / legend colour per genre.
    pub genre_colors: GenreColors,

    settings: PipelineSettings,

    /// Derived tables for the last distinct filter selection.
    dashboard: Dashboard,
}

impl AppState {
    pub fn new(dataset: Arc<TrackDataset>, config: &DashboardConfig) -> Result<Self, DashboardError> {
        let spec = FilterSpec::default_for(&dataset, config.popularity_range()?);
        spec.validate(&dataset)?;

        let settings = config.pipeline_settings();
        let dashboard = Dashboard::compute(&dataset, &spec, &settings);

        Ok(Self {
            input: FilterInput::from(&spec),
            artist_query: String::new(),
            genre_colors: GenreColors::new(dataset.genres()),
            settings,
            dashboard,
            dataset,
        })
    }

    /// Freeze the widget values into this frame's filter selection.
    pub fn current_spec(&self) -> FilterSpec {
        FilterSpec {
            popularity_range: PopularityRange::spanning(
                self.input.popularity_low,
                self.input.popularity_high,
            ),
            genre: self.input.genre.clone(),
            artist: self.input.artist.clone(),
            show_time_series: self.input.show_time_series,
        }
    }

    /// Rerun the pipeline if the selection changed since the last run.
    /// Returns whether anything was recomputed.
    pub fn refresh(&mut self) -> bool {
        let spec = self.current_spec();
        if spec == self.dashboard.spec {
            return false;
        }
        self.dashboard = Dashboard::compute(&self.dataset, &spec, &self.settings);
        true
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Slider limits: observed popularity, or the nominal 0–100 scale when
    /// no track has one.
    pub fn popularity_bounds(&self) -> (i64, i64) {
        self.dataset.popularity_bounds().unwrap_or((0, 100))
    }

    /// Move the lower slider, dragging the upper one along if needed.
    pub fn set_popularity_low(&mut self, low: i64) {
        self.input.popularity_low = low;
        if self.input.popularity_high < low {
            self.input.popularity_high = low;
        }
    }

    /// Move the upper slider, dragging the lower one along if needed.
    pub fn set_popularity_high(&mut self, high: i64) {
        self.input.popularity_high = high;
        if self.input.popularity_low > high {
            self.input.popularity_low = high;
        }
    }

    /// Artists whose name contains the search text (case-insensitive).
    pub fn matching_artists(&self) -> impl Iterator<Item = &String> + '_ {
        let query = self.artist_query.trim().to_lowercase();
        self.dataset
            .artists()
            .iter()
            .filter(move |a| query.is_empty() || a.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Track;

    fn state() -> AppState {
        let tracks = vec![
            Track {
                artist: Some("Dua Lipa".into()),
                genre: Some("pop".into()),
                popularity: Some(90),
                ..Default::default()
            },
            Track {
                artist: Some("Daft Punk".into()),
                genre: Some("edm".into()),
                popularity: Some(35),
                ..Default::default()
            },
            Track {
                artist: Some("Muse".into()),
                genre: Some("rock".into()),
                popularity: Some(60),
                ..Default::default()
            },
        ];
        AppState::new(
            Arc::new(TrackDataset::from_tracks(tracks)),
            &DashboardConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn starts_from_default_selection() {
        let s = state();
        assert_eq!(s.input.genre, "edm");
        assert_eq!(s.input.artist, "Daft Punk");
        assert_eq!((s.input.popularity_low, s.input.popularity_high), (35, 80));
        assert_eq!(s.dashboard().filtered, vec![1, 2]);
        assert_eq!(s.popularity_bounds(), (35, 90));
    }

    #[test]
    fn refresh_recomputes_only_on_change() {
        let mut s = state();
        assert!(!s.refresh());

        s.set_popularity_high(90);
        assert!(s.refresh());
        assert_eq!(s.dashboard().filtered, vec![0, 1, 2]);
        assert!(!s.refresh());

        s.input.show_time_series = false;
        assert!(s.refresh());
        assert!(s.dashboard().time_series.is_none());
    }

    #[test]
    fn sliders_keep_low_below_high() {
        let mut s = state();
        s.set_popularity_low(85);
        assert_eq!((s.input.popularity_low, s.input.popularity_high), (85, 85));
        s.set_popularity_high(40);
        assert_eq!((s.input.popularity_low, s.input.popularity_high), (40, 40));

        s.input.popularity_low = 70;
        let range = s.current_spec().popularity_range;
        assert_eq!((range.low(), range.high()), (40, 70));
    }

    #[test]
    fn artist_search_is_case_insensitive() {
        let mut s = state();
        s.artist_query = "  D ".into();
        let found: Vec<&String> = s.matching_artists().collect();
        assert_eq!(found, ["Daft Punk", "Dua Lipa"]);
        s.artist_query.clear();
        assert_eq!(s.matching_artists().count(), 3);
    }

    #[test]
    fn starts_when_every_genre_is_missing() {
        let tracks = vec![Track {
            artist: Some("A".into()),
            popularity: Some(50),
            ..Default::default()
        }];
        let s = AppState::new(
            Arc::new(TrackDataset::from_tracks(tracks)),
            &DashboardConfig::default(),
        )
        .unwrap();
        assert_eq!(s.input.genre, "");
        assert_eq!(s.dashboard().filtered, vec![0]);
        assert!(s.dashboard().genre_popularity.is_empty());
    }
}
