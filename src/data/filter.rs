use crate::error::DashboardError;

use super::model::{Track, TrackDataset};

// ---------------------------------------------------------------------------
// FilterSpec: the sidebar selection for one render pass
// ---------------------------------------------------------------------------

/// Inclusive popularity bounds, `low <= high` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularityRange {
    low: i64,
    high: i64,
}

impl PopularityRange {
    pub fn new(low: i64, high: i64) -> Result<Self, DashboardError> {
        if low > high {
            return Err(DashboardError::InvalidFilter(format!(
                "popularity range {low}..={high} has low > high"
            )));
        }
        Ok(Self { low, high })
    }

    /// Range between two slider ends given in either order.
    pub fn spanning(a: i64, b: i64) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> i64 {
        self.low
    }

    pub fn high(&self) -> i64 {
        self.high
    }

    pub fn contains(&self, popularity: i64) -> bool {
        (self.low..=self.high).contains(&popularity)
    }

    /// Narrow the range to `[min, max]`, keeping `low <= high`.
    pub fn clamped_to(&self, min: i64, max: i64) -> Self {
        let low = self.low.clamp(min, max);
        let high = self.high.clamp(low, max.max(low));
        Self { low, high }
    }
}

/// Immutable filter parameters, rebuilt from widget input on every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub popularity_range: PopularityRange,
    pub genre: String,
    pub artist: String,
    pub show_time_series: bool,
}

impl FilterSpec {
    /// Initial selection for a freshly loaded dataset: `default_range` clamped
    /// to the observed popularity, the first genre and artist, time series on.
    pub fn default_for(dataset: &TrackDataset, default_range: PopularityRange) -> Self {
        let popularity_range = match dataset.popularity_bounds() {
            Some((min, max)) => default_range.clamped_to(min, max),
            None => default_range,
        };
        FilterSpec {
            popularity_range,
            genre: dataset.genres().iter().next().cloned().unwrap_or_default(),
            artist: dataset.artists().iter().next().cloned().unwrap_or_default(),
            show_time_series: true,
        }
    }

    /// Check that genre and artist are among the dataset's selectable values.
    pub fn validate(&self, dataset: &TrackDataset) -> Result<(), DashboardError> {
        if !dataset.genres().is_empty() && !dataset.genres().contains(&self.genre) {
            return Err(DashboardError::InvalidFilter(format!(
                "genre '{}' does not occur in the dataset",
                self.genre
            )));
        }
        if !dataset.artists().is_empty() && !dataset.artists().contains(&self.artist) {
            return Err(DashboardError::InvalidFilter(format!(
                "artist '{}' does not occur in the dataset",
                self.artist
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DerivedView: a named, read-only subset of the dataset
// ---------------------------------------------------------------------------

/// Row indices into a shared dataset. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct DerivedView<'a> {
    name: &'static str,
    dataset: &'a TrackDataset,
    indices: Vec<usize>,
}

impl<'a> DerivedView<'a> {
    /// The whole dataset as a view.
    pub fn all(dataset: &'a TrackDataset) -> Self {
        DerivedView {
            name: "all tracks",
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    fn select(
        name: &'static str,
        dataset: &'a TrackDataset,
        keep: impl Fn(&Track) -> bool,
    ) -> Self {
        let indices = dataset
            .tracks()
            .iter()
            .enumerate()
            .filter(|(_, t)| keep(t))
            .map(|(i, _)| i)
            .collect();
        DerivedView {
            name,
            dataset,
            indices,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Borrow the selected tracks, in dataset order.
    pub fn tracks(&self) -> Vec<&'a Track> {
        let all = self.dataset.tracks();
        self.indices.iter().map(|&i| &all[i]).collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Tracks whose popularity lies in `range` (both ends inclusive).
/// Tracks without a popularity never pass.
pub fn filter_by_popularity(dataset: &TrackDataset, range: PopularityRange) -> DerivedView<'_> {
    DerivedView::select("filtered by popularity", dataset, |t| {
        t.popularity.is_some_and(|p| range.contains(p))
    })
}

/// Tracks whose genre equals `genre` exactly (case-sensitive).
pub fn filter_by_genre<'a>(dataset: &'a TrackDataset, genre: &str) -> DerivedView<'a> {
    DerivedView::select("subset by genre", dataset, |t| {
        t.genre.as_deref() == Some(genre)
    })
}

/// Tracks by `artist` exactly. Tracks with a missing artist never match, and
/// the selectable artists come from [`TrackDataset::artists`].
pub fn filter_by_artist<'a>(dataset: &'a TrackDataset, artist: &str) -> DerivedView<'a> {
    DerivedView::select("subset by artist", dataset, |t| {
        t.artist.as_deref() == Some(artist)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_popularity(values: &[Option<i64>]) -> TrackDataset {
        TrackDataset::from_tracks(
            values
                .iter()
                .map(|&popularity| Track {
                    popularity,
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn popularity_of(view: &DerivedView<'_>) -> Vec<i64> {
        view.tracks().iter().filter_map(|t| t.popularity).collect()
    }

    #[test]
    fn popularity_filter_is_inclusive_on_both_ends() {
        let ds = with_popularity(&[Some(10), Some(20), Some(50), Some(80), Some(90)]);
        let view = filter_by_popularity(&ds, PopularityRange::new(20, 80).unwrap());
        assert_eq!(popularity_of(&view), vec![20, 50, 80]);
        assert_eq!(view.indices(), &[1, 2, 3]);
    }

    #[test]
    fn popularity_filter_drops_missing_and_allows_empty() {
        let ds = with_popularity(&[Some(10), None, Some(95)]);
        let view = filter_by_popularity(&ds, PopularityRange::new(0, 100).unwrap());
        assert_eq!(popularity_of(&view), vec![10, 95]);

        let empty = filter_by_popularity(&ds, PopularityRange::new(40, 60).unwrap());
        assert!(empty.is_empty());
        assert!(empty.tracks().is_empty());
    }

    #[test]
    fn range_rejects_low_above_high() {
        assert!(matches!(
            PopularityRange::new(81, 80),
            Err(DashboardError::InvalidFilter(_))
        ));
        let r = PopularityRange::new(20, 80).unwrap().clamped_to(50, 100);
        assert_eq!((r.low(), r.high()), (50, 80));
        let r = PopularityRange::new(20, 30).unwrap().clamped_to(50, 100);
        assert_eq!((r.low(), r.high()), (50, 50));
    }

    #[test]
    fn genre_and_artist_filters_are_exact() {
        let ds = TrackDataset::from_tracks(vec![
            Track {
                genre: Some("pop".into()),
                artist: Some("Ana".into()),
                ..Default::default()
            },
            Track {
                genre: Some("Pop".into()),
                artist: None,
                ..Default::default()
            },
            Track {
                genre: Some("rock".into()),
                artist: Some("Ana".into()),
                ..Default::default()
            },
        ]);

        assert_eq!(filter_by_genre(&ds, "pop").indices(), &[0]);
        assert_eq!(filter_by_genre(&ds, "Pop").indices(), &[1]);
        assert!(filter_by_genre(&ds, "jazz").is_empty());
        assert_eq!(filter_by_artist(&ds, "Ana").indices(), &[0, 2]);
        assert_eq!(filter_by_artist(&ds, "Ana").name(), "subset by artist");
    }

    #[test]
    fn default_spec_picks_first_options_and_clamps_range() {
        let ds = TrackDataset::from_tracks(vec![
            Track {
                genre: Some("rock".into()),
                artist: Some("Zed".into()),
                popularity: Some(60),
                ..Default::default()
            },
            Track {
                genre: Some("latin".into()),
                artist: Some("Ana".into()),
                popularity: Some(99),
                ..Default::default()
            },
        ]);
        let spec = FilterSpec::default_for(&ds, PopularityRange::new(20, 80).unwrap());
        assert_eq!(spec.genre, "latin");
        assert_eq!(spec.artist, "Ana");
        assert_eq!(spec.popularity_range, PopularityRange::new(60, 80).unwrap());
        assert!(spec.show_time_series);
        assert!(spec.validate(&ds).is_ok());

        let bogus = FilterSpec {
            genre: "polka".into(),
            ..spec
        };
        assert!(bogus.validate(&ds).is_err());
    }

    #[test]
    fn dataset_without_genres_accepts_blank_genre() {
        let ds = TrackDataset::from_tracks(vec![Track {
            artist: Some("A".into()),
            popularity: Some(50),
            ..Default::default()
        }]);
        let spec = FilterSpec::default_for(&ds, PopularityRange::new(20, 80).unwrap());
        assert_eq!(spec.genre, "");
        assert!(spec.validate(&ds).is_ok());
        assert!(filter_by_genre(&ds, &spec.genre).is_empty());
    }
}
