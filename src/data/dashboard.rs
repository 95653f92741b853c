use super::aggregate::{
    correlation_matrix, group_mean_by, histogram_bins, mean, mode, radar_profile, scatter_pairs,
    time_series, CorrelationMatrix, GroupMean, HistogramBin, RadarPoint, TimePoint,
};
use super::filter::{filter_by_artist, filter_by_genre, filter_by_popularity, DerivedView, FilterSpec};
use super::model::{CellValue, Field, TrackDataset};

/// Attributes compared in the correlation heatmap.
pub const CORRELATION_FIELDS: [Field; 4] =
    [Field::Popularity, Field::Danceability, Field::Energy, Field::Tempo];

/// Axes of the artist radar chart.
pub const RADAR_FEATURES: [Field; 5] = [
    Field::Danceability,
    Field::Energy,
    Field::Valence,
    Field::Acousticness,
    Field::Instrumentalness,
];

/// Attributes plotted against popularity in the scatter charts.
pub const SCATTER_FIELDS: [Field; 3] = [Field::Danceability, Field::Energy, Field::Tempo];

/// Attributes plotted over release date.
pub const TIME_SERIES_FIELDS: [Field; 2] = [Field::Acousticness, Field::Instrumentalness];

/// Columns of the filtered-rows table.
pub const TABLE_FIELDS: [Field; 5] = [
    Field::AlbumName,
    Field::Artist,
    Field::Popularity,
    Field::Danceability,
    Field::Genre,
];

/// Tunables of the pipeline that come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub histogram_bins: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { histogram_bins: 30 }
    }
}

/// Headline numbers over the popularity-filtered rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyMetrics {
    pub avg_danceability: Option<f64>,
    pub avg_energy: Option<f64>,
    pub top_genre: Option<CellValue>,
    pub top_artist: Option<CellValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub x: Field,
    pub y: Field,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub field: Field,
    pub points: Vec<TimePoint>,
}

/// Everything the presenter draws for one [`FilterSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub spec: FilterSpec,
    /// Dataset indices of the popularity-filtered rows.
    pub filtered: Vec<usize>,
    pub metrics: KeyMetrics,
    /// Over the full dataset, independent of the filters.
    pub correlation: CorrelationMatrix,
    pub genre_popularity: Vec<GroupMean>,
    pub popularity_histogram: Vec<HistogramBin>,
    pub scatter: Vec<ScatterSeries>,
    pub radar: Vec<RadarPoint>,
    /// `None` when the time-series toggle is off.
    pub time_series: Option<Vec<TimeSeries>>,
}

impl Dashboard {
    /// Run the full filter-and-aggregate pipeline.
    pub fn compute(dataset: &TrackDataset, spec: &FilterSpec, settings: &PipelineSettings) -> Self {
        let all = DerivedView::all(dataset).tracks();

        let filtered_view = filter_by_popularity(dataset, spec.popularity_range);
        let filtered = filtered_view.tracks();

        let genre_rows = filter_by_genre(dataset, &spec.genre).tracks();
        let artist_rows = filter_by_artist(dataset, &spec.artist).tracks();

        let metrics = KeyMetrics {
            avg_danceability: mean(&filtered, Field::Danceability),
            avg_energy: mean(&filtered, Field::Energy),
            top_genre: mode(&filtered, Field::Genre),
            top_artist: mode(&filtered, Field::Artist),
        };

        let scatter = SCATTER_FIELDS
            .iter()
            .map(|&x| ScatterSeries {
                x,
                y: Field::Popularity,
                points: scatter_pairs(&filtered, x, Field::Popularity),
            })
            .collect();

        let time_series = spec.show_time_series.then(|| {
            TIME_SERIES_FIELDS
                .iter()
                .map(|&field| TimeSeries {
                    field,
                    points: time_series(&all, Field::ReleaseDate, field),
                })
                .collect()
        });

        log::debug!(
            "Recomputed dashboard: {} of {} tracks {} {}..={}, {} in genre '{}', {} by '{}'",
            filtered_view.len(),
            all.len(),
            filtered_view.name(),
            spec.popularity_range.low(),
            spec.popularity_range.high(),
            genre_rows.len(),
            spec.genre,
            artist_rows.len(),
            spec.artist,
        );

        Dashboard {
            spec: spec.clone(),
            filtered: filtered_view.indices().to_vec(),
            metrics,
            correlation: correlation_matrix(&all, &CORRELATION_FIELDS),
            genre_popularity: group_mean_by(&genre_rows, Field::Genre, Field::Popularity),
            popularity_histogram: histogram_bins(&filtered, Field::Popularity, settings.histogram_bins),
            scatter,
            radar: radar_profile(&artist_rows, &RADAR_FEATURES),
            time_series,
        }
    }
}
