use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the track table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, as read from any of the supported formats.
/// Grouping and mode computation key `BTreeMap`s by it, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can key BTreeMaps by CellValue --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
                Date(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for numeric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Guess the type of a raw text cell (CSV, or strings in JSON).
    pub fn parse(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        CellValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Field – the named attributes of a track
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    AlbumName,
    Artist,
    Popularity,
    Danceability,
    Energy,
    Tempo,
    Valence,
    Acousticness,
    Instrumentalness,
    Genre,
    ReleaseDate,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::AlbumName,
        Field::Artist,
        Field::Popularity,
        Field::Danceability,
        Field::Energy,
        Field::Tempo,
        Field::Valence,
        Field::Acousticness,
        Field::Instrumentalness,
        Field::Genre,
        Field::ReleaseDate,
    ];

    /// Human-readable label used in tables and chart axes.
    pub fn label(self) -> &'static str {
        match self {
            Field::AlbumName => "Album",
            Field::Artist => "Artist",
            Field::Popularity => "Popularity",
            Field::Danceability => "Danceability",
            Field::Energy => "Energy",
            Field::Tempo => "Tempo",
            Field::Valence => "Valence",
            Field::Acousticness => "Acousticness",
            Field::Instrumentalness => "Instrumentalness",
            Field::Genre => "Genre",
            Field::ReleaseDate => "Release date",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Field::AlbumName | Field::Artist | Field::Genre | Field::ReleaseDate
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Track – one row of the dataset
// ---------------------------------------------------------------------------

/// A single recording. Every attribute may be missing in the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub album_name: Option<String>,
    pub artist: Option<String>,
    pub popularity: Option<i64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub tempo: Option<f64>,
    pub valence: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub genre: Option<String>,
    /// Raw release date text; see [`Track::release_day`].
    pub release_date: Option<String>,
}

impl Track {
    /// Read one attribute as a [`CellValue`]; missing attributes are `Null`.
    ///
    /// A release date that does not parse comes back as `Text` so callers can
    /// still show it, while date-based computations skip it.
    pub fn value(&self, field: Field) -> CellValue {
        fn text(v: &Option<String>) -> CellValue {
            v.as_ref()
                .map(|s| CellValue::Text(s.clone()))
                .unwrap_or(CellValue::Null)
        }
        fn float(v: Option<f64>) -> CellValue {
            v.map(CellValue::Float).unwrap_or(CellValue::Null)
        }

        match field {
            Field::AlbumName => text(&self.album_name),
            Field::Artist => text(&self.artist),
            Field::Popularity => self
                .popularity
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Null),
            Field::Danceability => float(self.danceability),
            Field::Energy => float(self.energy),
            Field::Tempo => float(self.tempo),
            Field::Valence => float(self.valence),
            Field::Acousticness => float(self.acousticness),
            Field::Instrumentalness => float(self.instrumentalness),
            Field::Genre => text(&self.genre),
            Field::ReleaseDate => match (&self.release_date, self.release_day()) {
                (_, Some(day)) => CellValue::Date(day),
                (Some(raw), None) => CellValue::Text(raw.clone()),
                (None, None) => CellValue::Null,
            },
        }
    }

    /// Numeric attribute as `f64`, `None` if missing or not numeric.
    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Popularity => self.popularity.map(|p| p as f64),
            Field::Danceability => self.danceability,
            Field::Energy => self.energy,
            Field::Tempo => self.tempo,
            Field::Valence => self.valence,
            Field::Acousticness => self.acousticness,
            Field::Instrumentalness => self.instrumentalness,
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    /// Parsed release date, `None` when missing or unparsable.
    pub fn release_day(&self) -> Option<NaiveDate> {
        self.release_date.as_deref().and_then(parse_release_date)
    }

    /// Build a track from a cell lookup. Cells that cannot be coerced to the
    /// attribute's type become missing; the number of such cells is returned
    /// alongside so loaders can report it.
    pub fn from_cells(mut cell: impl FnMut(Field) -> CellValue) -> (Track, usize) {
        fn text(cell: CellValue) -> Option<String> {
            match cell {
                CellValue::Text(s) => Some(s),
                CellValue::Integer(i) => Some(i.to_string()),
                CellValue::Float(v) => Some(v.to_string()),
                CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
                CellValue::Null => None,
            }
        }

        let mut rejected = 0usize;

        let album_name = text(cell(Field::AlbumName));
        let artist = text(cell(Field::Artist));
        let genre = text(cell(Field::Genre));
        let release_date = text(cell(Field::ReleaseDate));

        let mut number = |value: CellValue| -> Option<f64> {
            match value {
                CellValue::Null => None,
                other => {
                    let parsed = other.as_f64();
                    if parsed.is_none() {
                        rejected += 1;
                    }
                    parsed
                }
            }
        };

        let popularity = number(cell(Field::Popularity)).map(|p| p.round() as i64);
        let danceability = number(cell(Field::Danceability));
        let energy = number(cell(Field::Energy));
        let tempo = number(cell(Field::Tempo));
        let valence = number(cell(Field::Valence));
        let acousticness = number(cell(Field::Acousticness));
        let instrumentalness = number(cell(Field::Instrumentalness));

        let track = Track {
            album_name,
            artist,
            popularity,
            danceability,
            energy,
            tempo,
            valence,
            acousticness,
            instrumentalness,
            genre,
            release_date,
        };
        (track, rejected)
    }
}

/// Parse the release date forms found in track exports: full dates, year-month
/// and bare years (which land on the first day of the period), and timestamps.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if s.len() == 7 {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
            return Some(d);
        }
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i32>().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }
    None
}

// ---------------------------------------------------------------------------
// TrackDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with the filter options pre-computed.
#[derive(Debug, Clone, Default)]
pub struct TrackDataset {
    tracks: Vec<Track>,
    genres: BTreeSet<String>,
    artists: BTreeSet<String>,
    popularity_bounds: Option<(i64, i64)>,
}

impl TrackDataset {
    /// Build filter options from the loaded tracks.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut genres = BTreeSet::new();
        let mut artists = BTreeSet::new();
        let mut popularity_bounds: Option<(i64, i64)> = None;

        for t in &tracks {
            if let Some(g) = &t.genre {
                genres.insert(g.clone());
            }
            if let Some(a) = &t.artist {
                artists.insert(a.clone());
            }
            if let Some(p) = t.popularity {
                popularity_bounds = Some(match popularity_bounds {
                    Some((lo, hi)) => (lo.min(p), hi.max(p)),
                    None => (p, p),
                });
            }
        }

        TrackDataset {
            tracks,
            genres,
            artists,
            popularity_bounds,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Distinct genres, sorted.
    pub fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    /// Distinct non-missing artists, sorted.
    pub fn artists(&self) -> &BTreeSet<String> {
        &self.artists
    }

    /// Observed `(min, max)` popularity; `None` when no row has one.
    pub fn popularity_bounds(&self) -> Option<(i64, i64)> {
        self.popularity_bounds
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
