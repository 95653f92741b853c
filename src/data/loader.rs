use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Field, Track, TrackDataset};
use crate::config::ColumnMap;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a track dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one track per line (the usual export)
/// * `.json`    – `[{ "track_artist": "...", "track_popularity": 71, ... }, ...]`
/// * `.parquet` – one column per attribute
///
/// Column names come from `columns`; a missing column is an error, while a
/// cell that cannot be read becomes a missing value for that track only.
pub fn load_file(path: &Path, columns: &ColumnMap) -> Result<TrackDataset> {
    if !path.exists() {
        return Err(DashboardError::DatasetNotFound(path.to_path_buf()).into());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (tracks, rejected) = match ext.as_str() {
        "csv" => load_csv(path, columns)?,
        "json" => load_json(path, columns)?,
        "parquet" | "pq" => load_parquet(path, columns)?,
        other => return Err(DashboardError::UnsupportedFormat(other.to_string()).into()),
    };

    report_unreadable(&tracks, rejected);
    Ok(TrackDataset::from_tracks(tracks))
}

fn report_unreadable(tracks: &[Track], rejected: usize) {
    if rejected > 0 {
        log::warn!("{rejected} numeric cells could not be parsed and are treated as missing");
    }
    let bad_dates = tracks
        .iter()
        .filter(|t| t.release_date.is_some() && t.release_day().is_none())
        .count();
    if bad_dates > 0 {
        log::warn!("{bad_dates} release dates could not be parsed and are left out of time series");
    }
}

/// Bring a raw cell to the shape its field expects: numeric fields re-parse
/// text, text fields keep blank strings as missing.
fn coerce(field: Field, cell: CellValue) -> CellValue {
    match cell {
        CellValue::Text(s) if field.is_numeric() => CellValue::parse(&s),
        CellValue::Text(s) if s.trim().is_empty() => CellValue::Null,
        other => other,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, extra columns are ignored.
fn load_csv(path: &Path, columns: &ColumnMap) -> Result<(Vec<Track>, usize)> {
    // Short rows are tolerated; their trailing cells read as missing.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let positions = columns.resolve(&headers)?;

    let mut tracks = Vec::new();
    let mut rejected = 0;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let (track, bad) = Track::from_cells(|field| {
            let idx = positions
                .iter()
                .find(|(f, _)| *f == field)
                .map(|(_, idx)| *idx);
            let raw = idx.and_then(|i| record.get(i)).unwrap_or("");
            coerce(field, CellValue::Text(raw.to_string()))
        });
        rejected += bad;
        tracks.push(track);
    }

    Ok((tracks, rejected))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "track_artist": "Lady Gaga",
///     "track_popularity": 100,
///     "danceability": 0.521,
///     "playlist_genre": "pop",
///     ...
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path, columns: &ColumnMap) -> Result<(Vec<Track>, usize)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut keys: BTreeSet<&str> = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        keys.extend(obj.keys().map(String::as_str));
    }
    if !records.is_empty() {
        let present: Vec<&str> = keys.into_iter().collect();
        columns.resolve(&present)?;
    }

    let mut tracks = Vec::with_capacity(records.len());
    let mut rejected = 0;

    for rec in records {
        let (track, bad) = Track::from_cells(|field| {
            let cell = rec
                .get(columns.column_for(field))
                .map(json_to_cell)
                .unwrap_or(CellValue::Null);
            coerce(field, cell)
        });
        rejected += bad;
        tracks.push(track);
    }

    Ok((tracks, rejected))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Text(b.to_string()),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per mapped attribute.
///
/// Text columns may be Utf8 or LargeUtf8, numbers any int/float width, and
/// the release date either text or Date32. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, columns: &ColumnMap) -> Result<(Vec<Track>, usize)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let field_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let positions = columns.resolve(&field_names)?;

    let reader = builder.build().context("building parquet reader")?;

    let mut tracks = Vec::new();
    let mut rejected = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let (track, bad) = Track::from_cells(|field| {
                positions
                    .iter()
                    .find(|(f, _)| *f == field)
                    .map(|(_, idx)| coerce(field, extract_cell(batch.column(*idx), row)))
                    .unwrap_or(CellValue::Null)
            });
            rejected += bad;
            tracks.push(track);
        }
    }

    Ok((tracks, rejected))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| float_cell(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| float_cell(a.value(row))),
        DataType::Date32 => col
            .as_primitive_opt::<Date32Type>()
            .and_then(|a| a.value_as_date(row))
            .map(CellValue::Date),
        _ => array_value_to_string(col, row).ok().map(CellValue::Text),
    };
    cell.unwrap_or(CellValue::Null)
}

fn float_cell(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field as ArrowField, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "track_album_name,track_artist,track_popularity,danceability,energy,\
tempo,valence,acousticness,instrumentalness,playlist_genre,track_album_release_date,track_id";

    fn temp_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_csv_with_missing_and_bad_cells() {
        let csv = format!(
            "{HEADER}\n\
             Born This Way,Lady Gaga,88,0.6,0.8,120.5,0.5,0.1,0.0,pop,2011-05-23,a1\n\
             1989,,71,0.7,loud,95,0.4,0.2,0.0,pop,2014,a2\n\
             Unknown,Nobody,,,,,,,,rock,sometime,a3\n"
        );
        let file = temp_file(".csv", &csv);
        let ds = load_file(file.path(), &ColumnMap::default()).unwrap();

        assert_eq!(ds.len(), 3);
        let t = &ds.tracks()[0];
        assert_eq!(t.artist.as_deref(), Some("Lady Gaga"));
        assert_eq!(t.popularity, Some(88));
        assert_eq!(t.tempo, Some(120.5));

        let t = &ds.tracks()[1];
        assert_eq!(t.album_name.as_deref(), Some("1989"));
        assert_eq!(t.artist, None);
        assert_eq!(t.energy, None);
        assert_eq!(t.tempo, Some(95.0));

        let t = &ds.tracks()[2];
        assert_eq!(t.popularity, None);
        assert_eq!(t.release_day(), None);
        assert_eq!(t.release_date.as_deref(), Some("sometime"));

        assert_eq!(ds.artists().len(), 2);
        assert_eq!(ds.popularity_bounds(), Some((71, 88)));
    }

    #[test]
    fn ragged_csv_rows_load_with_missing_cells() {
        let csv = format!(
            "{HEADER}\n\
             Born This Way,Lady Gaga,88,0.6,0.8,120.5,0.5,0.1,0.0,pop,2011-05-23,a1\n\
             Short,Muse,61,0.4\n\
             Long,Muse,55,0.5,0.5,100,0.5,0.5,0.0,rock,2001,a3,extra,cells\n"
        );
        let file = temp_file(".csv", &csv);
        let ds = load_file(file.path(), &ColumnMap::default()).unwrap();

        assert_eq!(ds.len(), 3);
        let t = &ds.tracks()[1];
        assert_eq!(t.popularity, Some(61));
        assert_eq!(t.danceability, Some(0.4));
        assert_eq!(t.energy, None);
        assert_eq!(t.genre, None);
        assert_eq!(t.release_date, None);
        assert_eq!(ds.tracks()[2].genre.as_deref(), Some("rock"));
    }

    #[test]
    fn missing_column_is_fatal() {
        let file = temp_file(".csv", "track_artist,track_popularity\nA,10\n");
        let err = load_file(file.path(), &ColumnMap::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::MissingColumn { .. })
        ));
    }

    #[test]
    fn missing_file_and_unknown_extension_are_fatal() {
        let err = load_file(Path::new("/definitely/not/here.csv"), &ColumnMap::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::DatasetNotFound(_))
        ));

        let file = temp_file(".xlsx", "");
        let err = load_file(file.path(), &ColumnMap::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn header_only_csv_is_an_empty_dataset() {
        let file = temp_file(".csv", &format!("{HEADER}\n"));
        let ds = load_file(file.path(), &ColumnMap::default()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.popularity_bounds(), None);
    }

    #[test]
    fn custom_column_map() {
        let columns = ColumnMap {
            artist: "artist_name".into(),
            ..ColumnMap::default()
        };
        let csv = HEADER.replace("track_artist", "artist_name") + "\nA,Björk,50,0.5,0.5,100,0.5,0.5,0.5,art pop,1997-09-22,x\n";
        let file = temp_file(".csv", &csv);
        let ds = load_file(file.path(), &columns).unwrap();
        assert_eq!(ds.tracks()[0].artist.as_deref(), Some("Björk"));
        assert_eq!(ds.tracks()[0].genre.as_deref(), Some("art pop"));
    }

    #[test]
    fn loads_json_records() {
        let json = r#"[
            {"track_album_name": "A", "track_artist": "X", "track_popularity": 64,
             "danceability": 0.5, "energy": "0.7", "tempo": 101, "valence": null,
             "acousticness": 0.3, "instrumentalness": 0.0, "playlist_genre": "latin",
             "track_album_release_date": "2019-06"},
            {"track_album_name": "B", "track_artist": null, "track_popularity": 70.0,
             "danceability": 0.9, "energy": 0.2, "tempo": 90.5, "valence": 0.4,
             "acousticness": 0.1, "instrumentalness": 0.5, "playlist_genre": "latin",
             "track_album_release_date": "2020-01-01"}
        ]"#;
        let file = temp_file(".json", json);
        let ds = load_file(file.path(), &ColumnMap::default()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.tracks()[0].energy, Some(0.7));
        assert_eq!(ds.tracks()[0].tempo, Some(101.0));
        assert_eq!(ds.tracks()[0].valence, None);
        assert_eq!(ds.tracks()[1].artist, None);
        assert_eq!(ds.tracks()[1].popularity, Some(70));
        assert_eq!(ds.genres().len(), 1);
    }

    #[test]
    fn json_without_required_key_is_fatal() {
        let file = temp_file(".json", r#"[{"track_artist": "X"}]"#);
        let err = load_file(file.path(), &ColumnMap::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::MissingColumn { .. })
        ));
    }

    #[test]
    fn loads_parquet_with_date32_column() {
        let columns = ColumnMap::default();
        let text = |name: &str| ArrowField::new(name, DataType::Utf8, true);
        let float = |name: &str| ArrowField::new(name, DataType::Float64, true);
        let schema = Arc::new(Schema::new(vec![
            text(&columns.album_name),
            text(&columns.artist),
            ArrowField::new(&columns.popularity, DataType::Int64, true),
            float(&columns.danceability),
            float(&columns.energy),
            float(&columns.tempo),
            float(&columns.valence),
            float(&columns.acousticness),
            float(&columns.instrumentalness),
            text(&columns.genre),
            ArrowField::new(&columns.release_date, DataType::Date32, true),
        ]));
        let floats = |a: f64, b: f64| Arc::new(Float64Array::from(vec![Some(a), Some(b)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("One"), Some("Two")])),
                Arc::new(StringArray::from(vec![Some("Ana"), None])),
                Arc::new(Int64Array::from(vec![Some(55), None])),
                floats(0.5, 0.6),
                floats(0.4, f64::NAN),
                floats(120.0, 128.0),
                floats(0.3, 0.2),
                floats(0.1, 0.0),
                floats(0.0, 0.9),
                Arc::new(StringArray::from(vec![Some("edm"), Some("edm")])),
                // 18262 days after the epoch is 2020-01-01.
                Arc::new(Date32Array::from(vec![Some(18262), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path(), &columns).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.tracks()[0];
        assert_eq!(first.artist.as_deref(), Some("Ana"));
        assert_eq!(first.popularity, Some(55));
        assert_eq!(first.release_day(), chrono::NaiveDate::from_ymd_opt(2020, 1, 1));
        let second = &ds.tracks()[1];
        assert_eq!(second.artist, None);
        assert_eq!(second.popularity, None);
        assert_eq!(second.energy, None);
        assert_eq!(second.release_date, None);
    }
}
