//! Summary statistics and chart tables over a set of tracks.
//!
//! Every function here accepts empty input, or input where the requested
//! attribute is missing on every row, and answers with `None` or an empty
//! table instead of failing.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{CellValue, Field, Track};

/// Mean of `field` for one group of [`group_mean_by`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub key: CellValue,
    pub mean: Option<f64>,
}

/// One equal-width histogram bin. `[start, end)` except the last bin, which
/// also contains `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarPoint {
    pub feature: Field,
    pub value: Option<f64>,
}

/// Pairwise Pearson correlations, rounded to two decimals.
///
/// `None` marks a degenerate pair: fewer than two complete observations, or
/// zero variance on either side.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub fields: Vec<Field>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn size(&self) -> usize {
        self.fields.len()
    }
}

/// Arithmetic mean of the non-missing values of `field`.
pub fn mean(rows: &[&Track], field: Field) -> Option<f64> {
    let (sum, n) = rows
        .iter()
        .filter_map(|t| t.number(field))
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Most frequent non-missing value of `field`.
///
/// Ties resolve to the smallest tied value in [`CellValue`] order, so `"a"`
/// wins over `"b"` and `3` over `7`.
pub fn mode(rows: &[&Track], field: Field) -> Option<CellValue> {
    let mut counts: BTreeMap<CellValue, usize> = BTreeMap::new();
    for t in rows {
        let v = t.value(field);
        if !v.is_null() {
            *counts.entry(v).or_default() += 1;
        }
    }
    let best = counts.values().copied().max()?;
    // BTreeMap iterates ascending, so the first hit is the smallest tied value.
    counts
        .into_iter()
        .find(|(_, n)| *n == best)
        .map(|(v, _)| v)
}

/// Pearson correlation for every pair in `fields`, using only the rows where
/// both values of the pair are present.
pub fn correlation_matrix(rows: &[&Track], fields: &[Field]) -> CorrelationMatrix {
    let n = fields.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(rows, fields[i], fields[j]).map(round2);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        fields: fields.to_vec(),
        values,
    }
}

fn pearson(rows: &[&Track], a: Field, b: Field) -> Option<f64> {
    let pairs = scatter_pairs(rows, a, b);
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p[1]).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for p in &pairs {
        let da = p[0] - mean_a;
        let db = p[1] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    // Only a constant column is degenerate, however small the spread.
    if is_constant(&pairs, 0) || is_constant(&pairs, 1) || var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    if a == b {
        return Some(1.0);
    }
    Some((cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0))
}

fn is_constant(pairs: &[[f64; 2]], axis: usize) -> bool {
    pairs.windows(2).all(|w| w[0][axis] == w[1][axis])
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Mean of `value_field` per distinct non-missing `group_field`, ordered by key.
pub fn group_mean_by(rows: &[&Track], group_field: Field, value_field: Field) -> Vec<GroupMean> {
    let mut groups: BTreeMap<CellValue, Vec<&Track>> = BTreeMap::new();
    for &t in rows {
        let key = t.value(group_field);
        if !key.is_null() {
            groups.entry(key).or_default().push(t);
        }
    }
    groups
        .into_iter()
        .map(|(key, members)| GroupMean {
            key,
            mean: mean(&members, value_field),
        })
        .collect()
}

/// Count non-missing values of `field` in `bin_count` equal-width bins
/// spanning the observed minimum and maximum.
pub fn histogram_bins(rows: &[&Track], field: Field, bin_count: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = rows.iter().filter_map(|t| t.number(field)).collect();
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }
    bins
}

/// `[x, y]` points for every row that has both values, in row order.
pub fn scatter_pairs(rows: &[&Track], x: Field, y: Field) -> Vec<[f64; 2]> {
    rows.iter()
        .filter_map(|t| Some([t.number(x)?, t.number(y)?]))
        .collect()
}

/// `value_field` against `date_field`, ascending by date.
///
/// Rows whose date does not parse, or whose value is missing, are left out;
/// rows sharing a date keep their input order.
pub fn time_series(rows: &[&Track], date_field: Field, value_field: Field) -> Vec<TimePoint> {
    let mut points: Vec<TimePoint> = rows
        .iter()
        .filter_map(|t| {
            let CellValue::Date(date) = t.value(date_field) else {
                return None;
            };
            Some(TimePoint {
                date,
                value: t.number(value_field)?,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Mean of each feature, in the order given.
pub fn radar_profile(rows: &[&Track], features: &[Field]) -> Vec<RadarPoint> {
    features
        .iter()
        .map(|&feature| RadarPoint {
            feature,
            value: mean(rows, feature),
        })
        .collect()
}
