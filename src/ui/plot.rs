use std::f64::consts::{FRAC_PI_2, TAU};

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Align2, Color32, FontId, Rect, RichText, Sense, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use super::PLACEHOLDER;
use crate::color::{contrast_text, correlation_color, generate_palette, GenreColors};
use crate::data::aggregate::{CorrelationMatrix, GroupMean, HistogramBin, RadarPoint};
use crate::data::dashboard::{ScatterSeries, TimeSeries};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Painted grid of the correlation matrix. Degenerate cells are coloured as 0
/// and labelled with the placeholder.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    ui.heading("Correlation Matrix: Popularity vs Danceability, Energy, Tempo");

    let n = matrix.size();
    let label_width = 110.0;
    let header_height = 24.0;
    let cell = egui::vec2(90.0, 40.0);
    let desired = egui::vec2(
        label_width + cell.x * n as f32,
        header_height + cell.y * n as f32,
    );
    let (rect, _) = ui.allocate_exact_size(desired, Sense::hover());
    let painter = ui.painter_at(rect);
    let font = FontId::proportional(13.0);
    let text_color = ui.visuals().text_color();

    for (j, field) in matrix.fields.iter().enumerate() {
        let pos = rect.min + egui::vec2(label_width + cell.x * (j as f32 + 0.5), header_height / 2.0);
        painter.text(pos, Align2::CENTER_CENTER, field.label(), font.clone(), text_color);
    }

    for (i, field) in matrix.fields.iter().enumerate() {
        let y = header_height + cell.y * i as f32;
        let pos = rect.min + egui::vec2(label_width - 8.0, y + cell.y / 2.0);
        painter.text(pos, Align2::RIGHT_CENTER, field.label(), font.clone(), text_color);

        for j in 0..n {
            let value = matrix.get(i, j);
            let fill = correlation_color(value);
            let cell_rect =
                Rect::from_min_size(rect.min + egui::vec2(label_width + cell.x * j as f32, y), cell)
                    .shrink(1.0);
            painter.rect_filled(cell_rect, 2.0, fill);
            let label = value
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            painter.text(cell_rect.center(), Align2::CENTER_CENTER, label, font.clone(), contrast_text(fill));
        }
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Average popularity of the selected genre (one bar per genre present).
pub fn genre_bar_chart(ui: &mut Ui, groups: &[GroupMean], genre: &str, colors: &GenreColors) {
    ui.heading(format!("Average Popularity for Genre: {genre}"));

    let names: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
    let bars: Vec<Bar> = groups
        .iter()
        .zip(&names)
        .enumerate()
        .map(|(i, (g, name))| {
            Bar::new(i as f64, g.mean.unwrap_or(0.0))
                .name(name)
                .fill(colors.color_for(name))
                .width(0.6)
        })
        .collect();

    Plot::new("genre_popularity")
        .height(CHART_HEIGHT)
        .x_axis_label("Genre")
        .y_axis_label("Popularity")
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Average popularity"));
        });
}

/// Distribution of popularity over the filtered tracks.
pub fn popularity_histogram(ui: &mut Ui, bins: &[HistogramBin]) {
    ui.heading("Distribution of Popularity Scores");

    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(b.width().max(0.5))
                .name(format!("{:.0}–{:.0}", b.start, b.end))
        })
        .collect();

    Plot::new("popularity_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Popularity Score")
        .y_axis_label("Count")
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE).name("Tracks"));
        });
}

// ---------------------------------------------------------------------------
// Scatter plots
// ---------------------------------------------------------------------------

/// One scatter plot per series, side by side.
pub fn scatter_plots(ui: &mut Ui, series: &[ScatterSeries]) {
    if series.is_empty() {
        return;
    }
    let colors = generate_palette(series.len());
    ui.columns(series.len(), |cols: &mut [Ui]| {
        for ((ui, s), color) in cols.iter_mut().zip(series).zip(colors) {
            ui.strong(format!("{} vs {}", s.y.label(), s.x.label()));
            Plot::new(("scatter", s.x.label()))
                .height(CHART_HEIGHT)
                .x_axis_label(s.x.label())
                .y_axis_label(s.y.label())
                .show(ui, |plot_ui| {
                    plot_ui.points(
                        Points::new(PlotPoints::new(s.points.clone()))
                            .radius(2.0)
                            .color(color)
                            .name(s.x.label()),
                    );
                });
        }
    });
}

// ---------------------------------------------------------------------------
// Radar chart
// ---------------------------------------------------------------------------

/// Radar vertex for feature `k` of `n`, first feature pointing up.
fn radar_xy(k: usize, n: usize, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - TAU * k as f64 / n as f64;
    [radius * angle.cos(), radius * angle.sin()]
}

/// Audio feature profile of the selected artist on a unit radar.
pub fn radar_chart(ui: &mut Ui, profile: &[RadarPoint], artist: &str) {
    ui.heading(format!("Audio Feature Profile: {artist}"));

    let n = profile.len();
    if n == 0 {
        return;
    }
    let outline: Vec<[f64; 2]> = profile
        .iter()
        .enumerate()
        .map(|(k, p)| radar_xy(k, n, p.value.unwrap_or(0.0)))
        .collect();
    let color = Color32::from_rgb(100, 13, 95);

    Plot::new("artist_radar")
        .height(CHART_HEIGHT + 60.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .include_x(-1.35)
        .include_x(1.35)
        .include_y(-1.2)
        .include_y(1.2)
        .show(ui, |plot_ui| {
            for ring in [0.25, 0.5, 0.75, 1.0] {
                let mut pts: Vec<[f64; 2]> = (0..n).map(|k| radar_xy(k, n, ring)).collect();
                pts.push(pts[0]);
                plot_ui.line(Line::new(PlotPoints::new(pts)).color(Color32::DARK_GRAY).width(0.5));
            }
            for (k, p) in profile.iter().enumerate() {
                let spoke = vec![[0.0, 0.0], radar_xy(k, n, 1.0)];
                plot_ui.line(Line::new(PlotPoints::new(spoke)).color(Color32::DARK_GRAY).width(0.5));

                let [x, y] = radar_xy(k, n, 1.15);
                let value = p
                    .value
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| PLACEHOLDER.to_string());
                plot_ui.text(Text::new(
                    PlotPoint::new(x, y),
                    RichText::new(format!("{}\n{value}", p.feature.label())).small(),
                ));
            }
            plot_ui.polygon(
                Polygon::new(PlotPoints::new(outline))
                    .fill_color(color.gamma_multiply(0.35))
                    .name(artist),
            );
        });
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// One line chart per series, side by side, with release years on the x axis.
pub fn time_series_charts(ui: &mut Ui, series: &[TimeSeries]) {
    if series.is_empty() {
        return;
    }
    let colors = [Color32::from_rgb(99, 110, 250), Color32::from_rgb(239, 85, 59)];
    ui.columns(series.len(), |cols: &mut [Ui]| {
        for (i, (ui, s)) in cols.iter_mut().zip(series).enumerate() {
            ui.strong(format!("{} Over Time", s.field.label()));
            let points: Vec<[f64; 2]> = s
                .points
                .iter()
                .map(|p| [day_number(p.date), p.value])
                .collect();
            Plot::new(("time_series", s.field.label()))
                .height(CHART_HEIGHT)
                .y_axis_label(s.field.label())
                .x_axis_formatter(|mark, _range| {
                    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                        .map(|d| d.format("%Y-%m").to_string())
                        .unwrap_or_default()
                })
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new(PlotPoints::new(points))
                            .color(colors[i % colors.len()])
                            .name(s.field.label()),
                    );
                });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radar_starts_at_top_and_goes_clockwise() {
        let [x, y] = radar_xy(0, 4, 1.0);
        assert!(x.abs() < 1e-12 && (y - 1.0).abs() < 1e-12);
        let [x, y] = radar_xy(1, 4, 0.5);
        assert!((x - 0.5).abs() < 1e-12 && y.abs() < 1e-12);
    }

    #[test]
    fn day_numbers_round_trip() {
        let d = NaiveDate::from_ymd_opt(2011, 5, 23).unwrap();
        assert_eq!(
            NaiveDate::from_num_days_from_ce_opt(day_number(d) as i32),
            Some(d)
        );
    }
}
