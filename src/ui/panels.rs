use std::sync::Arc;

use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use super::{format_number, format_value};
use crate::data::dashboard::{Dashboard, KeyMetrics, TABLE_FIELDS};
use crate::data::model::{CellValue, TrackDataset};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Interactive Filters");
    ui.separator();

    // The dataset handle is shared; clone the Arc so the widgets below can
    // mutate `state.input` while listing options.
    let dataset = Arc::clone(&state.dataset);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Popularity range ----
            ui.strong("Data Range Filters");
            let (min, max) = state.popularity_bounds();
            let mut low = state.input.popularity_low;
            let mut high = state.input.popularity_high;
            if ui
                .add(egui::Slider::new(&mut low, min..=max).text("min popularity"))
                .changed()
            {
                state.set_popularity_low(low);
            }
            if ui
                .add(egui::Slider::new(&mut high, min..=max).text("max popularity"))
                .changed()
            {
                state.set_popularity_high(high);
            }
            ui.separator();

            // ---- Genre ----
            ui.strong("Genre Analysis");
            egui::ComboBox::from_id_salt("genre")
                .selected_text(state.input.genre.clone())
                .show_ui(ui, |ui: &mut Ui| {
                    for genre in dataset.genres() {
                        let text = RichText::new(genre).color(state.genre_colors.color_for(genre));
                        ui.selectable_value(&mut state.input.genre, genre.clone(), text);
                    }
                });
            ui.separator();

            // ---- Artist ----
            ui.strong("Artist Profile");
            ui.add(
                egui::TextEdit::singleline(&mut state.artist_query)
                    .hint_text("Search artists…"),
            );
            egui::ComboBox::from_id_salt("artist")
                .selected_text(state.input.artist.clone())
                .show_ui(ui, |ui: &mut Ui| {
                    let matches: Vec<String> = state.matching_artists().cloned().collect();
                    if matches.is_empty() {
                        ui.label("No matching artist");
                    }
                    ScrollArea::vertical()
                        .max_height(320.0)
                        .show(ui, |ui: &mut Ui| {
                            for artist in matches {
                                let label = artist.clone();
                                ui.selectable_value(&mut state.input.artist, artist, label);
                            }
                        });
                });
            ui.label(
                RichText::new(format!("{} artists", dataset.artists().len()))
                    .small()
                    .weak(),
            );
            ui.separator();

            // ---- Time series ----
            ui.strong("Time Series");
            ui.checkbox(
                &mut state.input.show_time_series,
                "Show time-based audio features",
            );
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        ui.label(format!(
            "{} tracks loaded, {} in popularity range",
            state.dataset.len(),
            state.dashboard().filtered.len()
        ));
    });
}

// ---------------------------------------------------------------------------
// Filtered data sample and key metrics
// ---------------------------------------------------------------------------

/// Table of the popularity-filtered tracks.
pub fn filtered_table(ui: &mut Ui, dataset: &TrackDataset, dashboard: &Dashboard) {
    ui.heading("Sample of Filtered Data");

    let rows = &dashboard.filtered;
    if rows.is_empty() {
        ui.label("No tracks in the selected popularity range.");
        return;
    }

    let mut table = TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(260.0)
        .cell_layout(Layout::left_to_right(Align::Center));
    for _ in 1..TABLE_FIELDS.len() {
        table = table.column(Column::auto().at_least(90.0).clip(true));
    }
    table = table.column(Column::remainder());

    table
        .header(20.0, |mut header| {
            for field in TABLE_FIELDS {
                header.col(|ui: &mut Ui| {
                    ui.strong(field.label());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let track = &dataset.tracks()[rows[row.index()]];
                for field in TABLE_FIELDS {
                    row.col(|ui: &mut Ui| {
                        match track.value(field) {
                            CellValue::Null => ui.weak("—"),
                            value => ui.label(value.to_string()),
                        };
                    });
                }
            });
        });
}

/// The four headline numbers.
pub fn key_metrics(ui: &mut Ui, metrics: &KeyMetrics) {
    ui.heading("Key Metrics");
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Avg. Danceability", format_number(metrics.avg_danceability));
        metric(&mut cols[1], "Avg. Energy", format_number(metrics.avg_energy));
        metric(&mut cols[2], "Most Common Genre", format_value(metrics.top_genre.as_ref()));
        metric(&mut cols[3], "Top Artist", format_value(metrics.top_artist.as_ref()));
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).small().weak());
    ui.label(RichText::new(value).size(22.0).strong());
}
