use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TrackDashboardApp {
    pub state: AppState,
}

impl TrackDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for TrackDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Widget changes above only touch the filter input; rebuild the
        // derived tables before drawing them.
        self.state.refresh();

        // ---- Central panel: table, metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    charts(ui, &self.state);
                });
        });
    }
}

fn charts(ui: &mut Ui, state: &AppState) {
    let dashboard = state.dashboard();

    panels::filtered_table(ui, &state.dataset, dashboard);
    ui.add_space(12.0);
    panels::key_metrics(ui, &dashboard.metrics);
    ui.add_space(12.0);
    plot::correlation_heatmap(ui, &dashboard.correlation);
    ui.add_space(12.0);
    plot::genre_bar_chart(
        ui,
        &dashboard.genre_popularity,
        &dashboard.spec.genre,
        &state.genre_colors,
    );
    ui.add_space(12.0);
    plot::popularity_histogram(ui, &dashboard.popularity_histogram);
    ui.add_space(12.0);
    plot::scatter_plots(ui, &dashboard.scatter);
    ui.add_space(12.0);
    plot::radar_chart(ui, &dashboard.radar, &dashboard.spec.artist);

    if let Some(series) = &dashboard.time_series {
        ui.add_space(12.0);
        ui.heading("Time-Based Audio Features");
        plot::time_series_charts(ui, series);
    }
}
