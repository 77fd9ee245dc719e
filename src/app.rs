use eframe::egui;

use crate::state::AppState;
use crate::ui::charts::ChartBackend;
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    backend: Box<dyn ChartBackend>,
}

impl DashboardApp {
    pub fn new(state: AppState, backend: Box<dyn ChartBackend>) -> Self {
        Self { state, backend }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, self.backend.label());
        });

        // ---- Bottom panel: footer ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.small("Built with egui • Public dataset: Palmer Penguins");
        });

        // ---- Left side panel: navigation + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            pages::central_page(ui, &self.state, self.backend.as_ref());
        });
    }
}
