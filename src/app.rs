use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use tune_stats::config::AppConfig;
use tune_stats::dashboard::controls::ControlSpec;
use tune_stats::dashboard::payload::SummaryCard;
use tune_stats::dashboard::ComponentUpdate;

use crate::state::AppState;
use crate::ui::{controls, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TuneStatsApp {
    pub state: AppState,
}

/// What one dashboard card needs from the registry, detached from the
/// dashboard borrow so the card can mutate state.
struct CardSpec {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    controls: Vec<ControlSpec>,
}

impl TuneStatsApp {
    pub fn new(config: &AppConfig) -> Self {
        let mut state = AppState::new(config.resolve_workers());
        if let Some(path) = &config.data_path {
            state.load_or_report(path);
        }
        Self { state }
    }

    fn card_specs(&self) -> Vec<CardSpec> {
        let Some(dash) = &self.state.dashboard else {
            return Vec::new();
        };
        dash.layouts()
            .map(|(component, specs)| CardSpec {
                id: component.id(),
                title: component.title(),
                description: component.description(),
                controls: specs.to_vec(),
            })
            .collect()
    }
}

impl eframe::App for TuneStatsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: component cards ----
        let cards = self.card_specs();
        egui::CentralPanel::default().show(ctx, |ui| {
            if cards.is_empty() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a track file to start  (File → Open…)");
                });
                return;
            }
            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui: &mut Ui| {
                for spec in &cards {
                    component_card(ui, &mut self.state, spec);
                    ui.add_space(12.0);
                }
            });
        });
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

fn component_card(ui: &mut Ui, state: &mut AppState, spec: &CardSpec) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.heading(spec.title);

        if !spec.controls.is_empty() {
            let values = state.controls.entry(spec.id).or_default();
            if controls::control_row(ui, spec.id, &spec.controls, values) {
                log::debug!("{} controls changed: {:?}", spec.id, values);
                state.refresh_component(spec.id);
            }
            ui.add_space(6.0);
        }

        if let Some(update) = state.updates.iter().find(|u| u.id == spec.id) {
            update_body(ui, update);
        }

        if !spec.description.is_empty() {
            ui.separator();
            ui.label(RichText::new(spec.description).small().weak());
        }
    });
}

fn update_body(ui: &mut Ui, update: &ComponentUpdate) {
    if !update.payload.cards.is_empty() {
        summary_cards(ui, &update.payload.cards);
        ui.add_space(6.0);
    }
    plot::figure(ui, update.id, &update.payload.figure);
    if let Some(error) = &update.error {
        ui.label(RichText::new(error).monospace().color(Color32::RED));
    }
}

fn summary_cards(ui: &mut Ui, cards: &[SummaryCard]) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for card in cards {
            egui::Frame::group(ui.style())
                .inner_margin(10.0)
                .show(ui, |ui: &mut Ui| {
                    ui.set_min_width(120.0);
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.label(RichText::new(&card.value).size(22.0).strong());
                        ui.label(RichText::new(&card.label).small());
                    });
                });
        }
    });
}
