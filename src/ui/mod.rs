// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell for composing a pay document.
//! Handles layout, form controls, and wiring to the build and save commands.

pub mod components;

use eframe::egui;
use zeroize::Zeroizing;

use crate::config::PayConfig;
use crate::logic::builder::ensure_extension;
use crate::models::document::{FILE_EXTENSION, MAX_NOTE_CHARS, MIME_TYPE};
use crate::models::fields::{Field, hint_for};
use crate::mvu::{self, AppModel, Command, InspectedDocument, Msg, SessionState};
use crate::ui::components::expiry_picker;

const HINT_GRAY: u8 = 110;

/// Stateful egui application for building and saving pay documents.
pub struct PayPackApp {
    model: AppModel,
    inbox: Vec<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
}

impl PayPackApp {
    pub fn new(config: PayConfig) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();

        let threads = std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2);
        for _ in 0..threads {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            std::thread::spawn(move || {
                for cmd in cmd_rx.iter() {
                    let msg = mvu::run_command(cmd);
                    let _ = msg_tx.send(msg);
                }
            });
        }

        Self {
            model: AppModel::with_config(config),
            inbox: Vec::new(),
            cmd_tx,
            msg_rx,
        }
    }
}

impl eframe::App for PayPackApp {
    /// Drives a single UI frame: drains worker results, applies messages to
    /// the model, dispatches commands, then renders the panels.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(6.0, 8.0);
        });

        // Pull messages produced by the command worker.
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push(msg);
        }

        for msg in std::mem::take(&mut self.inbox) {
            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            for cmd in commands {
                if self.cmd_tx.send(cmd).is_ok() {
                    self.model.pending_commands += 1;
                }
            }
        }

        if let Some(name) = self.model.take_save_prompt() {
            self.prompt_save(&name);
        }
        if self.model.pending_commands > 0 {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Payment request");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(2.0);
                    egui::widgets::global_theme_preference_switch(ui);
                    ui.separator();
                    self.render_open_button(ui);
                });
            });
            ui.add_space(4.0);
        });

        self.render_error_modal(ctx);
        self.render_inspected_window(ctx);

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_form(ui);
                ui.add_space(12.0);
                self.render_more_options(ui);
                ui.add_space(12.0);
                self.render_create_button(ui);
                ui.add_space(8.0);
            });
        });
    }
}

impl PayPackApp {
    /// Native save dialog prefilled with the suggested name.
    fn prompt_save(&mut self, default_name: &str) {
        let dialog = rfd::FileDialog::new()
            .set_title("Save pay document")
            .add_filter("Pay document", &[FILE_EXTENSION])
            .set_file_name(default_name);

        if let Some(path) = dialog.save_file() {
            self.inbox
                .push(Msg::SaveRequested(ensure_extension(path, FILE_EXTENSION)));
        } else {
            self.inbox.push(Msg::SaveCancelled);
        }
    }

    fn render_open_button(&mut self, ui: &mut egui::Ui) {
        let button = egui::Button::new(format!("{} Open…", egui_phosphor::regular::FOLDER_OPEN));
        if ui
            .add(button)
            .on_hover_text("Inspect an existing .pay file")
            .clicked()
            && let Some(path) = rfd::FileDialog::new()
                .set_title("Open pay document")
                .add_filter("Pay document", &[FILE_EXTENSION])
                .pick_file()
        {
            self.inbox.push(Msg::OpenRequested(path));
        }
    }

    /// Required fields plus expiry and note.
    fn render_form(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            egui::Grid::new("pay_form_grid")
                .num_columns(2)
                .spacing(egui::vec2(8.0, 10.0))
                .min_col_width(110.0)
                .show(ui, |ui| {
                    ui.label("Amount");
                    ui.vertical(|ui| {
                        let mut amount = self.model.amount.clone();
                        if ui
                            .add(
                                egui::TextEdit::singleline(&mut amount)
                                    .hint_text("e.g., 12.50")
                                    .desired_width(180.0),
                            )
                            .changed()
                        {
                            self.inbox.push(Msg::AmountChanged(amount));
                        }
                        self.field_hint(ui, Field::Amount);
                    });
                    ui.end_row();

                    ui.label("Asset");
                    ui.vertical(|ui| {
                        self.render_asset_combo(ui);
                        self.field_hint(ui, Field::Asset);
                    });
                    ui.end_row();

                    ui.label("Network");
                    ui.vertical(|ui| {
                        self.render_network_combo(ui);
                        self.field_hint(ui, Field::Network);
                    });
                    ui.end_row();

                    ui.label("Expires");
                    ui.vertical(|ui| {
                        let msgs = expiry_picker::view(&self.model.expiry, ui);
                        self.inbox.extend(msgs.into_iter().map(Msg::Expiry));
                        self.field_hint(ui, Field::Expiry);
                    });
                    ui.end_row();

                    ui.label("Note");
                    ui.vertical(|ui| {
                        let mut note = self.model.note.clone();
                        if ui
                            .add(
                                egui::TextEdit::multiline(&mut note)
                                    .hint_text("What is this payment for?")
                                    .desired_rows(3)
                                    .desired_width(f32::INFINITY),
                            )
                            .changed()
                        {
                            self.inbox.push(Msg::NoteChanged(note));
                        }
                        ui.label(small_gray(format!(
                            "{}/{}",
                            self.model.note.chars().count(),
                            MAX_NOTE_CHARS
                        )));
                        self.field_hint(ui, Field::Note);
                    });
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.label(small_gray(
                "Expiry is entered in your local time zone and stored as UTC.",
            ));
        });
    }

    fn render_asset_combo(&mut self, ui: &mut egui::Ui) {
        let mut selected = self.model.asset.clone();
        egui::ComboBox::from_id_salt("asset_combo")
            .selected_text(selected.as_str())
            .show_ui(ui, |ui| {
                for asset in self.model.config.assets() {
                    ui.selectable_value(&mut selected, asset.to_string(), asset);
                }
            });
        if selected != self.model.asset {
            self.inbox.push(Msg::AssetChanged(selected));
        }
    }

    fn render_network_combo(&mut self, ui: &mut egui::Ui) {
        let networks = self.model.config.networks_for(&self.model.asset);
        let mut selected = self.model.network.clone();
        ui.add_enabled_ui(!networks.is_empty(), |ui| {
            egui::ComboBox::from_id_salt("network_combo")
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for network in networks {
                        ui.selectable_value(&mut selected, network.clone(), network.as_str());
                    }
                });
        });
        if selected != self.model.network {
            self.inbox.push(Msg::NetworkChanged(selected));
        }
    }

    /// Optional PIN, collapsed by default.
    fn render_more_options(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("More options")
            .default_open(false)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("PIN");
                    let mut pin = Zeroizing::new(self.model.pin.to_string());
                    if ui
                        .add(
                            egui::TextEdit::singleline(&mut *pin)
                                .password(true)
                                .hint_text("optional")
                                .desired_width(160.0),
                        )
                        .changed()
                    {
                        self.inbox.push(Msg::PinChanged(pin));
                    }
                });
                ui.label(small_gray(
                    "Only a SHA-256 hash of the PIN is stored in the document.",
                ));
            });
    }

    fn render_create_button(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let button = egui::Button::new(format!(
                "{} Create & save",
                egui_phosphor::regular::FLOPPY_DISK
            ));
            if ui
                .add_enabled(self.model.can_create(), button)
                .on_disabled_hover_text("Please fix the highlighted fields")
                .clicked()
            {
                self.inbox.push(Msg::CreateRequested);
            }

            match &self.model.session {
                SessionState::Building { .. } => {
                    ui.add(egui::Spinner::new().size(14.0));
                    ui.label("Creating…");
                }
                SessionState::Built(built) => {
                    let again = egui::Button::new(format!(
                        "{} Save again",
                        egui_phosphor::regular::DOWNLOAD_SIMPLE
                    ));
                    if ui.add(again).on_hover_text(built.filename.as_str()).clicked() {
                        self.model.save_prompt = Some(built.filename.clone());
                    }
                }
                SessionState::Editing => {}
            }
        });
    }

    fn field_hint(&self, ui: &mut egui::Ui, field: Field) {
        if let Some(error) = self.model.errors.get(field) {
            ui.label(
                egui::RichText::new(hint_for(field, error))
                    .small()
                    .color(ui.visuals().error_fg_color),
            );
        }
    }

    /// Render a simple modal window for error messages.
    fn render_error_modal(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.model.error.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissError);
                    }
                });
        }
    }

    /// Summary of an opened `.pay` file.
    fn render_inspected_window(&mut self, ctx: &egui::Context) {
        let Some(doc) = &self.model.inspected else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Pay document")
            .collapsible(false)
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                inspected_grid(ui, doc);
                ui.add_space(8.0);
                if ui.button("Close").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.inbox.push(Msg::DismissInspected);
        }
    }

    /// Render latest status/error message when present.
    fn render_status(&self, ui: &mut egui::Ui) {
        if let Some(text) = &self.model.status {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(text).color(egui::Color32::from_gray(68)));
                if self.model.pending_commands > 0 {
                    ui.add(egui::Spinner::new().size(14.0)).on_hover_text(format!(
                        "{} task(s) running in background",
                        self.model.pending_commands
                    ));
                }
            });
        }
    }
}

fn inspected_grid(ui: &mut egui::Ui, doc: &InspectedDocument) {
    let payload = doc.document.payload();
    egui::Grid::new("inspected_grid")
        .num_columns(2)
        .spacing(egui::vec2(8.0, 6.0))
        .show(ui, |ui| {
            let mut row = |label: &str, value: String| {
                ui.label(label);
                ui.label(egui::RichText::new(value).monospace());
                ui.end_row();
            };
            row("File", doc.path.display().to_string());
            row(
                "Format",
                format!("{MIME_TYPE} v{}", doc.document.header().version()),
            );
            row("Amount", format!("{} {}", payload.amount(), payload.asset()));
            row("Network", payload.network().to_string());
            row("Created", payload.created_at().to_string());
            row(
                "Expires",
                match payload.exp() {
                    Some(exp) if doc.expired => format!("{exp} (expired)"),
                    Some(exp) => exp.to_string(),
                    None => "never".into(),
                },
            );
            if let Some(note) = payload.note() {
                row("Note", note.to_string());
            }
            row(
                "PIN",
                if payload.pin_hash().is_some() {
                    "required".into()
                } else {
                    "none".into()
                },
            );
            row("ID", payload.jti().to_string());
            row("SHA-256", doc.fingerprint.clone());
        });
}

fn small_gray(text: impl Into<String>) -> egui::RichText {
    egui::RichText::new(text)
        .small()
        .color(egui::Color32::from_gray(HINT_GRAY))
}
