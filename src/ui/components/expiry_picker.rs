// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Optional expiry picker in MVU style.
//!
//! The picker works in local wall-clock time and hands the validator the
//! same `YYYY-MM-DDTHH:MM` text a browser `datetime-local` input would.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use eframe::egui;
use egui_extras::DatePickerButton;

use crate::ui::components::toggle_switch;
use crate::utils::datetime::{LOCAL_INPUT_FORMAT, local_after_hours};

/// Format an integer as a two-digit string (00-99).
fn format_two(n: i32) -> String {
    format!("{:02}", n.clamp(0, 99))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpiryModel {
    /// Whether the document gets an expiry at all.
    pub enabled: bool,
    /// Selected calendar date (local).
    pub date: NaiveDate,
    /// Selected hour (0-23).
    pub hour: i32,
    /// Selected minute (0-59).
    pub minute: i32,
}

impl Default for ExpiryModel {
    fn default() -> Self {
        let mut model = Self::at(Local::now().naive_local());
        model.enabled = false;
        model
    }
}

impl ExpiryModel {
    /// Enabled picker set to `hours` from now; `0` yields a disabled picker.
    pub fn hours_from_now(hours: u32) -> Self {
        if hours == 0 {
            return Self::default();
        }
        local_after_hours(hours).map(Self::at).unwrap_or_default()
    }

    fn at(local: NaiveDateTime) -> Self {
        Self {
            enabled: true,
            date: local.date(),
            hour: local.hour() as i32,
            minute: local.minute() as i32,
        }
    }

    /// Raw expiry input for validation; empty when disabled.
    pub fn to_local_input(&self) -> String {
        if !self.enabled {
            return String::new();
        }
        let time = chrono::NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0);
        match time {
            Some(time) => self.date.and_time(time).format(LOCAL_INPUT_FORMAT).to_string(),
            // Out-of-range parts produce text the validator reports as invalid.
            None => format!("{}T{}:{}", self.date, self.hour, self.minute),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpiryMsg {
    /// Turn the expiry on or off.
    SetEnabled(bool),
    /// Update the date field.
    SetDate(NaiveDate),
    /// Update the hour field.
    SetHour(i32),
    /// Update the minute field.
    SetMinute(i32),
    /// Move the expiry to `hours` from now and enable it.
    SetInHours(u32),
}

/// Apply a message to the expiry model.
pub fn update(model: &mut ExpiryModel, msg: ExpiryMsg) {
    match msg {
        ExpiryMsg::SetEnabled(enabled) => model.enabled = enabled,
        ExpiryMsg::SetDate(date) => model.date = date,
        ExpiryMsg::SetHour(h) => model.hour = h.clamp(0, 23),
        ExpiryMsg::SetMinute(m) => model.minute = m.clamp(0, 59),
        ExpiryMsg::SetInHours(hours) => {
            if let Some(local) = local_after_hours(hours) {
                *model = ExpiryModel::at(local);
            }
        }
    }
}

/// Render the picker controls and return any triggered messages.
pub fn view(model: &ExpiryModel, ui: &mut egui::Ui) -> Vec<ExpiryMsg> {
    let mut msgs = Vec::new();

    ui.horizontal(|ui| {
        let mut enabled = model.enabled;
        if toggle_switch(ui, &mut enabled)
            .on_hover_text("Documents without expiry stay valid indefinitely")
            .changed()
        {
            msgs.push(ExpiryMsg::SetEnabled(enabled));
        }
        ui.add_space(8.0);

        ui.add_enabled_ui(model.enabled, |ui| {
            let mut date = model.date;
            if ui
                .add(DatePickerButton::new(&mut date).show_icon(true))
                .changed()
            {
                msgs.push(ExpiryMsg::SetDate(date));
            }
            ui.add_space(8.0);

            let mut hour = model.hour;
            if ui
                .add(
                    egui::DragValue::new(&mut hour)
                        .range(0..=23)
                        .speed(0.1)
                        .clamp_existing_to_range(true)
                        .custom_formatter(|v, _| format_two(v as i32)),
                )
                .changed()
            {
                msgs.push(ExpiryMsg::SetHour(hour));
            }
            ui.label(":");
            let mut minute = model.minute;
            if ui
                .add(
                    egui::DragValue::new(&mut minute)
                        .range(0..=59)
                        .speed(0.1)
                        .clamp_existing_to_range(true)
                        .custom_formatter(|v, _| format_two(v as i32)),
                )
                .changed()
            {
                msgs.push(ExpiryMsg::SetMinute(minute));
            }
        });

        ui.add_space(8.0);
        if ui
            .button(egui::RichText::new(format!(
                "{} +24 h",
                egui_phosphor::regular::CLOCK
            )))
            .on_hover_text("Expire 24 hours from now (your local time, stored as UTC)")
            .clicked()
        {
            msgs.push(ExpiryMsg::SetInHours(24));
        }
    });

    msgs
}
