// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! On/off switch used for optional form sections.

use egui::{Response, Sense, StrokeKind, Ui, WidgetInfo, WidgetType, lerp, pos2, vec2};

/// Draw a compact switch; a click flips `on` and marks the response changed.
pub fn toggle_switch(ui: &mut Ui, on: &mut bool) -> Response {
    let height = ui.spacing().interact_size.y.max(18.0);
    let size = vec2(height * 1.8, height);
    let (rect, mut response) = ui.allocate_exact_size(size, Sense::click());
    if response.clicked() {
        *on = !*on;
        response.mark_changed();
    }
    response.widget_info(|| {
        WidgetInfo::selected(WidgetType::Checkbox, ui.is_enabled(), *on, "")
    });

    if ui.is_rect_visible(rect) {
        let t = ui.ctx().animate_bool_responsive(response.id, *on);
        let visuals = ui.style().interact_selectable(&response, *on);
        let radius = 0.5 * rect.height();
        ui.painter().rect(
            rect.expand(visuals.expansion),
            radius,
            visuals.bg_fill,
            visuals.bg_stroke,
            StrokeKind::Inside,
        );
        let knob_x = lerp((rect.left() + radius)..=(rect.right() - radius), t);
        ui.painter().circle(
            pos2(knob_x, rect.center().y),
            0.75 * radius,
            visuals.bg_fill,
            visuals.fg_stroke,
        );
    }

    response
}
