use eframe::egui::{self, Ui};

use tune_stats::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValue, ControlValues};

/// Render one component's widgets in a wrapped row. Returns true when any
/// value changed this frame.
pub fn control_row(ui: &mut Ui, salt: &str, specs: &[ControlSpec], values: &mut ControlValues) -> bool {
    let mut changed = false;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for spec in specs {
            ui.vertical(|ui: &mut Ui| {
                ui.strong(spec.label);
                changed |= control(ui, salt, spec, values);
            });
            ui.add_space(12.0);
        }
    });
    changed
}

fn option_text(option: &ControlOption) -> Option<&str> {
    match &option.value {
        ControlValue::Text(s) => Some(s.as_str()),
        _ => None,
    }
}

fn control(ui: &mut Ui, salt: &str, spec: &ControlSpec, values: &mut ControlValues) -> bool {
    let current = values.get(spec.id).cloned().unwrap_or_else(|| spec.default.clone());
    match &spec.kind {
        ControlKind::Dropdown(options) => {
            let selected = options
                .iter()
                .find(|o| o.value == current)
                .map(|o| o.label.clone())
                .unwrap_or_default();
            let mut picked = None;
            egui::ComboBox::from_id_salt((salt, spec.id))
                .selected_text(selected)
                .width(180.0)
                .show_ui(ui, |ui: &mut Ui| {
                    for option in options {
                        if ui.selectable_label(option.value == current, option.label.as_str()).clicked() {
                            picked = Some(option.value.clone());
                        }
                    }
                });
            match picked {
                Some(value) if value != current => {
                    values.set(spec.id, value);
                    true
                }
                _ => false,
            }
        }
        ControlKind::MultiSelect(options) | ControlKind::Checklist(options) => {
            let mut list = match current {
                ControlValue::List(items) => items,
                ControlValue::Text(s) if !s.is_empty() => vec![s],
                _ => Vec::new(),
            };
            let mut changed = false;
            let mut body = |ui: &mut Ui| {
                for option in options {
                    let Some(value) = option_text(option) else {
                        continue;
                    };
                    let mut checked = list.iter().any(|v| v == value);
                    if ui.checkbox(&mut checked, option.label.as_str()).changed() {
                        if checked {
                            list.push(value.to_string());
                        } else {
                            list.retain(|v| v != value);
                        }
                        changed = true;
                    }
                }
            };
            if matches!(spec.kind, ControlKind::Checklist(_)) {
                ui.horizontal_wrapped(body);
            } else {
                egui::ScrollArea::vertical()
                    .id_salt((salt, spec.id))
                    .max_height(140.0)
                    .show(ui, |ui: &mut Ui| body(ui));
            }
            if changed {
                values.set(spec.id, list);
            }
            changed
        }
        ControlKind::Toggle => {
            let mut on = matches!(current, ControlValue::Flag(true));
            let changed = ui.checkbox(&mut on, "Enabled").changed();
            if changed {
                values.set(spec.id, on);
            }
            changed
        }
        ControlKind::Slider { min, max, step } => {
            let mut v = number(&current, *min);
            let changed = ui
                .add(egui::Slider::new(&mut v, *min..=*max).step_by(*step))
                .changed();
            if changed {
                values.set(spec.id, v);
            }
            changed
        }
        ControlKind::Number { min, max } => {
            let mut v = number(&current, *min);
            let changed = ui
                .add(egui::DragValue::new(&mut v).range(*min..=*max))
                .changed();
            if changed {
                values.set(spec.id, v);
            }
            changed
        }
    }
}

fn number(value: &ControlValue, fallback: f64) -> f64 {
    match value {
        ControlValue::Number(v) => *v,
        ControlValue::Text(s) => s.trim().parse().unwrap_or(fallback),
        _ => fallback,
    }
}
