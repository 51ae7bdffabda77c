use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon,
    Text,
};

use tune_stats::dashboard::payload::{self, ColorScale, Figure};
use tune_stats::stats::binning;

use crate::color::{self, ColorMap};
use crate::ui::table;

const PLOT_HEIGHT: f32 = 320.0;
const ACCENT: Color32 = Color32::from_rgb(0, 212, 255);

// ---------------------------------------------------------------------------
// Figure dispatch
// ---------------------------------------------------------------------------

/// Render one component figure. `id` keeps plot memory apart between cards.
pub fn figure(ui: &mut Ui, id: &str, figure: &Figure) {
    match figure {
        Figure::Bar(chart) => bar_chart(ui, id, chart),
        Figure::Heatmap(map) => heatmap(ui, id, map),
        Figure::Radar(radar) => radar_chart(ui, id, radar),
        Figure::Histogram(hist) => histogram(ui, id, hist),
        Figure::Density(fig) => density(ui, id, fig),
        Figure::Sparklines(lines) => sparklines(ui, id, lines),
        Figure::Ridgeline(ridges) => ridgeline(ui, id, ridges),
        Figure::BoxPlot(plot) => box_plot(ui, id, plot),
        Figure::Scatter(scatter) => scatter_plot(ui, id, scatter),
        Figure::Table(data) => table::data_table(ui, id, data),
        Figure::Blank => {}
        Figure::NoData(message) | Figure::InsufficientSelection(message) => placeholder(ui, message),
        Figure::Failed => placeholder(ui, "An error occurred while updating this chart"),
    }
}

fn placeholder(ui: &mut Ui, message: &str) {
    ui.allocate_ui(egui::vec2(ui.available_width(), 120.0), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(message).size(18.0).weak());
        });
    });
}

/// Axis labels for categorical positions 0, 1, 2, …
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn cell(x: f64, y: f64, half_w: f64, half_h: f64, fill: Color32) -> Polygon<'static> {
    let corners = vec![
        [x - half_w, y - half_h],
        [x + half_w, y - half_h],
        [x + half_w, y + half_h],
        [x - half_w, y + half_h],
    ];
    Polygon::new(PlotPoints::new(corners))
        .fill_color(fill)
        .stroke(Stroke::new(0.5, Color32::from_gray(40)))
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, id: &str, chart: &payload::BarChart) {
    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();
    let bars = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| Bar::new(i as f64, b.value).width(0.7).name(&b.label))
        .collect();
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT));
        });
}

fn heatmap(ui: &mut Ui, id: &str, map: &payload::Heatmap) {
    let (lo, hi) = map.z_range.unwrap_or_else(|| {
        map.z
            .iter()
            .flatten()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
    });
    Plot::new(id)
        .height(PLOT_HEIGHT + 80.0)
        .x_axis_formatter(category_axis(map.x_labels.clone()))
        .y_axis_formatter(category_axis(map.y_labels.clone()))
        .show_grid(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (y, row) in map.z.iter().enumerate() {
                for (x, value) in row.iter().enumerate() {
                    let fill = match value {
                        Some(v) => color::scale_value(map.scale, *v, lo, hi),
                        None => Color32::from_gray(60),
                    };
                    plot_ui.polygon(cell(x as f64, y as f64, 0.5, 0.5, fill));
                    let note = map.text.as_ref().and_then(|t| t.get(y)?.get(x));
                    if let Some(note) = note {
                        plot_ui.text(
                            Text::new(PlotPoint::new(x as f64, y as f64), RichText::new(note).size(10.0))
                                .color(Color32::BLACK),
                        );
                    }
                }
            }
        });
    if let Some(legend) = &map.legend {
        ui.label(RichText::new(format!("{legend}: {lo:.2} … {hi:.2}")).weak());
    }
}

fn radar_chart(ui: &mut Ui, id: &str, radar: &payload::Radar) {
    let n = radar.axes.len().max(1);
    let angle = |i: usize| std::f64::consts::FRAC_PI_2 - std::f64::consts::TAU * i as f64 / n as f64;
    let colors = ColorMap::new(radar.series.iter().map(|s| s.name.as_str()));
    Plot::new(id)
        .height(PLOT_HEIGHT + 40.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for ring in [0.25, 0.5, 0.75, 1.0] {
                let circle: PlotPoints = (0..=64)
                    .map(|k| {
                        let a = std::f64::consts::TAU * f64::from(k) / 64.0;
                        [ring * a.cos(), ring * a.sin()]
                    })
                    .collect();
                plot_ui.line(Line::new(circle).color(Color32::from_gray(70)).width(0.5));
            }
            for (i, axis) in radar.axes.iter().enumerate() {
                let (s, c) = angle(i).sin_cos();
                plot_ui.line(Line::new(PlotPoints::new(vec![[0.0, 0.0], [c, s]])).color(Color32::from_gray(70)));
                plot_ui.text(Text::new(PlotPoint::new(1.18 * c, 1.12 * s), axis.as_str()));
            }
            for series in &radar.series {
                let mut pts: Vec<[f64; 2]> = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let r = v.unwrap_or(0.0);
                        let (s, c) = angle(i).sin_cos();
                        [r * c, r * s]
                    })
                    .collect();
                if let Some(first) = pts.first().copied() {
                    pts.push(first);
                }
                plot_ui.line(
                    Line::new(PlotPoints::new(pts))
                        .name(&series.name)
                        .color(colors.color_for(&series.name))
                        .width(2.0),
                );
            }
        });
}

fn histogram(ui: &mut Ui, id: &str, hist: &payload::HistogramFigure) {
    let bars = hist
        .centers
        .iter()
        .zip(&hist.counts)
        .map(|(c, n)| Bar::new(*c, *n as f64).width(hist.bin_width))
        .collect();
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(hist.metric.as_str())
        .y_axis_label("Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT).name(&hist.metric));
        });
}

fn density(ui: &mut Ui, id: &str, fig: &payload::DensityFigure) {
    let grid = &fig.grid;
    let max = grid.max_count().max(1) as f64;
    let colors = ColorMap::new(fig.overlays.iter().map(|s| s.name.as_str()));
    Plot::new(id)
        .height(PLOT_HEIGHT + 40.0)
        .x_axis_label(fig.x_label.as_str())
        .y_axis_label(fig.y_label.as_str())
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (yi, row) in grid.counts.iter().enumerate() {
                for (xi, count) in row.iter().enumerate().filter(|(_, n)| **n > 0) {
                    let (x0, x1) = (grid.x_edges[xi], grid.x_edges[xi + 1]);
                    let (y0, y1) = (grid.y_edges[yi], grid.y_edges[yi + 1]);
                    let fill = color::scale_color(ColorScale::Viridis, *count as f64 / max);
                    plot_ui.polygon(
                        cell((x0 + x1) / 2.0, (y0 + y1) / 2.0, (x1 - x0) / 2.0, (y1 - y0) / 2.0, fill)
                            .stroke(Stroke::NONE),
                    );
                }
            }
            for overlay in &fig.overlays {
                plot_ui.points(
                    Points::new(PlotPoints::new(overlay.points.clone()))
                        .name(&overlay.name)
                        .color(colors.color_for(&overlay.name))
                        .radius(2.0),
                );
            }
        });
}

fn sparklines(ui: &mut Ui, id: &str, lines: &payload::Sparklines) {
    ui.label(RichText::new(&lines.title).strong());
    let columns = lines.columns.max(1);
    let width = (ui.available_width() / columns as f32 - 12.0).max(80.0);
    egui::Grid::new(id).num_columns(columns).spacing([8.0, 8.0]).show(ui, |ui: &mut Ui| {
        for (i, panel) in lines.panels.iter().enumerate() {
            ui.vertical(|ui: &mut Ui| {
                ui.label(RichText::new(&panel.genre).small());
                let labels: Vec<String> = panel.points.iter().map(|(p, _)| p.clone()).collect();
                let pts: PlotPoints = panel
                    .points
                    .iter()
                    .enumerate()
                    .map(|(x, (_, y))| [x as f64, *y])
                    .collect();
                let mut plot = Plot::new((id, i))
                    .width(width)
                    .height(90.0)
                    .x_axis_formatter(category_axis(labels))
                    .allow_drag(false)
                    .allow_zoom(false)
                    .allow_scroll(false);
                if let Some((lo, hi)) = lines.y_range {
                    plot = plot.include_y(lo).include_y(hi);
                }
                plot.show(ui, |plot_ui| {
                    plot_ui.line(Line::new(pts).color(ACCENT).width(2.0));
                });
            });
            if (i + 1) % columns == 0 {
                ui.end_row();
            }
        }
    });
}

fn ridgeline(ui: &mut Ui, id: &str, fig: &payload::Ridgeline) {
    const BINS: usize = 20;
    let n = fig.ridges.len();
    let colors = generate_ridge_colors(n);
    let labels: Vec<String> = fig.ridges.iter().rev().map(|r| r.genre.clone()).collect();
    Plot::new(id)
        .height((60.0 + 28.0 * n as f32).max(PLOT_HEIGHT))
        .x_axis_label(fig.x_label.as_str())
        .y_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, ridge) in fig.ridges.iter().enumerate() {
                let base = (n - 1 - i) as f64;
                let Some(hist) = binning::histogram(&ridge.values, BINS) else {
                    continue;
                };
                let peak = hist.counts.iter().copied().max().unwrap_or(1).max(1) as f64;
                let mut outline: Vec<[f64; 2]> = vec![[hist.edges[0], base]];
                outline.extend(
                    hist.centers()
                        .iter()
                        .zip(&hist.counts)
                        .map(|(x, c)| [*x, base + 1.4 * *c as f64 / peak]),
                );
                outline.push([hist.edges[BINS], base]);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(outline))
                        .fill_color(colors[i].gamma_multiply(0.6))
                        .stroke(Stroke::new(1.0, colors[i]))
                        .name(&ridge.genre),
                );
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[ridge.median, base]]))
                        .radius(3.0)
                        .color(Color32::WHITE),
                );
            }
        });
}

fn generate_ridge_colors(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| color::scale_color(ColorScale::Viridis, i as f64 / n.max(2).saturating_sub(1) as f64))
        .collect()
}

fn box_plot(ui: &mut Ui, id: &str, fig: &payload::BoxPlot) {
    ui.label(RichText::new(&fig.title).strong());
    let labels: Vec<String> = fig.groups.iter().map(|(g, _)| g.clone()).collect();
    let colors = ColorMap::new(labels.iter().map(String::as_str));
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .y_axis_label(fig.y_label.as_str())
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (genre, s)) in fig.groups.iter().enumerate() {
                let x = i as f64;
                let color = colors.color_for(genre);
                let spread = BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker);
                plot_ui.box_plot(
                    BoxPlot::new(vec![BoxElem::new(x, spread).name(genre).box_width(0.6)])
                        .color(color)
                        .name(genre),
                );
                if !s.outliers.is_empty() {
                    let pts: Vec<[f64; 2]> = s.outliers.iter().map(|v| [x, *v]).collect();
                    plot_ui.points(Points::new(PlotPoints::new(pts)).color(color).radius(2.0));
                }
            }
        });
}

fn scatter_plot(ui: &mut Ui, id: &str, fig: &payload::Scatter) {
    let colors = ColorMap::new(fig.series.iter().map(|s| s.name.as_str()));
    Plot::new(id)
        .height(PLOT_HEIGHT + 40.0)
        .x_axis_label(fig.x_label.as_str())
        .y_axis_label(fig.y_label.as_str())
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for series in &fig.series {
                plot_ui.points(
                    Points::new(PlotPoints::new(series.points.clone()))
                        .name(&series.name)
                        .color(colors.color_for(&series.name).gamma_multiply(0.7))
                        .radius(2.5),
                );
            }
        });
}
