/*!
 * Desktop dashboard for cvtrends-rs.
 *
 * Shows the live market-trend charts with hourly background refresh and a
 * résumé analysis form:
 * - Skills and experience-level data refresh on a fixed period; a failed
 *   refresh keeps the last good chart under a warning banner
 * - The chart layout tier follows the panel width (narrow vs. wide)
 * - Charts can be exported as SVG/PNG
 *
 * Platform support: Windows, macOS, Linux
 */

use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use cvtrends_rs::layout::Orientation;
use cvtrends_rs::models::AnalysisReport;
use cvtrends_rs::viz::text::truncate_label;
use cvtrends_rs::{Client, RefreshScheduler, Snapshot, ViewportClass, resolve_layout, viz};

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([400.0, 400.0])
            .with_title("CV Market Trends"),
        ..Default::default()
    };

    eframe::run_native(
        "CV Market Trends",
        options,
        Box::new(|_cc| Ok(Box::new(TrendsApp::new()))),
    )
}

const SKILL_BAR: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);

#[derive(Debug)]
enum AnalyzeResult {
    Success(Box<AnalysisReport>),
    Error(String),
}

/// Main application state
struct TrendsApp {
    scheduler: RefreshScheduler,

    // Analyze form
    cv_text: String,
    analyzing: bool,
    report: Option<AnalysisReport>,
    analyze_error: String,
    analyze_receiver: Option<mpsc::Receiver<AnalyzeResult>>,

    // Export
    export_dir: String,
    export_message: String,
}

impl TrendsApp {
    fn new() -> Self {
        let home_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .to_string_lossy()
            .to_string();

        Self {
            scheduler: RefreshScheduler::start(Client::from_env()),
            cv_text: String::new(),
            analyzing: false,
            report: None,
            analyze_error: String::new(),
            analyze_receiver: None,
            export_dir: home_dir,
            export_message: String::new(),
        }
    }

    fn start_analysis(&mut self) {
        if self.cv_text.trim().is_empty() {
            self.analyze_error = "Paste your CV text first".to_string();
            return;
        }
        self.analyzing = true;
        self.analyze_error.clear();

        let (sender, receiver) = mpsc::channel();
        self.analyze_receiver = Some(receiver);
        let cv_text = self.cv_text.clone();

        // Network work stays off the UI thread.
        thread::spawn(move || {
            let client = Client::from_env();
            let result = match client.analyze_cv(&cv_text) {
                Ok(report) => AnalyzeResult::Success(Box::new(report)),
                Err(err) => AnalyzeResult::Error(err.to_string()),
            };
            let _ = sender.send(result);
        });
    }

    fn check_analysis_result(&mut self) {
        if let Some(receiver) = &self.analyze_receiver
            && let Ok(result) = receiver.try_recv()
        {
            self.analyzing = false;
            self.analyze_receiver = None;
            match result {
                AnalyzeResult::Success(report) => {
                    self.report = Some(*report);
                    self.analyze_error.clear();
                }
                AnalyzeResult::Error(err) => self.analyze_error = err,
            }
        }
    }

    fn export_charts(&mut self, snapshot: &Snapshot, viewport: ViewportClass, width: u32) {
        let Some(model) = snapshot.model.as_ref() else {
            return;
        };
        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.export_dir)
            .pick_folder()
        else {
            return;
        };
        self.export_dir = dir.to_string_lossy().to_string();

        let mut written = Vec::new();
        if let Some(layout) = resolve_layout(viewport, model.skills.len()) {
            let path = dir.join("cvtrends_skills.svg");
            match viz::plot_skills_chart(&model.skills, &layout, &path, width) {
                Ok(()) => written.push(path.display().to_string()),
                Err(err) => {
                    self.export_message = format!("Chart export failed: {err}");
                    return;
                }
            }
        }
        if !model.levels.is_empty() {
            let path = dir.join("cvtrends_levels.svg");
            match viz::plot_levels_chart(&model.levels, &path, width, 360) {
                Ok(()) => written.push(path.display().to_string()),
                Err(err) => {
                    self.export_message = format!("Chart export failed: {err}");
                    return;
                }
            }
        }
        self.export_message = if written.is_empty() {
            "Nothing to export yet".to_string()
        } else {
            format!("Exported: {}", written.join(", "))
        };
    }

    fn draw_skills(&self, ui: &mut egui::Ui, snapshot: &Snapshot, viewport: ViewportClass) {
        let Some(model) = snapshot.model.as_ref() else {
            return;
        };
        let Some(layout) = resolve_layout(viewport, model.skills.len()) else {
            ui.label("No skill data yet.");
            return;
        };

        let width = ui.available_width();
        let (response, painter) = ui.allocate_painter(
            egui::Vec2::new(width, layout.container_height as f32),
            egui::Sense::hover(),
        );
        let rect = response.rect;
        let n = model.skills.len() as f32;
        let font = egui::FontId::proportional(layout.tick_font_px as f32);
        let text_color = ui.visuals().text_color();

        match layout.orientation {
            // Narrow tier: sideways bars, labels in a left gutter, value
            // along the narrow dimension.
            Orientation::Vertical => {
                let gutter = 110.0_f32.min(rect.width() * 0.35);
                let value_w = (rect.width() - gutter).max(1.0);
                let slot = rect.height() / n;
                for (i, skill) in model.skills.iter().enumerate() {
                    let y = rect.top() + slot * (i as f32 + 0.5);
                    let frac = (skill.percent / 100.0).clamp(0.0, 1.0) as f32;
                    let half = (layout.bar_thickness as f32).min(slot * 0.8) / 2.0;
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(rect.left() + gutter, y - half),
                            egui::pos2(rect.left() + gutter + value_w * frac, y + half),
                        ),
                        2.0,
                        SKILL_BAR,
                    );
                    painter.text(
                        egui::pos2(rect.left() + gutter - 6.0, y),
                        egui::Align2::RIGHT_CENTER,
                        truncate_label(&skill.name, layout.label_max_chars),
                        font.clone(),
                        text_color,
                    );
                    painter.text(
                        egui::pos2(rect.left() + gutter + value_w * frac + 4.0, y),
                        egui::Align2::LEFT_CENTER,
                        format!("{:.0}%", skill.percent),
                        font.clone(),
                        text_color,
                    );
                }
            }
            // Wide tier: upright bars with labels underneath.
            Orientation::Horizontal => {
                let label_h = 18.0;
                let value_h = (rect.height() - label_h).max(1.0);
                let slot = rect.width() / n;
                for (i, skill) in model.skills.iter().enumerate() {
                    let x = rect.left() + slot * (i as f32 + 0.5);
                    let frac = (skill.percent / 100.0).clamp(0.0, 1.0) as f32;
                    let half = (layout.bar_thickness as f32).min(slot * 0.8) / 2.0;
                    let base = rect.top() + value_h;
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x - half, base - value_h * frac),
                            egui::pos2(x + half, base),
                        ),
                        2.0,
                        SKILL_BAR,
                    );
                    painter.text(
                        egui::pos2(x, base + 2.0),
                        egui::Align2::CENTER_TOP,
                        truncate_label(&skill.name, layout.label_max_chars),
                        font.clone(),
                        text_color,
                    );
                }
            }
        }
    }

    fn draw_levels(&self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        let Some(model) = snapshot.model.as_ref() else {
            return;
        };
        if model.levels.is_empty() {
            return;
        }
        ui.add_space(8.0);
        ui.label("Experience levels:");
        for level in &model.levels {
            ui.horizontal(|ui| {
                let (rect, _) =
                    ui.allocate_exact_size(egui::Vec2::splat(12.0), egui::Sense::hover());
                ui.painter()
                    .rect_filled(rect, 2.0, hex_color32(&level.color));
                ui.label(format!("{} ({})", level.name, level.count));
            });
        }
    }
}

impl eframe::App for TrendsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_analysis_result();

        let snapshot = self.scheduler.snapshot();
        if snapshot.loading || self.analyzing {
            ctx.request_repaint();
        } else {
            // Keep polling the scheduler while idle, just less eagerly.
            ctx.request_repaint_after(std::time::Duration::from_secs(1));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Market trends dashboard");
                ui.add_space(6.0);

                // Layout tier follows the actual panel width.
                let panel_width = ui.available_width();
                let viewport = ViewportClass::classify(panel_width.max(0.0) as u32);

                match (&snapshot.error, &snapshot.model) {
                    (Some(err), None) => {
                        ui.colored_label(egui::Color32::RED, format!("Error: {err}"));
                    }
                    (Some(err), Some(_)) => {
                        ui.colored_label(
                            egui::Color32::from_rgb(180, 120, 0),
                            format!("Refresh failed; showing stale data. ({err})"),
                        );
                    }
                    _ => {}
                }

                if snapshot.loading && snapshot.model.is_none() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading market data...");
                    });
                }

                if let Some(model) = &snapshot.model {
                    if model.total_jobs > 0 {
                        ui.label(format!("Out of {} jobs found:", model.total_jobs));
                    }
                    if let Some(at) = snapshot.fetched_at {
                        ui.weak(format!("Updated {}", at.format("%Y-%m-%d %H:%M UTC")));
                    }
                    ui.add_space(6.0);
                    self.draw_skills(ui, &snapshot, viewport);
                    self.draw_levels(ui, &snapshot);
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Refresh now").clicked() {
                        self.scheduler.refresh_now();
                    }
                    if ui
                        .add_enabled(
                            snapshot.model.is_some(),
                            egui::Button::new("Export charts..."),
                        )
                        .clicked()
                    {
                        self.export_charts(&snapshot, viewport, panel_width.max(320.0) as u32);
                    }
                    if snapshot.loading {
                        ui.spinner();
                    }
                });
                if !self.export_message.is_empty() {
                    ui.weak(&self.export_message);
                }

                ui.add_space(14.0);
                ui.separator();
                ui.heading("Analyze your CV");

                ui.add(
                    egui::TextEdit::multiline(&mut self.cv_text)
                        .hint_text("Paste your CV text here")
                        .desired_rows(8)
                        .desired_width(f32::INFINITY),
                );
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!self.analyzing, egui::Button::new("Analyze"))
                        .clicked()
                    {
                        self.start_analysis();
                    }
                    if self.analyzing {
                        ui.spinner();
                        ui.label("Analyzing...");
                    }
                });
                if !self.analyze_error.is_empty() {
                    ui.colored_label(egui::Color32::RED, &self.analyze_error);
                }

                if let Some(report) = &self.report {
                    ui.add_space(8.0);
                    ui.group(|ui| {
                        let rec = &report.recommendation;
                        if !rec.opening.is_empty() {
                            ui.label(&rec.opening);
                        }
                        if !rec.cv_review_points.is_empty() {
                            if !rec.cv_review_title.is_empty() {
                                ui.strong(&rec.cv_review_title);
                            }
                            for point in &rec.cv_review_points {
                                ui.label(format!("- {point}"));
                            }
                        }
                        if !rec.gap_analysis_intro.is_empty() {
                            ui.label(&rec.gap_analysis_intro);
                        }
                        if !rec.closing.is_empty() {
                            ui.label(&rec.closing);
                        }

                        let details = &report.analysis_details;
                        if !details.cv_skills.is_empty() {
                            ui.label(format!("CV skills: {}", details.cv_skills.join(", ")));
                        }
                        if !details.market_gaps.is_empty() {
                            ui.label(format!("Market gaps: {}", details.market_gaps.join(", ")));
                        }

                        if !report.top_jobs.is_empty() {
                            ui.add_space(4.0);
                            ui.strong("Matching jobs");
                            for job in &report.top_jobs {
                                let pct = job
                                    .match_percentage
                                    .map(|p| format!(" ({p:.0}% match)"))
                                    .unwrap_or_default();
                                ui.label(format!("{} at {}{}", job.title, job.company, pct));
                                if !job.link.is_empty() {
                                    ui.hyperlink(&job.link);
                                }
                            }
                        }
                    });
                }
            });
        });
    }
}

fn hex_color32(token: &str) -> egui::Color32 {
    let c = cvtrends_rs::viz::util::parse_hex_color(token);
    egui::Color32::from_rgb(c.0, c.1, c.2)
}
