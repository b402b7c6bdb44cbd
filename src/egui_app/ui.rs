//! egui renderer for the labeler.
//!
//! Every frame reads a [`Screen`] snapshot from the controller, draws it, and
//! forwards at most one [`Intent`] back once drawing is done.

use std::num::NonZeroU32;

use eframe::egui::{self, Button, Color32, Frame, RichText, Ui, Vec2};

use crate::egui_app::state::{Page, SetupForm, UiState};
use crate::labels::{Category, CategorySet, Label};
use crate::session::{Intent, LabelingController, Notice, Progress, Screen};

/// Smallest window size that keeps the labeling screen usable.
pub const MIN_VIEWPORT_SIZE: Vec2 = egui::vec2(640.0, 480.0);

const PRIMARY: Color32 = Color32::from_rgb(51, 87, 167);
const DANGER: Color32 = Color32::from_rgb(220, 53, 69);
const WARNING: Color32 = Color32::from_rgb(230, 160, 20);

/// Renders the labeler UI on top of a [`LabelingController`].
pub struct EguiApp {
    controller: LabelingController,
    ui: UiState,
}

impl EguiApp {
    pub fn new(controller: LabelingController) -> Self {
        let ui = UiState::new(controller.default_target());
        Self { controller, ui }
    }

    fn render_navigation(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("navigation")
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Navigation");
                ui.add_space(8.0);
                ui.radio_value(&mut self.ui.page, Page::Labeling, "Labeling");
                ui.radio_value(&mut self.ui.page, Page::Summary, "Summary");
            });
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.controller.notice().cloned() else {
            return;
        };
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let color = match notice {
                    Notice::SaveFailed(_) => DANGER,
                    Notice::StoreUnreadable(_) | Notice::WideStale(_) => WARNING,
                };
                ui.colored_label(color, notice.message());
                if self.controller.has_unsaved() {
                    if ui.button("Retry save").clicked()
                        && let Err(err) = self.controller.retry_persist()
                    {
                        tracing::debug!("Retry failed: {err}");
                    }
                } else if ui.button("Dismiss").clicked() {
                    self.controller.dismiss_notice();
                }
            });
        });
    }

    fn render_labeling_page(&mut self, ui: &mut Ui) {
        let intent = match self.controller.screen() {
            Screen::Setup {
                categories,
                default_target,
            } => render_setup(ui, &mut self.ui.setup, categories, default_target),
            Screen::Labeling {
                category,
                comment,
                index,
                pool_len,
                progress,
            } => {
                render_progress_header(ui, category, &progress);
                let navigate = render_comment_card(ui, &comment.text, index, pool_len);
                let submit = render_label_buttons(ui);
                let finish = render_finish_button(ui);
                navigate.or(submit).or(finish)
            }
            Screen::Exhausted { category, progress } => {
                render_progress_header(ui, category, &progress);
                ui.add_space(12.0);
                ui.colored_label(WARNING, "No more unlabeled comments.");
                render_finish_button(ui)
            }
            Screen::FinishModal { progress, .. } => render_finish_modal(ui, &progress),
            Screen::Congrats { target_true, .. } => render_congrats(ui, target_true),
        };
        if let Some(intent) = intent
            && let Err(err) = self.controller.dispatch(intent)
        {
            tracing::debug!("Intent left unsaved labels: {err}");
        }
    }

    fn render_summary_page(&mut self, ui: &mut Ui) {
        ui.heading("Labeling Summary by Category");
        if ui.button("Reload saved labels").clicked() {
            self.controller.reload_persisted();
        }
        ui.add_space(8.0);
        let summary = self.controller.summary();
        egui::Grid::new("summary_table")
            .striped(true)
            .num_columns(5)
            .show(ui, |ui| {
                for header in ["Category", "True", "False", "Labeled", "Unlabeled"] {
                    ui.label(RichText::new(header).strong());
                }
                ui.end_row();
                for row in summary.table() {
                    ui.label(row.category.as_str());
                    ui.label(row.true_count.to_string());
                    ui.label(row.false_count.to_string());
                    ui.label(row.labeled.to_string());
                    ui.label(row.unlabeled.to_string());
                    ui.end_row();
                }
            });
        if summary.orphaned_records > 0 {
            ui.add_space(8.0);
            ui.colored_label(
                WARNING,
                format!(
                    "{} saved labels refer to comments that are no longer in the corpus.",
                    summary.orphaned_records
                ),
            );
        }
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_navigation(ctx);
        self.render_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match self.ui.page {
            Page::Labeling => self.render_labeling_page(ui),
            Page::Summary => self.render_summary_page(ui),
        });
    }
}

fn render_setup(
    ui: &mut Ui,
    form: &mut SetupForm,
    categories: &CategorySet,
    default_target: NonZeroU32,
) -> Option<Intent> {
    ui.heading("Labeling Setup");
    ui.add_space(8.0);
    let selected = categories
        .iter()
        .nth(form.category_index)
        .map(Category::as_str)
        .unwrap_or_default();
    egui::ComboBox::from_label("Select Category")
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for (index, category) in categories.iter().enumerate() {
                ui.selectable_value(&mut form.category_index, index, category.as_str());
            }
        });
    ui.horizontal(|ui| {
        ui.label("Target True Labels");
        ui.add(egui::DragValue::new(&mut form.target_true).range(1..=1_000_000));
    });
    ui.add_space(8.0);
    if !ui.button("Start Labeling").clicked() {
        return None;
    }
    let category = categories.iter().nth(form.category_index)?.clone();
    let target_true = NonZeroU32::new(form.target_true).unwrap_or(default_target);
    Some(Intent::StartLabeling {
        category,
        target_true,
    })
}

fn render_progress_header(ui: &mut Ui, category: &Category, progress: &Progress) {
    ui.heading(format!("Category: {category}"));
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{}% of target", progress.percent())).strong());
        ui.add_space(16.0);
        ui.label(format!("True: {}", progress.true_count));
        ui.add_space(16.0);
        ui.label(format!("False: {}", progress.false_count));
    });
    ui.add(egui::ProgressBar::new(progress.fraction()).fill(PRIMARY));
}

fn render_comment_card(ui: &mut Ui, text: &str, index: usize, pool_len: usize) -> Option<Intent> {
    let mut intent = None;
    ui.add_space(12.0);
    ui.horizontal(|ui| {
        if ui.add_enabled(index > 0, Button::new("←")).clicked() {
            intent = Some(Intent::BumpIndex(-1));
        }
        Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width((ui.available_width() - 48.0).max(120.0));
            ui.label(RichText::new(text).size(16.0));
        });
        if ui.add_enabled(index + 1 < pool_len, Button::new("→")).clicked() {
            intent = Some(Intent::BumpIndex(1));
        }
    });
    ui.label(format!("Comment {} of {} remaining", index + 1, pool_len));
    intent
}

fn render_label_buttons(ui: &mut Ui) -> Option<Intent> {
    let mut intent = None;
    ui.add_space(12.0);
    ui.horizontal(|ui| {
        let button = |text: &str, fill: Color32| {
            Button::new(RichText::new(text).color(Color32::WHITE).size(18.0))
                .fill(fill)
                .min_size(egui::vec2(160.0, 44.0))
        };
        if ui.add(button("FALSE", DANGER)).clicked() {
            intent = Some(Intent::Submit(Label::False));
        }
        if ui.add(button("TRUE", PRIMARY)).clicked() {
            intent = Some(Intent::Submit(Label::True));
        }
    });
    intent
}

fn render_finish_button(ui: &mut Ui) -> Option<Intent> {
    ui.separator();
    ui.button("Finish").clicked().then_some(Intent::Finish)
}

fn render_finish_modal(ui: &mut Ui, progress: &Progress) -> Option<Intent> {
    ui.heading("Labeling Complete");
    ui.label(format!("True answered: {}", progress.true_count));
    ui.label(format!("False answered: {}", progress.false_count));
    ui.label(format!("Total answered: {}", progress.completed()));
    ui.label(format!("Goal for true labels: {}", progress.target_true));
    ui.add_space(8.0);
    let mut intent = None;
    ui.horizontal(|ui| {
        if ui.button("Home").clicked() {
            intent = Some(Intent::HomeFromModal);
        }
        if ui.button("Cancel").clicked() {
            intent = Some(Intent::CancelFinish);
        }
    });
    intent
}

fn render_congrats(ui: &mut Ui, target_true: NonZeroU32) -> Option<Intent> {
    ui.heading("Congratulations!");
    ui.label(format!("You have reached your goal of {target_true} true labels!"));
    ui.add_space(8.0);
    ui.button("Home").clicked().then_some(Intent::HomeFromModal)
}
