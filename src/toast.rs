use std::time::{Duration, Instant};

use crate::notice::{Notice, NotificationSink, Position, Severity};

const TOAST_WIDTH: f32 = 300.0;
const MARGIN: f32 = 12.0;

struct ActiveToast {
    notice: Notice,
    expires: Instant,
}

/// On-screen stack of notices, one column per corner, oldest on top.
#[derive(Default)]
pub struct Toasts {
    active: Vec<ActiveToast>,
}

impl NotificationSink for Toasts {
    fn notify(&mut self, notice: Notice) {
        self.push_at(notice, Instant::now());
    }
}

impl Toasts {
    fn push_at(&mut self, notice: Notice, now: Instant) {
        tracing::debug!(severity = ?notice.severity, message = %notice.message, "notice");
        let expires = now + notice.duration;
        self.active.push(ActiveToast { notice, expires });
    }

    /// Drop expired notices; returns the time until the next one expires.
    fn prune(&mut self, now: Instant) -> Option<Duration> {
        self.active.retain(|t| t.expires > now);
        self.active.iter().map(|t| t.expires - now).min()
    }

    fn at(&self, position: Position) -> impl Iterator<Item = (usize, &ActiveToast)> {
        self.active
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.notice.position == position)
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(next_expiry) = self.prune(Instant::now()) else {
            return;
        };
        ctx.request_repaint_after(next_expiry);

        let mut dismissed = Vec::new();
        for (position, anchor, offset) in [
            (Position::TopRight, egui::Align2::RIGHT_TOP, egui::vec2(-MARGIN, MARGIN)),
            (Position::BottomRight, egui::Align2::RIGHT_BOTTOM, egui::vec2(-MARGIN, -MARGIN)),
        ] {
            if self.at(position).next().is_none() {
                continue;
            }
            egui::Area::new(egui::Id::new(("toasts", position)))
                .anchor(anchor, offset)
                .order(egui::Order::Tooltip)
                .interactable(true)
                .show(ctx, |ui| {
                    ui.set_width(TOAST_WIDTH);
                    for (idx, toast) in self.at(position) {
                        if show_toast(ui, &toast.notice) {
                            dismissed.push(idx);
                        }
                    }
                });
        }

        dismissed.sort_unstable();
        for idx in dismissed.into_iter().rev() {
            self.active.remove(idx);
        }
    }
}

fn accent(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::Success => egui::Color32::from_rgb(34, 160, 90),
        Severity::Error => egui::Color32::from_rgb(210, 60, 60),
        Severity::Info => egui::Color32::from_rgb(52, 130, 220),
        Severity::Warning => egui::Color32::from_rgb(230, 160, 30),
    }
}

fn icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "✔",
        Severity::Error => "✖",
        Severity::Info => "ℹ",
        Severity::Warning => "⚠",
    }
}

/// Returns `true` when the toast was clicked away.
fn show_toast(ui: &mut egui::Ui, notice: &Notice) -> bool {
    let color = accent(notice.severity);
    let resp = egui::Frame::popup(ui.style())
        .stroke(egui::Stroke::new(1.0, color))
        .show(ui, |ui| {
            ui.set_width(TOAST_WIDTH - 16.0);
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(icon(notice.severity)).color(color).strong());
                ui.label(&notice.message);
            });
        })
        .response
        .interact(egui::Sense::click());
    ui.add_space(6.0);
    resp.clicked()
}
