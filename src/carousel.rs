use std::time::{Duration, Instant};

use crate::config::Timings;

const FRAME: Duration = Duration::from_millis(16);
const DOT_RADIUS: f32 = 4.0;
const ARROW_SIZE: f32 = 36.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideEvent {
    BeforeChange { current: usize, next: usize },
    AfterChange { current: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct CarouselSettings {
    pub autoplay_interval: Duration,
    pub transition: Duration,
    pub pause_on_hover: bool,
}

impl From<Timings> for CarouselSettings {
    fn from(timings: Timings) -> Self {
        Self {
            autoplay_interval: timings.autoplay_interval,
            transition: timings.transition,
            pause_on_hover: true,
        }
    }
}

struct Fade {
    from: usize,
    started: Instant,
}

/// Fading slide display with autoplay.
///
/// Autoplay and wrap-around are only active with more than one slide. Every
/// index change emits `BeforeChange` right away and `AfterChange` once the
/// fade has finished; callers drain them with [`Carousel::take_events`].
pub struct Carousel {
    settings: CarouselSettings,
    index: usize,
    fade: Option<Fade>,
    last_change: Instant,
    hovered: bool,
    drag: egui::Vec2,
    events: Vec<SlideEvent>,
}

#[derive(Debug, Default)]
pub struct CarouselResponse {
    /// The visible slide was clicked.
    pub clicked: Option<usize>,
    /// Total drag when a drag gesture ended.
    pub swipe: Option<egui::Vec2>,
}

impl Carousel {
    pub fn new(settings: CarouselSettings, now: Instant) -> Self {
        Self {
            settings,
            index: 0,
            fade: None,
            last_change: now,
            hovered: false,
            drag: egui::Vec2::ZERO,
            events: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn go_to(&mut self, target: usize, len: usize, now: Instant) {
        let Some(last) = len.checked_sub(1) else {
            return;
        };
        let target = target.min(last);
        if target == self.index {
            return;
        }
        self.events.push(SlideEvent::BeforeChange {
            current: self.index,
            next: target,
        });
        self.fade = Some(Fade {
            from: self.index,
            started: now,
        });
        self.index = target;
        self.last_change = now;
    }

    pub fn next(&mut self, len: usize, now: Instant) {
        let target = if self.index + 1 < len {
            self.index + 1
        } else if len > 1 {
            0
        } else {
            return;
        };
        self.go_to(target, len, now);
    }

    pub fn previous(&mut self, len: usize, now: Instant) {
        let target = if self.index > 0 {
            self.index - 1
        } else if len > 1 {
            len - 1
        } else {
            return;
        };
        self.go_to(target, len, now);
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Advance fades and autoplay. Returns how soon the caller should call
    /// again, if at all.
    pub fn tick(&mut self, len: usize, now: Instant) -> Option<Duration> {
        let Some(last) = len.checked_sub(1) else {
            self.index = 0;
            self.fade = None;
            return None;
        };
        if self.index > last {
            self.index = last;
            self.fade = None;
            self.events.push(SlideEvent::AfterChange { current: last });
        }

        if let Some(fade) = &self.fade {
            if now.saturating_duration_since(fade.started) < self.settings.transition {
                return Some(FRAME);
            }
            self.fade = None;
            self.events.push(SlideEvent::AfterChange {
                current: self.index,
            });
        }

        if len < 2 {
            return None;
        }
        if self.hovered && self.settings.pause_on_hover {
            self.last_change = now;
            return Some(self.settings.autoplay_interval);
        }
        let idle = now.saturating_duration_since(self.last_change);
        if idle >= self.settings.autoplay_interval {
            self.next(len, now);
            Some(FRAME)
        } else {
            Some(self.settings.autoplay_interval - idle)
        }
    }

    pub fn take_events(&mut self) -> Vec<SlideEvent> {
        std::mem::take(&mut self.events)
    }

    /// Outgoing slide and eased progress of the running fade.
    fn fade_progress(&self, now: Instant) -> Option<(usize, f32)> {
        let fade = self.fade.as_ref()?;
        let total = self.settings.transition.as_secs_f32().max(f32::EPSILON);
        let t = (now.saturating_duration_since(fade.started).as_secs_f32() / total).min(1.0);
        Some((fade.from, ease_in_out(t)))
    }

    /// Draw the slides. `paint_slide` paints slide `index` into a rect with
    /// the given opacity.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        len: usize,
        height: f32,
        mut paint_slide: impl FnMut(&egui::Painter, egui::Rect, usize, f32),
    ) -> CarouselResponse {
        let mut out = CarouselResponse::default();
        let now = Instant::now();
        let (rect, resp) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), height),
            egui::Sense::click_and_drag(),
        );
        self.set_hovered(resp.hovered());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 8.0, ui.visuals().extreme_bg_color);
        if len == 0 {
            return out;
        }

        match self.fade_progress(now) {
            Some((from, t)) if from < len => {
                paint_slide(&painter, rect, from, 1.0 - t);
                paint_slide(&painter, rect, self.index, t);
            }
            _ => paint_slide(&painter, rect, self.index.min(len - 1), 1.0),
        }

        if resp.dragged() {
            self.drag += resp.drag_delta();
        }
        if resp.drag_stopped() {
            out.swipe = Some(std::mem::replace(&mut self.drag, egui::Vec2::ZERO));
        } else if resp.clicked() {
            out.clicked = Some(self.index);
        }

        if len > 1 {
            let arrow = egui::vec2(ARROW_SIZE, ARROW_SIZE);
            let prev_rect = egui::Rect::from_center_size(
                egui::pos2(rect.left() + 16.0 + ARROW_SIZE / 2.0, rect.center().y),
                arrow,
            );
            let next_rect = egui::Rect::from_center_size(
                egui::pos2(rect.right() - 16.0 - ARROW_SIZE / 2.0, rect.center().y),
                arrow,
            );
            if ui
                .put(prev_rect, egui::Button::new("◀").corner_radius(ARROW_SIZE))
                .on_hover_text("Previous image")
                .clicked()
            {
                self.previous(len, now);
            }
            if ui
                .put(next_rect, egui::Button::new("▶").corner_radius(ARROW_SIZE))
                .on_hover_text("Next image")
                .clicked()
            {
                self.next(len, now);
            }
            self.show_dots(ui, rect, len, now);
        }
        out
    }

    fn show_dots(&mut self, ui: &mut egui::Ui, rect: egui::Rect, len: usize, now: Instant) {
        let spacing = DOT_RADIUS * 4.0;
        let width = spacing * (len as f32 - 1.0);
        let start = egui::pos2(rect.center().x - width / 2.0, rect.bottom() - 14.0);
        let base_id = ui.id().with("carousel_dots");
        for i in 0..len {
            let center = start + egui::vec2(spacing * i as f32, 0.0);
            let hit = egui::Rect::from_center_size(center, egui::vec2(spacing, spacing));
            let resp = ui.interact(hit, base_id.with(i), egui::Sense::click());
            let color = if i == self.index {
                egui::Color32::WHITE
            } else {
                egui::Color32::from_white_alpha(90)
            };
            ui.painter().circle_filled(center, DOT_RADIUS, color);
            if resp.clicked() {
                self.go_to(i, len, now);
            }
        }
    }
}

/// Symmetric cubic ease, close to `cubic-bezier(0.7, 0, 0.3, 1)`.
fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CarouselSettings {
        CarouselSettings {
            autoplay_interval: Duration::from_millis(5000),
            transition: Duration::from_millis(700),
            pause_on_hover: true,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn go_to_emits_before_then_after() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);

        c.go_to(2, 3, t0);
        assert_eq!(
            c.take_events(),
            [SlideEvent::BeforeChange {
                current: 0,
                next: 2
            }]
        );
        assert_eq!(c.index(), 2);

        c.tick(3, t0 + ms(100));
        assert!(c.take_events().is_empty());

        c.tick(3, t0 + ms(700));
        assert_eq!(c.take_events(), [SlideEvent::AfterChange { current: 2 }]);
    }

    #[test]
    fn go_to_current_slide_is_a_no_op() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);
        c.go_to(0, 3, t0);
        assert!(c.take_events().is_empty());
    }

    #[test]
    fn go_to_running_target_lets_the_fade_finish() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);
        c.go_to(1, 3, t0);
        c.take_events();

        c.go_to(1, 3, t0 + ms(300));
        assert!(c.take_events().is_empty());

        c.tick(3, t0 + ms(700));
        assert_eq!(c.take_events(), [SlideEvent::AfterChange { current: 1 }]);
    }

    #[test]
    fn autoplay_advances_after_interval() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);

        c.tick(3, t0 + ms(4999));
        assert_eq!(c.index(), 0);

        c.tick(3, t0 + ms(5000));
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn next_wraps_with_more_than_one_slide() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);
        c.go_to(2, 3, t0);

        c.next(3, t0);
        assert_eq!(c.index(), 0);

        c.previous(3, t0);
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn single_slide_neither_loops_nor_autoplays() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);

        c.next(1, t0);
        c.previous(1, t0);
        assert_eq!(c.tick(1, t0 + ms(60_000)), None);

        assert_eq!(c.index(), 0);
        assert!(c.take_events().is_empty());
    }

    #[test]
    fn hover_pauses_autoplay() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);
        c.set_hovered(true);

        c.tick(3, t0 + ms(9000));
        assert_eq!(c.index(), 0);

        c.set_hovered(false);
        c.tick(3, t0 + ms(9001));
        assert_eq!(c.index(), 0);
        c.tick(3, t0 + ms(14_000));
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn shrinking_collection_clamps_index() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);
        c.go_to(4, 5, t0);
        c.take_events();

        c.tick(2, t0 + ms(10));

        assert_eq!(c.index(), 1);
        assert_eq!(c.take_events(), [SlideEvent::AfterChange { current: 1 }]);
    }

    #[test]
    fn retarget_during_fade_reports_new_target() {
        let t0 = Instant::now();
        let mut c = Carousel::new(settings(), t0);
        c.go_to(1, 4, t0);
        c.go_to(3, 4, t0 + ms(200));

        assert_eq!(
            c.take_events(),
            [
                SlideEvent::BeforeChange {
                    current: 0,
                    next: 1
                },
                SlideEvent::BeforeChange {
                    current: 1,
                    next: 3
                },
            ]
        );
        c.tick(4, t0 + ms(900));
        assert_eq!(c.take_events(), [SlideEvent::AfterChange { current: 3 }]);
    }

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
    }
}
