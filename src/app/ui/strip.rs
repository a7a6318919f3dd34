// src/app/ui/strip.rs
//
// Programme tab: the horizontal session strip on top, the detail panel in
// the remaining space. One column per eligible session, in feed order.

use eframe::egui as eg;

use crate::app::prefetch::THUMB_WIDTH;
use crate::app::timefmt;
use crate::app::ui::{paint_image_slot, POSTER_RATIO};

const COLUMN_SPACING: f32 = 6.0;
const CAP_HEIGHT: f32 = 40.0;

impl crate::app::CineRailApp {
    pub(crate) fn ui_render_programme(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        if let Some(err) = self.programme_unavailable() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("Programme indisponible");
                ui.label(eg::RichText::new(err.to_string()).weak());
            });
            return;
        }
        if self.sessions.is_empty() && self.panel.is_none() && self.selected.is_none() {
            // Either still loading or a genuinely empty programme.
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                if self.had_programme() {
                    ui.label("Aucune séance à venir.");
                } else {
                    ui.spinner();
                    ui.label("Chargement du programme…");
                }
            });
            return;
        }

        self.ui_render_strip(ui, ctx);
        ui.separator();
        self.ui_render_panel(ui, ctx);
    }

    // ---------- SESSION STRIP ----------
    fn ui_render_strip(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        // Step arrows: move the selection (and therefore the scroll target)
        // one session at a time.
        ui.horizontal(|ui| {
            let at = self.selected;
            let last = self.sessions.len().saturating_sub(1);
            if ui
                .add_enabled(at.is_some_and(|i| i > 0), eg::Button::new("◀").small())
                .clicked()
            {
                if let Some(i) = at {
                    self.open_session(i - 1);
                }
            }
            if ui
                .add_enabled(at.is_some_and(|i| i < last), eg::Button::new("▶").small())
                .clicked()
            {
                if let Some(i) = at {
                    self.open_session(i + 1);
                }
            }
        });

        let poster_h = self.poster_height_ui;
        let card_w = poster_h / POSTER_RATIO;
        let card_h = CAP_HEIGHT + 18.0 + poster_h;

        let scroll_target = self.scroll_to.take();
        let mut clicked: Option<usize> = None;

        eg::ScrollArea::horizontal()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing = eg::vec2(COLUMN_SPACING, 0.0);

                    for idx in 0..self.sessions.len() {
                        let (rect, resp) = ui
                            .allocate_exact_size(eg::vec2(card_w, card_h), eg::Sense::click());
                        if resp.clicked() {
                            clicked = Some(idx);
                        }
                        if scroll_target == Some(idx) {
                            resp.scroll_to_me(Some(eg::Align::Center));
                        }

                        let session = &self.sessions[idx];
                        let parts = timefmt::day_parts(&session.date);

                        // Day cap: abbreviation + DD/MM.
                        let painter = ui.painter();
                        painter.text(
                            eg::pos2(rect.center().x, rect.top() + 4.0),
                            eg::Align2::CENTER_TOP,
                            &parts.abbr,
                            eg::FontId::proportional(15.0),
                            ui.visuals().strong_text_color(),
                        );
                        painter.text(
                            eg::pos2(rect.center().x, rect.top() + 22.0),
                            eg::Align2::CENTER_TOP,
                            &parts.date,
                            eg::FontId::proportional(13.0),
                            ui.visuals().text_color(),
                        );
                        painter.text(
                            eg::pos2(rect.center().x, rect.top() + CAP_HEIGHT),
                            eg::Align2::CENTER_TOP,
                            &session.heure,
                            eg::FontId::monospace(13.0),
                            ui.visuals().text_color(),
                        );

                        let poster_rect = eg::Rect::from_min_size(
                            eg::pos2(rect.left(), rect.top() + CAP_HEIGHT + 18.0),
                            eg::vec2(card_w, poster_h),
                        );
                        let url = self.sessions[idx].affiche_url.clone();
                        paint_image_slot(
                            ui,
                            ctx,
                            &mut self.images,
                            poster_rect,
                            url.as_deref(),
                            THUMB_WIDTH,
                        );

                        if self.selected == Some(idx) {
                            ui.painter().rect_stroke(
                                rect.shrink(1.0),
                                4.0,
                                eg::Stroke::new(2.0, ui.visuals().selection.bg_fill),
                            );
                        }
                    }
                });
            });

        if let Some(idx) = clicked {
            self.open_session(idx);
            // A direct click should not scroll the strip out from under the
            // pointer.
            self.scroll_to = None;
        }
    }
}
