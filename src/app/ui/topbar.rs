// src/app/ui/topbar.rs
use eframe::egui as eg;

use crate::app::types::Tab;

impl crate::app::CineRailApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui) {
        ui.horizontal(|ui| {
            ui.label(eg::RichText::new("CineRail").strong());
            ui.separator();

            for tab in Tab::ALL {
                if ui.selectable_label(self.tab == tab, tab.label()).clicked() {
                    self.tab = tab;
                }
            }

            ui.separator();

            // Programme-only controls
            if self.tab == Tab::Programme {
                let today = self.today().format("%Y-%m-%d").to_string();
                if ui
                    .add_enabled(!self.sessions.is_empty(), eg::Button::new("Aujourd'hui"))
                    .on_hover_text("Aller à la prochaine séance")
                    .clicked()
                {
                    self.jump_to_date(&today);
                }

                if ui
                    .selectable_label(self.calendar_open, "📅 Calendrier")
                    .clicked()
                {
                    self.calendar_open = !self.calendar_open;
                    if !self.calendar_open {
                        // Re-derive the default month on the next open.
                        self.calendar_cursor.reset();
                    }
                }

                ui.separator();

                ui.label("Affiches:");
                if ui
                    .add(eg::Slider::new(&mut self.poster_height_ui, 120.0..=280.0).suffix(" px"))
                    .changed()
                {
                    self.mark_dirty();
                }
            }
        });
    }
}
