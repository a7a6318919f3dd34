// src/app/ui/calendar.rs
//
// Month-grid popup. Days with at least one screening are clickable; a click
// jumps the strip to that date (or the nearest later one) and closes the
// popup. Geometry helpers live in app/calendar.rs.

use chrono::Datelike;
use eframe::egui as eg;

use crate::app::calendar::{days_in_month, iso_date, leading_blanks, WEEKDAY_HEADER};

const MOIS: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

const CELL: f32 = 34.0;

impl crate::app::CineRailApp {
    pub(crate) fn ui_render_calendar(&mut self, ctx: &eg::Context) {
        let today = self.today();
        let (year, month) = self.calendar_cursor.open(today, &self.index);

        let mut open = true;
        let mut shift: i32 = 0;
        let mut picked: Option<String> = None;

        eg::Window::new("Calendrier")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("◀").clicked() {
                        shift = -1;
                    }
                    ui.with_layout(
                        eg::Layout::centered_and_justified(eg::Direction::LeftToRight),
                        |ui| {
                            ui.label(
                                eg::RichText::new(format!(
                                    "{} {year}",
                                    MOIS[(month - 1) as usize]
                                ))
                                .strong(),
                            );
                        },
                    );
                    if ui.button("▶").clicked() {
                        shift = 1;
                    }
                });
                ui.separator();

                eg::Grid::new("month_grid")
                    .num_columns(7)
                    .min_col_width(CELL)
                    .show(ui, |ui| {
                        for head in WEEKDAY_HEADER {
                            ui.label(eg::RichText::new(head).small().weak());
                        }
                        ui.end_row();

                        let mut col = 0usize;
                        for _ in 0..leading_blanks(year, month) {
                            ui.label("");
                            col += 1;
                        }
                        let today_iso = iso_date(today.year(), today.month(), today.day());
                        for day in 1..=days_in_month(year, month) {
                            let date = iso_date(year, month, day);
                            // Past days never react, even if the 2h grace
                            // period still lists a session on them.
                            let available =
                                self.index.is_available(&date) && date.as_str() >= today_iso.as_str();
                            let is_today =
                                chrono::NaiveDate::from_ymd_opt(year, month, day) == Some(today);

                            let text = if is_today {
                                eg::RichText::new(day.to_string()).strong().underline()
                            } else if available {
                                eg::RichText::new(day.to_string()).strong()
                            } else {
                                eg::RichText::new(day.to_string()).weak()
                            };
                            if ui
                                .add_enabled(available, eg::Button::new(text).min_size(eg::vec2(CELL, CELL)))
                                .clicked()
                            {
                                picked = Some(date);
                            }

                            col += 1;
                            if col % 7 == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });

        if shift != 0 {
            self.calendar_cursor.shift(shift);
        }
        if let Some(date) = picked {
            self.jump_to_date(&date);
        }
        if !open {
            self.calendar_open = false;
            self.calendar_cursor.reset();
        }
    }
}
