// src/app/ui/tabs.rs
//
// The three auxiliary tabs: printed-programme PDFs (current + next issue),
// the upcoming-releases poster grid, and the archive of past issues. All
// three share the lazy AuxFeed states rendered by `feed_gate`.

use eframe::egui as eg;

use crate::app::prefetch::THUMB_WIDTH;
use crate::app::program::{self, ProgramBundle};
use crate::app::types::AuxFeed;
use crate::app::ui::{open_in_browser, paint_image_slot, POSTER_RATIO};

const UPCOMING_SPACING: f32 = 10.0;

/// Spinner / error for a feed slot; Some(list) once loaded.
fn feed_gate<'a, T>(ui: &mut eg::Ui, feed: &'a AuxFeed<T>, what: &str) -> Option<&'a [T]> {
    match feed {
        AuxFeed::Loaded(list) => Some(list),
        AuxFeed::NotRequested | AuxFeed::Loading => {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
                ui.label(format!("Chargement : {what}…"));
            });
            None
        }
        AuxFeed::Unavailable(err) => {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading(format!("{what} indisponible"));
                ui.label(eg::RichText::new(err).weak());
            });
            None
        }
    }
}

fn issue_title(bundle: &ProgramBundle) -> String {
    match bundle.numero.as_deref() {
        Some(n) => format!("Programme N°{n}"),
        None => "Programme".to_string(),
    }
}

fn validity_line(bundle: &ProgramBundle) -> Option<String> {
    match (bundle.debut.as_deref(), bundle.fin.as_deref()) {
        (Some(a), Some(b)) => Some(format!("du {a} au {b}")),
        _ => None,
    }
}

impl crate::app::CineRailApp {
    /// Absolute URL for a bundle's PDF file (the feed may ship either form).
    fn pdf_url(&self, fichier: &str) -> String {
        if fichier.starts_with("http://") || fichier.starts_with("https://") {
            fichier.to_string()
        } else {
            self.cfg.feed_url(fichier)
        }
    }

    fn issue_block(&self, ui: &mut eg::Ui, heading: &str, bundle: &ProgramBundle) {
        ui.group(|ui| {
            ui.label(eg::RichText::new(heading).small().weak());
            ui.heading(issue_title(bundle));
            if let Some(line) = validity_line(bundle) {
                ui.label(line);
            }
            match bundle.fichier.as_deref() {
                Some(fichier) => {
                    if ui.button("Ouvrir le PDF").clicked() {
                        open_in_browser(&self.pdf_url(fichier));
                    }
                }
                None => {
                    ui.label(eg::RichText::new("PDF manquant").weak());
                }
            }
        });
    }

    // ---------- PROGRAMME PDF ----------
    pub(crate) fn ui_render_pdf_tab(&mut self, ui: &mut eg::Ui) {
        let today = self.today();
        let Some(bundles) = feed_gate(ui, &self.bundles, "Programme PDF") else {
            return;
        };

        let current = program::current_issue(bundles, today);
        let next = program::next_issue(bundles, today);

        ui.add_space(8.0);
        match current {
            Some(i) => self.issue_block(ui, "En ce moment", &bundles[i]),
            None => {
                ui.label("Aucun programme en cours de validité.");
            }
        }
        if let Some(i) = next {
            ui.add_space(8.0);
            self.issue_block(ui, "À venir", &bundles[i]);
        }
    }

    // ---------- PROCHAINEMENT ----------
    pub(crate) fn ui_render_upcoming_tab(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let cards: Vec<(Option<String>, Option<String>)> = {
            let Some(cards) = feed_gate(ui, &self.upcoming, "Prochainement") else {
                return;
            };
            cards
                .iter()
                .map(|c| (c.poster.clone(), c.alt.clone()))
                .collect()
        };
        if cards.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label("Rien à annoncer pour le moment.");
            });
            return;
        }

        let poster_h = self.poster_height_ui.max(200.0);
        let poster_w = poster_h / POSTER_RATIO;

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing =
                        eg::vec2(UPCOMING_SPACING, UPCOMING_SPACING);
                    for (poster, alt) in &cards {
                        let Some(url) = poster.as_deref().map(str::trim).filter(|u| !u.is_empty())
                        else {
                            continue;
                        };
                        let (rect, resp) = ui.allocate_exact_size(
                            eg::vec2(poster_w, poster_h),
                            eg::Sense::hover(),
                        );
                        paint_image_slot(ui, ctx, &mut self.images, rect, Some(url), THUMB_WIDTH);
                        if let Some(alt) = alt.as_deref().filter(|a| !a.trim().is_empty()) {
                            resp.on_hover_text(alt);
                        }
                    }
                });
            });
    }

    // ---------- ARCHIVES ----------
    pub(crate) fn ui_render_archives_tab(&mut self, ui: &mut eg::Ui) {
        let today = self.today();
        let Some(bundles) = feed_gate(ui, &self.bundles, "Archives") else {
            return;
        };

        let past = program::archive_issues(bundles, today);
        if past.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label("Aucune archive.");
            });
            return;
        }

        let rows: Vec<ProgramBundle> = past.iter().map(|&i| bundles[i].clone()).collect();
        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for bundle in &rows {
                    ui.horizontal(|ui| {
                        ui.label(eg::RichText::new(issue_title(bundle)).strong());
                        if let Some(line) = validity_line(bundle) {
                            ui.label(eg::RichText::new(line).weak());
                        }
                        if let Some(fichier) = bundle.fichier.as_deref() {
                            if ui.small_button("Ouvrir").clicked() {
                                open_in_browser(&self.pdf_url(fichier));
                            }
                        }
                    });
                    ui.separator();
                }
            });
    }
}
