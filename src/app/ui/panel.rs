// src/app/ui/panel.rs
//
// Detail panel for the open session. Content is prebuilt in app/panel.rs;
// this file only lays it out. The panel body is skipped for one frame after
// opening so the strip settles (scroll + selection) before the reveal.

use eframe::egui as eg;

use crate::app::gallery;
use crate::app::prefetch::{ImageFetcher, PREVIEW_WIDTH, THUMB_WIDTH};
use crate::app::trailer::Trailer;
use crate::app::ui::{chip, open_in_browser, paint_image_slot};

const PREVIEW_MAX_W: f32 = 640.0;
const THUMB_SPACING: f32 = 6.0;

impl crate::app::CineRailApp {
    pub(crate) fn ui_render_panel(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        if self.panel.is_none() {
            return;
        }
        if !self.panel_visible {
            self.panel_visible = true;
            ctx.request_repaint();
            return;
        }

        // Take the content out so its gallery can be mutated while the image
        // fetcher (another field) is borrowed.
        let Some(mut content) = self.panel.take() else {
            return;
        };
        let mut close = false;
        let mut arm_trailer = false;

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(&content.title);
                    ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                        if ui.button("✕ Fermer").clicked() {
                            close = true;
                        }
                    });
                });

                if !content.chips.is_empty() {
                    ui.horizontal_wrapped(|ui| {
                        for label in &content.chips {
                            chip(ui, label);
                        }
                    });
                }

                if !content.realisateur.is_empty() {
                    ui.label(format!("De {}", content.realisateur));
                }
                if !content.cast.is_empty() {
                    ui.label(format!("Avec {}", content.cast));
                }
                if !content.info_line.is_empty() {
                    ui.label(eg::RichText::new(&content.info_line).weak());
                }
                if !content.genres.is_empty() {
                    ui.label(eg::RichText::new(&content.genres).italics());
                }

                ui.add_space(8.0);

                // Large preview: the gallery selection when there is one,
                // else the lead backdrop / poster.
                let preview_url = content
                    .gallery
                    .visible()
                    .then(|| content.gallery.current_url())
                    .flatten()
                    .map(str::to_string)
                    .or_else(|| content.preview_url.clone());
                if let Some(url) = preview_url {
                    draw_preview(ui, ctx, &mut self.images, &url);
                }

                if content.gallery.visible() {
                    // Count-keyed layout: the row always splits the preview
                    // width into exactly as many slots as there are images.
                    let avail = ui.available_width().min(PREVIEW_MAX_W);
                    let thumb_w = content.gallery.column_width(avail, THUMB_SPACING);
                    let thumb_h = thumb_w * 9.0 / 16.0;
                    let mut select: Option<usize> = None;
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing = eg::vec2(THUMB_SPACING, THUMB_SPACING);
                        for (i, img) in content.gallery.images.iter().enumerate() {
                            let (rect, resp) = ui.allocate_exact_size(
                                eg::vec2(thumb_w, thumb_h),
                                eg::Sense::click(),
                            );
                            paint_image_slot(
                                ui,
                                ctx,
                                &mut self.images,
                                rect,
                                Some(&img.thumb_url),
                                THUMB_WIDTH,
                            );
                            if i == content.gallery.current {
                                ui.painter().rect_stroke(
                                    rect.shrink(1.0),
                                    2.0,
                                    eg::Stroke::new(2.0, ui.visuals().selection.bg_fill),
                                );
                            }
                            if resp.clicked() {
                                select = Some(i);
                            }
                        }
                    });
                    if let Some(i) = select {
                        content.gallery.select(i);
                    }
                }

                if let Some(trailer) = &content.trailer {
                    ui.add_space(8.0);
                    arm_trailer = render_trailer(
                        ui,
                        ctx,
                        &mut self.images,
                        trailer,
                        self.trailer_armed,
                    );
                }

                if !content.synopsis.is_empty() {
                    ui.add_space(8.0);
                    ui.label(&content.synopsis);
                }

                if let Some(prix) = &content.prix {
                    ui.add_space(4.0);
                    ui.label(eg::RichText::new(prix).strong());
                }

                if let Some(review) = &content.review {
                    ui.add_space(4.0);
                    if ui.link(&review.label).clicked() {
                        open_in_browser(&review.url);
                    }
                }
            });

        self.panel = Some(content);
        if arm_trailer {
            self.trailer_armed = true;
        }
        if close {
            self.hide_panel();
        }
    }
}

fn draw_preview(ui: &mut eg::Ui, ctx: &eg::Context, images: &mut ImageFetcher, url: &str) {
    let avail = ui.available_width().min(PREVIEW_MAX_W);
    // Pick the variant that covers the slot at the current pixel density.
    let need_px = avail * ctx.pixels_per_point();
    let (variant, width) = gallery::preview_for_width(url, need_px);
    match images.texture(ctx, &variant, width) {
        Some(tex) => {
            let size = tex.size_vec2();
            let scale = (avail / size.x).min(1.0);
            ui.image((tex.id(), size * scale));
        }
        None => {
            let (rect, _) = ui.allocate_exact_size(
                eg::vec2(avail, avail * 9.0 / 16.0),
                eg::Sense::hover(),
            );
            paint_image_slot(ui, ctx, images, rect, Some(&variant), width);
        }
    }
}

/// Returns true when a deferred trailer was activated this frame.
fn render_trailer(
    ui: &mut eg::Ui,
    ctx: &eg::Context,
    images: &mut ImageFetcher,
    trailer: &Trailer,
    armed: bool,
) -> bool {
    if !trailer.is_deferred() {
        if ui.button("▶ Bande-annonce").clicked() {
            open_in_browser(trailer.embed_url());
        }
        return false;
    }

    if armed {
        ui.label(eg::RichText::new("Bande-annonce ouverte dans le navigateur.").weak());
        return false;
    }

    // Click-to-load placeholder: provider thumbnail with a play overlay.
    let avail = ui.available_width().min(PREVIEW_MAX_W);
    let (rect, resp) = ui.allocate_exact_size(
        eg::vec2(avail, avail * 9.0 / 16.0),
        eg::Sense::click(),
    );
    paint_image_slot(ui, ctx, images, rect, trailer.thumbnail_url(), PREVIEW_WIDTH);
    ui.painter().text(
        rect.center(),
        eg::Align2::CENTER_CENTER,
        "▶",
        eg::FontId::proportional(48.0),
        eg::Color32::WHITE,
    );
    ui.painter().text(
        eg::pos2(rect.center().x, rect.bottom() - 12.0),
        eg::Align2::CENTER_BOTTOM,
        "Voir la bande-annonce",
        eg::FontId::proportional(14.0),
        eg::Color32::WHITE,
    );

    if resp.clicked() {
        open_in_browser(trailer.embed_url());
        return true;
    }
    false
}
