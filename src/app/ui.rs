// src/app/ui.rs
//
// Rendering entry points, split per surface. Each submodule adds
// `ui_render_*` methods onto CineRailApp; shared drawing helpers live here.

use eframe::egui as eg;
use tracing::warn;

use crate::app::prefetch::ImageFetcher;

mod calendar;
mod panel;
mod strip;
mod tabs;
mod topbar;

/// Poster aspect (height / width), shared by the strip and the upcoming grid.
pub(crate) const POSTER_RATIO: f32 = 1.5;

/// Request `url` at the given width bucket and paint it into `rect`: the
/// texture once ready, a flat placeholder while in flight, and a crossed-out
/// placeholder once the download has permanently failed.
pub(crate) fn paint_image_slot(
    ui: &eg::Ui,
    ctx: &eg::Context,
    images: &mut ImageFetcher,
    rect: eg::Rect,
    url: Option<&str>,
    max_width: u32,
) {
    if let Some(tex) = url.and_then(|u| images.texture(ctx, u, max_width)) {
        ui.painter().image(
            tex.id(),
            rect,
            eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
            eg::Color32::WHITE,
        );
        return;
    }
    ui.painter()
        .rect_filled(rect, eg::Rounding::same(4.0), eg::Color32::from_gray(40));
    if url.is_some_and(|u| images.failed(u, max_width)) {
        ui.painter().text(
            rect.center(),
            eg::Align2::CENTER_CENTER,
            "✕",
            eg::FontId::proportional(16.0),
            eg::Color32::from_gray(110),
        );
    }
}

/// Hand a URL to the system browser (PDFs, review pages, trailer embeds).
pub(crate) fn open_in_browser(url: &str) {
    if let Err(e) = webbrowser::open(url) {
        warn!("failed to open {url}: {e}");
    }
}

/// Small framed badge used for the special-session chips.
pub(crate) fn chip(ui: &mut eg::Ui, label: &str) {
    let visuals = ui.visuals().clone();
    eg::Frame::none()
        .fill(visuals.faint_bg_color)
        .stroke(eg::Stroke::new(1.0, visuals.weak_text_color()))
        .rounding(eg::Rounding::same(8.0))
        .inner_margin(eg::Margin::symmetric(8.0, 3.0))
        .show(ui, |ui| {
            ui.label(eg::RichText::new(label).small());
        });
}
