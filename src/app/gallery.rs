// src/app/gallery.rs
//
// Backdrop gallery for the detail panel: poster exclusion, dedup, cap, and
// TMDB-style width-token rewriting for thumbnails and the large preview.

pub const GALLERY_CAP: usize = 5;

/// Width token carried by feed image URLs (`…/w780/abc.jpg`); swapping it
/// requests a differently-sized variant of the same asset.
const SOURCE_WIDTH_TOKEN: &str = "/w780/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryImage {
    /// Full-size source as shipped by the feed.
    pub url: String,
    /// Downscaled variant used for the thumbnail row.
    pub thumb_url: String,
}

/// Thumbnail strip under the large preview. Suppressed below two entries;
/// otherwise the layout variant is keyed by the exact count (2..=5 columns).
#[derive(Clone, Debug, Default)]
pub struct Gallery {
    pub images: Vec<GalleryImage>,
    /// Index of the image currently shown in the large preview.
    pub current: usize,
}

impl Gallery {
    pub fn visible(&self) -> bool {
        self.images.len() >= 2
    }

    pub fn columns(&self) -> usize {
        self.images.len().clamp(2, GALLERY_CAP)
    }

    pub fn select(&mut self, idx: usize) {
        if idx < self.images.len() {
            self.current = idx;
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.images.get(self.current).map(|img| img.url.as_str())
    }

    /// Thumbnail width for the count-keyed layout: the row splits the
    /// available width into exactly `columns()` slots.
    pub fn column_width(&self, avail: f32, spacing: f32) -> f32 {
        let cols = self.columns() as f32;
        ((avail - spacing * (cols - 1.0)) / cols).max(24.0)
    }
}

/// Identity key for "is this the same image": trailing filename segment,
/// query string stripped, case-insensitive.
pub fn image_key(url: &str) -> String {
    let no_query = url.split(['?', '#']).next().unwrap_or(url);
    no_query
        .rsplit('/')
        .next()
        .unwrap_or(no_query)
        .to_ascii_lowercase()
}

/// Substitute the width token (e.g. "w300", "w1280") into a feed image URL.
/// URLs without the token come back unchanged.
pub fn width_variant(url: &str, width: &str) -> String {
    url.replace(SOURCE_WIDTH_TOKEN, &format!("/{width}/"))
}

/// Width candidates for the large preview, smallest first, mirroring the
/// source-set the web embed would declare.
pub fn preview_variants(url: &str) -> [(String, u32); 3] {
    [
        (width_variant(url, "w300"), 300),
        (url.to_string(), 780),
        (width_variant(url, "w1280"), 1280),
    ]
}

/// Smallest preview variant that still covers `need_px` device pixels,
/// falling back to the largest one.
pub fn preview_for_width(url: &str, need_px: f32) -> (String, u32) {
    let variants = preview_variants(url);
    variants
        .iter()
        .find(|(_, w)| *w as f32 >= need_px)
        .cloned()
        .unwrap_or_else(|| variants[variants.len() - 1].clone())
}

/// Build the gallery: drop backdrops matching the poster by filename, dedup
/// the rest by raw URL (first occurrence kept, order preserved), cap at 5.
pub fn build_gallery<'a, I>(poster_url: Option<&str>, backdrops: I) -> Gallery
where
    I: IntoIterator<Item = &'a str>,
{
    let poster_key = poster_url
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(image_key);

    let mut images: Vec<GalleryImage> = Vec::new();
    for url in backdrops {
        let url = url.trim();
        if url.is_empty() || images.len() >= GALLERY_CAP {
            continue;
        }
        if poster_key.as_deref() == Some(image_key(url).as_str()) {
            continue;
        }
        if images.iter().any(|img| img.url == url) {
            continue;
        }
        images.push(GalleryImage {
            url: url.to_string(),
            thumb_url: width_variant(url, "w300"),
        });
    }

    Gallery { images, current: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(gallery: &Gallery) -> Vec<&str> {
        gallery.images.iter().map(|i| i.url.as_str()).collect()
    }

    #[test]
    fn poster_excluded_and_duplicates_collapsed() {
        let gallery = build_gallery(
            Some("a/poster.jpg"),
            ["a/poster.jpg", "b/x.jpg", "b/x.jpg", "c/y.jpg"],
        );
        assert_eq!(urls(&gallery), vec!["b/x.jpg", "c/y.jpg"]);
    }

    #[test]
    fn poster_match_ignores_query_and_case() {
        let gallery = build_gallery(
            Some("https://cdn/w780/Poster.JPG?sig=1"),
            ["https://other/w780/poster.jpg", "https://cdn/w780/b.jpg"],
        );
        assert_eq!(urls(&gallery), vec!["https://cdn/w780/b.jpg"]);
    }

    #[test]
    fn capped_at_five_preserving_order() {
        let backdrops: Vec<String> = (0..8).map(|i| format!("https://img/{i}.jpg")).collect();
        let gallery = build_gallery(None, backdrops.iter().map(String::as_str));
        assert_eq!(gallery.images.len(), 5);
        assert_eq!(gallery.images[0].url, "https://img/0.jpg");
        assert_eq!(gallery.images[4].url, "https://img/4.jpg");
    }

    #[test]
    fn suppressed_below_two_entries() {
        assert!(!build_gallery(None, ["https://img/only.jpg"]).visible());
        assert!(!build_gallery(None, []).visible());
        assert!(build_gallery(None, ["https://img/a.jpg", "https://img/b.jpg"]).visible());
    }

    #[test]
    fn width_token_rewriting() {
        assert_eq!(
            width_variant("https://cdn/t/p/w780/abc.jpg", "w300"),
            "https://cdn/t/p/w300/abc.jpg"
        );
        // No token -> unchanged.
        assert_eq!(width_variant("https://cdn/raw/abc.jpg", "w300"), "https://cdn/raw/abc.jpg");

        let variants = preview_variants("https://cdn/t/p/w780/abc.jpg");
        assert_eq!(variants[0].0, "https://cdn/t/p/w300/abc.jpg");
        assert_eq!(variants[2].0, "https://cdn/t/p/w1280/abc.jpg");
    }

    #[test]
    fn column_width_splits_by_exact_count() {
        let three = build_gallery(None, ["https://i/a.jpg", "https://i/b.jpg", "https://i/c.jpg"]);
        assert_eq!(three.columns(), 3);
        assert_eq!(three.column_width(320.0, 10.0), 100.0);

        let two = build_gallery(None, ["https://i/a.jpg", "https://i/b.jpg"]);
        assert_eq!(two.column_width(320.0, 10.0), 155.0);
    }

    #[test]
    fn preview_variant_picked_by_needed_width() {
        let url = "https://cdn/t/p/w780/abc.jpg";
        assert_eq!(preview_for_width(url, 250.0).1, 300);
        assert!(preview_for_width(url, 250.0).0.contains("/w300/"));
        assert_eq!(preview_for_width(url, 600.0).1, 780);
        assert_eq!(preview_for_width(url, 1000.0).1, 1280);
        // Wider than the largest variant: take what there is.
        assert_eq!(preview_for_width(url, 3000.0).1, 1280);
    }

    #[test]
    fn selection_moves_the_preview() {
        let mut gallery = build_gallery(None, ["https://img/a.jpg", "https://img/b.jpg"]);
        assert_eq!(gallery.current_url(), Some("https://img/a.jpg"));
        gallery.select(1);
        assert_eq!(gallery.current_url(), Some("https://img/b.jpg"));
        gallery.select(9); // out of range is a no-op
        assert_eq!(gallery.current, 1);
    }
}
