// src/app/panel.rs
//
// Builds everything the detail panel shows for one session: text lines,
// chips, review link, gallery and trailer descriptor. Pure data; rendering
// is in ui/panel.rs. Re-opening a session rebuilds the whole content (no
// partial patching).

use crate::app::gallery::{self, Gallery};
use crate::app::pipeline::Session;
use crate::app::timefmt;
use crate::app::trailer::{self, Trailer};

/// Keyword -> chip label table for the free-text `categorie`/`commentaire`
/// fields. Substring match, case-insensitive, first match wins per label.
const CHIP_RULES: &[(&str, &str)] = &[
    ("ciné goûter", "Ciné Goûter"),
    ("cine gouter", "Ciné Goûter"),
    ("ciné jeunes", "Ciné Jeunes"),
    ("cine jeunes", "Ciné Jeunes"),
    ("ephad", "Séance EPHAD HANDI"),
    ("handi", "Séance EPHAD HANDI"),
    ("ciné documentaire", "Ciné Documentaire"),
    ("cine documentaire", "Ciné Documentaire"),
    ("ciné club", "Ciné Club"),
    ("cine club", "Ciné Club"),
    ("ciné discussion", "Ciné Discussion"),
    ("cine discussion", "Ciné Discussion"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewLink {
    pub label: String,
    pub url: String,
}

/// Everything the panel renders for the currently open session.
#[derive(Clone, Debug, Default)]
pub struct PanelContent {
    pub title: String,
    pub realisateur: String,
    pub cast: String,
    /// Slash-joined version / year / country / duration line.
    pub info_line: String,
    pub genres: String,
    pub synopsis: String,
    pub review: Option<ReviewLink>,
    pub chips: Vec<String>,
    pub prix: Option<String>,
    /// Large preview image: lead backdrop, else poster.
    pub preview_url: Option<String>,
    pub gallery: Gallery,
    pub trailer: Option<Trailer>,
}

/// Chip labels matched in the category + comment free text.
pub fn special_chips(categorie: Option<&str>, commentaire: Option<&str>) -> Vec<&'static str> {
    let haystack = format!(
        "{} {}",
        categorie.unwrap_or_default(),
        commentaire.unwrap_or_default()
    )
    .to_lowercase();

    let mut labels: Vec<&'static str> = Vec::new();
    for (needle, label) in CHIP_RULES {
        if haystack.contains(needle) && !labels.contains(label) {
            labels.push(label);
        }
    }
    labels
}

fn info_line(session: &Session) -> String {
    let mut parts: Vec<String> = Vec::new();
    for field in [&session.version, &session.annee, &session.pays] {
        if let Some(v) = field.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            parts.push(v.to_string());
        }
    }
    if let Some(min) = session.duree_min {
        parts.push(timefmt::format_duration(min));
    }
    parts.join(" / ")
}

fn non_blank(field: Option<&str>) -> Option<String> {
    field.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn build_panel(session: &Session) -> PanelContent {
    let title = non_blank(session.titre.as_deref()).unwrap_or_else(|| "Titre inconnu".into());

    let review = non_blank(session.allocine_url.as_deref()).map(|url| ReviewLink {
        label: format!("\u{ab}{title}\u{bb} sur Allociné"),
        url,
    });

    let mut chips: Vec<String> = special_chips(
        session.categorie.as_deref(),
        session.commentaire.as_deref(),
    )
    .into_iter()
    .map(str::to_string)
    .collect();
    if let Some(c) = non_blank(session.commentaire.as_deref()) {
        chips.push(c);
    }
    if let Some(t) = non_blank(session.tarif.as_deref()) {
        chips.push(t);
    }

    let preview_url = non_blank(session.backdrop_url.as_deref())
        .or_else(|| non_blank(session.affiche_url.as_deref()));

    // Lead backdrop first, then the rest; the poster never appears here.
    let gallery = gallery::build_gallery(
        session.affiche_url.as_deref(),
        session
            .backdrop_url
            .iter()
            .chain(session.backdrops.iter())
            .map(String::as_str),
    );

    let trailer_thumb = non_blank(session.backdrop_url.as_deref())
        .or_else(|| non_blank(session.affiche_url.as_deref()));
    let trailer = trailer::resolve(session.trailer_url.as_deref(), trailer_thumb.as_deref());

    PanelContent {
        title,
        realisateur: non_blank(session.realisateur.as_deref()).unwrap_or_default(),
        cast: non_blank(session.acteurs_principaux.as_deref()).unwrap_or_default(),
        info_line: info_line(session),
        genres: non_blank(session.genres.as_deref()).unwrap_or_default(),
        synopsis: non_blank(session.synopsis.as_deref()).unwrap_or_default(),
        review,
        chips,
        prix: non_blank(session.prix.as_deref()),
        preview_url,
        gallery,
        trailer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::feed::RawSession;
    use crate::app::pipeline::compute_eligible;
    use chrono::NaiveDate;

    fn session(mutate: impl FnOnce(&mut RawSession)) -> Session {
        let mut raw = RawSession {
            titre: Some("Le Grand Bain".into()),
            date: Some("2025-09-04".into()),
            heure: Some("20:30".into()),
            ..RawSession::default()
        };
        mutate(&mut raw);
        let now = NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        compute_eligible(&[raw], now).remove(0)
    }

    #[test]
    fn chips_match_case_insensitively_and_union() {
        let labels = special_chips(Some("CINÉ CLUB"), Some("séance ciné goûter + handi"));
        assert_eq!(labels, vec!["Ciné Club", "Ciné Goûter", "Séance EPHAD HANDI"]);
    }

    #[test]
    fn chip_labels_are_not_duplicated() {
        // Both spellings map to the same label; it appears once.
        let labels = special_chips(Some("ciné goûter"), Some("cine gouter"));
        assert_eq!(labels, vec!["Ciné Goûter"]);
    }

    #[test]
    fn info_line_joins_present_fields_with_slashes() {
        let s = session(|r| {
            r.version = Some("VOSTFR".into());
            r.annee = Some("2018".into());
            r.pays = Some("France".into());
            r.duree_min = Some("122".into());
        });
        let content = build_panel(&s);
        assert_eq!(content.info_line, "VOSTFR / 2018 / France / 2h02");
    }

    #[test]
    fn info_line_skips_missing_fields() {
        let s = session(|r| {
            r.annee = Some("2018".into());
            r.duree_min = Some("45".into());
        });
        assert_eq!(build_panel(&s).info_line, "2018 / 45 min");
    }

    #[test]
    fn missing_title_falls_back() {
        let s = session(|r| r.titre = None);
        assert_eq!(build_panel(&s).title, "Titre inconnu");
    }

    #[test]
    fn review_link_carries_title_and_url() {
        let s = session(|r| r.allocine_url = Some("https://allocine.fr/f/1.html".into()));
        let review = build_panel(&s).review.expect("review link");
        assert_eq!(review.url, "https://allocine.fr/f/1.html");
        assert!(review.label.contains("Le Grand Bain"));
        assert!(review.label.contains("sur Allociné"));
    }

    #[test]
    fn comment_and_tarif_become_trailing_chips() {
        let s = session(|r| {
            r.categorie = Some("ciné club".into());
            r.commentaire = Some("Débat après la séance".into());
            r.tarif = Some("Tarif unique 5€".into());
        });
        let content = build_panel(&s);
        assert_eq!(
            content.chips,
            vec![
                "Ciné Club".to_string(),
                "Débat après la séance".to_string(),
                "Tarif unique 5€".to_string()
            ]
        );
    }

    #[test]
    fn preview_prefers_lead_backdrop_then_poster() {
        let with_backdrop = session(|r| {
            r.backdrop_url = Some("https://img/w780/b.jpg".into());
            r.affiche_url = Some("https://img/w780/p.jpg".into());
        });
        assert_eq!(
            build_panel(&with_backdrop).preview_url.as_deref(),
            Some("https://img/w780/b.jpg")
        );

        let poster_only = session(|r| {
            r.affiche_url = Some("https://img/w780/p.jpg".into());
        });
        assert_eq!(
            build_panel(&poster_only).preview_url.as_deref(),
            Some("https://img/w780/p.jpg")
        );
    }

    #[test]
    fn gallery_feeds_lead_backdrop_first() {
        let s = session(|r| {
            r.affiche_url = Some("https://img/w780/poster.jpg".into());
            r.backdrop_url = Some("https://img/w780/lead.jpg".into());
            r.backdrops = vec![
                "https://img/w780/lead.jpg".into(),
                "https://img/w780/poster.jpg".into(),
                "https://img/w780/second.jpg".into(),
            ];
        });
        let content = build_panel(&s);
        let urls: Vec<_> = content.gallery.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://img/w780/lead.jpg", "https://img/w780/second.jpg"]);
    }
}
