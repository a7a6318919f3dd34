// src/app/trailer.rs
//
// Classifies a trailer source URL and produces an embed descriptor. Probes
// run in a fixed priority order; the first match wins. Deferred variants are
// click-to-load placeholders (thumbnail + play button), immediate ones may
// be shown as soon as the panel opens.

use once_cell::sync::Lazy;
use regex::Regex;
use urlencoding::{decode, encode};

static MP4_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.mp4(\?.*)?$").expect("mp4 regex"));
static ALLOCINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)allocine\.fr/.*(player|video)").expect("allocine regex"));
static DAILYMOTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)dailymotion\.com/(?:embed/)?video/([A-Za-z0-9]+)").expect("dailymotion regex")
});
static YOUTUBE_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]v=([A-Za-z0-9_-]{6,})").expect("youtube v= regex"));
static YOUTUBE_SHORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtu\.be/([A-Za-z0-9_-]{6,})").expect("youtu.be regex"));

/// Resolved trailer descriptor, tagged by provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trailer {
    /// Direct video file, played inline, no autoplay.
    Mp4 { url: String },
    /// Allociné player; deferred, autoplay forced off.
    AllocinePlayer {
        embed_url: String,
        thumbnail_url: Option<String>,
    },
    /// Dailymotion; deferred, autoplay forced on (the user already clicked).
    Dailymotion {
        embed_url: String,
        thumbnail_url: String,
    },
    /// YouTube iframe; immediate, autoplay off.
    YouTube { embed_url: String },
}

impl Trailer {
    /// Deferred descriptors render a placeholder until explicitly activated.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::AllocinePlayer { .. } | Self::Dailymotion { .. })
    }

    pub fn embed_url(&self) -> &str {
        match self {
            Self::Mp4 { url } => url,
            Self::AllocinePlayer { embed_url, .. } => embed_url,
            Self::Dailymotion { embed_url, .. } => embed_url,
            Self::YouTube { embed_url } => embed_url,
        }
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        match self {
            Self::AllocinePlayer { thumbnail_url, .. } => thumbnail_url.as_deref(),
            Self::Dailymotion { thumbnail_url, .. } => Some(thumbnail_url),
            _ => None,
        }
    }
}

/// Merge `forced` query parameters into `url`, overwriting on key conflict
/// and leaving unrelated parameters and any fragment untouched.
pub fn merge_query(url: &str, forced: &[(&str, &str)]) -> String {
    let (body, fragment) = match url.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (url, None),
    };
    let (base, query) = match body.split_once('?') {
        Some((b, q)) => (b, q),
        None => (body, ""),
    };

    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (k, v) = p.split_once('=').unwrap_or((p, ""));
            (
                decode(k).map(|c| c.into_owned()).unwrap_or_else(|_| k.to_string()),
                decode(v).map(|c| c.into_owned()).unwrap_or_else(|_| v.to_string()),
            )
        })
        .collect();

    for (key, value) in forced {
        match pairs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = (*value).to_string(),
            None => pairs.push(((*key).to_string(), (*value).to_string())),
        }
    }

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut out = base.to_string();
    if !query.is_empty() {
        out.push('?');
        out.push_str(&query);
    }
    if let Some(f) = fragment {
        out.push('#');
        out.push_str(f);
    }
    out
}

fn probe_mp4(url: &str) -> Option<Trailer> {
    MP4_RE
        .is_match(url)
        .then(|| Trailer::Mp4 { url: url.to_string() })
}

fn probe_allocine(url: &str, fallback_thumb: Option<&str>) -> Option<Trailer> {
    ALLOCINE_RE.is_match(url).then(|| Trailer::AllocinePlayer {
        embed_url: merge_query(
            url,
            &[("autoplay", "0"), ("autostart", "0"), ("autoStart", "0")],
        ),
        thumbnail_url: fallback_thumb.map(str::to_string),
    })
}

fn probe_dailymotion(url: &str) -> Option<Trailer> {
    let id = DAILYMOTION_RE.captures(url)?.get(1)?.as_str();
    Some(Trailer::Dailymotion {
        embed_url: merge_query(
            &format!("https://www.dailymotion.com/embed/video/{id}"),
            &[
                ("autoplay", "1"),
                ("mute", "0"),
                ("queue-autoplay-next", "0"),
                ("ui-start-screen-info", "1"),
            ],
        ),
        thumbnail_url: format!("https://www.dailymotion.com/thumbnail/video/{id}"),
    })
}

fn probe_youtube(url: &str) -> Option<Trailer> {
    let id = YOUTUBE_PARAM_RE
        .captures(url)
        .or_else(|| YOUTUBE_SHORT_RE.captures(url))?
        .get(1)?
        .as_str();
    Some(Trailer::YouTube {
        embed_url: merge_query(
            &format!("https://www.youtube.com/embed/{id}"),
            &[("autoplay", "0"), ("mute", "0")],
        ),
    })
}

/// Resolve a session's trailer URL. `fallback_thumb` is the lead backdrop
/// (or poster) used when the provider gives no thumbnail of its own.
pub fn resolve(trailer_url: Option<&str>, fallback_thumb: Option<&str>) -> Option<Trailer> {
    let url = trailer_url?.trim();
    if url.is_empty() {
        return None;
    }
    probe_mp4(url)
        .or_else(|| probe_allocine(url, fallback_thumb))
        .or_else(|| probe_dailymotion(url))
        .or_else(|| probe_youtube(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp4_wins_with_or_without_query() {
        let t = resolve(Some("https://cdn.example/t.mp4"), None).unwrap();
        assert_eq!(t, Trailer::Mp4 { url: "https://cdn.example/t.mp4".into() });
        assert!(matches!(
            resolve(Some("https://cdn.example/t.MP4?v=AbCdEfGh"), None),
            Some(Trailer::Mp4 { .. })
        ));
    }

    #[test]
    fn allocine_forces_autoplay_off_without_clobbering() {
        let t = resolve(
            Some("https://www.allocine.fr/_video/player_gen_cmedia=1234.html?lang=fr&autoplay=1#go"),
            Some("https://img/backdrop.jpg"),
        )
        .unwrap();
        let Trailer::AllocinePlayer { embed_url, thumbnail_url } = &t else {
            panic!("expected allocine, got {t:?}");
        };
        assert!(embed_url.contains("lang=fr"));
        assert!(embed_url.contains("autoplay=0"));
        assert!(embed_url.contains("autostart=0"));
        assert!(embed_url.contains("autoStart=0"));
        assert!(!embed_url.contains("autoplay=1"));
        assert!(embed_url.ends_with("#go"));
        assert_eq!(thumbnail_url.as_deref(), Some("https://img/backdrop.jpg"));
        assert!(t.is_deferred());
    }

    #[test]
    fn dailymotion_builds_embed_and_thumbnail_from_id() {
        let t = resolve(Some("https://www.dailymotion.com/video/k1abCDe"), None).unwrap();
        let Trailer::Dailymotion { embed_url, thumbnail_url } = &t else {
            panic!("expected dailymotion, got {t:?}");
        };
        assert!(embed_url.starts_with("https://www.dailymotion.com/embed/video/k1abCDe?"));
        assert!(embed_url.contains("autoplay=1"));
        assert!(embed_url.contains("mute=0"));
        assert!(embed_url.contains("queue-autoplay-next=0"));
        assert!(embed_url.contains("ui-start-screen-info=1"));
        assert_eq!(thumbnail_url, "https://www.dailymotion.com/thumbnail/video/k1abCDe");

        // The /embed/video/<id> form resolves to the same id.
        let t2 = resolve(
            Some("https://www.dailymotion.com/embed/video/k1abCDe?x=1"),
            None,
        )
        .unwrap();
        assert!(t2.embed_url().contains("/embed/video/k1abCDe"));
    }

    #[test]
    fn youtube_short_and_param_forms() {
        let t = resolve(Some("https://youtu.be/AbCdEfGhIjK"), None).unwrap();
        let Trailer::YouTube { embed_url } = &t else {
            panic!("expected youtube, got {t:?}");
        };
        assert!(embed_url.starts_with("https://www.youtube.com/embed/AbCdEfGhIjK?"));
        assert!(embed_url.contains("autoplay=0"));
        assert!(embed_url.contains("mute=0"));
        assert!(!t.is_deferred());

        let t = resolve(
            Some("https://www.youtube.com/watch?v=AbCdEfGhIjK&t=12"),
            None,
        )
        .unwrap();
        assert!(t.embed_url().contains("/embed/AbCdEfGhIjK"));
    }

    #[test]
    fn short_youtube_ids_are_rejected() {
        assert!(resolve(Some("https://youtu.be/abc12"), None).is_none());
    }

    #[test]
    fn unknown_or_missing_urls_yield_nothing() {
        assert!(resolve(None, None).is_none());
        assert!(resolve(Some(""), None).is_none());
        assert!(resolve(Some("https://vimeo.com/12345678"), None).is_none());
    }

    #[test]
    fn merge_query_percent_encodes_and_preserves_order() {
        let merged = merge_query(
            "https://host/p?a=1&name=j%20d",
            &[("a", "2"), ("new", "v v")],
        );
        assert_eq!(merged, "https://host/p?a=2&name=j%20d&new=v%20v");
    }
}
