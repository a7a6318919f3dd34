// src/app/feed.rs
//
// JSON feed plumbing: raw record types, lenient decoding, and the background
// fetch threads that hand results to the UI over mpsc (polled per frame).

use std::sync::mpsc::Sender;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::app::program::{ProgramBundle, UpcomingCard};

pub const PROGRAMME_FILE: &str = "programme.json";
pub const BUNDLES_FILE: &str = "PDFs.json";
pub const UPCOMING_FILE: &str = "prochainement.json";

const FETCH_TIMEOUT_SECS: u64 = 20;

/// One screening record as the feed ships it. Everything except the
/// eligibility-gating pair (`date`, `heure`) is optional and tolerated
/// missing; numeric-ish fields may arrive as strings or numbers.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSession {
    pub titre: Option<String>,
    pub realisateur: Option<String>,
    pub acteurs_principaux: Option<String>,
    pub date: Option<String>,
    pub heure: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub duree_min: Option<String>,
    pub version: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub annee: Option<String>,
    pub pays: Option<String>,
    pub genres: Option<String>,
    pub synopsis: Option<String>,
    pub categorie: Option<String>,
    pub commentaire: Option<String>,
    pub tarif: Option<String>,
    pub prix: Option<String>,
    pub affiche_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub backdrops: Vec<String>,
    #[serde(
        alias = "AllocineURL",
        alias = "allocine",
        alias = "url_allocine",
        alias = "AlloCine",
        alias = "allocineUrl"
    )]
    pub allocine_url: Option<String>,
    pub trailer_url: Option<String>,
}

/// Accept strings, numbers or booleans for loosely-typed feed fields.
pub(crate) fn stringish<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

/// Messages from fetch threads back to the UI thread.
pub enum FeedMsg {
    /// `seq` tags the request generation; a stale response may still be
    /// applied (last-response-wins, no cancellation of in-flight fetches).
    Programme {
        seq: u64,
        result: Result<Vec<RawSession>, String>,
    },
    Bundles(Result<Vec<ProgramBundle>, String>),
    Upcoming(Result<Vec<UpcomingCard>, String>),
}

pub fn build_client() -> Result<Client, String> {
    Client::builder()
        .user_agent("cinerail/feed")
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| format!("http client: {e}"))
}

fn fetch_text(client: &Client, url: &str) -> Result<String, String> {
    let resp = client
        .get(url)
        .header(reqwest::header::CACHE_CONTROL, "no-store")
        .send()
        .map_err(|e| format!("GET {url}: {e}"))?;
    if !resp.status().is_success() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }
    resp.text().map_err(|e| format!("read body: {e}"))
}

fn fetch_list<T: DeserializeOwned>(client: &Client, url: &str) -> Result<Vec<T>, String> {
    let text = fetch_text(client, url)?;
    serde_json::from_str(&text).map_err(|e| format!("decode {url}: {e}"))
}

/// Decode the programme array record-by-record so one malformed entry
/// degrades to an (ineligible) empty session instead of sinking the refresh.
pub fn decode_sessions(text: &str) -> Result<Vec<RawSession>, String> {
    let values: Vec<Value> = serde_json::from_str(text).map_err(|e| format!("decode: {e}"))?;
    Ok(values
        .into_iter()
        .map(|v| match serde_json::from_value::<RawSession>(v) {
            Ok(rec) => rec,
            Err(e) => {
                warn!("skipping malformed session record: {e}");
                RawSession::default()
            }
        })
        .collect())
}

pub fn spawn_programme_fetch(tx: Sender<FeedMsg>, client: Client, url: String, seq: u64) {
    std::thread::spawn(move || {
        let result = fetch_text(&client, &url).and_then(|text| decode_sessions(&text));
        if let Err(e) = &result {
            warn!("programme refresh abandoned: {e}");
        }
        let _ = tx.send(FeedMsg::Programme { seq, result });
    });
}

pub fn spawn_bundles_fetch(tx: Sender<FeedMsg>, client: Client, url: String) {
    std::thread::spawn(move || {
        let result = fetch_list::<ProgramBundle>(&client, &url);
        if let Err(e) = &result {
            warn!("programme-bundle fetch failed: {e}");
        }
        let _ = tx.send(FeedMsg::Bundles(result));
    });
}

pub fn spawn_upcoming_fetch(tx: Sender<FeedMsg>, client: Client, url: String) {
    std::thread::spawn(move || {
        let result = fetch_list::<UpcomingCard>(&client, &url);
        if let Err(e) = &result {
            warn!("upcoming-releases fetch failed: {e}");
        }
        let _ = tx.send(FeedMsg::Upcoming(result));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_french_fields_and_number_variants() {
        let json = r#"[{
            "titre": "Le Grand Bain",
            "realisateur": "Gilles Lellouche",
            "date": "2025-09-04",
            "heure": "20:30",
            "duree_min": 122,
            "annee": "2018",
            "backdrops": ["https://img/b1.jpg", "https://img/b2.jpg"],
            "AllocineURL": "https://www.allocine.fr/film/fichefilm_gen_cfilm=250825.html"
        }]"#;
        let list = decode_sessions(json).expect("decodes");
        assert_eq!(list.len(), 1);
        let s = &list[0];
        assert_eq!(s.titre.as_deref(), Some("Le Grand Bain"));
        assert_eq!(s.duree_min.as_deref(), Some("122"));
        assert_eq!(s.annee.as_deref(), Some("2018"));
        assert_eq!(s.backdrops.len(), 2);
        assert!(s.allocine_url.as_deref().unwrap_or("").contains("allocine"));
    }

    #[test]
    fn review_url_casing_variants_all_land() {
        for key in [
            "allocine_url",
            "AllocineURL",
            "allocine",
            "url_allocine",
            "AlloCine",
            "allocineUrl",
        ] {
            let json = format!(r#"[{{"titre": "X", "{key}": "https://allocine.fr/x"}}]"#);
            let list = decode_sessions(&json).expect("decodes");
            assert_eq!(
                list[0].allocine_url.as_deref(),
                Some("https://allocine.fr/x"),
                "variant {key}"
            );
        }
    }

    #[test]
    fn malformed_record_degrades_instead_of_failing_the_batch() {
        let json = r#"[{"titre": "Ok", "date": "2025-09-04", "heure": "18:00"}, 42]"#;
        let list = decode_sessions(json).expect("whole batch survives");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].titre.as_deref(), Some("Ok"));
        // The bad record decays to an empty session with no date/heure,
        // which the eligibility filter then drops.
        assert!(list[1].date.is_none());
    }

    #[test]
    fn top_level_garbage_is_an_error() {
        assert!(decode_sessions("{\"nope\":1}").is_err());
        assert!(decode_sessions("not json").is_err());
    }
}
