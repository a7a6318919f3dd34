// src/app/pipeline.rs
//
// Turns the raw feed list into the ordered list of displayable sessions.
// This ordered list is the single source of truth for the strip, the
// calendar index and the "open first session" default.

use chrono::{Duration, NaiveDateTime};

use crate::app::feed::RawSession;
use crate::app::timefmt;

/// Sessions stay listed until this long after their start time.
pub const GRACE_HOURS: i64 = 2;

/// One eligible screening, feed fields plus its parsed local instant.
#[derive(Clone, Debug)]
pub struct Session {
    pub titre: Option<String>,
    pub realisateur: Option<String>,
    pub acteurs_principaux: Option<String>,
    /// ISO `YYYY-MM-DD`; guaranteed parseable (it backed `instant`).
    pub date: String,
    /// Raw `HH:MM` clock text, shown verbatim on the strip.
    pub heure: String,
    pub duree_min: Option<u32>,
    pub version: Option<String>,
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
    pub allocine_url: Option<String>,
    pub trailer_url: Option<String>,
    pub instant: NaiveDateTime,
}

fn cook(raw: &RawSession, instant: NaiveDateTime) -> Session {
    Session {
        titre: raw.titre.clone(),
        realisateur: raw.realisateur.clone(),
        acteurs_principaux: raw.acteurs_principaux.clone(),
        date: raw.date.as_deref().unwrap_or_default().trim().to_string(),
        heure: raw.heure.as_deref().unwrap_or_default().trim().to_string(),
        duree_min: raw
            .duree_min
            .as_deref()
            .and_then(|d| d.trim().parse::<u32>().ok()),
        version: raw.version.clone(),
        annee: raw.annee.clone(),
        pays: raw.pays.clone(),
        genres: raw.genres.clone(),
        synopsis: raw.synopsis.clone(),
        categorie: raw.categorie.clone(),
        commentaire: raw.commentaire.clone(),
        tarif: raw.tarif.clone(),
        prix: raw.prix.clone(),
        affiche_url: raw.affiche_url.clone(),
        backdrop_url: raw.backdrop_url.clone(),
        backdrops: raw.backdrops.clone(),
        allocine_url: raw.allocine_url.clone(),
        trailer_url: raw.trailer_url.clone(),
        instant,
    }
}

/// Filter to sessions whose time field is non-blank, whose instant parses,
/// and which started no more than the grace period before `now`; then sort
/// ascending by instant. The sort is stable, so feed order survives ties.
pub fn compute_eligible(raw: &[RawSession], now: NaiveDateTime) -> Vec<Session> {
    let cutoff = now - Duration::hours(GRACE_HOURS);

    let mut sessions: Vec<Session> = raw
        .iter()
        .filter_map(|r| {
            let heure = r.heure.as_deref().unwrap_or("");
            if heure.trim().is_empty() {
                return None;
            }
            let instant = timefmt::parse_instant(r.date.as_deref().unwrap_or(""), heure)?;
            (instant >= cutoff).then(|| cook(r, instant))
        })
        .collect();

    sessions.sort_by_key(|s| s.instant);
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(titre: &str, date: &str, heure: &str) -> RawSession {
        RawSession {
            titre: Some(titre.into()),
            date: Some(date.into()),
            heure: Some(heure.into()),
            ..RawSession::default()
        }
    }

    fn at(date: (i32, u32, u32), time: (u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(time.0, time.1, 0)
            .unwrap()
    }

    #[test]
    fn blank_or_missing_time_is_excluded() {
        let list = vec![
            raw("a", "2025-09-04", ""),
            raw("b", "2025-09-04", "   "),
            RawSession {
                titre: Some("c".into()),
                date: Some("2025-09-04".into()),
                ..RawSession::default()
            },
            raw("d", "2025-09-04", "20:00"),
        ];
        let out = compute_eligible(&list, at((2025, 9, 4), (10, 0)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].titre.as_deref(), Some("d"));
    }

    #[test]
    fn two_hour_grace_boundary() {
        let now = at((2025, 9, 4), (20, 0));
        let list = vec![
            raw("too-old", "2025-09-04", "17:59"), // 2h01 past
            raw("kept", "2025-09-04", "18:01"),    // 1h59 past
            raw("edge", "2025-09-04", "18:00"),    // exactly 2h past, kept
        ];
        let out = compute_eligible(&list, now);
        let names: Vec<_> = out.iter().map(|s| s.titre.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["edge", "kept"]);
    }

    #[test]
    fn sort_is_stable_for_identical_instants() {
        let now = at((2025, 9, 1), (8, 0));
        let list = vec![
            raw("second-day", "2025-09-05", "18:00"),
            raw("tie-1", "2025-09-02", "20:30"),
            raw("tie-2", "2025-09-02", "20:30"),
            raw("tie-3", "2025-09-02", "20:30"),
        ];
        let out = compute_eligible(&list, now);
        let names: Vec<_> = out.iter().map(|s| s.titre.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["tie-1", "tie-2", "tie-3", "second-day"]);
    }

    #[test]
    fn unparseable_date_drops_the_session() {
        let list = vec![raw("bad", "tuesday", "20:00")];
        assert!(compute_eligible(&list, at((2025, 9, 4), (10, 0))).is_empty());
    }

    #[test]
    fn cooked_fields_carry_over() {
        let mut r = raw("Film", "2025-09-04", "20:00");
        r.duree_min = Some("122".into());
        r.backdrops = vec!["https://img/a.jpg".into()];
        let out = compute_eligible(&[r], at((2025, 9, 4), (10, 0)));
        assert_eq!(out[0].duree_min, Some(122));
        assert_eq!(out[0].backdrops.len(), 1);
        assert_eq!(out[0].date, "2025-09-04");
    }
}
