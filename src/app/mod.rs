// src/app/mod.rs
//
// Session feed polling and view-state synchronization.
//
// All mutable view state (selected session, calendar cursor, memoized aux
// feeds) lives on this struct; sub-renderers in ui/ borrow it. Feed fetches
// run on worker threads and land here through one mpsc channel, polled once
// per frame.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use eframe::egui as eg;
use tracing::{info, warn};

pub mod cache;
pub mod calendar;
pub mod feed;
pub mod gallery;
pub mod panel;
pub mod pipeline;
pub mod prefetch;
pub mod prefs;
pub mod program;
pub mod timefmt;
pub mod trailer;
pub mod types;
pub mod ui;

use crate::app::calendar::{CalendarCursor, CalendarIndex};
use crate::app::feed::{FeedMsg, RawSession};
use crate::app::panel::PanelContent;
use crate::app::pipeline::Session;
use crate::app::prefetch::{ImageFetcher, THUMB_WIDTH};
use crate::app::types::{BundleFeed, Tab, UpcomingFeed};
use crate::config::{load_config, AppConfig};

pub struct CineRailApp {
    cfg: AppConfig,

    // ---- feed plumbing ----
    feed_tx: Sender<FeedMsg>,
    feed_rx: Receiver<FeedMsg>,
    feed_seq: u64,
    last_refresh: Instant,
    did_init: bool,

    // ---- programme data ----
    pub(crate) sessions: Vec<Session>,
    pub(crate) index: CalendarIndex,
    /// Set once any programme response (even empty) has been applied.
    had_programme: bool,
    /// Sticky only until the first successful load; later failures keep the
    /// previous list on screen without comment.
    programme_error: Option<String>,

    // ---- auxiliary tabs (lazy, memoized) ----
    pub(crate) bundles: BundleFeed,
    pub(crate) upcoming: UpcomingFeed,

    // ---- view state ----
    pub(crate) tab: Tab,
    pub(crate) selected: Option<usize>,
    pub(crate) panel: Option<PanelContent>,
    /// Next-paint reveal guard: the panel renders one frame after `open`.
    pub(crate) panel_visible: bool,
    /// Deferred trailer placeholders arm exactly once.
    pub(crate) trailer_armed: bool,
    pub(crate) calendar_open: bool,
    pub(crate) calendar_cursor: CalendarCursor,
    /// Strip scroll request (column index), consumed by ui/strip.rs.
    pub(crate) scroll_to: Option<usize>,

    // ---- images ----
    pub(crate) images: ImageFetcher,

    // ---- prefs ----
    pub(crate) prefs_dirty: bool,
    pub(crate) prefs_last_write: Instant,
    pub(crate) poster_height_ui: f32,
}

impl Default for CineRailApp {
    fn default() -> Self {
        let (feed_tx, feed_rx) = mpsc::channel();
        Self {
            cfg: load_config(),

            feed_tx,
            feed_rx,
            feed_seq: 0,
            last_refresh: Instant::now(),
            did_init: false,

            sessions: Vec::new(),
            index: CalendarIndex::default(),
            had_programme: false,
            programme_error: None,

            bundles: BundleFeed::default(),
            upcoming: UpcomingFeed::default(),

            tab: Tab::Programme,
            selected: None,
            panel: None,
            panel_visible: false,
            trailer_armed: false,
            calendar_open: false,
            calendar_cursor: CalendarCursor::default(),
            scroll_to: None,

            images: ImageFetcher::new(),

            prefs_dirty: false,
            prefs_last_write: Instant::now(),
            poster_height_ui: 180.0,
        }
    }
}

impl CineRailApp {
    pub(crate) fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    // ---- feed lifecycle ----

    fn start_programme_fetch(&mut self) {
        self.feed_seq += 1;
        self.last_refresh = Instant::now();
        match feed::build_client() {
            Ok(client) => feed::spawn_programme_fetch(
                self.feed_tx.clone(),
                client,
                self.cfg.feed_url(feed::PROGRAMME_FILE),
                self.feed_seq,
            ),
            Err(e) => warn!("programme fetch skipped: {e}"),
        }
    }

    /// Lazy, once-per-run fetches for the auxiliary tabs.
    fn ensure_aux_feed(&mut self, tab: Tab) {
        match tab {
            Tab::Pdf | Tab::Archives => {
                if matches!(self.bundles, BundleFeed::NotRequested) {
                    self.bundles = BundleFeed::Loading;
                    match feed::build_client() {
                        Ok(client) => feed::spawn_bundles_fetch(
                            self.feed_tx.clone(),
                            client,
                            self.cfg.feed_url(feed::BUNDLES_FILE),
                        ),
                        Err(e) => self.bundles = BundleFeed::Unavailable(e),
                    }
                }
            }
            Tab::Prochainement => {
                if matches!(self.upcoming, UpcomingFeed::NotRequested) {
                    self.upcoming = UpcomingFeed::Loading;
                    match feed::build_client() {
                        Ok(client) => feed::spawn_upcoming_fetch(
                            self.feed_tx.clone(),
                            client,
                            self.cfg.feed_url(feed::UPCOMING_FILE),
                        ),
                        Err(e) => self.upcoming = UpcomingFeed::Unavailable(e),
                    }
                }
            }
            Tab::Programme => {}
        }
    }

    fn poll_feed(&mut self, ctx: &eg::Context) {
        let mut seen = false;
        loop {
            match self.feed_rx.try_recv() {
                Ok(FeedMsg::Programme { seq, result }) => {
                    seen = true;
                    // Last response wins: overlapping refreshes are rare (30
                    // minute timer) and the feed is idempotent, so a stale
                    // `seq` is applied anyway and only logged.
                    if seq != self.feed_seq {
                        info!("applying out-of-order programme response (seq {seq})");
                    }
                    match result {
                        Ok(raw) => self.apply_programme(&raw),
                        Err(e) => {
                            if !self.had_programme {
                                self.programme_error = Some(e);
                            }
                        }
                    }
                }
                Ok(FeedMsg::Bundles(result)) => {
                    seen = true;
                    self.bundles.apply(result);
                }
                Ok(FeedMsg::Upcoming(result)) => {
                    seen = true;
                    self.upcoming.apply(result);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if seen {
            ctx.request_repaint();
        }
    }

    /// Wholesale rebuild on every refresh: eligible list, calendar index,
    /// strip contents, and the auto-opened first session.
    pub(crate) fn apply_programme(&mut self, raw: &[RawSession]) {
        let now = Local::now().naive_local();
        self.sessions = pipeline::compute_eligible(raw, now);
        self.index = CalendarIndex::build(&self.sessions);
        self.had_programme = true;
        self.programme_error = None;

        for s in &self.sessions {
            if let Some(url) = s.affiche_url.as_deref() {
                self.images.request(url, THUMB_WIDTH);
            }
        }

        if self.sessions.is_empty() {
            self.hide_panel();
        } else {
            self.open_session(0);
        }
    }

    // ---- panel / selection ----

    pub(crate) fn open_session(&mut self, idx: usize) {
        let Some(session) = self.sessions.get(idx) else {
            return;
        };
        self.panel = Some(panel::build_panel(session));
        self.selected = Some(idx);
        self.panel_visible = false; // revealed next paint
        self.trailer_armed = false;
        self.scroll_to = Some(idx);
    }

    pub(crate) fn hide_panel(&mut self) {
        self.panel = None;
        self.selected = None;
        self.panel_visible = false;
        self.trailer_armed = false;
    }

    /// Calendar day activation: exact date or nearest future screening date.
    pub(crate) fn jump_to_date(&mut self, date: &str) {
        if let Some(idx) = self.index.resolve_date_or_next(date, &self.sessions) {
            self.open_session(idx);
            self.calendar_open = false;
            self.calendar_cursor.reset();
        }
    }

    pub(crate) fn programme_unavailable(&self) -> Option<&str> {
        self.programme_error.as_deref()
    }

    pub(crate) fn had_programme(&self) -> bool {
        self.had_programme
    }
}

// ========== App impl ==========
impl eframe::App for CineRailApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        if !self.did_init {
            self.did_init = true;
            self.load_prefs();
            self.start_programme_fetch();
            // The restored tab may need its feed right away.
            self.ensure_aux_feed(self.tab);
        }

        self.poll_feed(ctx);
        self.images.begin_frame(ctx);

        // Fixed-interval re-fetch; failures simply wait for the next tick.
        let refresh_every = Duration::from_secs(self.cfg.refresh_minutes * 60);
        if self.last_refresh.elapsed() >= refresh_every {
            self.start_programme_fetch();
        }
        // Keep the timer honest even when idle in the background.
        ctx.request_repaint_after(Duration::from_secs(30));

        let prev_tab = self.tab;
        eg::TopBottomPanel::top("topbar").show(ctx, |ui| {
            self.ui_render_topbar(ui);
        });
        if self.tab != prev_tab {
            self.ensure_aux_feed(self.tab);
            self.mark_dirty();
        }

        eg::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Programme => self.ui_render_programme(ui, ctx),
            Tab::Pdf => self.ui_render_pdf_tab(ui),
            Tab::Prochainement => self.ui_render_upcoming_tab(ui, ctx),
            Tab::Archives => self.ui_render_archives_tab(ui),
        });

        if self.calendar_open && self.tab == Tab::Programme {
            self.ui_render_calendar(ctx);
        }

        self.maybe_save_prefs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, heure: &str) -> RawSession {
        RawSession {
            titre: Some(format!("{date} {heure}")),
            date: Some(date.into()),
            heure: Some(heure.into()),
            ..RawSession::default()
        }
    }

    fn future_date(days: i64) -> String {
        (Local::now().date_naive() + chrono::Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    #[test]
    fn refresh_rebuilds_and_opens_first_session() {
        let mut app = CineRailApp::default();
        let d1 = future_date(1);
        let d2 = future_date(3);
        app.apply_programme(&[raw(&d2, "21:00"), raw(&d1, "18:00")]);

        assert_eq!(app.sessions.len(), 2);
        // Sorted ascending, first auto-opened, panel pending reveal.
        assert_eq!(app.sessions[0].date, d1);
        assert_eq!(app.selected, Some(0));
        assert!(app.panel.is_some());
        assert!(!app.panel_visible);
        assert_eq!(app.scroll_to, Some(0));
        assert!(app.index.is_available(&d1));
    }

    #[test]
    fn empty_refresh_clears_everything() {
        let mut app = CineRailApp::default();
        app.apply_programme(&[raw(&future_date(1), "18:00")]);
        assert!(app.panel.is_some());

        // All sessions in the past now: strip empty, panel cleared, no
        // active calendar days.
        app.apply_programme(&[raw("2001-01-01", "18:00")]);
        assert!(app.sessions.is_empty());
        assert!(app.panel.is_none());
        assert_eq!(app.selected, None);
        assert_eq!(app.index.available_dates().count(), 0);
    }

    #[test]
    fn jump_to_date_falls_forward_and_closes_calendar() {
        let mut app = CineRailApp::default();
        let d1 = future_date(2);
        let d3 = future_date(6);
        app.apply_programme(&[raw(&d1, "18:00"), raw(&d3, "18:00")]);

        app.calendar_open = true;
        let gap = future_date(4); // between d1 and d3, no screening
        app.jump_to_date(&gap);
        assert_eq!(app.selected, Some(1));
        assert!(!app.calendar_open);

        // Past the last date: no-op, calendar stays open.
        app.calendar_open = true;
        app.jump_to_date(&future_date(30));
        assert_eq!(app.selected, Some(1));
        assert!(app.calendar_open);
    }

    #[test]
    fn reopening_replaces_panel_content_wholesale() {
        let mut app = CineRailApp::default();
        let d1 = future_date(1);
        let d2 = future_date(2);
        let mut second = raw(&d2, "20:00");
        second.titre = Some("Autre film".into());
        app.apply_programme(&[raw(&d1, "18:00"), second]);

        app.panel_visible = true;
        app.trailer_armed = true;
        app.open_session(1);
        let content = app.panel.as_ref().expect("panel content");
        assert_eq!(content.title, "Autre film");
        assert!(!app.panel_visible, "reveal guard re-arms on open");
        assert!(!app.trailer_armed, "deferred trailer re-arms per session");
    }
}
