// src/app/prefetch.rs
//
// Shared image fetcher: a small worker pool downloads and caches images in
// the background while the UI thread polls completions and uploads textures
// with a per-frame budget. Every image in the app (strip posters, panel
// preview, gallery thumbs, trailer placeholders, upcoming posters) goes
// through here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

use eframe::egui::{self as eg, ColorImage, TextureHandle};
use tracing::warn;

use crate::app::cache;

const WORKER_COUNT: usize = 8;
const MAX_DONE_PER_FRAME: usize = 16;
const MAX_UPLOADS_PER_FRAME: usize = 4;

/// Standard width buckets.
pub const THUMB_WIDTH: u32 = 320;
pub const PREVIEW_WIDTH: u32 = 780;

struct Job {
    key: String,
    url: String,
    max_width: u32,
}

struct JobDone {
    key: String,
    result: Result<PathBuf, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ImageState {
    Pending,
    Cached(PathBuf),
    Ready,
    Failed,
}

pub struct ImageFetcher {
    work_tx: Option<Sender<Job>>,
    done_rx: Receiver<JobDone>,
    states: HashMap<String, ImageState>,
    textures: HashMap<String, TextureHandle>,
    uploads_left: usize,
}

impl ImageFetcher {
    pub fn new() -> Self {
        let (work_tx, work_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel::<JobDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        match crate::app::feed::build_client() {
            Ok(client) => {
                for _ in 0..WORKER_COUNT {
                    let work_rx = Arc::clone(&work_rx);
                    let done_tx = done_tx.clone();
                    let client = client.clone();
                    std::thread::spawn(move || loop {
                        let job = {
                            let Ok(rx) = work_rx.lock() else { break };
                            rx.recv()
                        };
                        let Ok(job) = job else { break };
                        let result =
                            cache::download_and_store(&client, &job.url, &job.key, job.max_width);
                        let _ = done_tx.send(JobDone {
                            key: job.key,
                            result,
                        });
                    });
                }
            }
            Err(e) => {
                // No client, no workers: every request will stay Pending and
                // render as a placeholder rectangle.
                warn!("image fetcher disabled: {e}");
            }
        }

        Self {
            work_tx: Some(work_tx),
            done_rx,
            states: HashMap::new(),
            textures: HashMap::new(),
            uploads_left: MAX_UPLOADS_PER_FRAME,
        }
    }

    /// Queue `url` at the given width bucket if it is not already known.
    pub fn request(&mut self, url: &str, max_width: u32) -> String {
        let key = cache::image_key(url, max_width);
        if self.states.contains_key(&key) {
            return key;
        }
        if let Some(path) = cache::cached_path(&key) {
            self.states.insert(key.clone(), ImageState::Cached(path));
            return key;
        }
        self.states.insert(key.clone(), ImageState::Pending);
        if let Some(tx) = &self.work_tx {
            let _ = tx.send(Job {
                key: key.clone(),
                url: url.to_string(),
                max_width,
            });
        }
        key
    }

    /// Drain a bounded number of completions and reset the upload budget.
    /// Call once per frame before rendering.
    pub fn begin_frame(&mut self, ctx: &eg::Context) {
        self.uploads_left = MAX_UPLOADS_PER_FRAME;

        let mut drained = 0usize;
        while drained < MAX_DONE_PER_FRAME {
            match self.done_rx.try_recv() {
                Ok(done) => {
                    drained += 1;
                    let state = match done.result {
                        Ok(path) => ImageState::Cached(path),
                        Err(e) => {
                            warn!("image fetch failed: {e}");
                            ImageState::Failed
                        }
                    };
                    self.states.insert(done.key, state);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if drained > 0 {
            ctx.request_repaint();
        }
    }

    /// Texture for `url` at the given width, requesting and lazily uploading
    /// as needed. Returns None while the image is still in flight (or failed).
    pub fn texture(&mut self, ctx: &eg::Context, url: &str, max_width: u32) -> Option<TextureHandle> {
        let key = self.request(url, max_width);
        if let Some(tex) = self.textures.get(&key) {
            return Some(tex.clone());
        }

        let ImageState::Cached(path) = self.states.get(&key)?.clone() else {
            return None;
        };
        if self.uploads_left == 0 {
            ctx.request_repaint();
            return None;
        }
        self.uploads_left -= 1;

        match cache::load_rgba(&path) {
            Ok((w, h, bytes)) => {
                let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &bytes);
                let tex = ctx.load_texture(key.clone(), img, eg::TextureOptions::LINEAR);
                self.textures.insert(key.clone(), tex.clone());
                self.states.insert(key, ImageState::Ready);
                Some(tex)
            }
            Err(e) => {
                warn!("texture upload failed: {e}");
                self.states.insert(key, ImageState::Failed);
                None
            }
        }
    }

    /// True once a request for this url/width has permanently failed.
    pub fn failed(&self, url: &str, max_width: u32) -> bool {
        matches!(
            self.states.get(&cache::image_key(url, max_width)),
            Some(ImageState::Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_downloads_report_and_never_yield_a_texture() {
        let ctx = eg::Context::default();
        let mut images = ImageFetcher::new();
        let url = "https://img/w780/broken.jpg";

        assert!(!images.failed(url, THUMB_WIDTH));

        images
            .states
            .insert(cache::image_key(url, THUMB_WIDTH), ImageState::Failed);
        assert!(images.failed(url, THUMB_WIDTH));
        assert!(images.texture(&ctx, url, THUMB_WIDTH).is_none());
        // The failure is sticky: asking again does not re-queue the job.
        assert!(images.failed(url, THUMB_WIDTH));
    }
}
