// src/app/cache.rs
//
// On-disk image cache: md5-keyed, width-bucketed JPEG files with age-based
// pruning. Posters and backdrops are downscaled at download time so the GPU
// never sees full-size feed assets.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use std::time::{Duration, SystemTime};

use image::GenericImageView;
use reqwest::blocking::Client;
use tracing::warn;

use crate::config::{load_config, resolve_relative_path};

static CACHE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static IMAGE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static IMAGE_PRUNE_ONCE: Once = Once::new();

const IMAGE_RETENTION_DAYS: u64 = 30;
const IMAGE_RETENTION_SECS: u64 = IMAGE_RETENTION_DAYS * 24 * 60 * 60;
const JPEG_QUALITY: u8 = 80;

pub fn cache_dir() -> PathBuf {
    CACHE_DIR_ONCE
        .get_or_init(|| {
            let cfg = load_config();
            let mut path = PathBuf::from(
                cfg.cache_dir
                    .clone()
                    .unwrap_or_else(|| resolve_relative_path(".cinerail_cache")),
            );
            if let Err(e) = fs::create_dir_all(&path) {
                warn!("failed to create cache dir {}: {e}", path.display());
                path = PathBuf::from(resolve_relative_path(".cinerail_cache"));
                let _ = fs::create_dir_all(&path);
            }
            path
        })
        .clone()
}

pub fn image_cache_dir() -> PathBuf {
    let dir = IMAGE_DIR_ONCE.get_or_init(|| {
        let mut path = cache_dir().join("images");
        if let Err(e) = fs::create_dir_all(&path) {
            warn!("failed to create image cache dir {}: {e}", path.display());
            path = cache_dir();
        }
        path
    });

    IMAGE_PRUNE_ONCE.call_once({
        let path = dir.clone();
        move || {
            if let Err(err) = prune_image_cache_in_dir(&path) {
                warn!("image cache prune failed: {err}");
            }
        }
    });

    dir.clone()
}

fn prune_image_cache_in_dir(dir: &Path) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(IMAGE_RETENTION_SECS))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "part"));
        if !is_image {
            continue;
        }
        let modified = entry.metadata()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff {
            let _ = fs::remove_file(&path);
            removed += 1;
        }
    }
    Ok(removed)
}

/// Cache key for one (url, target width) pair.
pub fn image_key(url: &str, max_width: u32) -> String {
    format!("{:x}_w{max_width}", md5::compute(url.as_bytes()))
}

/// Path a cached entry would live at, if it exists on disk.
pub fn cached_path(key: &str) -> Option<PathBuf> {
    let p = image_cache_dir().join(format!("{key}.jpg"));
    p.exists().then_some(p)
}

/// Decode a cached file to (width, height, RGBA8 bytes) for texture upload.
pub fn load_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open image {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().into_raw()))
}

/// Download, downscale to `max_width` (keeping aspect) and store as JPEG.
/// Reuses the shared pooled client; returns the on-disk path.
pub fn download_and_store(
    client: &Client,
    url: &str,
    key: &str,
    max_width: u32,
) -> Result<PathBuf, String> {
    use image::{imageops::FilterType, DynamicImage};

    let dest = image_cache_dir().join(format!("{key}.jpg"));
    if dest.exists() {
        return Ok(dest);
    }

    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download {url}: {e}"))?;

    let img = image::load_from_memory(&bytes).map_err(|e| format!("decode {url}: {e}"))?;

    let (w, h) = img.dimensions();
    let out: DynamicImage = if w > max_width {
        let new_h = ((h as f32) * (max_width as f32 / w as f32)).round().max(1.0) as u32;
        img.resize_exact(max_width, new_h, FilterType::CatmullRom)
    } else {
        img
    };

    let mut jpeg_bytes: Vec<u8> = Vec::new();
    {
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, JPEG_QUALITY);
        encoder
            .encode_image(&out)
            .map_err(|e| format!("jpeg encode: {e}"))?;
    }

    if let Some(parent) = dest.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = dest.with_extension("jpg.part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(&jpeg_bytes).map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, &dest).map_err(|e| format!("rename: {e}"))?;

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_separate_width_buckets() {
        let a = image_key("https://img/w780/a.jpg", 320);
        let b = image_key("https://img/w780/a.jpg", 780);
        let c = image_key("https://img/w780/b.jpg", 320);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(a.ends_with("_w320"));
    }

    #[test]
    fn prune_removes_only_stale_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fresh = dir.path().join("fresh.jpg");
        fs::write(&fresh, b"jpeg").unwrap();
        let ignored = dir.path().join("notes.txt");
        fs::write(&ignored, b"keep").unwrap();

        let removed = prune_image_cache_in_dir(dir.path()).expect("prune runs");
        assert_eq!(removed, 0);
        assert!(fresh.exists());
        assert!(ignored.exists());
    }
}
