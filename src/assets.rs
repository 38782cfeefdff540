//! Image and font assets: local template loading, icon downloads, resizing,
//! centering, text measurement/drawing and overflow fitting.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use image::{imageops, Rgba, RgbaImage};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rusttype::{point, Font, Scale};
use thiserror::Error;
use tracing::warn;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

const PRIMARY_FONT: &str = "BurbankBigRegular-Black.ttf";
const FALLBACK_FONT: &str = "LuckiestGuy-Regular.ttf";

// Lower bound for the iterative text fit, so a pathological string can
// never shrink the search forever.
const MIN_TEXT_PX: f32 = 8.0;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        source: image::ImageError,
    },
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },
    #[error("failed to load font {name}: {reason}")]
    Font { name: String, reason: String },
}

fn assets_dir() -> PathBuf {
    std::env::var("ATHENA_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("assets"))
}

fn fonts_dir() -> PathBuf {
    assets_dir().join("fonts")
}

fn images_dir() -> PathBuf {
    assets_dir().join("images")
}

fn templates_dir() -> PathBuf {
    images_dir().join("shopTemplates")
}

fn open(path: PathBuf) -> Result<RgbaImage, AssetError> {
    if !path.is_file() {
        return Err(AssetError::NotFound(path));
    }
    let name = path.display().to_string();
    image::open(&path)
        .map(|img| img.to_rgba8())
        .map_err(|source| AssetError::Decode { name, source })
}

/// Open an image from `assets/images/` (background texture, currency icon).
pub fn open_image(name: &str) -> Result<RgbaImage, AssetError> {
    open(images_dir().join(name))
}

/// Open a card template layer from `assets/images/shopTemplates/`.
pub fn open_template(name: &str) -> Result<RgbaImage, AssetError> {
    open(templates_dir().join(name))
}

/// Fetch and decode a remote image. One attempt, no retry; the caller
/// decides how far the failure reaches.
pub async fn download(http: &reqwest::Client, url: &str) -> Result<RgbaImage, AssetError> {
    let resp = http.get(url).send().await.map_err(|e| AssetError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !resp.status().is_success() {
        return Err(AssetError::Download {
            url: url.to_string(),
            reason: format!("http {}", resp.status()),
        });
    }
    let bytes = resp.bytes().await.map_err(|e| AssetError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    image::load_from_memory(&bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| AssetError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

fn scale_to(img: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    imageops::resize(img, w.max(1), h.max(1), imageops::FilterType::Lanczos3)
}

/// Uniform scale so the result fits within `max_w` x `max_h`. Dimensions
/// truncate, so the result never exceeds the box.
pub fn ratio_resize(img: &RgbaImage, max_w: u32, max_h: u32) -> RgbaImage {
    let ratio = (max_w as f32 / img.width() as f32).min(max_h as f32 / img.height() as f32);
    scale_to(
        img,
        (img.width() as f32 * ratio) as u32,
        (img.height() as f32 * ratio) as u32,
    )
}

/// Uniform scale so the result covers `min_w` x `min_h`. Used for the
/// canvas background texture. Dimensions round up, so truncation can
/// never leave an uncovered edge.
pub fn cover_resize(img: &RgbaImage, min_w: u32, min_h: u32) -> RgbaImage {
    let ratio = (min_w as f32 / img.width() as f32).max(min_h as f32 / img.height() as f32);
    scale_to(
        img,
        (img.width() as f32 * ratio).ceil() as u32,
        (img.height() as f32 * ratio).ceil() as u32,
    )
}

/// Coordinate that horizontally centers content of `content_width` inside a
/// container, at a fixed distance from the top.
pub fn center_x(content_width: i64, container_width: i64, top: i64) -> (i64, i64) {
    (container_width / 2 - content_width / 2, top)
}

static FONT_CACHE: Lazy<Mutex<HashMap<String, Arc<Font<'static>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn load_font_cached(name: &str) -> Result<Arc<Font<'static>>, AssetError> {
    if let Some(f) = FONT_CACHE.lock().get(name) {
        return Ok(Arc::clone(f));
    }

    let bytes = std::fs::read(fonts_dir().join(name)).map_err(|e| AssetError::Font {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let f = Font::try_from_vec(bytes).ok_or_else(|| AssetError::Font {
        name: name.to_string(),
        reason: "failed to parse font".to_string(),
    })?;

    let f = Arc::new(f);
    FONT_CACHE.lock().insert(name.to_string(), Arc::clone(&f));
    Ok(f)
}

/// The bundled poster font. Sizing happens at draw time.
pub fn font() -> Result<Arc<Font<'static>>, AssetError> {
    match load_font_cached(PRIMARY_FONT) {
        Ok(f) => Ok(f),
        Err(_) => {
            warn!("{PRIMARY_FONT} not found, defaulting to {FALLBACK_FONT}");
            load_font_cached(FALLBACK_FONT)
        }
    }
}

/// Rendered pixel width of `text` at `px`.
pub fn text_width(font: &Font<'_>, px: f32, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    font.layout(text, scale, point(0.0, v_metrics.ascent))
        .filter_map(|g| g.pixel_bounding_box())
        .map(|bb| bb.max.x as f32)
        .fold(0.0, f32::max)
}

/// Decrease the font size from `start_px` until `text` fits within
/// `max_width`. Returns the final size, its measured width, and the total
/// shrinkage (start - final); callers use the shrinkage to re-center the
/// baseline vertically.
pub fn fit_text_x(font: &Font<'_>, text: &str, start_px: f32, max_width: f32) -> (f32, f32, f32) {
    let mut px = start_px;
    let mut width = text_width(font, px, text);
    while width >= max_width && px > MIN_TEXT_PX {
        px -= 1.0;
        width = text_width(font, px, text);
    }
    (px, width, start_px - px)
}

/// Draw `text` with its top edge at `y`, alpha-blended onto the image.
pub fn draw_text(img: &mut RgbaImage, font: &Font<'_>, px: f32, x: i64, y: i64, color: Rgba<u8>, text: &str) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let baseline = y as f32 + v_metrics.ascent;

    for glyph in font.layout(text, scale, point(x as f32, baseline)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let dx = gx as i64 + bb.min.x as i64;
                let dy = gy as i64 + bb.min.y as i64;
                if dx < 0 || dy < 0 || dx >= img.width() as i64 || dy >= img.height() as i64 {
                    return;
                }
                let a = (v * 255.0) as u8;
                if a == 0 {
                    return;
                }
                let dst = img.get_pixel_mut(dx as u32, dy as u32);
                let sa = a as f32 / 255.0;
                let inv = 1.0 - sa;
                dst.0[0] = (color.0[0] as f32 * sa + dst.0[0] as f32 * inv) as u8;
                dst.0[1] = (color.0[1] as f32 * sa + dst.0[1] as f32 * inv) as u8;
                dst.0[2] = (color.0[2] as f32 * sa + dst.0[2] as f32 * inv) as u8;
                dst.0[3] = dst.0[3].max(a);
            });
        }
    }
}

/// Copy `over` onto `base` verbatim, ignoring alpha. Out-of-bounds pixels
/// are clipped.
pub fn paste(base: &mut RgbaImage, over: &RgbaImage, x: i64, y: i64) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let bx = x + ox as i64;
            let by = y + oy as i64;
            if bx < 0 || by < 0 || bx >= base.width() as i64 || by >= base.height() as i64 {
                continue;
            }
            base.put_pixel(bx as u32, by as u32, *over.get_pixel(ox, oy));
        }
    }
}

/// Composite `over` onto `base` using `over`'s own alpha channel as the
/// mask. Out-of-bounds pixels are clipped.
pub fn overlay_alpha(base: &mut RgbaImage, over: &RgbaImage, x: i64, y: i64) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let p = over.get_pixel(ox, oy);
            let a = p.0[3] as f32 / 255.0;
            if a <= 0.0 {
                continue;
            }
            let bx = x + ox as i64;
            let by = y + oy as i64;
            if bx < 0 || by < 0 || bx >= base.width() as i64 || by >= base.height() as i64 {
                continue;
            }
            let dst = base.get_pixel_mut(bx as u32, by as u32);
            let inv = 1.0 - a;
            dst.0[0] = (p.0[0] as f32 * a + dst.0[0] as f32 * inv) as u8;
            dst.0[1] = (p.0[1] as f32 * a + dst.0[1] as f32 * inv) as u8;
            dst.0[2] = (p.0[2] as f32 * a + dst.0[2] as f32 * inv) as u8;
            dst.0[3] = dst.0[3].max(p.0[3]);
        }
    }
}
