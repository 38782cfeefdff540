//! Top-level image build: shape the raw response, compose the canvas,
//! persist it as a quality-85 JPEG.

use std::{fs::File, io::BufWriter};

use image::{codecs::jpeg::JpegEncoder, DynamicImage, RgbaImage};
use thiserror::Error;
use tracing::{info, warn};

use crate::layout::{self, ComposeError};
use crate::shop::{RawItem, ShopResponse};

pub const OUTPUT_FILE: &str = "itemshop.jpeg";
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to parse item shop response: {0}")]
    Shape(#[from] serde_json::Error),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("failed to save {OUTPUT_FILE}: {0}")]
    Save(String),
}

/// Turn a raw shop response into the saved poster. Shape and save failures
/// are fatal; per-item failures were already absorbed during composition.
pub async fn build(
    http: &reqwest::Client,
    date: &str,
    response: serde_json::Value,
) -> Result<(), BuildError> {
    let shop: ShopResponse = serde_json::from_value(response)?;

    let featured = concat_sections(&shop.featured, &shop.special_featured);
    let daily = concat_sections(&shop.daily, &shop.special_daily);
    info!("Featured: {}, Daily: {}", featured.len(), daily.len());

    let canvas = layout::compose(http, date, &featured, &daily).await?;
    save_jpeg(canvas)?;

    if !shop.full_shop {
        warn!("some cosmetics are missing from this shop");
    }
    info!("Generated item shop image");
    Ok(())
}

/// Primary items first, "special" items appended, order preserved.
fn concat_sections(primary: &[RawItem], special: &[RawItem]) -> Vec<RawItem> {
    primary.iter().chain(special).cloned().collect()
}

fn save_jpeg(canvas: RgbaImage) -> Result<(), BuildError> {
    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let file = File::create(OUTPUT_FILE).map_err(|e| BuildError::Save(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| BuildError::Save(e.to_string()))
}
