//! Per-item card rendering: one catalog item -> one 310x510 card image.

use image::{Rgba, RgbaImage};
use rusttype::Font;
use thiserror::Error;
use tracing::warn;

use crate::assets::{self, AssetError, WHITE};
use crate::rarity::{self, RarityStyle};
use crate::shop::RawItem;
use crate::util;

pub const CARD_WIDTH: u32 = 310;
pub const CARD_HEIGHT: u32 = 510;

const PRICE_TEXT_TOP: i64 = 347;
const PRICE_ICON_TOP: i64 = 350;
const NAME_TOP: i64 = 400;
const CAPTION_TOP: i64 = 450;

// Text wider than this at the nominal size gets refit to FIT_WIDTH.
const OVERFLOW_AT: f32 = 270.0;
const FIT_WIDTH: f32 = 250.0;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("item is missing required field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// A catalog item with everything a card needs present and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub rarity: String,
    pub category: String,
    pub price: u64,
    pub icon_url: String,
}

impl Item {
    /// Validate a raw API entry. A missing field rejects only this item;
    /// the caller skips it and keeps going.
    pub fn from_raw(raw: &RawItem) -> Result<Self, CardError> {
        let name = raw.name.clone().ok_or(CardError::MissingField("name"))?;
        let rarity = raw
            .rarity
            .clone()
            .ok_or(CardError::MissingField("rarity"))?
            .to_lowercase();
        let category = raw
            .category
            .clone()
            .ok_or(CardError::MissingField("type"))?
            .to_lowercase();
        let price = raw.price.ok_or(CardError::MissingField("price"))?;
        // an empty url counts as absent, falling through to the icon
        let icon_url = raw
            .image
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| raw.icon.clone().filter(|url| !url.is_empty()))
            .ok_or(CardError::MissingField("image"))?;
        Ok(Self {
            name,
            rarity,
            category,
            price,
            icon_url,
        })
    }

    /// Uppercased shop name with the redundant category suffix removed.
    /// Bundles keep their other suffixes so e.g. an outfit bundled under an
    /// "... Outfit Bundle" name only loses " BUNDLE".
    pub fn display_name(&self) -> String {
        let upper = self.name.to_uppercase();
        if self.category == "bundle" {
            upper.replace(" BUNDLE", "")
        } else {
            upper
                .replace(" OUTFIT", "")
                .replace(" PICKAXE", "")
                .replace(" BUNDLE", "")
        }
    }
}

/// Render the card for one item: rarity background, downloaded icon,
/// rarity overlay, price row, name and rarity/category caption.
pub async fn render(http: &reqwest::Client, item: &Item) -> Result<RgbaImage, CardError> {
    let style = rarity::lookup(&item.rarity);
    let mut card = RgbaImage::new(CARD_WIDTH, CARD_HEIGHT);

    let background = template_or_common(&style, "BG")?;
    assets::paste(&mut card, &background, 0, 0);

    let icon = assets::download(http, &item.icon_url).await?;
    let (icon, top) = match item.category.as_str() {
        "outfit" | "emote" => (assets::ratio_resize(&icon, 285, 365), 0),
        "wrap" => (assets::ratio_resize(&icon, 230, 310), 15),
        _ => (assets::ratio_resize(&icon, 310, 390), 15),
    };
    let (x, y) = assets::center_x(icon.width() as i64, CARD_WIDTH as i64, top);
    assets::overlay_alpha(&mut card, &icon, x, y);

    let overlay = template_or_common(&style, "OV")?;
    assets::overlay_alpha(&mut card, &overlay, 0, 0);

    let font = assets::font()?;

    // Price text and currency icon are centered jointly as one unit.
    let vbucks = assets::ratio_resize(&assets::open_image("vbucks.png")?, 40, 40);
    let price_text = util::format_thousands(item.price);
    let price_width = assets::text_width(&font, 40.0, &price_text) as i64;
    let (x, y) = assets::center_x(
        (price_width - 5) - vbucks.width() as i64,
        CARD_WIDTH as i64,
        PRICE_TEXT_TOP,
    );
    assets::draw_text(&mut card, &font, 40.0, x, y, WHITE, &price_text);
    let (x, y) = assets::center_x(
        vbucks.width() as i64 + price_width + 5,
        CARD_WIDTH as i64,
        PRICE_ICON_TOP,
    );
    assets::overlay_alpha(&mut card, &vbucks, x, y);

    draw_centered_fit(&mut card, &font, &item.display_name(), 40.0, NAME_TOP, WHITE);

    let caption = format!(
        "{} {}",
        style.label.to_uppercase(),
        item.category.to_uppercase()
    );
    let (r, g, b) = style.accent;
    draw_centered_fit(&mut card, &font, &caption, 30.0, CAPTION_TOP, Rgba([r, g, b, 255]));

    Ok(card)
}

/// Rarity-prefixed template layer, falling back to the Common layer when the
/// file is absent. Non-fatal; the fallback keeps the card renderable.
fn template_or_common(style: &RarityStyle, layer: &str) -> Result<RgbaImage, CardError> {
    let name = format!("{}{layer}.png", style.template_prefix);
    match assets::open_template(&name) {
        Ok(img) => Ok(img),
        Err(AssetError::NotFound(_)) => {
            warn!("failed to open {name}, defaulting to Common");
            Ok(assets::open_template(&format!("Common{layer}.png"))?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Center `text` horizontally; when it overflows the card, shrink it to fit
/// (starting the search at `refit_px`) and drop the top edge by half the
/// shrinkage so the smaller text stays visually anchored.
fn draw_centered_fit(
    card: &mut RgbaImage,
    font: &Font<'_>,
    text: &str,
    refit_px: f32,
    top: i64,
    color: Rgba<u8>,
) {
    let mut px = 40.0;
    let mut width = assets::text_width(font, px, text);
    let mut shift = 0i64;
    if width >= OVERFLOW_AT {
        let (fit_px, fit_width, change) = assets::fit_text_x(font, text, refit_px, FIT_WIDTH);
        px = fit_px;
        width = fit_width;
        shift = (change / 2.0) as i64;
    }
    let (x, y) = assets::center_x(width as i64, CARD_WIDTH as i64, top + shift);
    assets::draw_text(card, font, px, x, y, color, text);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, rarity: &str, category: &str) -> RawItem {
        RawItem {
            name: Some(name.to_string()),
            rarity: Some(rarity.to_string()),
            category: Some(category.to_string()),
            price: Some(1500),
            image: Some("https://x/img.png".to_string()),
            icon: None,
        }
    }

    #[test]
    fn valid_item_passes() {
        let item = Item::from_raw(&raw("Renegade Raider Outfit", "Rare", "Outfit")).unwrap();
        assert_eq!(item.rarity, "rare");
        assert_eq!(item.category, "outfit");
        assert_eq!(item.icon_url, "https://x/img.png");
    }

    #[test]
    fn missing_fields_are_named() {
        let mut r = raw("x", "rare", "outfit");
        r.price = None;
        assert!(matches!(
            Item::from_raw(&r),
            Err(CardError::MissingField("price"))
        ));

        let mut r = raw("x", "rare", "outfit");
        r.name = None;
        assert!(matches!(
            Item::from_raw(&r),
            Err(CardError::MissingField("name"))
        ));
    }

    #[test]
    fn icon_substitutes_missing_image() {
        let mut r = raw("x", "rare", "outfit");
        r.image = None;
        r.icon = Some("https://x/icon.png".to_string());
        let item = Item::from_raw(&r).unwrap();
        assert_eq!(item.icon_url, "https://x/icon.png");

        r.icon = None;
        assert!(matches!(
            Item::from_raw(&r),
            Err(CardError::MissingField("image"))
        ));
    }

    #[test]
    fn empty_image_url_falls_through_to_icon() {
        let mut r = raw("x", "rare", "outfit");
        r.image = Some(String::new());
        r.icon = Some("https://x/icon.png".to_string());
        let item = Item::from_raw(&r).unwrap();
        assert_eq!(item.icon_url, "https://x/icon.png");

        r.icon = Some(String::new());
        assert!(matches!(
            Item::from_raw(&r),
            Err(CardError::MissingField("image"))
        ));
    }

    #[test]
    fn display_name_strips_category_suffix() {
        let item = Item::from_raw(&raw("Renegade Raider Outfit", "Rare", "outfit")).unwrap();
        assert_eq!(item.display_name(), "RENEGADE RAIDER");

        let item = Item::from_raw(&raw("Raider's Revenge Pickaxe", "Epic", "pickaxe")).unwrap();
        assert_eq!(item.display_name(), "RAIDER'S REVENGE");
    }

    #[test]
    fn bundle_only_strips_bundle() {
        let item = Item::from_raw(&raw("Lava Legends Outfit Bundle", "Legendary", "bundle")).unwrap();
        assert_eq!(item.display_name(), "LAVA LEGENDS OUTFIT");
    }
}
