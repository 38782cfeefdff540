//! Grid layout: tier selection by item count, canvas sizing, header text
//! and dense card placement for the featured and daily sections.

use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::warn;

use crate::assets::{self, AssetError, WHITE};
use crate::card::{self, Item, CARD_HEIGHT, CARD_WIDTH};
use crate::shop::RawItem;

pub const HEADER_HEIGHT: u32 = 350;
// Card size plus a 20px gutter.
pub const CELL_PITCH_X: u32 = CARD_WIDTH + 20;
pub const CELL_PITCH_Y: u32 = CARD_HEIGHT + 20;

const FEATURED_START_X: i64 = 20;
const TITLE: &str = "FORTNITE ITEM SHOP ROTATION";
const HEADER_PX: f32 = 80.0;
const FALLBACK_BACKGROUND: Rgba<u8> = Rgba([34, 37, 40, 255]);

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// One of the three fixed grid configurations, selected by item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTier {
    pub featured_columns: u32,
    pub daily_columns: u32,
    pub width: u32,
    pub daily_start_x: i64,
}

/// Threshold the section sizes into a tier. Conditions evaluate in order
/// and a later match overrides an earlier one, so the widest tier needs
/// both sections over 20 items.
pub fn select_tier(featured: usize, daily: usize) -> GridTier {
    let mut tier = GridTier {
        featured_columns: 3,
        daily_columns: 3,
        width: 2050,
        daily_start_x: 1055,
    };
    if featured >= 21 {
        tier = GridTier {
            featured_columns: 6,
            daily_columns: 3,
            width: 3070,
            daily_start_x: 2075,
        };
    }
    if featured >= 21 && daily >= 21 {
        tier = GridTier {
            featured_columns: 6,
            daily_columns: 6,
            width: 4055,
            daily_start_x: 2075,
        };
    }
    tier
}

fn rows_for(count: usize, columns: u32) -> u32 {
    (count as u32).div_ceil(columns)
}

/// Header plus enough full-pitch rows for the taller of the two sections.
pub fn canvas_height(tier: &GridTier, featured: usize, daily: usize) -> u32 {
    let rows = rows_for(featured, tier.featured_columns).max(rows_for(daily, tier.daily_columns));
    HEADER_HEIGHT + CELL_PITCH_Y * rows
}

/// Top-left corner of grid cell `index` in a section starting at `start_x`.
pub fn cell_origin(start_x: i64, columns: u32, index: u32) -> (i64, i64) {
    (
        start_x + (index % columns) as i64 * CELL_PITCH_X as i64,
        HEADER_HEIGHT as i64 + (index / columns) as i64 * CELL_PITCH_Y as i64,
    )
}

/// Compose the full poster: background, title, date, section headers, then
/// both card grids. The caller persists the result.
pub async fn compose(
    http: &reqwest::Client,
    date: &str,
    featured: &[RawItem],
    daily: &[RawItem],
) -> Result<RgbaImage, ComposeError> {
    let tier = select_tier(featured.len(), daily.len());
    let height = canvas_height(&tier, featured.len(), daily.len());
    let mut canvas = RgbaImage::new(tier.width, height);

    match assets::open_image("background.png") {
        Ok(texture) => {
            let texture = assets::cover_resize(&texture, tier.width, height);
            let (x, y) = assets::center_x(texture.width() as i64, tier.width as i64, 0);
            assets::paste(&mut canvas, &texture, x, y);
        }
        Err(e) => {
            warn!("failed to open background.png, defaulting to dark gray ({e})");
            for pixel in canvas.pixels_mut() {
                *pixel = FALLBACK_BACKGROUND;
            }
        }
    }

    let font = assets::font()?;

    let title_width = assets::text_width(&font, HEADER_PX, TITLE) as i64;
    let (x, y) = assets::center_x(title_width, tier.width as i64, 30);
    assets::draw_text(&mut canvas, &font, HEADER_PX, x, y, WHITE, TITLE);

    let date_text = date.to_uppercase();
    let date_width = assets::text_width(&font, HEADER_PX, &date_text) as i64;
    let (x, y) = assets::center_x(date_width, tier.width as i64, 120);
    assets::draw_text(&mut canvas, &font, HEADER_PX, x, y, WHITE, &date_text);

    assets::draw_text(&mut canvas, &font, HEADER_PX, 20, 240, WHITE, "FEATURED");
    assets::draw_text(
        &mut canvas,
        &font,
        HEADER_PX,
        tier.width as i64 - 230,
        240,
        WHITE,
        "DAILY",
    );

    place_section(http, &mut canvas, featured, FEATURED_START_X, tier.featured_columns, "featured").await;
    place_section(http, &mut canvas, daily, tier.daily_start_x, tier.daily_columns, "daily").await;

    Ok(canvas)
}

/// Render every item in a section and place the survivors densely: a
/// skipped item never leaves a hole, later cards shift up to fill it.
async fn place_section(
    http: &reqwest::Client,
    canvas: &mut RgbaImage,
    items: &[RawItem],
    start_x: i64,
    columns: u32,
    section: &str,
) {
    let mut cards = Vec::new();
    for item in validate_section(items, section) {
        match card::render(http, &item).await {
            Ok(c) => cards.push(c),
            Err(e) => warn!("failed to render {section} item {:?}: {e}", item.name),
        }
    }

    for (c, (x, y)) in cards.iter().zip(section_cells(cards.len(), start_x, columns)) {
        assets::overlay_alpha(canvas, c, x, y);
    }
}

/// Items that pass per-item validation, in list order. A malformed entry
/// is logged and dropped here, before it can claim a grid cell.
fn validate_section(items: &[RawItem], section: &str) -> Vec<Item> {
    let mut valid = Vec::new();
    for raw in items {
        match Item::from_raw(raw) {
            Ok(item) => valid.push(item),
            Err(e) => warn!("skipping {section} item: {e}"),
        }
    }
    valid
}

/// The grid cells occupied by `count` placed cards: row-major, dense,
/// indexed by position among the survivors only.
fn section_cells(count: usize, start_x: i64, columns: u32) -> Vec<(i64, i64)> {
    (0..count as u32)
        .map(|i| cell_origin(start_x, columns, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_a_small_shop() {
        let tier = select_tier(20, 10);
        assert_eq!(tier.width, 2050);
        assert_eq!(tier.featured_columns, 3);
        assert_eq!(tier.daily_columns, 3);
        assert_eq!(tier.daily_start_x, 1055);
        // ceil(20/3) = 7 rows
        assert_eq!(canvas_height(&tier, 20, 10), 350 + 530 * 7);
    }

    #[test]
    fn tier_b_wide_featured() {
        let tier = select_tier(25, 5);
        assert_eq!(tier.width, 3070);
        assert_eq!(tier.featured_columns, 6);
        assert_eq!(tier.daily_columns, 3);
        assert_eq!(tier.daily_start_x, 2075);
        // ceil(25/6) = 5 rows
        assert_eq!(canvas_height(&tier, 25, 5), 3000);
    }

    #[test]
    fn tier_c_needs_both_sections_large() {
        assert_eq!(select_tier(21, 21).width, 4055);
        assert_eq!(select_tier(21, 21).daily_columns, 6);
        // large daily alone never widens past tier A
        assert_eq!(select_tier(5, 40).width, 2050);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(select_tier(20, 20).width, 2050);
        assert_eq!(select_tier(21, 20).width, 3070);
        assert_eq!(select_tier(21, 21).width, 4055);
        // empty featured stays on the base tier
        assert_eq!(select_tier(0, 10).width, 2050);
    }

    #[test]
    fn width_is_monotonic_in_item_counts() {
        for f in 0..50 {
            for d in 0..50 {
                let w = select_tier(f, d).width;
                assert!(select_tier(f + 1, d).width >= w);
                assert!(select_tier(f, d + 1).width >= w);
            }
        }
    }

    #[test]
    fn height_covers_taller_section() {
        let tier = select_tier(21, 20);
        // daily needs ceil(20/3) = 7 rows even though featured needs 4
        assert_eq!(canvas_height(&tier, 21, 20), 350 + 530 * 7);
    }

    #[test]
    fn empty_shop_is_header_only() {
        let tier = select_tier(0, 0);
        assert_eq!(canvas_height(&tier, 0, 0), HEADER_HEIGHT);
    }

    #[test]
    fn cells_advance_by_pitch() {
        assert_eq!(cell_origin(20, 3, 0), (20, 350));
        assert_eq!(cell_origin(20, 3, 1), (350, 350));
        assert_eq!(cell_origin(20, 3, 2), (680, 350));
        assert_eq!(cell_origin(20, 3, 3), (20, 880));
        assert_eq!(cell_origin(2075, 6, 7), (2405, 880));
    }

    #[test]
    fn malformed_item_consumes_no_cell() {
        let valid = |name: &str| RawItem {
            name: Some(name.to_string()),
            rarity: Some("rare".to_string()),
            category: Some("outfit".to_string()),
            price: Some(1200),
            image: Some("https://x/img.png".to_string()),
            icon: None,
        };
        let malformed = RawItem {
            name: Some("broken".to_string()),
            ..RawItem::default()
        };
        let items = [valid("a"), valid("b"), malformed, valid("c"), valid("d")];

        let survivors = validate_section(&items, "featured");
        let names: Vec<_> = survivors.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);

        // four cells, contiguous from the section origin; the dropped item
        // left no hole, so "c" sits where the malformed entry would have
        let cells = section_cells(survivors.len(), 20, 3);
        assert_eq!(cells, [(20, 350), (350, 350), (680, 350), (20, 880)]);
    }

    #[test]
    fn featured_block_never_reaches_daily_start() {
        for (f, d) in [(20, 10), (25, 5), (30, 30)] {
            let tier = select_tier(f, d);
            let last_col = tier.featured_columns - 1;
            let (x, _) = cell_origin(FEATURED_START_X, tier.featured_columns, last_col);
            assert!(x + CARD_WIDTH as i64 <= tier.daily_start_x);
        }
    }
}
