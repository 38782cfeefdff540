//! Rarity styling table: rarity identifier -> display label, accent color
//! and template-file prefix. Pure data; render logic never branches on
//! individual rarities.

use std::collections::HashMap;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RarityStyle {
    pub label: &'static str,
    pub accent: (u8, u8, u8),
    /// File-name prefix of the card templates, e.g. "Legendary" for
    /// `LegendaryBG.png` / `LegendaryOV.png`.
    pub template_prefix: &'static str,
}

const UNKNOWN: RarityStyle = RarityStyle {
    label: "Unknown",
    accent: (255, 255, 255),
    template_prefix: "Unknown",
};

static STYLES: Lazy<HashMap<&'static str, RarityStyle>> = Lazy::new(|| {
    HashMap::from([
        ("frozen series", style("Frozen", (148, 223, 255), "Frozen")),
        ("lava series", style("Lava", (234, 141, 35), "Lava")),
        ("legendary", style("Legendary", (211, 120, 65), "Legendary")),
        ("slurp series", style("Slurp", (0, 233, 176), "Slurp")),
        ("dark", style("Dark", (251, 34, 223), "Dark")),
        ("star wars series", style("Star Wars", (231, 196, 19), "Star wars")),
        ("marvel", style("Marvel", (197, 51, 52), "Marvel")),
        ("dc", style("DC", (84, 117, 199), "Dc")),
        ("icon series", style("Icon", (54, 183, 183), "Icon")),
        ("shadow series", style("Shadow", (113, 113, 113), "Shadow")),
        ("platform series", style("Gaming Legends", (117, 108, 235), "Gaming legends")),
        ("epic", style("Epic", (177, 91, 226), "Epic")),
        ("rare", style("Rare", (73, 172, 242), "Rare")),
        ("uncommon", style("Uncommon", (96, 170, 58), "Uncommon")),
        ("common", style("Common", (190, 190, 190), "Common")),
    ])
});

const fn style(label: &'static str, accent: (u8, u8, u8), prefix: &'static str) -> RarityStyle {
    RarityStyle {
        label,
        accent,
        template_prefix: prefix,
    }
}

/// Case-insensitive lookup; unknown rarities get the white "Unknown" style
/// (and, downstream, the Common template fallback).
pub fn lookup(rarity_key: &str) -> RarityStyle {
    STYLES
        .get(rarity_key.to_lowercase().as_str())
        .copied()
        .unwrap_or(UNKNOWN)
}
