//! Waste categories and where they go
//!
//! The classification service reports one of a small set of upper-case
//! category names. This table maps each to a bin and a handful of
//! disposal tips for display.

use serde::Serialize;

/// Pseudo-category the service reports for fullness checks
pub const BIN_CHECK: &str = "BIN_CHECK";

/// Category reported when no label matched a known material
pub const UNCATEGORIZED: &str = "UNCATEGORIZED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinGuide {
    pub category: &'static str,
    pub bin: &'static str,
    pub recyclable: bool,
    /// Typical labels the service detects for this category
    pub sample_labels: &'static [&'static str],
    pub tips: &'static [&'static str],
}

pub const GUIDES: &[BinGuide] = &[
    BinGuide {
        category: "PLASTIC",
        bin: "Blue bin (dry recyclables)",
        recyclable: true,
        sample_labels: &["plastic bottle", "bottle", "plastic", "container"],
        tips: &[
            "Rinse out food and drink residue",
            "Remove caps and crush bottles flat",
            "Keep plastic bags out of the recycling bin",
        ],
    },
    BinGuide {
        category: "PAPER",
        bin: "Blue bin (dry recyclables)",
        recyclable: true,
        sample_labels: &["paper", "cardboard", "carton", "newspaper"],
        tips: &[
            "Flatten cardboard boxes",
            "Keep paper dry and free of grease",
            "Remove tape and plastic windows where possible",
        ],
    },
    BinGuide {
        category: "ORGANIC",
        bin: "Green bin (wet waste / compost)",
        recyclable: false,
        sample_labels: &["food", "fruit", "banana", "vegetable"],
        tips: &[
            "Compost fruit and vegetable scraps",
            "Drain liquids before disposal",
            "Do not include plastic packaging",
        ],
    },
    BinGuide {
        category: "METAL",
        bin: "Blue bin (dry recyclables)",
        recyclable: true,
        sample_labels: &["can", "tin", "aluminium", "metal"],
        tips: &[
            "Rinse cans before recycling",
            "Aluminium foil can be balled up and recycled",
        ],
    },
    BinGuide {
        category: "GLASS",
        bin: "Glass collection point",
        recyclable: true,
        sample_labels: &["glass", "jar", "glass bottle", "cup"],
        tips: &[
            "Remove lids and rinse jars",
            "Wrap broken glass before disposal",
            "Window glass and ceramics do not belong with bottles",
        ],
    },
    BinGuide {
        category: UNCATEGORIZED,
        bin: "Black bin (general waste)",
        recyclable: false,
        sample_labels: &["waste", "object"],
        tips: &["Check local guidelines for items that could not be classified"],
    },
];

/// Case-insensitive lookup of a reported category
#[cfg(test)]
pub(crate) fn guide_for(category: &str) -> Option<&'static BinGuide> {
    let category = category.trim();
    GUIDES
        .iter()
        .find(|guide| guide.category.eq_ignore_ascii_case(category))
}

/// Categories that describe a material, excluding the uncategorized bucket
pub fn material_categories() -> impl Iterator<Item = &'static BinGuide> {
    GUIDES.iter().filter(|guide| guide.category != UNCATEGORIZED)
}
