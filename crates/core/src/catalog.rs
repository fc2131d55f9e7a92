//! Catalog listing rules.
//!
//! The catalog is stored as one row per sellable variant (size +
//! colorway). Listing pages want one card per silhouette and fit, so
//! [`group_variants`] folds the flat rows into [`ProductGroup`]s.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Gender, Money, ParseEnumError, ProductId, VariantId};

/// Broad color family used for filtering listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBucket {
    Black,
    White,
    Grey,
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Pink,
    Purple,
    Brown,
}

const KEYWORDS: &[(ColorBucket, &[&str])] = &[
    (ColorBucket::Black, &["black", "onyx", "obsidian", "noir", "jet", "bred"]),
    (ColorBucket::White, &["white", "sail", "ivory", "cream", "bone", "summit", "phantom"]),
    (
        ColorBucket::Grey,
        &["grey", "gray", "silver", "cement", "anthracite", "wolf", "smoke", "pewter", "graphite"],
    ),
    (
        ColorBucket::Red,
        &["red", "crimson", "cardinal", "burgundy", "maroon", "infrared", "scarlet", "chicago"],
    ),
    (ColorBucket::Blue, &["blue", "navy", "royal", "cobalt", "teal", "aqua", "unc"]),
    (ColorBucket::Green, &["green", "olive", "mint", "forest", "pine", "sage"]),
    (ColorBucket::Yellow, &["yellow", "gold", "volt", "lemon", "maize"]),
    (ColorBucket::Orange, &["orange", "tangerine", "copper", "rust"]),
    (ColorBucket::Pink, &["pink", "rose", "coral", "fuchsia", "magenta", "salmon"]),
    (ColorBucket::Purple, &["purple", "violet", "lilac", "lavender", "grape", "indigo"]),
    (
        ColorBucket::Brown,
        &["brown", "tan", "khaki", "mocha", "chocolate", "wheat", "sand", "beige", "tobacco"],
    ),
];

impl ColorBucket {
    pub const ALL: [Self; 11] = [
        Self::Black,
        Self::White,
        Self::Grey,
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Orange,
        Self::Pink,
        Self::Purple,
        Self::Brown,
    ];

    fn of_token(token: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(_, words)| words.contains(&token))
            .map(|(bucket, _)| *bucket)
    }

    /// Every family a colorway names, in the order they appear.
    ///
    /// `"Black/White-University Red"` → `[Black, White, Red]`.
    #[must_use]
    pub fn families(colorway: &str) -> Vec<Self> {
        let mut found = Vec::new();
        for token in colorway
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            if let Some(bucket) = Self::of_token(&token.to_lowercase())
                && !found.contains(&bucket)
            {
                found.push(bucket);
            }
        }
        found
    }

    /// The primary family: colorways list the base color first.
    #[must_use]
    pub fn classify(colorway: &str) -> Option<Self> {
        Self::families(colorway).into_iter().next()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Grey => "grey",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Brown => "brown",
        }
    }
}

impl std::str::FromStr for ColorBucket {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = if wanted == "gray" { "grey".to_owned() } else { wanted };
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == wanted)
            .ok_or_else(|| ParseEnumError::new("color", s))
    }
}

impl std::fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sellable variant, as read from the catalog join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantListing {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub silhouette: String,
    pub brand: String,
    pub gender: Gender,
    pub sku: String,
    pub size: String,
    pub colorway: Option<String>,
    pub price: Money,
    pub image_url: Option<String>,
    pub in_stock: bool,
}

/// One listing card: a silhouette in one fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductGroup {
    /// First product seen for this silhouette and fit.
    pub product_id: ProductId,
    pub silhouette: String,
    pub brand: String,
    pub gender: Gender,
    /// Lowest variant price, shown as "from $X".
    pub price: Money,
    /// First non-empty variant image.
    pub image_url: Option<String>,
    pub sizes: Vec<String>,
    pub colorways: Vec<String>,
    pub colors: Vec<ColorBucket>,
    pub variant_count: usize,
    pub in_stock: bool,
}

impl ProductGroup {
    fn start(row: VariantListing) -> Self {
        let mut group = Self {
            product_id: row.product_id,
            silhouette: row.silhouette.trim().to_owned(),
            brand: row.brand.clone(),
            gender: row.gender,
            price: row.price,
            image_url: None,
            sizes: Vec::new(),
            colorways: Vec::new(),
            colors: Vec::new(),
            variant_count: 0,
            in_stock: false,
        };
        group.absorb(row);
        group
    }

    fn absorb(&mut self, row: VariantListing) {
        self.variant_count += 1;
        self.price = self.price.min(row.price);
        self.in_stock |= row.in_stock;

        if self.image_url.is_none() {
            self.image_url = row.image_url.filter(|url| !url.trim().is_empty());
        }

        let size = row.size.trim();
        if !size.is_empty() && !self.sizes.iter().any(|s| s == size) {
            self.sizes.push(size.to_owned());
        }

        if let Some(colorway) = row.colorway.as_deref().map(str::trim)
            && !colorway.is_empty()
            && !self.colorways.iter().any(|c| c == colorway)
        {
            for bucket in ColorBucket::families(colorway) {
                if !self.colors.contains(&bucket) {
                    self.colors.push(bucket);
                }
            }
            self.colorways.push(colorway.to_owned());
        }
    }

    /// Whether any variant in the group is in the given color family.
    #[must_use]
    pub fn has_color(&self, bucket: ColorBucket) -> bool {
        self.colors.contains(&bucket)
    }
}

/// Group flat variant rows by silhouette (case-insensitive) and gender.
///
/// Groups keep the order in which their first row appeared.
#[must_use]
pub fn group_variants(rows: impl IntoIterator<Item = VariantListing>) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = Vec::new();
    let mut index: HashMap<(String, Gender), usize> = HashMap::new();

    for row in rows {
        let key = (row.silhouette.trim().to_lowercase(), row.gender);
        match index.get(&key).and_then(|&i| groups.get_mut(i)) {
            Some(group) => group.absorb(row),
            None => {
                index.insert(key, groups.len());
                groups.push(ProductGroup::start(row));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(silhouette: &str, gender: Gender, size: &str, cents: i64) -> VariantListing {
        VariantListing {
            product_id: ProductId::new(1),
            variant_id: VariantId::new(1),
            silhouette: silhouette.to_owned(),
            brand: "Nike".to_owned(),
            gender,
            sku: format!("{silhouette}-{size}"),
            size: size.to_owned(),
            colorway: None,
            price: Money::from_cents(cents),
            image_url: None,
            in_stock: true,
        }
    }

    #[test]
    fn test_groups_by_silhouette_and_gender() {
        let groups = group_variants([
            row("Air Max 90", Gender::Men, "42", 13_000),
            row("air max 90 ", Gender::Men, "43", 12_000),
            row("Air Max 90", Gender::Women, "38", 13_000),
            row("Dunk Low", Gender::Men, "42", 11_000),
        ]);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].silhouette, "Air Max 90");
        assert_eq!(groups[0].gender, Gender::Men);
        assert_eq!(groups[0].variant_count, 2);
        assert_eq!(groups[0].sizes, ["42", "43"]);
        assert_eq!(groups[1].gender, Gender::Women);
        assert_eq!(groups[2].silhouette, "Dunk Low");
    }

    #[test]
    fn test_representative_price_is_lowest() {
        let groups = group_variants([
            row("Samba", Gender::Unisex, "40", 10_000),
            row("Samba", Gender::Unisex, "41", 8_500),
            row("Samba", Gender::Unisex, "42", 9_000),
        ]);
        assert_eq!(groups[0].price, Money::from_cents(8_500));
    }

    #[test]
    fn test_representative_image_is_first_non_empty() {
        let mut a = row("Gel-Kayano", Gender::Men, "42", 15_000);
        a.image_url = Some("  ".to_owned());
        let mut b = row("Gel-Kayano", Gender::Men, "43", 15_000);
        b.image_url = Some("https://cdn.example/kayano-43.jpg".to_owned());
        let mut c = row("Gel-Kayano", Gender::Men, "44", 15_000);
        c.image_url = Some("https://cdn.example/kayano-44.jpg".to_owned());

        let groups = group_variants([a, b, c]);
        assert_eq!(
            groups[0].image_url.as_deref(),
            Some("https://cdn.example/kayano-43.jpg")
        );
    }

    #[test]
    fn test_colorways_bucketed() {
        let mut a = row("Jordan 1", Gender::Men, "42", 18_000);
        a.colorway = Some("Black/White-University Red".to_owned());
        let mut b = row("Jordan 1", Gender::Men, "43", 18_000);
        b.colorway = Some("Sail/Olive".to_owned());

        let groups = group_variants([a, b]);
        assert_eq!(
            groups[0].colors,
            [
                ColorBucket::Black,
                ColorBucket::White,
                ColorBucket::Red,
                ColorBucket::Green
            ]
        );
        assert!(groups[0].has_color(ColorBucket::Green));
        assert!(!groups[0].has_color(ColorBucket::Pink));
    }

    #[test]
    fn test_classify_primary_color() {
        assert_eq!(
            ColorBucket::classify("Triple Black"),
            Some(ColorBucket::Black)
        );
        assert_eq!(
            ColorBucket::classify("Summit White/Navy"),
            Some(ColorBucket::White)
        );
        assert_eq!(ColorBucket::classify("Lucky Green"), Some(ColorBucket::Green));
        assert_eq!(ColorBucket::classify("Multi"), None);
    }

    #[test]
    fn test_parse_color_filter() {
        assert_eq!("Gray".parse::<ColorBucket>(), Ok(ColorBucket::Grey));
        assert_eq!("red".parse::<ColorBucket>(), Ok(ColorBucket::Red));
        assert!("plaid".parse::<ColorBucket>().is_err());
    }
}
