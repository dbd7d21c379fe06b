// ABOUTME: The normalized Product record and the Site enum naming every supported shop.
// ABOUTME: Product uses snake_case JSON keys shared by the scrapers, the cache and the assistant schema.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A single listing normalized from a site's search results page.
///
/// `price` stays textual: formats vary by site and must survive for display.
/// A `rating` of `0.0` means either "not found" or a genuine zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub reviews_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub site: String,
}

/// Reads an explicit JSON `null` as the field's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The shops with a built-in adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Amazon,
    Trendyol,
    Teknosa,
    MediaMarkt,
}

impl Site {
    pub const ALL: [Site; 4] = [Site::Amazon, Site::Trendyol, Site::Teknosa, Site::MediaMarkt];

    /// The identifier callers use to select this site. Also the provenance tag on products.
    pub fn id(&self) -> &'static str {
        match self {
            Site::Amazon => "amazon",
            Site::Trendyol => "trendyol",
            Site::Teknosa => "teknosa",
            Site::MediaMarkt => "mediamarkt",
        }
    }

    /// Origin that relative product links are resolved against.
    pub fn origin(&self) -> &'static str {
        match self {
            Site::Amazon => "https://www.amazon.com.tr",
            Site::Trendyol => "https://www.trendyol.com",
            Site::Teknosa => "https://www.teknosa.com",
            Site::MediaMarkt => "https://www.mediamarkt.com.tr",
        }
    }

    /// Exact, case-sensitive lookup by identifier.
    pub fn from_id(id: &str) -> Option<Site> {
        Site::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
