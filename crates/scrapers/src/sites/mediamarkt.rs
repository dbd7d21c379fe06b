// ABOUTME: Listing rules for mediamarkt.com.tr search results.
// ABOUTME: The rating is read from the accessible label of the star widget.

use scraper::ElementRef;

use crate::extractors::normalize::{last_decimal, normalize_price, parse_count};
use crate::extractors::select::{first_value, SelectorSpec};
use crate::product::{Product, Site};
use crate::sites::{ExtractContext, ListingRules, SitePolicy};

const LINK: &[SelectorSpec] = &[SelectorSpec::Attr(
    "a[data-test='mms-router-link-product-list-item-link']",
    "href",
)];
const TITLE: &[SelectorSpec] = &[SelectorSpec::Text("p[data-test='product-title']")];
const PRICE: &[SelectorSpec] = &[
    SelectorSpec::Text("div[data-test='mms-price'] span.sc-5a9f6c31-0.cmEuny"),
    SelectorSpec::Text("div[data-test='mms-price']"),
];
// The label reads "... 5 yıldız üzerinden 4.5"; the score is the last number.
const RATING_LABEL: &[SelectorSpec] = &[SelectorSpec::Attr(
    "div[data-test='mms-customer-rating']",
    "aria-label",
)];
const REVIEWS: &[SelectorSpec] = &[SelectorSpec::Text(
    "span[data-test='mms-customer-rating-count']",
)];
const IMAGE: &[SelectorSpec] = &[SelectorSpec::Attr("picture img", "src")];

#[derive(Debug, Clone, Copy, Default)]
pub struct MediaMarkt;

impl ListingRules for MediaMarkt {
    fn site(&self) -> Site {
        Site::MediaMarkt
    }

    fn policy(&self) -> SitePolicy {
        SitePolicy {
            skip_incomplete: true,
            synthesize_rating: false,
        }
    }

    fn search_url(&self, base: &str, query: &str) -> String {
        format!("{base}/tr/search.html?query={query}")
    }

    fn fragment_selector(&self) -> &'static str {
        "div.sc-43f40bb6-0.QXAyC"
    }

    fn extract(&self, fragment: ElementRef<'_>, ctx: &ExtractContext<'_>) -> Option<Product> {
        let href = ctx.required(first_value(fragment, LINK), "url")?;
        let title = ctx.required(first_value(fragment, TITLE), "title")?;
        let rating = first_value(fragment, RATING_LABEL).and_then(|l| last_decimal(&l));

        Some(Product {
            title,
            price: first_value(fragment, PRICE)
                .map(|p| normalize_price(&p))
                .unwrap_or_default(),
            rating: ctx.rating(rating),
            reviews_count: first_value(fragment, REVIEWS)
                .map(|c| parse_count(&c))
                .unwrap_or(0),
            url: ctx.resolve(&href),
            image_url: first_value(fragment, IMAGE).unwrap_or_default(),
            ..ctx.product()
        })
    }
}
