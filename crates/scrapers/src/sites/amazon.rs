// ABOUTME: Listing rules for amazon.com.tr search results.
// ABOUTME: Keeps listings with empty titles and synthesizes missing ratings.

use scraper::ElementRef;

use crate::extractors::normalize::{is_digits_only, normalize_price, parse_count, rating_token};
use crate::extractors::select::{first_element, first_value, texts, SelectorSpec};
use crate::product::{Product, Site};
use crate::sites::{ExtractContext, ListingRules, SitePolicy};

const TITLE: &[SelectorSpec] = &[
    SelectorSpec::Attr("h2", "aria-label"),
    SelectorSpec::Text("h2 span"),
];
const PRICE_BLOCK: &str = ".a-price";
const PRICE_WHOLE: &[SelectorSpec] = &[SelectorSpec::Text(".a-price-whole")];
const PRICE_FRACTION: &[SelectorSpec] = &[SelectorSpec::Text(".a-price-fraction")];
const PRICE_OFFSCREEN: &[SelectorSpec] = &[SelectorSpec::Text(".a-price .a-offscreen")];
const IMAGE: &[SelectorSpec] = &[SelectorSpec::Attr("img", "src")];
const LINK: &[SelectorSpec] = &[
    SelectorSpec::Attr("h2 a", "href"),
    SelectorSpec::Attr("a.a-link-normal", "href"),
];
const RATING: &[SelectorSpec] = &[SelectorSpec::Text("span.a-icon-alt")];
/// The rating label reads "5 yıldız üzerinden 4,4"; the score is the fourth word.
const RATING_TOKEN: usize = 3;
const REVIEW_CANDIDATES: &str = "span.a-size-base";

#[derive(Debug, Clone, Copy, Default)]
pub struct Amazon;

impl Amazon {
    /// Whole and fraction parts of the first price block, when both are present.
    fn split_price(fragment: ElementRef<'_>) -> Option<String> {
        let block = first_element(fragment, PRICE_BLOCK)?;
        let whole = first_value(block, PRICE_WHOLE)?;
        let fraction = first_value(block, PRICE_FRACTION)?;
        Some(format!("{whole}{fraction}"))
    }

    /// First review-count candidate made only of digits.
    fn reviews(fragment: ElementRef<'_>) -> u32 {
        texts(fragment, REVIEW_CANDIDATES)
            .into_iter()
            .find(|t| is_digits_only(t))
            .map(|t| parse_count(&t))
            .unwrap_or(0)
    }
}

impl ListingRules for Amazon {
    fn site(&self) -> Site {
        Site::Amazon
    }

    fn policy(&self) -> SitePolicy {
        SitePolicy {
            skip_incomplete: false,
            synthesize_rating: true,
        }
    }

    fn search_url(&self, base: &str, query: &str) -> String {
        format!("{base}/s?k={query}")
    }

    fn fragment_selector(&self) -> &'static str {
        "div[data-component-type='s-search-result']"
    }

    fn extract(&self, fragment: ElementRef<'_>, ctx: &ExtractContext<'_>) -> Option<Product> {
        let title = ctx.required(first_value(fragment, TITLE), "title")?;
        let href = ctx.required(first_value(fragment, LINK), "url")?;
        let price = Self::split_price(fragment)
            .or_else(|| first_value(fragment, PRICE_OFFSCREEN))
            .map(|p| normalize_price(&p))
            .unwrap_or_default();
        let rating = first_value(fragment, RATING).and_then(|t| rating_token(&t, RATING_TOKEN));

        Some(Product {
            title,
            price,
            rating: ctx.rating(rating),
            reviews_count: Self::reviews(fragment),
            url: ctx.resolve(&href),
            image_url: first_value(fragment, IMAGE).unwrap_or_default(),
            ..ctx.product()
        })
    }
}
