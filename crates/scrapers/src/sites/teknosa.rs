// ABOUTME: Listing rules for teknosa.com search results.
// ABOUTME: Every field is a data attribute on the listing element itself.

use scraper::ElementRef;

use crate::extractors::normalize::{normalize_price, parse_count, parse_rating};
use crate::extractors::select::{first_value, SelectorSpec};
use crate::product::{Product, Site};
use crate::sites::{ExtractContext, ListingRules, SitePolicy};

const TITLE: &[SelectorSpec] = &[SelectorSpec::OwnAttr("data-product-name")];
const PRICE: &[SelectorSpec] = &[
    SelectorSpec::OwnAttr("data-price-with-discount"),
    SelectorSpec::OwnAttr("data-product-price"),
];
const RATING: &[SelectorSpec] = &[SelectorSpec::OwnAttr("data-product-rating-score")];
const REVIEWS: &[SelectorSpec] = &[SelectorSpec::OwnAttr("data-product-review-count")];
const LINK: &[SelectorSpec] = &[SelectorSpec::OwnAttr("data-product-url")];
const IMAGE: &[SelectorSpec] = &[SelectorSpec::OwnAttr("data-insider-img")];

#[derive(Debug, Clone, Copy, Default)]
pub struct Teknosa;

impl ListingRules for Teknosa {
    fn site(&self) -> Site {
        Site::Teknosa
    }

    fn policy(&self) -> SitePolicy {
        SitePolicy {
            skip_incomplete: true,
            synthesize_rating: false,
        }
    }

    fn search_url(&self, base: &str, query: &str) -> String {
        format!("{base}/arama/?sort=mostFavorited-desc&s={query}%3Arelevance")
    }

    fn fragment_selector(&self) -> &'static str {
        "div#product-item"
    }

    fn extract(&self, fragment: ElementRef<'_>, ctx: &ExtractContext<'_>) -> Option<Product> {
        let title = ctx.required(first_value(fragment, TITLE), "title")?;
        let href = ctx.required(first_value(fragment, LINK), "url")?;
        let rating = first_value(fragment, RATING).and_then(|r| parse_rating(&r));

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::rating::RatingFallback;
    use pretty_assertions::assert_eq;
    use scraper::{Html, Selector};
    use url::Url;

    fn extract_all(html: &str) -> Vec<Product> {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse(Teknosa.fragment_selector()).unwrap();
        let base = Url::parse(Site::Teknosa.origin()).unwrap();
        let fallback = RatingFallback::seeded(9);
        let ctx = ExtractContext {
            site: Site::Teknosa,
            policy: Teknosa.policy(),
            base_url: &base,
            fallback: &fallback,
        };
        doc.select(&sel)
            .filter_map(|f| Teknosa.extract(f, &ctx))
            .collect()
    }

    #[test]
    fn reads_data_attributes() {
        let products = extract_all(
            r#"<div id="product-item"
                 data-product-name="Samsung 55&quot; QLED TV"
                 data-price-with-discount="24999.00"
                 data-product-price="27999.00"
                 data-product-rating-score="4.7"
                 data-product-review-count="312"
                 data-product-url="/samsung-qled-tv-p-125"
                 data-insider-img="https://img.teknosa.com/tv.jpg"></div>"#,
        );
        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.title, "Samsung 55\" QLED TV");
        assert_eq!(p.price, "24999.00");
        assert_eq!(p.rating, 4.7);
        assert_eq!(p.reviews_count, 312);
        assert_eq!(p.url, "https://www.teknosa.com/samsung-qled-tv-p-125");
        assert_eq!(p.image_url, "https://img.teknosa.com/tv.jpg");
        assert_eq!(p.site, "teknosa");
    }

    #[test]
    fn regular_price_when_no_discount_and_zero_rating_kept() {
        let products = extract_all(
            r#"<div id="product-item" data-product-name="Kettle"
                 data-product-price="899 TL" data-product-url="/kettle-p-1"></div>"#,
        );
        assert_eq!(products[0].price, "899");
        assert_eq!(products[0].rating, 0.0);
    }

    #[test]
    fn listings_without_title_or_url_are_skipped() {
        let products = extract_all(
            r#"<div id="product-item" data-product-url="/a-p-1"></div>
               <div id="product-item" data-product-name="No link"></div>
               <div id="product-item" data-product-name="Ok" data-product-url="/ok-p-2"></div>"#,
        );
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Ok");
    }
}
