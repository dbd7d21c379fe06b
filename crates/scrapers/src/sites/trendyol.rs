// ABOUTME: Listing rules for trendyol.com search results.
// ABOUTME: Price falls back from the discounted badge to the basket price.

use scraper::ElementRef;

use crate::extractors::normalize::{normalize_price, parse_count, parse_rating};
use crate::extractors::select::{first_value, SelectorSpec};
use crate::product::{Product, Site};
use crate::sites::{ExtractContext, ListingRules, SitePolicy};

const TITLE: &[SelectorSpec] = &[SelectorSpec::Text(".prdct-desc-cntnr-name")];
const DESCRIPTION: &[SelectorSpec] = &[SelectorSpec::Text(".prdct-desc-cntnr-ttl")];
const PRICE: &[SelectorSpec] = &[
    SelectorSpec::Text(".price-item.lowest-price-discounted"),
    SelectorSpec::Text(".price-item.discounted"),
    SelectorSpec::Text(".price-item.basket-price-original"),
];
const IMAGE: &[SelectorSpec] = &[
    SelectorSpec::Attr(".p-card-img", "data-src"),
    SelectorSpec::Attr(".p-card-img", "src"),
];
const LINK: &[SelectorSpec] = &[SelectorSpec::Attr("a", "href")];
const RATING: &[SelectorSpec] = &[SelectorSpec::Text(".rating-score")];
const REVIEWS: &[SelectorSpec] = &[SelectorSpec::Text(".ratingCount")];

#[derive(Debug, Clone, Copy, Default)]
pub struct Trendyol;

impl ListingRules for Trendyol {
    fn site(&self) -> Site {
        Site::Trendyol
    }

    fn policy(&self) -> SitePolicy {
        SitePolicy {
            skip_incomplete: false,
            synthesize_rating: true,
        }
    }

    fn search_url(&self, base: &str, query: &str) -> String {
        format!("{base}/sr?q={query}")
    }

    fn fragment_selector(&self) -> &'static str {
        ".p-card-wrppr"
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
            description: first_value(fragment, DESCRIPTION).unwrap_or_default(),
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
        let sel = Selector::parse(Trendyol.fragment_selector()).unwrap();
        let base = Url::parse(Site::Trendyol.origin()).unwrap();
        let fallback = RatingFallback::seeded(5);
        let ctx = ExtractContext {
            site: Site::Trendyol,
            policy: Trendyol.policy(),
            base_url: &base,
            fallback: &fallback,
        };
        doc.select(&sel)
            .filter_map(|f| Trendyol.extract(f, &ctx))
            .collect()
    }

    #[test]
    fn reads_full_card() {
        let products = extract_all(
            r#"<div class="p-card-wrppr">
                <a href="/apple/iphone-15-p-123">
                  <img class="p-card-img" data-src="https://cdn.dsmcdn.com/a.jpg" src="/placeholder.gif">
                  <span class="prdct-desc-cntnr-ttl">Apple</span>
                  <span class="prdct-desc-cntnr-name">iPhone 15 128 GB</span>
                  <span class="rating-score">4,6</span>
                  <span class="ratingCount">(1.245)</span>
                  <div class="price-item discounted">42.999,00 TL</div>
                  <div class="price-item basket-price-original">45.000 TL</div>
                </a>
            </div>"#,
        );
        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.title, "iPhone 15 128 GB");
        assert_eq!(p.description, "Apple");
        assert_eq!(p.price, "42999.00");
        assert_eq!(p.rating, 4.6);
        assert_eq!(p.reviews_count, 1245);
        assert_eq!(p.url, "https://www.trendyol.com/apple/iphone-15-p-123");
        assert_eq!(p.image_url, "https://cdn.dsmcdn.com/a.jpg");
        assert_eq!(p.site, "trendyol");
    }

    #[test]
    fn basket_price_and_src_fallbacks() {
        let products = extract_all(
            r#"<div class="p-card-wrppr">
                <a href="/x-p-1"><img class="p-card-img" src="https://cdn.dsmcdn.com/b.jpg"></a>
                <span class="prdct-desc-cntnr-name">Kılıf</span>
                <div class="price-item basket-price-original">199,90 TL</div>
            </div>"#,
        );
        let p = &products[0];
        assert_eq!(p.price, "199.90");
        assert_eq!(p.image_url, "https://cdn.dsmcdn.com/b.jpg");
        assert_eq!(p.reviews_count, 0);
        assert!((3.5..=4.9).contains(&p.rating));
    }

    #[test]
    fn incomplete_cards_are_kept() {
        let products = extract_all(r#"<div class="p-card-wrppr"></div><div class="p-card-wrppr"></div>"#);
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| p.title.is_empty() && p.url.is_empty()));
    }
}
