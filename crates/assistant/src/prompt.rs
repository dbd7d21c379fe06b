// ABOUTME: Builds the instruction prompt sent to the assistant.
// ABOUTME: One summary line per product followed by the user's question and the reply schema.

use std::fmt::Write;

use smartyshop_scrapers::Product;

/// Most products the assistant may pick for a recommendation.
pub const MAX_RECOMMENDED: usize = 50;

/// `- Title: <t>, Price: <p>, Rating: <r>, Reviews: <n>, URL: <u>` with a one-decimal rating.
pub fn product_line(product: &Product) -> String {
    format!(
        "- Title: {}, Price: {}, Rating: {:.1}, Reviews: {}, URL: {}",
        product.title, product.price, product.rating, product.reviews_count, product.url
    )
}

pub fn build_prompt(products: &[Product], question: &str) -> String {
    let mut list = String::new();
    for product in products {
        let _ = writeln!(list, "{}", product_line(product));
    }

    format!(
        r#"You are an expert shopping assistant. Analyze the product list below and answer the user's question.

When the user asks for a recommendation, a selection or a ranking, choose up to {MAX_RECOMMENDED} of the best products from the list, judging by title, rating and number of reviews.

If the list is empty or does not contain what the user is looking for, answer from your general product knowledge and return an empty "products" array.

Respond with a single raw JSON object and nothing else. Do not wrap it in markdown code fences such as ```json. The object must have exactly this structure:
{{
  "answer": "Your answer to the user's question, summarizing findings or recommendations.",
  "products": [
    {{
      "title": "Product Title",
      "price": "Product Price",
      "rating": 4.5,
      "reviews_count": 120,
      "url": "Product URL",
      "image_url": "Image URL",
      "description": "Product Description",
      "site": "Site Name"
    }}
  ]
}}

User question: {question}

Products:
{list}"#
    )
}
