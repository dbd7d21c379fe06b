// ABOUTME: Pure text normalizers for prices, ratings, review counts and search queries.
// ABOUTME: None of these ever fail; unparseable input degrades to an empty string, None or zero.

use once_cell::sync::Lazy;
use regex::Regex;

/// Decimal number with either separator, e.g. "4", "4.5", "4,5".
static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("decimal pattern compiles"));

/// Letters that some search endpoints mishandle, paired with their ASCII fold.
const QUERY_FOLDS: &[(char, char)] = &[
    ('ç', 'c'),
    ('Ç', 'C'),
    ('ğ', 'g'),
    ('Ğ', 'G'),
    ('ı', 'i'),
    ('İ', 'I'),
    ('ö', 'o'),
    ('Ö', 'O'),
    ('ş', 's'),
    ('Ş', 'S'),
    ('ü', 'u'),
    ('Ü', 'U'),
];

/// Folds the fixed set of Turkish letters to ASCII. Everything else passes through.
pub fn fold_query(query: &str) -> String {
    query
        .chars()
        .map(|c| {
            QUERY_FOLDS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

/// Normalizes a displayed price to digits with an optional `.` decimal separator.
///
/// Currency symbols, letters and whitespace are dropped. When both `.` and `,`
/// appear the right-most one is the decimal separator. A lone `,` is decimal
/// only when followed by one or two digits; a lone `.` is grouping when followed
/// by exactly three digits or when repeated.
pub fn normalize_price(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let decimal = match (kept.rfind('.'), kept.rfind(',')) {
        (Some(dot), Some(comma)) => Some(dot.max(comma)),
        (None, Some(comma)) => {
            let tail = kept.len() - comma - 1;
            (kept.matches(',').count() == 1 && (1..=2).contains(&tail)).then_some(comma)
        }
        (Some(dot), None) => {
            let tail = kept.len() - dot - 1;
            (kept.matches('.').count() == 1 && tail != 3).then_some(dot)
        }
        (None, None) => None,
    };

    let mut out = String::with_capacity(kept.len());
    for (i, c) in kept.char_indices() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if Some(i) == decimal {
            out.push('.');
        }
    }
    out.trim_end_matches('.').to_string()
}

fn to_rating(number: &str) -> Option<f64> {
    number
        .trim()
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r >= 0.0)
}

/// Parses a bare rating such as "4,3" or "4.3".
pub fn parse_rating(raw: &str) -> Option<f64> {
    to_rating(raw)
}

/// Parses the whitespace-separated token at `index`, e.g. index 3 of "5 yıldız üzerinden 4,4".
pub fn rating_token(raw: &str, index: usize) -> Option<f64> {
    raw.split_whitespace().nth(index).and_then(to_rating)
}

/// Parses the last decimal number embedded in a label such as
/// "Ortalama ürün değerlendirmesi: 5 yıldız üzerinden 3.5".
pub fn last_decimal(raw: &str) -> Option<f64> {
    DECIMAL_RE
        .find_iter(raw)
        .last()
        .and_then(|m| to_rating(m.as_str()))
}

/// Parses a review count, stripping parentheses and digit grouping. Failure yields zero.
pub fn parse_count(raw: &str) -> u32 {
    let cleaned: String = raw
        .trim()
        .trim_matches(|c| c == '(' || c == ')')
        .chars()
        .filter(|c| !matches!(c, '.' | ',') && !c.is_whitespace())
        .collect();
    cleaned.parse().unwrap_or(0)
}

/// True for a non-empty string made only of ASCII digits.
pub fn is_digits_only(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
