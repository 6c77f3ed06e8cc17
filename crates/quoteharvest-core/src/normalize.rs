//! Conversion of displayed values into typed values.
//!
//! Every function here is total: malformed input yields `None`, never an error.

/// Suffix multipliers, scanned in this order. The first suffix letter found
/// anywhere in the text wins.
pub const VOLUME_SUFFIXES: [(char, f64); 4] = [
    ('K', 1e3),
    ('M', 1e6),
    ('B', 1e9),
    ('T', 1e12),
];

/// Parse a price, change or ratio as displayed (`"$1,234.50"`, `"(+0.75%)"`).
///
/// Everything outside `[0-9.-]` is dropped before parsing.
pub fn clean_numeric(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse a share volume written plainly (`"12,345"`) or with a K/M/B/T suffix
/// (`"1.2M"`).
pub fn clean_volume(text: &str) -> Option<i64> {
    let upper = text.to_uppercase().replace(',', "");

    for (suffix, multiplier) in VOLUME_SUFFIXES {
        if upper.contains(suffix) {
            let number = upper.replace(suffix, "");
            let value = number.trim().parse::<f64>().ok()?;
            let scaled = (value * multiplier).round();
            return scaled.is_finite().then_some(scaled as i64);
        }
    }

    let digits: String = text
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
}

/// Market cap stays textual; the suffix letter drives categorization later.
pub fn clean_market_cap(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Strip parenthetical segments such as a ticker echo (`"Apple Inc. (AAPL)"`).
pub fn clean_company_name(text: &str) -> Option<String> {
    let mut kept = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                kept.push_str(&rest[..open]);
                kept.push(' ');
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    kept.push_str(rest);

    let name = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

/// Split a displayed range (`"150.10 - 155.25"`) into its bounds.
pub fn clean_range(text: &str) -> (Option<f64>, Option<f64>) {
    let split = text
        .split_once(" - ")
        .or_else(|| text.trim().split_once('-'));
    match split {
        Some((low, high)) => (clean_numeric(low), clean_numeric(high)),
        None => (None, None),
    }
}
