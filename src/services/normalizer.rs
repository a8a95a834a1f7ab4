//! Name and amount normalization
//!
//! Upstream pages publish amounts in Argentine notation ("$ 1.485,50") while
//! JSON APIs send plain numbers. Everything funnels through [`parse_amount`]
//! before it reaches a quote set.

/// Normalize an upstream name for lookup: trim, collapse whitespace, lowercase.
///
/// # Examples
/// ```
/// use pizarra::services::normalizer::normalize_name;
///
/// assert_eq!(normalize_name("  Contado con   Liquidación "), "contado con liquidación");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parse an amount written either in plain or Argentine notation.
///
/// Rules:
/// - Optional leading "$" or "US$" and surrounding spaces are ignored.
/// - With a comma present, dots are thousands separators and the comma is
///   the decimal mark: "1.040,50" → 1040.5
/// - Several dots are thousands separators: "1.234.567" → 1234567
/// - A single dot followed by exactly three digits is a thousands
///   separator: "1.485" → 1485. Otherwise it is the decimal mark.
///
/// Returns `None` for anything else, including non-finite results.
///
/// # Examples
/// ```
/// use pizarra::services::normalizer::parse_amount;
///
/// assert_eq!(parse_amount("$ 1.485,50"), Some(1485.5));
/// assert_eq!(parse_amount("1040.00"), Some(1040.0));
/// assert_eq!(parse_amount("n/d"), None);
/// ```
pub fn parse_amount(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("US$")
        .or_else(|| trimmed.strip_prefix('$'))
        .unwrap_or(trimmed)
        .trim_start();

    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, body),
    };

    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let canonical = if body.contains(',') {
        body.replace('.', "").replace(',', ".")
    } else {
        match body.matches('.').count() {
            0 => body.to_string(),
            1 => {
                let decimals = body.len() - body.find('.')? - 1;
                if decimals == 3 {
                    body.replace('.', "")
                } else {
                    body.to_string()
                }
            }
            _ => body.replace('.', ""),
        }
    };

    let value: f64 = canonical.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Parse a percentage such as "2,7%" or "118,3 %". The sign is optional.
pub fn parse_percent(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    parse_amount(trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end())
}

/// Format an amount in Argentine notation with two decimals.
///
/// # Examples
/// - 1040.5 → "1.040,50"
/// - 1234567.891 → "1.234.567,89"
/// - 0.0 → "0,00"
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    let digits: Vec<char> = whole.chars().collect();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{},{:02}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== normalize_name ==========

    #[test]
    fn test_normalize_name_trims_and_lowercases() {
        assert_eq!(normalize_name(" Oficial "), "oficial");
    }

    #[test]
    fn test_normalize_name_collapses_inner_whitespace() {
        assert_eq!(
            normalize_name("Contado\tcon \n Liquidación"),
            "contado con liquidación"
        );
    }

    #[test]
    fn test_normalize_name_keeps_accents() {
        assert_eq!(normalize_name("LIQUIDACIÓN"), "liquidación");
    }

    // ========== parse_amount ==========

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!(parse_amount("1490"), Some(1490.0));
    }

    #[test]
    fn test_parse_plain_decimal() {
        assert_eq!(parse_amount("1040.50"), Some(1040.5));
        assert_eq!(parse_amount("1040.5"), Some(1040.5));
    }

    #[test]
    fn test_parse_argentine_with_decimals() {
        assert_eq!(parse_amount("1.040,50"), Some(1040.5));
        assert_eq!(parse_amount("1485,5"), Some(1485.5));
    }

    #[test]
    fn test_parse_single_dot_three_digits_is_thousands() {
        assert_eq!(parse_amount("1.485"), Some(1485.0));
    }

    #[test]
    fn test_parse_multiple_dots_are_thousands() {
        assert_eq!(parse_amount("1.234.567"), Some(1234567.0));
    }

    #[test]
    fn test_parse_currency_prefixes() {
        assert_eq!(parse_amount("$1.485,00"), Some(1485.0));
        assert_eq!(parse_amount("$ 1.485,00"), Some(1485.0));
        assert_eq!(parse_amount("US$ 12,5"), Some(12.5));
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(parse_amount("-2,5"), Some(-2.5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("not-a-number"), None);
        assert_eq!(parse_amount("1.040,50 ARS"), None);
        assert_eq!(parse_amount(",50"), None);
        assert_eq!(parse_amount("1,2,3"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    // ========== parse_percent ==========

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("2,7%"), Some(2.7));
        assert_eq!(parse_percent(" 118,3 % "), Some(118.3));
        assert_eq!(parse_percent("1.5"), Some(1.5));
        assert_eq!(parse_percent("-0,4%"), Some(-0.4));
        assert_eq!(parse_percent("%"), None);
        assert_eq!(parse_percent("s/d"), None);
    }

    // ========== format_amount ==========

    #[test]
    fn test_format_amount_thousands() {
        assert_eq!(format_amount(1040.5), "1.040,50");
        assert_eq!(format_amount(1234567.891), "1.234.567,89");
    }

    #[test]
    fn test_format_amount_small() {
        assert_eq!(format_amount(0.0), "0,00");
        assert_eq!(format_amount(12.0), "12,00");
        assert_eq!(format_amount(999.999), "1.000,00");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(-1485.5), "-1.485,50");
    }

    #[test]
    fn test_format_then_parse_matches() {
        let text = format_amount(1510.4);
        assert_eq!(parse_amount(&text), Some(1510.4));
    }
}
