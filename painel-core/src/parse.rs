//! Free-text monetary value parsing.
//!
//! Source pages render amounts in inconsistent shapes: BR grouping
//! ("1.234,56"), EN grouping ("1,234.56"), magnitude suffixes ("2,5 mi",
//! "10k"), parenthetical negatives ("(1.000)"), currency prefixes and
//! non-breaking spaces. A cell that cannot be parsed degrades to `None`
//! so one malformed value never discards an otherwise-valid row.

/// Parse a free-text monetary token into a numeric value.
///
/// Returns `None` for empty tokens, dashes, and textual NA markers, and
/// for anything that survives stripping but still fails to parse. The
/// sign is resolved first (parentheses or a leading "-"), the magnitude
/// suffix is applied to the absolute value, and the result is negated
/// last.
pub fn parse_value(token: &str) -> Option<f64> {
    let mut s = token.trim();
    if is_missing(s) {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = s[1..s.len() - 1].trim();
    }

    let stripped = s
        .replace("R$", "")
        .replace("r$", "")
        .replace('\u{a0}', "");
    let s = stripped.trim();
    if is_missing(s) {
        return None;
    }

    let value = match split_token(s) {
        Some((sign_negative, number, suffix)) => {
            if sign_negative {
                negative = true;
            }
            Some(decode_number(number)? * suffix_multiplier(suffix))
        }
        None => fallback_parse(s),
    }?;

    Some(if negative { -value } else { value })
}

fn is_missing(s: &str) -> bool {
    matches!(s, "" | "-" | "—" | "None" | "nan" | "NaN" | "N/A" | "n/a")
}

/// Split a token into (leading-sign-is-negative, numeric part, suffix).
///
/// The token must be: optional sign, a run of digits/"."/",", optional
/// whitespace, and an optional alphabetic or "%" suffix consuming the
/// rest of the string. Anything else rejects the structured path.
fn split_token(s: &str) -> Option<(bool, &str, &str)> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let num_end = rest
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == ','))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if num_end == 0 {
        return None;
    }

    let number = &rest[..num_end];
    let suffix = rest[num_end..].trim_start();
    if !suffix.chars().all(|c| c.is_alphabetic() || c == '%') {
        return None;
    }

    Some((negative, number, suffix))
}

/// Decode a numeric literal with BR or EN separators.
///
/// Whichever of "." / "," appears last is the decimal separator; the
/// other is grouping and is removed. A lone comma is decimal.
fn decode_number(num: &str) -> Option<f64> {
    let cleaned = match (num.rfind('.'), num.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => num.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => num.replace(',', ""),
        (None, Some(_)) => num.replace(',', "."),
        _ => num.to_string(),
    };
    cleaned.parse::<f64>().ok()
}

/// Magnitude multiplier for a (possibly localized) suffix.
fn suffix_multiplier(suffix: &str) -> f64 {
    match suffix.to_lowercase().as_str() {
        "k" | "mil" => 1e3,
        "mi" | "m" | "milhao" | "milhão" | "milhoes" | "milhões" => 1e6,
        "bi" | "b" | "bilhao" | "bilhão" | "bilhoes" | "bilhões" => 1e9,
        _ => 1.0,
    }
}

/// Last resort: strip everything non-numeric, treat comma as decimal.
fn fallback_parse(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect();
    cleaned.replace(',', ".").parse::<f64>().ok()
}
