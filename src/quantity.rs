use serde_json::Value;

/// How a scale suffix applies to the numeric prefix of a quantity.
///
/// Sub-unit scales divide by a power of ten rather than multiplying by its
/// inexact reciprocal, so that `"200u"` resolves to exactly `0.0002`.
enum Scale {
    Divide(f64),
    Multiply(f64),
}

fn scale_for_suffix(suffix: char) -> Option<Scale> {
    match suffix {
        'u' => Some(Scale::Divide(1e6)),
        'm' => Some(Scale::Divide(1e3)),
        'K' => Some(Scale::Multiply(1e3)),
        'M' => Some(Scale::Multiply(1e6)),
        _ => None,
    }
}

/// Parses a decimal string with an optional trailing scale suffix.
///
/// Recognized suffixes are `u` (1e-6), `m` (1e-3), `K` (1e3) and `M` (1e6).
/// Non-finite spellings such as `inf` or `NaN` are not quantities.
///
/// ```
/// use jsoncheck::parse_quantity;
///
/// assert_eq!(Some(0.75), parse_quantity("750m"));
/// assert_eq!(Some(200000.0), parse_quantity("200K"));
/// assert_eq!(Some(12.5), parse_quantity("12.5"));
/// assert_eq!(None, parse_quantity("200X"));
/// ```
pub fn parse_quantity(s: &str) -> Option<f64> {
    let scale = s.chars().last().and_then(scale_for_suffix);

    let digits = match scale {
        Some(_) => &s[..s.len() - 1],
        None => s,
    };

    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(match scale {
        Some(Scale::Divide(factor)) => value / factor,
        Some(Scale::Multiply(factor)) => value * factor,
        None => value,
    })
}

/// Resolves a JSON value to a numeric magnitude.
///
/// Numbers are returned unchanged and strings go through [`parse_quantity`].
/// Any other kind of value has no magnitude.
pub fn parse_magnitude(value: &Value) -> Option<f64> {
    magnitude_of(value.as_f64(), value.as_str())
}

/// A number is its own magnitude; a string is parsed as a quantity.
pub(crate) fn magnitude_of(number: Option<f64>, string: Option<&str>) -> Option<f64> {
    number.or_else(|| string.and_then(parse_quantity))
}
