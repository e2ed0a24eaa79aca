//! Number list and `transform` attribute parsing.

use kurbo::{Affine, Point};

use crate::error::{Error, Result};

/// Parse an SVG number list such as `"0 0 512 512"` or `"10,20-5.5.5"`.
pub(crate) fn parse_numbers(value: &str) -> Result<Vec<f64>> {
    let mut numbers = Vec::new();
    let mut token = String::new();
    let mut prev = None;

    for c in value.chars() {
        let separator = c.is_whitespace() || c == ',';
        let starts_number = match c {
            '-' | '+' => !token.is_empty() && !matches!(prev, Some('e' | 'E')),
            '.' => token.contains('.') && !token.contains(['e', 'E']),
            _ => false,
        };
        if separator || starts_number {
            flush(&mut token, &mut numbers)?;
        }
        if !separator {
            token.push(c);
        }
        prev = Some(c);
    }
    flush(&mut token, &mut numbers)?;

    Ok(numbers)
}

fn flush(token: &mut String, numbers: &mut Vec<f64>) -> Result<()> {
    if token.is_empty() {
        return Ok(());
    }
    let value = token.parse::<f64>().map_err(|_| Error::Number(token.clone()))?;
    numbers.push(value);
    token.clear();
    Ok(())
}

/// Parse a length attribute. Only unitless and `px` values are accepted.
pub(crate) fn parse_length(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.trim().parse::<f64>().map_err(|_| Error::Number(value.to_string()))
}

/// Parse a `transform` attribute into a single affine.
///
/// Transforms in the list apply right to left, so `"translate(10) scale(2)"`
/// scales first.
pub(crate) fn parse_transform(value: &str) -> Result<Affine> {
    let invalid = || Error::Transform(value.to_string());

    let mut result = Affine::IDENTITY;
    let mut rest = value.trim();
    while !rest.is_empty() {
        let open = rest.find('(').ok_or_else(invalid)?;
        let close = rest[open..].find(')').map(|i| open + i).ok_or_else(invalid)?;
        let name = rest[..open].trim();
        let args = parse_numbers(&rest[open + 1..close]).map_err(|_| invalid())?;

        let transform = match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Affine::new([a, b, c, d, e, f]),
            ("translate", &[tx]) => Affine::translate((tx, 0.0)),
            ("translate", &[tx, ty]) => Affine::translate((tx, ty)),
            ("scale", &[s]) => Affine::scale(s),
            ("scale", &[sx, sy]) => Affine::scale_non_uniform(sx, sy),
            ("rotate", &[angle]) => Affine::rotate(angle.to_radians()),
            ("rotate", &[angle, cx, cy]) => {
                Affine::rotate_about(angle.to_radians(), Point::new(cx, cy))
            }
            ("skewX", &[angle]) => Affine::skew(angle.to_radians().tan(), 0.0),
            ("skewY", &[angle]) => Affine::skew(0.0, angle.to_radians().tan()),
            _ => return Err(invalid()),
        };
        result = result * transform;

        rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    Ok(result)
}
