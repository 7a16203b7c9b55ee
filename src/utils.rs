use std::fmt::Display;

/// Join any displayable values with `delim`.
pub fn join_display<I, T>(values: I, delim: &str) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(delim);
        }
        out.push_str(&value.to_string());
    }
    out
}

/// Shortest round-trip decimal form, e.g. `5`, `12.5`, `144.930127`.
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// Coordinate form: shortest round-trip decimal, padded to at least two
/// fractional digits (`145.1` -> `145.10`, `145` -> `145.00`).
pub fn format_coord(value: f64) -> String {
    let mut s = value.to_string();
    if !value.is_finite() {
        return s;
    }
    match s.find('.') {
        Some(dot) => {
            let decimals = s.len() - dot - 1;
            for _ in decimals..2 {
                s.push('0');
            }
        }
        None => s.push_str(".00"),
    }
    s
}

/// Substring check that tolerates non-UTF-8 bodies.
pub fn body_contains(body: &[u8], needle: &str) -> bool {
    String::from_utf8_lossy(body).contains(needle)
}
