//! String helpers used by the built-in rules.

/// Extension methods for string slices.
pub trait StrExt {
    /// Trims the string, turns non-breaking and other Unicode spaces into
    /// plain spaces, and collapses whitespace runs into a single space.
    fn prepared(&self) -> String;

    /// `true` if the string is empty after preparation.
    fn is_blank(&self) -> bool;

    /// Parses a number written with an optional sign, `.` or `,` as the
    /// decimal separator, and spaces or underscores as digit grouping.
    fn parse_number(&self) -> Option<f64>;

    /// Like [`StrExt::parse_number`] but rejects fractional input.
    fn parse_integer(&self) -> Option<i128>;
}

impl StrExt for str {
    fn prepared(&self) -> String {
        let mut out = String::with_capacity(self.len());
        let mut pending_space = false;
        for c in self.chars() {
            if c.is_whitespace() {
                pending_space = !out.is_empty();
                continue;
            }
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
        out
    }

    fn is_blank(&self) -> bool {
        self.chars().all(char::is_whitespace)
    }

    fn parse_number(&self) -> Option<f64> {
        let normalized = normalize_number(self)?;
        normalized.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn parse_integer(&self) -> Option<i128> {
        let normalized = normalize_number(self)?;
        if normalized.contains('.') {
            return None;
        }
        normalized.parse::<i128>().ok()
    }
}

/// Rewrites `s` into the form Rust's parsers accept, or `None` if it cannot
/// be a number.
fn normalize_number(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(trimmed.len());
    let mut seen_digit = false;
    let mut seen_separator = false;
    for (i, c) in trimmed.chars().enumerate() {
        match c {
            '+' | '-' if i == 0 => out.push(c),
            '0'..='9' => {
                seen_digit = true;
                out.push(c);
            }
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                out.push('.');
            }
            '_' => {}
            c if c.is_whitespace() && seen_digit => {}
            _ => return None,
        }
    }
    seen_digit.then_some(out)
}
