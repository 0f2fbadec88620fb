//! Message template interpolation.
//!
//! Templates reference the argument list `[value, ...extra]` by position:
//!
//! | Placeholder | Renders |
//! |-------------|---------|
//! | `{1}` | argument 1, or nothing when absent |
//! | `{1:'field'}` | argument 1, or the literal `field` when absent |
//! | `{1:0}` | argument 1, or argument 0 when absent |
//!
//! A backslash before `{` emits the brace literally, so `\{1}` renders as
//! `{1}`. Braces that do not form a placeholder are copied verbatim.

use crate::value::Value;

/// Interpolate `template` against `args`.
///
/// ```
/// use formkit::validation::format_message;
///
/// let args = [Some("".into()), Some("Name".into())];
/// assert_eq!(format_message("{1:0} must not be empty", &args), "Name must not be empty");
/// ```
pub fn format_message(template: &str, args: &[Option<Value>]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '\\']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(escaped) = tail.strip_prefix("\\{") {
            out.push('{');
            rest = escaped;
            continue;
        }
        if let Some(after_backslash) = tail.strip_prefix('\\') {
            out.push('\\');
            rest = after_backslash;
            continue;
        }
        match parse_placeholder(tail) {
            Some((placeholder, len)) => {
                out.push_str(&placeholder.render(args));
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape `text` so it renders verbatim when embedded in a template.
pub fn escape(text: &str) -> String {
    text.replace('{', "\\{")
}

#[derive(Debug, PartialEq)]
enum Fallback<'a> {
    None,
    Literal(&'a str),
    Arg(usize),
}

#[derive(Debug, PartialEq)]
struct Placeholder<'a> {
    index: usize,
    fallback: Fallback<'a>,
}

impl Placeholder<'_> {
    fn render(&self, args: &[Option<Value>]) -> String {
        let arg = |i: usize| args.get(i).and_then(Option::as_ref);
        match (arg(self.index), &self.fallback) {
            (Some(value), _) => value.to_string(),
            (None, Fallback::Literal(literal)) => (*literal).to_string(),
            (None, Fallback::Arg(other)) => arg(*other).map(Value::to_string).unwrap_or_default(),
            (None, Fallback::None) => String::new(),
        }
    }
}

/// Parse a placeholder at the start of `s`, returning it and its byte length.
fn parse_placeholder(s: &str) -> Option<(Placeholder<'_>, usize)> {
    let body = s.strip_prefix('{')?;
    let (index, mut pos) = leading_number(body)?;
    let fallback = match body[pos..].strip_prefix(':') {
        Some(rest) => {
            pos += 1;
            if let Some(quoted) = rest.strip_prefix('\'') {
                let end = quoted.find('\'')?;
                pos += end + 2;
                Fallback::Literal(&quoted[..end])
            } else {
                let (other, len) = leading_number(rest)?;
                pos += len;
                Fallback::Arg(other)
            }
        }
        None => Fallback::None,
    };
    if !body[pos..].starts_with('}') {
        return None;
    }
    Some((Placeholder { index, fallback }, pos + 2))
}

fn leading_number(s: &str) -> Option<(usize, usize)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    s[..len].parse().ok().map(|n| (n, len))
}
