//! `{namespace.name}` placeholders inside rule declarations.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Color(&'a str),
    Metric(&'a str),
}

/// Splits a template into literal text and placeholders.
///
/// Only the `colors.` and `metrics.` namespaces exist; anything else between
/// braces, an unterminated brace or an empty name is rejected. `rule` is used
/// for error reporting only.
pub fn tokenize<'a>(rule: &str, template: &'a str) -> Result<Vec<Segment<'a>>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            segments.push(Segment::Text(&rest[..open]));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| Error::malformed(rule, "unterminated placeholder"))?;
        let token = &after[..close];
        if token.contains('{') {
            return Err(Error::malformed(rule, format!("nested brace in {{{token}}}")));
        }
        segments.push(parse_token(rule, token)?);
        rest = &after[close + 1..];
    }

    if rest.contains('}') {
        return Err(Error::malformed(rule, "unbalanced closing brace"));
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    Ok(segments)
}

fn parse_token<'a>(rule: &str, token: &'a str) -> Result<Segment<'a>> {
    let segment = if let Some(key) = token.strip_prefix("colors.") {
        Segment::Color(key)
    } else if let Some(name) = token.strip_prefix("metrics.") {
        Segment::Metric(name)
    } else {
        return Err(Error::malformed(rule, format!("unknown token {{{token}}}")));
    };

    match segment {
        Segment::Color(name) | Segment::Metric(name)
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            Err(Error::malformed(rule, format!("invalid name in {{{token}}}")))
        }
        other => Ok(other),
    }
}
