//! Placeholder expansion for dependency templates.
//!
//! Templates use `{N}` to splice the pattern's Nth capture group (counted
//! from zero) into a child name, with `{{` and `}}` as literal braces.
//! Named placeholders parse here too; whether any are accepted is up to the
//! caller's validation pass.

use crate::error::Error;

/// One parsed segment of a template string.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Literal(&'a str),
    Group(usize),
    Named(&'a str),
}

/// Split a template into literal and placeholder pieces.
///
/// Fails on unbalanced or empty braces. Braces are ASCII, so byte-indexed
/// slicing below always lands on a char boundary.
pub(crate) fn parse(template: &str) -> Result<Vec<Piece<'_>>, Error> {
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                pieces.push(Piece::Literal(&template[literal_start..=i]));
                i += 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                pieces.push(Piece::Literal(&template[literal_start..=i]));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                pieces.push(Piece::Literal(&template[literal_start..i]));
                let close = template[i..]
                    .find('}')
                    .ok_or_else(|| malformed(template))?;
                let name = &template[i + 1..i + close];
                if name.is_empty() {
                    return Err(malformed(template));
                }
                match name.parse::<usize>() {
                    Ok(index) => pieces.push(Piece::Group(index)),
                    Err(_) => pieces.push(Piece::Named(name)),
                }
                i += close + 1;
                literal_start = i;
            }
            b'}' => return Err(malformed(template)),
            _ => i += 1,
        }
    }

    pieces.push(Piece::Literal(&template[literal_start..]));
    Ok(pieces)
}

/// Check that `template` only uses `{N}` placeholders that the pattern can
/// supply. Dependency templates have no named placeholders.
pub(crate) fn validate_groups(template: &str, group_count: usize) -> Result<(), Error> {
    for piece in parse(template)? {
        match piece {
            Piece::Literal(_) => {}
            Piece::Group(index) if index < group_count => {}
            Piece::Group(index) => {
                return Err(Error::MakefileUsage(format!(
                    "Template '{template}' uses capture group {index} but the pattern only captures {group_count}"
                )));
            }
            Piece::Named(name) => {
                return Err(Error::MakefileUsage(format!(
                    "Template '{template}' uses unknown placeholder '{{{name}}}'"
                )));
            }
        }
    }
    Ok(())
}

/// Substitute capture groups into a template validated by
/// [`validate_groups`]. A group the match did not populate renders empty.
pub(crate) fn expand_groups(template: &str, groups: &[&str]) -> String {
    let Ok(pieces) = parse(template) else {
        return template.to_string();
    };
    let mut expanded = String::with_capacity(template.len());
    for piece in pieces {
        match piece {
            Piece::Literal(text) => expanded.push_str(text),
            Piece::Group(index) => expanded.push_str(groups.get(index).copied().unwrap_or("")),
            Piece::Named(_) => {}
        }
    }
    expanded
}

fn malformed(template: &str) -> Error {
    Error::MakefileUsage(format!("Malformed placeholder braces in template '{template}'"))
}
