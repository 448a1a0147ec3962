use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector syntax at byte {position} in '{selector}'")]
    Unsupported { selector: String, position: usize },
}

/// Comma-separated list of compound selectors (`div.a#b[data-x=y]`).
///
/// Combinators (descendant, child, sibling) and pseudo-classes are not
/// supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

/// What a selector needs to know about an element.
pub(crate) trait Subject {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

impl Selector {
    pub(crate) fn matches(&self, subject: &impl Subject) -> bool {
        self.alternatives.iter().any(|c| c.matches(subject))
    }
}

impl Compound {
    fn matches(&self, subject: &impl Subject) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(subject.tag()) {
                return false;
            }
        }
        if self.ids.iter().any(|id| subject.attr("id") != Some(id.as_str())) {
            return false;
        }
        if self.classes.iter().any(|c| !subject.has_class(c)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|(name, expected)| match (subject.attr(name), expected) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            })
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut alternatives = Vec::new();
        let mut offset = 0;
        for part in raw.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                return Err(SelectorError::Empty);
            }
            let lead = part.len() - part.trim_start().len();
            alternatives.push(parse_compound(trimmed).map_err(|position| {
                SelectorError::Unsupported {
                    selector: raw.to_string(),
                    position: offset + lead + position,
                }
            })?);
            offset += part.len() + 1;
        }
        Ok(Self { alternatives })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(input: &str) -> Result<Compound, usize> {
    let mut compound = Compound::default();
    let bytes: Vec<char> = input.chars().collect();
    let mut pos = 0;

    let read_ident = |pos: &mut usize| -> Result<String, usize> {
        let start = *pos;
        while *pos < bytes.len() && is_ident_char(bytes[*pos]) {
            *pos += 1;
        }
        if start == *pos {
            return Err(start);
        }
        Ok(bytes[start..*pos].iter().collect())
    };

    if pos < bytes.len() && bytes[pos] == '*' {
        pos += 1;
    } else if pos < bytes.len() && is_ident_char(bytes[pos]) {
        compound.tag = Some(read_ident(&mut pos)?);
    }

    while pos < bytes.len() {
        match bytes[pos] {
            '.' => {
                pos += 1;
                compound.classes.push(read_ident(&mut pos)?);
            }
            '#' => {
                pos += 1;
                compound.ids.push(read_ident(&mut pos)?);
            }
            '[' => {
                pos += 1;
                let name = read_ident(&mut pos)?;
                let value = if pos < bytes.len() && bytes[pos] == '=' {
                    pos += 1;
                    Some(read_attr_value(&bytes, &mut pos)?)
                } else {
                    None
                };
                if pos >= bytes.len() || bytes[pos] != ']' {
                    return Err(pos);
                }
                pos += 1;
                compound.attributes.push((name, value));
            }
            _ => return Err(pos),
        }
    }

    Ok(compound)
}

fn read_attr_value(bytes: &[char], pos: &mut usize) -> Result<String, usize> {
    let quote = match bytes.get(*pos) {
        Some(q @ ('"' | '\'')) => Some(*q),
        Some(_) => None,
        None => return Err(*pos),
    };

    if let Some(quote) = quote {
        *pos += 1;
        let start = *pos;
        while *pos < bytes.len() && bytes[*pos] != quote {
            *pos += 1;
        }
        if *pos >= bytes.len() {
            return Err(start);
        }
        let value = bytes[start..*pos].iter().collect();
        *pos += 1;
        Ok(value)
    } else {
        let start = *pos;
        while *pos < bytes.len() && is_ident_char(bytes[*pos]) {
            *pos += 1;
        }
        if start == *pos {
            return Err(start);
        }
        Ok(bytes[start..*pos].iter().collect())
    }
}
