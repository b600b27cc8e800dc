//! Topic title validation and canonicalization
//!
//! Raw titles arrive from clients in loose forms (`a/b`, `/a//b/`, `+`,
//! `a/+/#`). `canonicalize` turns them into the single form the registry keys
//! on: a leading `/`, segments of `[0-9a-zA-Z_-]+` or a lone wildcard token,
//! at most 254 bytes.
//!
//! Wildcard normalization:
//! - a bare `#` or `+` is shorthand for `/#` or `/+`
//! - `#` may appear once; any run of `+`, `/` and `#` around it collapses to a
//!   single `#` (so `+/#` and `#/+` both become `#`)
//! - every remaining wildcard token becomes its own segment (`a+b` is `/a/+/b`)

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::TitleError;

/// Separator between title segments, also the leading character of every
/// canonical title.
pub const SEPARATOR: char = '/';

/// Longest canonical title accepted, in bytes.
pub const MAX_TITLE_LEN: usize = 254;

pub const SINGLE_LEVEL: &str = "+";
pub const MULTI_LEVEL: &str = "#";

/// Character class of a literal segment, without anchors.
pub(crate) const SEGMENT_PATTERN: &str = r"[0-9a-zA-Z_\-]+";

static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{SEGMENT_PATTERN}$")).expect("segment regex"));

static WILDCARD_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\+*/*)*#+/*(\+*/*)*").expect("wildcard run regex"));

/// A validated title in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTitle {
    title: String,
    wildcard: bool,
    segments: Vec<String>,
}

impl CanonicalTitle {
    pub fn as_str(&self) -> &str {
        &self.title
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn into_parts(self) -> (String, bool, Vec<String>) {
        (self.title, self.wildcard, self.segments)
    }
}

impl std::fmt::Display for CanonicalTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Validate `raw` and return its canonical form.
pub fn canonicalize(raw: &str) -> Result<CanonicalTitle, TitleError> {
    if raw.len() == 1 && raw.starts_with(SEPARATOR) {
        return Err(TitleError::Root);
    }
    let raw = match raw {
        MULTI_LEVEL => "/#",
        SINGLE_LEVEL => "/+",
        other => other,
    };
    if raw.is_empty() {
        return Err(TitleError::Empty);
    }

    let wildcard = raw.contains(['#', '+']);
    let expanded;
    let working = if wildcard {
        if raw.matches('#').count() > 1 {
            return Err(TitleError::MultipleHash);
        }
        let collapsed = WILDCARD_RUN.replace_all(raw, MULTI_LEVEL);
        expanded = collapsed.replace('#', "/#/").replace('+', "/+/");
        expanded.as_str()
    } else {
        raw
    };

    let trimmed = working.trim().trim_matches(SEPARATOR);
    if trimmed.is_empty() {
        return Err(TitleError::TrimmedEmpty);
    }

    let mut segments = Vec::new();
    for segment in trimmed.split(SEPARATOR).filter(|s| !s.is_empty()) {
        if !is_valid_segment(segment) {
            return Err(TitleError::InvalidSegment {
                segment: segment.to_string(),
            });
        }
        segments.push(segment.to_string());
    }
    if segments.is_empty() {
        return Err(TitleError::NoSegments);
    }
    if let Some(pos) = segments.iter().position(|s| s == MULTI_LEVEL) {
        if pos + 1 != segments.len() {
            return Err(TitleError::HashNotLast);
        }
    }

    let title = format!("{SEPARATOR}{}", segments.join("/"));
    if title.len() > MAX_TITLE_LEN {
        return Err(TitleError::TooLong { len: title.len() });
    }

    Ok(CanonicalTitle {
        title,
        wildcard,
        segments,
    })
}

/// Canonicalize a title a message is being published to. Publish titles name
/// one concrete topic, so wildcard tokens are rejected.
pub fn canonicalize_publish(raw: &str) -> Result<CanonicalTitle, TitleError> {
    let canonical = canonicalize(raw)?;
    if canonical.is_wildcard() {
        return Err(TitleError::WildcardPublish);
    }
    Ok(canonical)
}

fn is_valid_segment(segment: &str) -> bool {
    segment == MULTI_LEVEL || segment == SINGLE_LEVEL || SEGMENT.is_match(segment)
}
