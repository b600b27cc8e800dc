//! Wildcard title matchers
//!
//! A wildcard topic compiles its segment list into an anchored regex once, at
//! topic creation, and evaluates it against every canonical title published
//! while the topic lives.
//!
//! - `+` matches exactly one segment
//! - `#` (always last) matches one or more trailing segments
//! - a literal segment matches itself

use once_cell::sync::Lazy;
use regex::Regex;

use crate::broker::title::{MULTI_LEVEL, SEGMENT_PATTERN, SINGLE_LEVEL};
use crate::utils::error::RegistryError;

static MULTI_PATTERN: Lazy<String> =
    Lazy::new(|| format!("({SEGMENT_PATTERN}/)*{SEGMENT_PATTERN}"));

/// `/#`: any non-root title.
static ANY_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^/{}$", *MULTI_PATTERN)).expect("multi-level regex"));

/// `/+`: any single-segment title.
static ANY_SINGLE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^/{SEGMENT_PATTERN}$")).expect("single-level regex"));

#[derive(Debug, Clone)]
pub struct TitleMatcher {
    regex: Regex,
}

impl TitleMatcher {
    /// Compile the segments of a canonical wildcard title.
    pub fn compile(segments: &[String]) -> Result<Self, RegistryError> {
        match segments {
            [only] if only == MULTI_LEVEL => {
                return Ok(Self {
                    regex: ANY_TITLE.clone(),
                });
            }
            [only] if only == SINGLE_LEVEL => {
                return Ok(Self {
                    regex: ANY_SINGLE_SEGMENT.clone(),
                });
            }
            _ => {}
        }

        let mut pattern = String::from("^");
        for segment in segments {
            pattern.push('/');
            match segment.as_str() {
                MULTI_LEVEL => pattern.push_str(&MULTI_PATTERN),
                SINGLE_LEVEL => pattern.push_str(SEGMENT_PATTERN),
                literal => pattern.push_str(&regex::escape(literal)),
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| RegistryError::Pattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// Whether the canonical title `candidate` is covered by this matcher.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
