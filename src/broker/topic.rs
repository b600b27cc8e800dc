//! Topic management
//!
//! A `Topic` is one distinct canonical title, plain or wildcard, together with
//! the clients subscribed to it. Wildcard topics carry the matcher compiled
//! from their segments.
//!
//! Concurrency note: callers must synchronize access to `Topic` (the registry
//! holds every topic behind its lock).

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::broker::matcher::TitleMatcher;
use crate::broker::title::CanonicalTitle;
use crate::utils::error::RegistryError;

pub type ClientId = i64;

/// Return code reported for a title that could not be subscribed.
pub const SUBSCRIBE_FAILED: u8 = 0x80;

/// Delivery tier negotiated when a topic is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SubscribeLevel {
    #[default]
    Qos0 = 0x00,
    Qos1 = 0x01,
    Qos2 = 0x02,
}

impl SubscribeLevel {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::Qos0),
            0x01 => Some(Self::Qos1),
            0x02 => Some(Self::Qos2),
            _ => None,
        }
    }
}

impl TryFrom<u8> for SubscribeLevel {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(code)
    }
}

impl Serialize for SubscribeLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

pub(crate) fn now_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

#[derive(Debug)]
pub struct Topic {
    title: String,
    segments: Vec<String>,
    matcher: Option<TitleMatcher>,
    subscribers: HashMap<ClientId, i64>,
    level: SubscribeLevel,
    created_at: i64,
}

impl Topic {
    /// Create an empty topic for `canonical`, compiling its matcher when the
    /// title holds wildcards.
    pub fn new(canonical: CanonicalTitle) -> Result<Self, RegistryError> {
        let (title, wildcard, segments) = canonical.into_parts();
        let matcher = if wildcard {
            Some(TitleMatcher::compile(&segments)?)
        } else {
            None
        };
        Ok(Self {
            title,
            segments,
            matcher,
            subscribers: HashMap::new(),
            level: SubscribeLevel::default(),
            created_at: now_nanos(),
        })
    }

    pub fn is_wildcard(&self) -> bool {
        self.matcher.is_some()
    }

    /// Whether a published canonical title reaches this topic. Plain topics
    /// compare by equality.
    pub fn match_title(&self, candidate: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.matches(candidate),
            None => self.title == candidate,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Add a subscriber, refreshing its timestamp if already present.
    pub fn add_client(&mut self, id: ClientId) {
        self.subscribers.insert(id, now_nanos());
    }

    /// Remove a subscriber and return how many remain.
    pub fn remove_client(&mut self, id: ClientId) -> usize {
        self.subscribers.remove(&id);
        self.subscribers.len()
    }

    /// Subscribers mapped to the time (ns since epoch) they subscribed.
    pub fn clients(&self) -> &HashMap<ClientId, i64> {
        &self.subscribers
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn level(&self) -> SubscribeLevel {
        self.level
    }

    pub fn set_level(&mut self, level: SubscribeLevel) {
        self.level = level;
    }

    /// Set the level from a raw return code; unknown codes are ignored.
    pub fn set_level_code(&mut self, code: u8) {
        if let Some(level) = SubscribeLevel::from_code(code) {
            self.level = level;
        }
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            title: self.title.clone(),
            wildcard: self.is_wildcard(),
            level: self.level,
            subscribers: self.subscribers.len(),
            created_at: self.created_at,
        }
    }
}

/// Point-in-time view of a topic returned by the listing calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub title: String,
    pub wildcard: bool,
    pub level: SubscribeLevel,
    pub subscribers: usize,
    pub created_at: i64,
}
