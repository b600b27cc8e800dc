use std::collections::{HashMap, HashSet};

use crate::broker::topic::ClientId;

/// Where a subscribed topic lives in the registry: which index and under
/// which canonical title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicKey {
    pub title: String,
    pub wildcard: bool,
}

impl TopicKey {
    pub fn new(title: impl Into<String>, wildcard: bool) -> Self {
        Self {
            title: title.into(),
            wildcard,
        }
    }
}

/// Subscriptions held by one client.
///
/// Entries are keyed by the title exactly as the client sent it, so `a/b`
/// and `/a/b` are separate entries that resolve to the same topic.
#[derive(Debug)]
pub struct ClientEntry {
    pub id: ClientId,
    topics: HashMap<String, TopicKey>,
}

impl ClientEntry {
    pub fn new(id: ClientId) -> Self {
        Self {
            id,
            topics: HashMap::new(),
        }
    }

    /// Record a subscription. An existing entry for `raw` is kept as is.
    pub fn insert(&mut self, raw: &str, key: TopicKey) -> bool {
        if self.topics.contains_key(raw) {
            return false;
        }
        self.topics.insert(raw.to_string(), key);
        true
    }

    pub fn remove(&mut self, raw: &str) -> Option<TopicKey> {
        self.topics.remove(raw)
    }

    pub fn get(&self, raw: &str) -> Option<&TopicKey> {
        self.topics.get(raw)
    }

    /// Whether any remaining raw title still resolves to `key`.
    pub fn references(&self, key: &TopicKey) -> bool {
        self.topics.values().any(|k| k == key)
    }

    /// Distinct topics this client is subscribed to.
    pub fn topic_keys(&self) -> HashSet<&TopicKey> {
        self.topics.values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TopicKey)> {
        self.topics.iter().map(|(raw, key)| (raw.as_str(), key))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
