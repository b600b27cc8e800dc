//! Registry engine
//!
//! `TopicRegistry` owns the subscription index:
//! - plain topics keyed by canonical title, matched by exact lookup
//! - wildcard topics keyed by canonical title, matched by scanning their
//!   compiled matchers
//! - per-client entries mapping the titles a client sent to the topics they
//!   resolved to
//!
//! Concurrency and usage notes:
//! - All state sits behind one `RwLock`. Subscribe, unsubscribe and publish
//!   resolution take it exclusively; listings take it shared.
//! - Nothing here blocks or performs I/O, so every call is bounded by the
//!   number of topics or subscribers it touches.
//! - The authorization hook runs while the lock is held. It must not call back
//!   into the registry; the lock is not reentrant and such a call deadlocks.
//! - A topic is created by its first subscriber and evicted with its last, so
//!   no topic in the index ever has an empty subscriber set.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};

use crate::broker::title;
use crate::broker::topic::{ClientId, SUBSCRIBE_FAILED, SubscribeLevel, Topic, TopicSummary};
use crate::client::{ClientEntry, TopicKey};
use crate::utils::error::{AuthorizationError, RegistryError, Result};

/// Authorization callback consulted once per title on subscribe, with the
/// canonical title and the subscribing client.
pub type SubscribeHandle =
    Arc<dyn Fn(&str, ClientId) -> std::result::Result<(), AuthorizationError> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Level for topics this call creates. Existing topics keep theirs.
    pub level: SubscribeLevel,
}

impl SubscribeOptions {
    pub fn with_level(level: SubscribeLevel) -> Self {
        Self { level }
    }

    /// Options from a raw return code; anything but a valid level maps to
    /// `Qos0`.
    pub fn from_code(code: u8) -> Self {
        Self {
            level: SubscribeLevel::from_code(code).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Fail with `TopicNotFound` when no plain topic has the exact title.
    pub check_exists: bool,
}

/// Outcome of subscribing one title.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscribeResult {
    /// Title as the client sent it.
    pub subscribe_title: String,
    /// Canonical title of the topic subscribed to, if any.
    pub topic_title: Option<String>,
    /// Level in effect for the topic.
    pub outcome: std::result::Result<SubscribeLevel, RegistryError>,
}

impl SubscribeResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Wire return code: the level on success, `SUBSCRIBE_FAILED` otherwise.
    pub fn return_code(&self) -> u8 {
        match &self.outcome {
            Ok(level) => level.code(),
            Err(_) => SUBSCRIBE_FAILED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsubscribeResult {
    pub title: String,
    pub outcome: std::result::Result<(), RegistryError>,
}

/// One subscription of one client to one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeItem {
    pub client_id: ClientId,
    pub title: String,
    /// Nanoseconds since the epoch.
    pub subscribed_at: i64,
}

#[derive(Debug, Default)]
struct TopicIndex {
    plain: HashMap<String, Topic>,
    wildcard: HashMap<String, Topic>,
}

impl TopicIndex {
    fn map(&self, wildcard: bool) -> &HashMap<String, Topic> {
        if wildcard { &self.wildcard } else { &self.plain }
    }

    fn map_mut(&mut self, wildcard: bool) -> &mut HashMap<String, Topic> {
        if wildcard {
            &mut self.wildcard
        } else {
            &mut self.plain
        }
    }

    fn get(&self, key: &TopicKey) -> Option<&Topic> {
        self.map(key.wildcard).get(&key.title)
    }

    /// Take `id` off the topic at `key`, evicting the topic if it empties.
    fn release(&mut self, id: ClientId, key: &TopicKey) {
        let topics = self.map_mut(key.wildcard);
        let Some(topic) = topics.get_mut(&key.title) else {
            return;
        };
        if topic.remove_client(id) == 0 {
            topics.remove(&key.title);
            debug!(title = %key.title, wildcard = key.wildcard, "topic evicted");
        }
    }
}

struct RegistryState {
    index: TopicIndex,
    clients: HashMap<ClientId, ClientEntry>,
    handle: SubscribeHandle,
}

impl RegistryState {
    fn subscribe_one(
        &mut self,
        id: ClientId,
        raw: &str,
        requested: SubscribeLevel,
    ) -> Result<(String, SubscribeLevel)> {
        let canonical = title::canonicalize(raw).map_err(|e| RegistryError::validation(raw, e))?;

        (self.handle)(canonical.as_str(), id).map_err(|source| RegistryError::Unauthorized {
            title: canonical.as_str().to_string(),
            source,
        })?;

        let key = TopicKey::new(canonical.as_str(), canonical.is_wildcard());
        let topics = self.index.map_mut(key.wildcard);
        let level = match topics.get_mut(&key.title) {
            Some(topic) => {
                topic.add_client(id);
                topic.level()
            }
            None => {
                let mut topic = Topic::new(canonical)?;
                topic.add_client(id);
                topic.set_level(requested);
                debug!(title = %key.title, wildcard = key.wildcard, level = requested.code(), "topic created");
                topics.insert(key.title.clone(), topic);
                requested
            }
        };

        let title = key.title.clone();
        self.clients
            .entry(id)
            .or_insert_with(|| ClientEntry::new(id))
            .insert(raw, key);
        Ok((title, level))
    }
}

/// Concurrency-safe subscription index and fan-out resolver.
pub struct TopicRegistry {
    state: RwLock<RegistryState>,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TopicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("TopicRegistry")
            .field("plain_topics", &state.index.plain.len())
            .field("wildcard_topics", &state.index.wildcard.len())
            .field("clients", &state.clients.len())
            .finish()
    }
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                index: TopicIndex::default(),
                clients: HashMap::new(),
                handle: Arc::new(allow_all),
            }),
        }
    }

    /// Install the subscribe authorization hook. `None` keeps the current one.
    pub fn set_subscribe_handle(&self, handle: Option<SubscribeHandle>) {
        if let Some(handle) = handle {
            self.state.write().handle = handle;
        }
    }

    /// Subscribe `id` to each of `titles`. Every title is handled on its own:
    /// a failure is reported in that title's result and the rest proceed.
    pub fn subscribe<S: AsRef<str>>(
        &self,
        id: ClientId,
        titles: &[S],
        options: SubscribeOptions,
    ) -> Vec<SubscribeResult> {
        let mut state = self.state.write();
        titles
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                match state.subscribe_one(id, raw, options.level) {
                    Ok((topic_title, level)) => SubscribeResult {
                        subscribe_title: raw.to_string(),
                        topic_title: Some(topic_title),
                        outcome: Ok(level),
                    },
                    Err(e) => {
                        debug!(client = id, title = raw, error = %e, "subscribe rejected");
                        SubscribeResult {
                            subscribe_title: raw.to_string(),
                            topic_title: None,
                            outcome: Err(e),
                        }
                    }
                }
            })
            .collect()
    }

    /// Unsubscribe `id` from each of `titles`, matched against the titles the
    /// client originally sent.
    pub fn unsubscribe<S: AsRef<str>>(
        &self,
        id: ClientId,
        titles: &[S],
    ) -> Result<Vec<UnsubscribeResult>> {
        if titles.is_empty() {
            return Err(RegistryError::EmptyTitles);
        }
        let mut state = self.state.write();
        let RegistryState { index, clients, .. } = &mut *state;
        let entry = clients
            .get_mut(&id)
            .ok_or(RegistryError::ClientNotFound(id))?;
        if entry.is_empty() {
            return Err(RegistryError::NoSubscriptions(id));
        }

        let results = titles
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                let outcome = match entry.remove(raw) {
                    Some(key) => {
                        if !entry.references(&key) {
                            index.release(id, &key);
                        }
                        Ok(())
                    }
                    None => Err(RegistryError::NotSubscribed(raw.to_string())),
                };
                UnsubscribeResult {
                    title: raw.to_string(),
                    outcome,
                }
            })
            .collect();
        Ok(results)
    }

    /// Drop every subscription of `id` and forget the client. Unknown clients
    /// are ignored.
    pub fn unsubscribe_all(&self, id: ClientId) {
        let mut state = self.state.write();
        let RegistryState { index, clients, .. } = &mut *state;
        let Some(entry) = clients.remove(&id) else {
            return;
        };
        for key in entry.topic_keys() {
            index.release(id, key);
        }
        info!(client = id, subscriptions = entry.len(), "client unsubscribed from all topics");
    }

    /// Clients that should receive a message published to `title`: the
    /// subscribers of the exact plain topic plus those of every wildcard topic
    /// whose matcher accepts the title.
    pub fn publish_client_ids(
        &self,
        title: &str,
        options: PublishOptions,
    ) -> Result<HashSet<ClientId>> {
        let canonical =
            title::canonicalize_publish(title).map_err(|e| RegistryError::validation(title, e))?;
        let title = canonical.as_str();

        let state = self.state.write();
        let mut ids = HashSet::new();
        match state.index.plain.get(title) {
            Some(topic) => {
                debug_assert!(topic.subscriber_count() > 0, "empty topic left in index");
                ids.extend(topic.clients().keys().copied());
            }
            None if options.check_exists => {
                return Err(RegistryError::TopicNotFound(title.to_string()));
            }
            None => {}
        }
        for topic in state.index.wildcard.values() {
            if topic.match_title(title) {
                ids.extend(topic.clients().keys().copied());
            }
        }
        Ok(ids)
    }

    /// Plain topics sorted by descending title, paged over `[start, end)`.
    pub fn plain_topics(&self, start: usize, end: usize) -> (usize, Vec<TopicSummary>) {
        let state = self.state.read();
        list_topics(&state.index.plain, start, end)
    }

    /// Wildcard topics sorted by descending title, paged over `[start, end)`.
    pub fn wildcard_topics(&self, start: usize, end: usize) -> (usize, Vec<TopicSummary>) {
        let state = self.state.read();
        list_topics(&state.index.wildcard, start, end)
    }

    /// Subscribers of one topic sorted by descending client id, paged over
    /// `[start, end)`. `title` is canonicalized before lookup.
    pub fn topic_subscribers(
        &self,
        title: &str,
        start: usize,
        end: usize,
    ) -> Result<(usize, Vec<SubscribeItem>)> {
        let canonical = title::canonicalize(title).map_err(|e| RegistryError::validation(title, e))?;
        let state = self.state.read();
        let topic = state
            .index
            .map(canonical.is_wildcard())
            .get(canonical.as_str())
            .ok_or_else(|| RegistryError::TopicNotFound(canonical.to_string()))?;

        let mut items: Vec<SubscribeItem> = topic
            .clients()
            .iter()
            .map(|(&client_id, &subscribed_at)| SubscribeItem {
                client_id,
                title: topic.title().to_string(),
                subscribed_at,
            })
            .collect();
        items.sort_by(|a, b| b.client_id.cmp(&a.client_id));
        let total = items.len();
        Ok((total, paginate(items, start, end)))
    }

    /// Subscriptions of one client, paged over `[start, end)`. There is one
    /// item per title the client sent; items are ordered by descending topic
    /// title.
    pub fn client_subscriptions(
        &self,
        id: ClientId,
        start: usize,
        end: usize,
    ) -> Result<(usize, Vec<SubscribeItem>)> {
        let state = self.state.read();
        let entry = state
            .clients
            .get(&id)
            .ok_or(RegistryError::ClientNotFound(id))?;

        let mut items: Vec<SubscribeItem> = entry
            .iter()
            .map(|(_, key)| SubscribeItem {
                client_id: id,
                title: key.title.clone(),
                subscribed_at: state
                    .index
                    .get(key)
                    .and_then(|topic| topic.clients().get(&id).copied())
                    .unwrap_or_default(),
            })
            .collect();
        items.sort_by(|a, b| {
            b.client_id
                .cmp(&a.client_id)
                .then_with(|| b.title.cmp(&a.title))
        });
        let total = items.len();
        Ok((total, paginate(items, start, end)))
    }

    pub fn plain_topic_count(&self) -> usize {
        self.state.read().index.plain.len()
    }

    pub fn wildcard_topic_count(&self) -> usize {
        self.state.read().index.wildcard.len()
    }

    pub fn client_count(&self) -> usize {
        self.state.read().clients.len()
    }
}

fn allow_all(_title: &str, _id: ClientId) -> std::result::Result<(), AuthorizationError> {
    Ok(())
}

fn list_topics(
    topics: &HashMap<String, Topic>,
    start: usize,
    end: usize,
) -> (usize, Vec<TopicSummary>) {
    let mut summaries: Vec<TopicSummary> = topics.values().map(Topic::summary).collect();
    summaries.sort_by(|a, b| b.title.cmp(&a.title));
    (summaries.len(), paginate(summaries, start, end))
}

fn paginate<T>(items: Vec<T>, start: usize, end: usize) -> Vec<T> {
    items
        .into_iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
