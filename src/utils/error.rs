//! The `error` module defines the error types used throughout `topicreg`.
//!
//! `TitleError` covers every way a raw topic title can fail validation.
//! `RegistryError` is the error surfaced by the registry API; per-title
//! failures are carried inside result items rather than aborting a batch.

use thiserror::Error;

use crate::broker::title::MAX_TITLE_LEN;
use crate::broker::topic::ClientId;

/// Validation failures for raw topic titles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    #[error("\"/\" is the root topic")]
    Root,

    #[error("topic title is empty")]
    Empty,

    #[error("\"#\" may appear only once")]
    MultipleHash,

    #[error("topic title is empty after trimming")]
    TrimmedEmpty,

    #[error("{segment} --> segment must match [0-9a-zA-Z_-]+")]
    InvalidSegment { segment: String },

    #[error("topic title has no segments")]
    NoSegments,

    #[error("\"#\" must be the last segment")]
    HashNotLast,

    #[error("topic title is {len} bytes, limit is {max}", max = MAX_TITLE_LEN)]
    TooLong { len: usize },

    #[error("publish title may not contain wildcards")]
    WildcardPublish,
}

/// Rejection returned by a subscribe authorization hook.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct AuthorizationError(String);

impl AuthorizationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("topic({title}) error: {source}")]
    Validation {
        title: String,
        #[source]
        source: TitleError,
    },

    #[error("subscribe to {title} rejected: {source}")]
    Unauthorized {
        title: String,
        #[source]
        source: AuthorizationError,
    },

    #[error("not found client({0})")]
    ClientNotFound(ClientId),

    #[error("topic({0}) does not exist")]
    TopicNotFound(String),

    #[error("unsubscribe titles are empty")]
    EmptyTitles,

    #[error("client({0}) has no subscriptions")]
    NoSubscriptions(ClientId),

    #[error("client is not subscribed to {0}")]
    NotSubscribed(String),

    #[error("failed to compile matcher {pattern}: {reason}")]
    Pattern { pattern: String, reason: String },
}

impl RegistryError {
    pub fn validation(title: impl Into<String>, source: TitleError) -> Self {
        Self::Validation {
            title: title.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ClientNotFound(_) | Self::TopicNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
