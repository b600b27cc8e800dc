use serde::{Deserialize, Serialize};

use crate::broker::{ClientId, SubscribeItem, TopicSummary};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe {
        client_id: ClientId,
        titles: Vec<String>,
        #[serde(default)]
        level: Option<u8>,
    },

    Unsubscribe {
        client_id: ClientId,
        titles: Vec<String>,
    },

    UnsubscribeAll {
        client_id: ClientId,
    },

    Resolve {
        title: String,
        #[serde(default)]
        check_exists: Option<bool>,
    },

    PlainTopics {
        start: usize,
        end: usize,
    },

    WildcardTopics {
        start: usize,
        end: usize,
    },

    TopicSubscribers {
        title: String,
        start: usize,
        end: usize,
    },

    ClientSubscriptions {
        client_id: ClientId,
        start: usize,
        end: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct SubscribeReply {
    pub title: String,
    pub topic: Option<String>,
    pub code: u8,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UnsubscribeReply {
    pub title: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Subscribed {
        client_id: ClientId,
        results: Vec<SubscribeReply>,
    },

    Unsubscribed {
        client_id: ClientId,
        results: Vec<UnsubscribeReply>,
    },

    UnsubscribedAll {
        client_id: ClientId,
    },

    Resolved {
        title: String,
        client_ids: Vec<ClientId>,
    },

    Topics {
        total: usize,
        topics: Vec<TopicSummary>,
    },

    Subscriptions {
        total: usize,
        items: Vec<SubscribeItem>,
    },

    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl ToString) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
}
