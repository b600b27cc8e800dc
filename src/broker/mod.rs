pub mod engine;
pub mod matcher;
pub mod title;
pub mod topic;

pub use engine::{
    PublishOptions, SubscribeHandle, SubscribeItem, SubscribeOptions, SubscribeResult,
    TopicRegistry, UnsubscribeResult,
};
pub use topic::{ClientId, SUBSCRIBE_FAILED, SubscribeLevel, Topic, TopicSummary};
