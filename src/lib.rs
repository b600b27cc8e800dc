//! # topicreg
//!
//! `topicreg` is an in-memory subscription registry for an MQTT-style
//! publish/subscribe broker. Given client subscriptions to `/`-separated
//! titles, optionally using the `+` (one segment) and `#` (one or more
//! trailing segments) wildcards, it resolves the set of clients interested in
//! any published title.
//!
//! ## Core Modules
//!
//! - `broker`: title canonicalization, wildcard matchers, topics and the
//!   `TopicRegistry` that indexes them.
//! - `client`: per-client bookkeeping of subscribed titles.
//! - `config`: loading and merging runtime settings.
//! - `transport`: a newline-delimited JSON driver for the registry.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;

pub use broker::{
    ClientId, PublishOptions, SubscribeHandle, SubscribeLevel, SubscribeOptions, TopicRegistry,
};
pub use utils::error::{AuthorizationError, RegistryError, TitleError};
