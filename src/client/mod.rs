//! The `client` module tracks what each connected client has subscribed to.
//!
//! It provides the `ClientEntry` struct, which maps the titles a client sent
//! to the registry topics they resolved to, so a client's subscriptions can be
//! listed and torn down without scanning every topic.

pub mod entry;
pub use entry::{ClientEntry, TopicKey};
