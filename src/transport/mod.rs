//! The `transport` module drives a `TopicRegistry` over newline-delimited
//! JSON, one request per line in and one response per line out.
//!
//! It defines the request/response shapes and the serving loop the binary
//! runs on stdin/stdout. Delivery of messages to subscribers is left to
//! whatever sits on the other side of the pipe.

pub mod message;
pub mod stdio;
