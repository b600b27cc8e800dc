use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::broker::{PublishOptions, SubscribeOptions, TopicRegistry};
use crate::config::RegistrySettings;
use crate::transport::message::{ClientMessage, ServerMessage, SubscribeReply, UnsubscribeReply};

/// Apply one request to the registry. `settings` supplies the defaults for
/// fields a request leaves out.
pub fn handle_message(
    registry: &TopicRegistry,
    settings: &RegistrySettings,
    msg: ClientMessage,
) -> ServerMessage {
    match msg {
        ClientMessage::Subscribe {
            client_id,
            titles,
            level,
        } => {
            let options = SubscribeOptions::from_code(level.unwrap_or(settings.default_level));
            let results = registry
                .subscribe(client_id, &titles, options)
                .into_iter()
                .map(|r| SubscribeReply {
                    code: r.return_code(),
                    error: r.outcome.err().map(|e| e.to_string()),
                    title: r.subscribe_title,
                    topic: r.topic_title,
                })
                .collect();
            ServerMessage::Subscribed { client_id, results }
        }
        ClientMessage::Unsubscribe { client_id, titles } => {
            match registry.unsubscribe(client_id, &titles) {
                Ok(results) => ServerMessage::Unsubscribed {
                    client_id,
                    results: results
                        .into_iter()
                        .map(|r| UnsubscribeReply {
                            title: r.title,
                            error: r.outcome.err().map(|e| e.to_string()),
                        })
                        .collect(),
                },
                Err(e) => ServerMessage::error(e),
            }
        }
        ClientMessage::UnsubscribeAll { client_id } => {
            registry.unsubscribe_all(client_id);
            ServerMessage::UnsubscribedAll { client_id }
        }
        ClientMessage::Resolve {
            title,
            check_exists,
        } => {
            let options = PublishOptions {
                check_exists: check_exists.unwrap_or(settings.check_exists),
            };
            match registry.publish_client_ids(&title, options) {
                Ok(ids) => {
                    let mut client_ids: Vec<_> = ids.into_iter().collect();
                    client_ids.sort_unstable();
                    ServerMessage::Resolved { title, client_ids }
                }
                Err(e) => ServerMessage::error(e),
            }
        }
        ClientMessage::PlainTopics { start, end } => {
            let (total, topics) = registry.plain_topics(start, end);
            ServerMessage::Topics { total, topics }
        }
        ClientMessage::WildcardTopics { start, end } => {
            let (total, topics) = registry.wildcard_topics(start, end);
            ServerMessage::Topics { total, topics }
        }
        ClientMessage::TopicSubscribers { title, start, end } => {
            match registry.topic_subscribers(&title, start, end) {
                Ok((total, items)) => ServerMessage::Subscriptions { total, items },
                Err(e) => ServerMessage::error(e),
            }
        }
        ClientMessage::ClientSubscriptions {
            client_id,
            start,
            end,
        } => match registry.client_subscriptions(client_id, start, end) {
            Ok((total, items)) => ServerMessage::Subscriptions { total, items },
            Err(e) => ServerMessage::error(e),
        },
    }
}

/// Parse and apply one line. Malformed input yields an `error` reply.
pub fn handle_line(registry: &TopicRegistry, settings: &RegistrySettings, line: &str) -> ServerMessage {
    match serde_json::from_str::<ClientMessage>(line) {
        Ok(msg) => {
            debug!(?msg, "request");
            handle_message(registry, settings, msg)
        }
        Err(e) => {
            warn!("Invalid request: {e}");
            ServerMessage::error(format!("invalid request: {e}"))
        }
    }
}

/// Serve requests from `reader` until it is exhausted, writing one JSON reply
/// per non-blank line to `writer`.
pub fn serve<R: BufRead, W: Write>(
    registry: &TopicRegistry,
    settings: &RegistrySettings,
    reader: R,
    mut writer: W,
) -> std::io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_line(registry, settings, &line);
        serde_json::to_writer(&mut writer, &reply)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    Ok(())
}
