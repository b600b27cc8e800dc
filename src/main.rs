use std::io::{self, BufWriter};
use std::sync::Arc;

use topicreg::config::load_config;
use topicreg::transport::stdio::serve;
use topicreg::utils::logging;
use topicreg::{AuthorizationError, ClientId, SubscribeHandle, TopicRegistry};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = load_config()?;
    logging::init(&config.logging.level);

    let registry = TopicRegistry::new();
    if !config.registry.deny_prefixes.is_empty() {
        let denied = config.registry.deny_prefixes.clone();
        let handle: SubscribeHandle = Arc::new(move |title: &str, _id: ClientId| {
            match denied.iter().find(|prefix| title.starts_with(prefix.as_str())) {
                Some(prefix) => Err(AuthorizationError::new(format!("prefix {prefix} is denied"))),
                None => Ok(()),
            }
        });
        registry.set_subscribe_handle(Some(handle));
    }

    info!("Serving topic registry on stdin/stdout");
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    serve(&registry, &config.registry, stdin, stdout)?;
    info!("Input closed, exiting");
    Ok(())
}
