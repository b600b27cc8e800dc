/// Initialize tracing/logging for the application.
///
/// Output goes to stderr; stdout carries the line protocol.
pub fn init(default_level: &str) {
    let lvl = match default_level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" | "warning" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };

    // try_init so tests can call this more than once
    let _ = tracing_subscriber::fmt()
        .with_max_level(lvl)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
