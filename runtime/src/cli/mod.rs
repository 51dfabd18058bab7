//! CLI subcommand implementations for the pricewalk binary.

pub mod doctor;
pub mod normalize_cmd;
pub mod output;
pub mod progress;
pub mod scrape_cmd;
pub mod serve_cmd;

/// Install the stderr `fmt` subscriber.
///
/// `default_level` applies to this crate unless `RUST_LOG` says otherwise;
/// `--verbose` raises it to `debug`. `PRICEWALK_LOG_JSON` switches to JSON lines.
pub fn init_tracing(default_level: &str) {
    let level = if output::is_verbose() {
        "debug"
    } else {
        default_level
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("pricewalk_runtime={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if std::env::var("PRICEWALK_LOG_JSON").is_ok() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
