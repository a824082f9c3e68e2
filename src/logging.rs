use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const CONSOLE_FILTER: &str = "info,llm_request=info,web_request=warn,curation=info";
const FILE_FILTER: &str = "info,llm_request=debug,web_request=debug,curation=debug";

/// Installs the console and daily-rolling file layers. `RUST_LOG` replaces the
/// console filter when set. Console logs go to stderr, leaving stdout to the
/// curated output.
pub fn configure_logging() -> anyhow::Result<()> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CONSOLE_FILTER));
    let console_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(console_filter);

    let file_appender = rolling::daily("logs", "curator.log");
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_filter(EnvFilter::new(FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(console_log)
        .with(file_log)
        .try_init()?;

    Ok(())
}
