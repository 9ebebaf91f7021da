use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FILTER_TARGETS: [&str; 3] = ["account_locked", "access_gate", "account_state"];

/// Default directives: `level` for the filter's own crates, `warn` for the
/// host application and its dependencies.
fn default_directives(level: tracing::Level) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        FILTER_TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.as_str().to_ascii_lowercase())),
    );
    directives.join(",")
}

/// Installs the global subscriber. `RUST_LOG` replaces the default directives
/// when set.
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
