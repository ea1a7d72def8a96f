//! Tracing subscriber bootstrap driven by [`TelemetrySettings`].

use anyhow::anyhow;
use shelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `settings.filter`. Fails if a subscriber
/// is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::info!(
        target: "shelf-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

/// A parsable `RUST_LOG` directive wins; otherwise `settings.filter` must parse.
fn env_filter(
    env_directive: Option<String>,
    settings: &TelemetrySettings,
) -> anyhow::Result<EnvFilter> {
    if let Some(filter) = env_directive.and_then(|directive| EnvFilter::try_new(directive).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.filter)
        .map_err(|e| anyhow!("invalid log filter '{}': {e}", settings.filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn malformed() -> TelemetrySettings {
        TelemetrySettings {
            log_format: LogFormat::Pretty,
            filter: "shelf_app=verbose".to_string(),
        }
    }

    #[test]
    fn rejects_malformed_filter() {
        let err = env_filter(None, &malformed()).unwrap_err();
        assert!(err.to_string().contains("shelf_app=verbose"));
    }

    #[test]
    fn default_filter_parses() {
        assert!(env_filter(None, &TelemetrySettings::default()).is_ok());
    }

    #[test]
    fn env_directive_takes_precedence() {
        let filter = env_filter(Some("trace".to_string()), &malformed()).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn unparsable_env_directive_falls_back_to_settings() {
        let settings = TelemetrySettings {
            log_format: LogFormat::Json,
            filter: "warn".to_string(),
        };
        let filter = env_filter(Some("shelf_app=verbose".to_string()), &settings).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
