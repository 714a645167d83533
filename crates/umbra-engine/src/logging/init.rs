use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `filter` follows the `env_logger` directive syntax, for example
/// `"umbra_engine=debug,wgpu=warn"`. When it is `None` the `RUST_LOG`
/// variable is consulted, and `default_level` applies if that is unset too.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Prefix records with a millisecond timestamp.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Shorthand for a config driven by an explicit directive string.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::default()
        }
    }

    fn builder(&self) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();

        match (&self.filter, std::env::var("RUST_LOG")) {
            (Some(filter), _) => {
                builder.parse_filters(filter);
            }
            (None, Ok(filter)) => {
                builder.parse_filters(&filter);
            }
            (None, Err(_)) => {
                builder.filter_level(self.default_level);
                // wgpu is chatty at info.
                builder.filter_module("wgpu_core", LevelFilter::Warn);
                builder.filter_module("wgpu_hal", LevelFilter::Warn);
            }
        }

        builder.write_style(self.write_style);
        if self.timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }
        builder
    }
}

static INIT: Once = Once::new();

/// Installs the global logger once.
///
/// Later calls are ignored. If some other logger was installed first the
/// failure is reported on stderr and the existing logger is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| match config.builder().try_init() {
        Ok(()) => log::debug!("logging initialized"),
        Err(e) => eprintln!("umbra: logger already installed: {e}"),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LoggingConfig::default();
        assert!(config.filter.is_none());
        assert_eq!(config.default_level, LevelFilter::Info);
        assert!(config.timestamps);
    }

    #[test]
    fn with_filter_keeps_other_defaults() {
        let config = LoggingConfig::with_filter("umbra_engine=trace");
        assert_eq!(config.filter.as_deref(), Some("umbra_engine=trace"));
        assert_eq!(config.default_level, LevelFilter::Info);
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::with_filter("warn"));
        init_logging(LoggingConfig::default());
        log::warn!("still alive");
    }
}
