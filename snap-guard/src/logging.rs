//! Logging utilities.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application. [`setup::init_logging`] is the subscriber the
//! `snap-validate` binary uses. It always writes to stderr so reports on
//! stdout stay machine-readable.

/// Truncates a string to at most `max_length` bytes, on a character boundary.
///
/// Used to keep generated SQL and cell values from flooding log lines.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber configuration and installation.
pub mod setup {
    use tracing::Level;

    /// Configuration for the `tracing` subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for dependencies
        pub level: Level,
        /// Log level for `snap_guard` itself
        pub crate_level: Level,
        /// Emit one JSON object per event
        pub json_format: bool,
        /// Filter directive overriding both levels
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Warnings and errors only.
        pub fn quiet() -> Self {
            Self {
                crate_level: Level::WARN,
                ..Self::default()
            }
        }

        /// Debug output from this crate, including generated SQL.
        pub fn verbose() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                ..Self::default()
            }
        }

        /// Sets the dependency log level.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for this crate.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom filter directive.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the filter directive.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},snap_guard={},snap_validate={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a stderr subscriber. `RUST_LOG` takes precedence over the
    /// configured levels.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use snap_guard::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::verbose().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
