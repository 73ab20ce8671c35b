use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` filter syntax, e.g.
/// `"blitter_engine=debug,wgpu_core=warn"`. When unset, `RUST_LOG` is read,
/// then `info` is used.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger. Later calls are ignored, as is
/// an already installed logger.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
                // wgpu is chatty at info.
                builder.filter_module("wgpu_core", log::LevelFilter::Warn);
                builder.filter_module("wgpu_hal", log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
