use std::sync::Once;

use log::LevelFilter;

/// Logger setup for binaries.
///
/// `filter` uses `env_logger` directive syntax (`"info,cornerpin_warp=debug"`).
/// Without one, `RUST_LOG` applies on top of `level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub level: LevelFilter,
    pub style: env_logger::WriteStyle,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: None, level: LevelFilter::Info, style: env_logger::WriteStyle::Auto, timestamps: true }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self { filter: Some(filter.into()), ..Self::default() }
    }
}

/// GPU stack crates that log every allocation at info.
const NOISY_MODULES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.level);
        for module in NOISY_MODULES {
            builder.filter_module(module, LevelFilter::Warn);
        }

        // Directives parsed last win over the defaults above.
        if let Some(filter) = config.filter.or_else(|| std::env::var(env_logger::DEFAULT_FILTER_ENV).ok()) {
            builder.parse_filters(&filter);
        }

        builder.write_style(config.style);
        if !config.timestamps {
            builder.format_timestamp(None);
        }

        // A test harness may already own the logger.
        if builder.try_init().is_ok() {
            log::debug!("logger ready");
        }
    });
}
