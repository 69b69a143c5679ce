use crate::config::{Config, RustEnv};
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ConfigBuilder};

/// The HTTP stack logs every connection and frame at DEBUG, which buries the
/// OAuth state issue/verify lines. Only shown at TRACE.
const FILTERED_MODULES: &[&str] = &["tower", "tower_http", "hyper", "hyper_util", "axum", "h2"];

pub struct Logger {}

impl Logger {
    /// Initializes the global terminal logger from the configured level and
    /// runtime environment.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let log_config = Self::build_log_config(
            Self::should_filter_dependencies(config.log_level_filter),
            &config.runtime_env,
        );

        simplelog::TermLogger::init(
            Self::convert_level_filter(config.log_level_filter),
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    /// Production output drops source locations and thread ids so each
    /// rejected callback stays on one short line.
    fn build_log_config(apply_filters: bool, runtime_env: &RustEnv) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();
        builder.set_target_level(simplelog::LevelFilter::Error);

        match runtime_env {
            RustEnv::Production => {
                builder.set_location_level(simplelog::LevelFilter::Off);
                builder.set_thread_level(simplelog::LevelFilter::Off);
            }
            RustEnv::Development | RustEnv::Staging => {
                builder.set_location_level(simplelog::LevelFilter::Debug);
            }
        }

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
