use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Targets that log at the level chosen on the command line.
const RHIZOME_TARGETS: [&str; 3] = ["rhizome", "rhizome_frame", "rhizome_transport"];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Workspace crates log at `level`; everything else is capped at warn.
pub fn log_targets(level: LogLevel) -> Targets {
    let level = level.as_filter();
    RHIZOME_TARGETS
        .into_iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(target, level)
        })
        .with_default(level.min(LevelFilter::WARN))
}

/// Install the stderr subscriber. Frame traffic logs at debug, drops at warn.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);
    let registry = tracing_subscriber::registry().with(log_targets(level));

    match format {
        LogFormat::Text => {
            let _ = registry.with(layer).try_init();
        }
        LogFormat::Json => {
            let _ = registry.with(layer.json()).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn workspace_targets_follow_requested_level() {
        let targets = log_targets(LogLevel::Debug);
        assert!(targets.would_enable("rhizome_frame::reader", &Level::DEBUG));
        assert!(targets.would_enable("rhizome_transport::tcp", &Level::DEBUG));
        assert!(targets.would_enable("rhizome::cmd::listen", &Level::DEBUG));
        assert!(!targets.would_enable("rhizome_frame::responder", &Level::TRACE));
    }

    #[test]
    fn other_targets_capped_at_warn() {
        let targets = log_targets(LogLevel::Trace);
        assert!(!targets.would_enable("mio::poll", &Level::INFO));
        assert!(targets.would_enable("mio::poll", &Level::WARN));

        let quiet = log_targets(LogLevel::Error);
        assert!(!quiet.would_enable("mio::poll", &Level::WARN));
        assert!(!quiet.would_enable("rhizome_frame::reader", &Level::WARN));
    }
}
