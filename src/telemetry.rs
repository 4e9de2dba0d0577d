use serde::{Serialize, Serializer};
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use crate::settings::Config;

/// A resolved logging severity.
///
/// Accepts the usual level names as well as the numeric levels 0, 10, 20, 30, 40 and 50
/// (notset, debug, info, warning, error, critical). `critical` collapses onto `error`
/// and `notset` onto `trace`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevel(LevelFilter);

impl LogLevel {
    pub const WARNING: LogLevel = LogLevel(LevelFilter::WARN);

    pub fn from_name(name: &str) -> Option<Self> {
        let filter = match name.trim().to_ascii_lowercase().as_str() {
            "critical" | "fatal" | "error" => LevelFilter::ERROR,
            "warning" | "warn" => LevelFilter::WARN,
            "info" => LevelFilter::INFO,
            "debug" => LevelFilter::DEBUG,
            "notset" | "trace" => LevelFilter::TRACE,
            _ => return None,
        };
        Some(Self(filter))
    }

    pub fn from_number(level: i64) -> Option<Self> {
        let filter = match level {
            50 | 40 => LevelFilter::ERROR,
            30 => LevelFilter::WARN,
            20 => LevelFilter::INFO,
            10 => LevelFilter::DEBUG,
            0 => LevelFilter::TRACE,
            _ => return None,
        };
        Some(Self(filter))
    }

    /// Numeric text is read as a level number, anything else as a name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().parse::<i64>() {
            Ok(level) => Self::from_number(level),
            Err(_) => Self::from_name(value),
        }
    }

    pub fn filter(self) -> LevelFilter {
        self.0
    }

    pub fn enables(self, level: Level) -> bool {
        self.0 >= level
    }

    pub fn name(self) -> &'static str {
        if self.0 == LevelFilter::ERROR {
            "error"
        } else if self.0 == LevelFilter::WARN {
            "warning"
        } else if self.0 == LevelFilter::INFO {
            "info"
        } else if self.0 == LevelFilter::DEBUG {
            "debug"
        } else if self.0 == LevelFilter::TRACE {
            "trace"
        } else {
            "off"
        }
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Handle on the active process log level.
///
/// Only the one-shot CLI front-ends reload it; a served request gates its own output on
/// `RenderRequest::log_level` instead. A disabled control (no subscriber installed, as in
/// tests) ignores every request.
#[derive(Clone, Default)]
pub struct LogControl {
    handle: Option<reload::Handle<LevelFilter, Registry>>,
}

impl LogControl {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn apply(&self, level: LogLevel) {
        let Some(handle) = &self.handle else {
            return;
        };
        if let Err(e) = handle.reload(level.filter()) {
            tracing::warn!("Failed to set log level to {}: {}", level.name(), e);
        }
    }
}

/// Install the global subscriber.
///
/// Logs go to stdout, or to a daily rolled file under `log_dir` when configured. The
/// returned guard must stay alive for buffered file output to be flushed.
pub fn init_tracing(config: &Config) -> (LogControl, Option<WorkerGuard>) {
    let (filter, handle) = reload::Layer::new(config.default_log_level.filter());

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "qrlabel.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    let stdout_layer = file_layer
        .is_none()
        .then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    (
        LogControl {
            handle: Some(handle),
        },
        guard,
    )
}
