//! logfmt lines on stderr for the optimizer driver.
//!
//! Every line carries the wall-clock time of day, the level and a tag naming
//! the component, followed by the caller's `key=value` fields in order. The
//! pass itself never logs; [`Optimizer`](crate::Optimizer) reports per-pass
//! results at debug level and fixpoint summaries at info level when tracing is
//! enabled, and always warns when the round limit is hit.
//!
//! ```ignore
//! log_info!("optimizer", program = "main.R", rounds = 2);
//! // time=12:34:56.789 level=info tag=optimizer program=main.R rounds=2
//! ```

use std::time::{Duration, SystemTime};

use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

impl Level {
    fn label(self) -> ColoredString {
        match self {
            Level::Debug => "debug".dimmed(),
            Level::Info => "info".cyan(),
            Level::Warn => "warn".yellow(),
        }
    }
}

/// Time of day in UTC as `HH:MM:SS.mmm`
fn clock_time(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs() % 86_400;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        since_epoch.subsec_millis()
    )
}

// Values containing spaces, quotes or '=' are quoted
fn quote_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '"', '=']) {
        format!("{:?}", value)
    } else {
        value.to_string()
    }
}

pub fn format_line(level: Level, tag: &str, fields: &[(&str, String)]) -> String {
    let since_epoch = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let header = [
        ("time", clock_time(since_epoch)),
        ("level", level.label().to_string()),
        ("tag", tag.to_string()),
    ];
    header
        .into_iter()
        .chain(fields.iter().map(|(key, value)| (*key, quote_value(value))))
        .map(|(key, value)| format!("{}={}", key.dimmed(), value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
    ($level:expr, $tag:expr, $($key:ident = $value:expr),* $(,)?) => {
        eprintln!("{}", $crate::log::format_line(
            $level,
            $tag,
            &[$(( stringify!($key), format!("{}", $value) )),*]
        ))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($tag:expr, $($fields:tt)*) => {
        $crate::log_at!($crate::log::Level::Debug, $tag, $($fields)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($tag:expr, $($fields:tt)*) => {
        $crate::log_at!($crate::log::Level::Info, $tag, $($fields)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($tag:expr, $($fields:tt)*) => {
        $crate::log_at!($crate::log::Level::Warn, $tag, $($fields)*)
    };
}
