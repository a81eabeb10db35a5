//! Log line formatting and subscriber setup.
//!
//! Lines render as `TIMESTAMP [LEVEL] message (details)`, one event per
//! line, with structured fields collected into the parenthesized details.
//! Output goes to a log file when one is configured, stdout otherwise.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides the configured level. Failure to open the log
/// file is a startup error.
pub fn init(level: &str, log_file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let writer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stdout),
    };

    tracing_subscriber::fmt()
        .event_format(LineFormat)
        .with_env_filter(filter)
        .with_writer(writer)
        .init();

    Ok(())
}

/// `TIMESTAMP [LEVEL] message (details)` event formatter.
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = level_name(*event.metadata().level());

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        write!(writer, "{} [{}] {}", timestamp, level, fields.message)?;
        if !fields.details.is_empty() {
            write!(writer, " ({})", fields.details.join(", "))?;
        }
        writeln!(writer)
    }
}

/// Level names used in log lines. `WARN` renders as `WARNING`.
fn level_name(level: Level) -> &'static str {
    if level == Level::ERROR {
        "ERROR"
    } else if level == Level::WARN {
        "WARNING"
    } else if level == Level::INFO {
        "INFO"
    } else if level == Level::DEBUG {
        "DEBUG"
    } else {
        "TRACE"
    }
}

/// Splits an event into the human message and the remaining fields.
#[derive(Default)]
struct FieldCollector {
    message: String,
    details: Vec<String>,
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.details.push(format!("{}: {:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.details.push(format!("{}: {}", field.name(), value));
        }
    }
}
