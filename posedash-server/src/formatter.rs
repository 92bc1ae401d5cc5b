//! Log line formats: a compact colored one for local runs, flat JSON for deployments.
use std::fmt;

use serde_json::{Map, Number, Value};
use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;
use yansi::{Paint, Painted};

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// `12:04:55.120  INFO handler{id=3}: posedash_server::routes: message key=value`
pub struct PrettyFormatter;

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let ansi = writer.has_ansi_escapes();
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        write!(writer, "{} {} ", styled(ansi, timestamp.dim()), styled(ansi, level_label(meta.level())))?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", styled(ansi, span.metadata().name().bold()))?;
                let ext = span.extensions();
                match ext.get::<FormattedFields<N>>() {
                    Some(fields) if !fields.fields.is_empty() => write!(writer, "{{{}}}: ", fields.fields)?,
                    _ => writer.write_str(": ")?,
                }
            }
        }

        write!(writer, "{}: ", styled(ansi, meta.target().dim()))?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_label(level: &Level) -> Painted<&'static str> {
    match *level {
        Level::TRACE => "TRACE".magenta(),
        Level::DEBUG => "DEBUG".blue(),
        Level::INFO => " INFO".green(),
        Level::WARN => " WARN".yellow(),
        Level::ERROR => "ERROR".red(),
    }
}

/// Drops the styling when the writer has no ANSI support.
fn styled<T: fmt::Display>(ansi: bool, painted: Painted<T>) -> impl fmt::Display {
    painted.whenever(if ansi { yansi::Condition::ALWAYS } else { yansi::Condition::NEVER })
}

/// One JSON object per event: `message`, `level`, `target`, then each span's fields under its
/// name and the event's own fields at the top level.
pub struct JsonFormatter;

#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl JsonVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(s)) => self.message = Some(s),
            ("message", other) => self.message = Some(other.to_string()),
            (name, value) => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::Number(Number::from(value)));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::Number(Number::from(value)));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Number::from_f64(value).map_or(Value::Null, Value::Number));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let mut line = Map::new();
        line.insert("message".into(), Value::String(visitor.message.unwrap_or_default()));
        line.insert("level".into(), Value::String(meta.level().to_string()));
        line.insert("target".into(), Value::String(meta.target().to_string()));

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let ext = span.extensions();
                let fields = ext
                    .get::<FormattedFields<N>>()
                    .map(|f| f.fields.as_str())
                    .filter(|f| !f.is_empty())
                    .map(|f| serde_json::from_str::<Value>(f).unwrap_or_else(|_| Value::String(f.to_string())))
                    .unwrap_or_else(|| Value::Object(Map::new()));
                line.insert(span.metadata().name().to_string(), fields);
            }
        }
        line.extend(visitor.fields);

        let json = serde_json::to_string(&line).map_err(|_| fmt::Error)?;
        writeln!(writer, "{json}")
    }
}
