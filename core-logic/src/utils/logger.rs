use crate::traits::Severity;
use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Target used for every dashboard log line.
pub const DASHBOARD_TARGET: &str = "dashboard";

pub fn setup_logger() -> Option<WorkerGuard> {
    // Create logs directory
    std::fs::create_dir_all("logs").ok();

    let file_appender = tracing_appender::rolling::hourly("logs", "prior");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File layer: every dashboard line, WARN for others
    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target(DASHBOARD_TARGET, tracing::Level::INFO)
        .with_default(tracing::Level::WARN);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    // Console layer: dashboard lines, ERROR for others
    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target(DASHBOARD_TARGET, tracing::Level::INFO)
        .with_default(tracing::Level::ERROR);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    // try_init: tests and repeated setup must not panic
    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .ok()?;

    // Return guard - MUST be kept alive by caller
    Some(guard)
}

/// Emits one dashboard line through `tracing`, tagged with its severity.
pub fn trace_line(severity: Severity, text: &str) {
    let tag = severity.as_str();
    match severity {
        Severity::Error => tracing::error!(target: "dashboard", severity = tag, "{}", text),
        Severity::Warning => tracing::warn!(target: "dashboard", severity = tag, "{}", text),
        _ => tracing::info!(target: "dashboard", severity = tag, "{}", text),
    }
}

// --- Formatters ---

#[derive(Default)]
struct MessageVisitor {
    message: String,
    severity: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "severity" => self.severity = Some(format!("{:?}", value).trim_matches('"').to_string()),
            _ => {}
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "severity" => self.severity = Some(value.to_string()),
            _ => {}
        }
    }
}

fn severity_style(severity: Option<&str>) -> Style {
    match severity {
        Some("success") => Style::new().fg(Color::LightGreen).bold(),
        Some("error") => Style::new().fg(Color::LightRed).bold(),
        Some("warning") => Style::new().fg(Color::LightYellow).bold(),
        Some("swap") => Style::new().fg(Color::LightMagenta).bold(),
        Some("system") => Style::new().fg(Color::White).bold(),
        _ => Style::new().bold(),
    }
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
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
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let timestamp = Local::now().format("%H:%M:%S");
        let bracket = Style::new().fg(Color::LightCyan);
        let time = Style::new().fg(Color::DarkGray).bold();
        let style = severity_style(visitor.severity.as_deref());

        writeln!(
            writer,
            "{} {} {} {}",
            bracket.paint("["),
            time.paint(timestamp.to_string()),
            bracket.paint("]"),
            style.paint(visitor.message)
        )
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
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
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        match visitor.severity {
            Some(sev) => writeln!(writer, "{} [{}] [{}] {}", timestamp, level, sev, visitor.message),
            None => writeln!(writer, "{} [{}] {}", timestamp, level, visitor.message),
        }
    }
}
