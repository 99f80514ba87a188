use std::fmt::Debug;

use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Target of events that carry pre-rendered terminal output.
pub const PRINT_TARGET: &str = "deployr::print";

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber: `RUST_LOG` (default `info`) filtering,
/// [`DeployrFormatter`] output, and an indicatif layer so spinners and log
/// lines share the terminal.
pub fn init_logging() {
    let indicatif_layer = IndicatifLayer::new();

    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if let Ok(directive) = format!("{PRINT_TARGET}=info").parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(DeployrFormatter)
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .init();
}

pub struct DeployrFormatter;

impl<S, N> FormatEvent<S, N> for DeployrFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let mut fields = EventFields::default();
        event.record(&mut fields);

        if meta.target() == PRINT_TARGET {
            if let Some(raw) = fields.raw_msg {
                return writeln!(writer, "{raw}");
            }
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
            Level::TRACE => ("[ ]", |s| s.dimmed()),
            Level::DEBUG => ("[?]", |s| s.blue()),
            Level::INFO if fields.success => ("[+]", |s| s.green().bold()),
            Level::INFO => ("[*]", |s| s.cyan().bold()),
            Level::WARN => ("[!]", |s| s.yellow().bold()),
            Level::ERROR => ("[-]", |s| s.red().bold()),
        };

        write!(writer, "{} {}", color_func(symbol.into()), fields.message)?;
        for (name, value) in &fields.extra {
            write!(writer, " {}", format!("{name}={value}").dimmed())?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct EventFields {
    message: String,
    raw_msg: Option<String>,
    success: bool,
    extra: Vec<(&'static str, String)>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "raw_msg" => self.raw_msg = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.extra.push((name, value.to_string())),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "success" => self.success = value,
            name => self.extra.push((name, value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "raw_msg" => self.raw_msg = Some(format!("{value:?}")),
            name => self.extra.push((name, format!("{value:?}"))),
        }
    }
}
