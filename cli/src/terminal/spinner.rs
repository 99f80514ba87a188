use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TIP_DURATION: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const TIPS: &[&str] = &[
    "Press Ctrl-C to stop admitting new hosts",
    "Raise --aggressiveness to scan faster",
    "Use --json to feed results into other tools",
];

fn style() -> Option<ProgressStyle> {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .ok()
        .map(|style| {
            style.tick_strings(&[
                "▁▁▁▁▁",
                "▁▂▂▂▁",
                "▁▄▂▄▁",
                "▂▄▆▄▂",
                "▄▆█▆▄",
                "▂▄▆▄▂",
                "▁▄▂▄▁",
                "▁▂▂▂▁",
            ])
        })
}

/// Drives the spinner attached to `span` until `running` goes false,
/// rotating through usage tips.
pub fn start_scan_spinner(span: Span, host_count: u128, running: Arc<AtomicBool>) -> JoinHandle<()> {
    if let Some(style) = style() {
        span.pb_set_style(&style);
    }
    let headline = format!(
        "Probing {} host(s)...",
        host_count.to_string().green().bold()
    );
    span.pb_set_message(&headline);

    thread::spawn(move || {
        let mut tip_index = 0;
        let mut next_switch = Instant::now() + TIP_DURATION;
        let mut showing_tip = false;

        while running.load(Ordering::Relaxed) {
            if Instant::now() >= next_switch {
                if showing_tip {
                    span.pb_set_message(&headline);
                } else {
                    let tip = TIPS[tip_index % TIPS.len()];
                    span.pb_set_message(&format!("{}", tip.italic().white()));
                    tip_index += 1;
                }
                showing_tip = !showing_tip;
                next_switch = Instant::now() + TIP_DURATION;
            }
            thread::sleep(POLL_INTERVAL);
        }
    })
}
