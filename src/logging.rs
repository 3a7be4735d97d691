//! The event sink contract a run reports through, plus a colorized console default.

use colored::Colorize;
use fern::Dispatch;
use log::LevelFilter;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const TIME_FORMAT: &[FormatItem<'_>] = format_description!("[hour]:[minute]:[second]");

/// Everything a run reports through during execution. A trait rather than a concrete logger so
/// a caller embedding this crate can redirect output (a test harness capturing lines, a daemon
/// forwarding to a different channel) without touching the executor.
pub trait BuildEventSink: Send + Sync {
    fn log(&self, line: &str);

    fn logfn(&self, args: std::fmt::Arguments<'_>) {
        self.log(&args.to_string());
    }

    fn trace(&self, line: &str);

    fn tracefn(&self, args: std::fmt::Arguments<'_>) {
        self.trace(&args.to_string());
    }

    fn trace_error(&self, line: &str);

    fn trace_line(&self);

    fn trace_header(&self, line: &str);

    fn trace_important(&self, line: &str);

    fn trace_start_target(&self, name: &str, description: Option<&str>, dependency_list: &str);

    fn trace_end_target(&self, name: &str);

    fn send_vendor_error(&self, message: &str);

    fn close_all_open_tags(&self);

    fn kill_all_created_processes(&self);
}

/// The default console sink: colorized, level-filtered, timestamped lines through the `log`
/// facade.
#[derive(Debug, Default)]
pub struct DefaultEventSink;

impl DefaultEventSink {
    /// Installs this sink as the process-wide `log` backend at the given level filter.
    pub fn install(level: LevelFilter) -> Result<(), log::SetLoggerError> {
        Dispatch::new()
            .format(|out, message, record| {
                let level_str = match record.level() {
                    log::Level::Error => record.level().to_string().red().to_string(),
                    log::Level::Warn => record.level().to_string().yellow().to_string(),
                    log::Level::Info => record.level().to_string().green().to_string(),
                    log::Level::Debug => record.level().to_string().blue().to_string(),
                    log::Level::Trace => record.level().to_string().bright_black().to_string(),
                };
                let now = OffsetDateTime::now_utc();
                let stamp = now.format(TIME_FORMAT).unwrap_or_else(|_| "--:--:--".to_string());
                out.finish(format_args!("[{stamp}] {level_str:>5}: {message}"))
            })
            .level(level)
            .chain(std::io::stdout())
            .apply()
    }
}

impl BuildEventSink for DefaultEventSink {
    fn log(&self, line: &str) {
        log::info!("{line}");
    }

    fn trace(&self, line: &str) {
        log::debug!("{line}");
    }

    fn trace_error(&self, line: &str) {
        log::error!("{line}");
    }

    fn trace_line(&self) {
        log::debug!("{}", "-".repeat(60));
    }

    fn trace_header(&self, line: &str) {
        log::info!("{}", line.bold());
    }

    fn trace_important(&self, line: &str) {
        log::warn!("{}", line.bold());
    }

    fn trace_start_target(&self, name: &str, description: Option<&str>, dependency_list: &str) {
        let desc = description.unwrap_or_default();
        if dependency_list.is_empty() {
            log::debug!("> {} {}", name.bold(), desc);
        } else {
            log::debug!("> {} {} (needs {})", name.bold(), desc, dependency_list);
        }
    }

    fn trace_end_target(&self, name: &str) {
        log::debug!("< {}", name.bold());
    }

    fn send_vendor_error(&self, message: &str) {
        log::error!("{}", message.red());
    }

    fn close_all_open_tags(&self) {}

    fn kill_all_created_processes(&self) {}
}
