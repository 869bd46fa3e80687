use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE: &str = "score_ticker.log";

/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(log_dir: Option<&str>, console: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir.map(str::trim).filter(|d| !d.is_empty()) {
        Some(dir) if dir_writable(dir) => {
            // rolling::daily panics if it cannot create the file, hence the
            // writability probe above.
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        Some(dir) => {
            eprintln!("warning: log directory {dir} is not writable, file logging disabled");
            (None, None)
        }
        None => (None, None),
    };

    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    guard
}

fn dir_writable(dir: &str) -> bool {
    if fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = Path::new(dir).join(".score_ticker_write_test");
    let ok = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&probe)
        .is_ok();
    let _ = fs::remove_file(&probe);
    ok
}
