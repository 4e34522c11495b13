use std::{fs, io};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use countdown::paths;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleFormat {
    /// Level and message only.
    Compact,
    /// Timestamps, targets and debug events (`-v`).
    Verbose,
    /// One JSON object per line (`--log-json`).
    Json,
    /// Indented JSON (`--log-json --pretty`).
    PrettyJson,
}

impl ConsoleFormat {
    pub fn from_flags(verbose: bool, log_json: bool, pretty: bool) -> Self {
        match (log_json, pretty, verbose) {
            (true, true, _) => ConsoleFormat::PrettyJson,
            (true, false, _) => ConsoleFormat::Json,
            (false, _, true) => ConsoleFormat::Verbose,
            (false, _, false) => ConsoleFormat::Compact,
        }
    }
}

/// Installs the global subscriber.
///
/// Console logs always go to stderr; stdout belongs to the countdown display
/// and the `once --json` snapshot. When `run_id` is set, a JSON debug log is
/// also written to `~/.countdown/logs/run-<id>.log`. The returned guard must
/// outlive every log call so that file is flushed.
pub fn init(
    format: ConsoleFormat,
    run_id: Option<&str>,
) -> Option<WorkerGuard> {
    let (file_layer, guard) = match run_id.map(open_run_log) {
        Some(Ok((writer, guard))) => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(Targets::new().with_default(tracing::Level::DEBUG));
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Warning: run log disabled: {e}");
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer(format))
        .with(file_layer)
        .init();

    guard
}

/// One file per run, never rotated.
fn open_run_log(id: &str) -> io::Result<(NonBlocking, WorkerGuard)> {
    let log_dir = paths::data_dir().join("logs");
    fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::never(&log_dir, format!("run-{id}.log"));
    Ok(tracing_appender::non_blocking(appender))
}

fn console_layer(format: ConsoleFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_env_filter(format == ConsoleFormat::Verbose));
    match format {
        ConsoleFormat::PrettyJson => Box::new(
            fmt::layer()
                .json()
                .with_writer(|| PrettyJsonWriter::new(io::stderr()))
                .with_filter(filter),
        ),
        ConsoleFormat::Json => Box::new(
            fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_filter(filter),
        ),
        ConsoleFormat::Verbose => Box::new(fmt::layer().with_writer(io::stderr).with_filter(filter)),
        ConsoleFormat::Compact => Box::new(
            fmt::layer()
                .with_writer(io::stderr)
                .without_time()
                .with_target(false)
                .with_filter(filter),
        ),
    }
}

/// Re-indents single-line JSON log records.
struct PrettyJsonWriter<W: io::Write> {
    inner: W,
}

impl<W: io::Write> PrettyJsonWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: io::Write> io::Write for PrettyJsonWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let record = std::str::from_utf8(buf)
            .ok()
            .and_then(|s| serde_json::from_str::<serde_json::Value>(s.trim()).ok())
            .filter(serde_json::Value::is_object);
        match record {
            Some(val) => {
                serde_json::to_writer_pretty(&mut self.inner, &val)?;
                self.inner.write_all(b"\n")?;
                Ok(buf.len())
            }
            None => self.inner.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn default_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose {
        "countdown=debug,info"
    } else {
        "countdown=info,warn"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn json_wins_over_verbose() {
        assert_eq!(ConsoleFormat::from_flags(true, true, false), ConsoleFormat::Json);
        assert_eq!(ConsoleFormat::from_flags(true, true, true), ConsoleFormat::PrettyJson);
        assert_eq!(ConsoleFormat::from_flags(true, false, false), ConsoleFormat::Verbose);
        assert_eq!(ConsoleFormat::from_flags(false, false, false), ConsoleFormat::Compact);
    }

    #[test]
    fn pretty_writer_indents_json_records() {
        let mut writer = PrettyJsonWriter::new(Vec::new());
        writer.write_all(b"{\"level\":\"INFO\"}\n").unwrap();
        writer.write_all(b"plain text\n").unwrap();
        let output = String::from_utf8(writer.inner).unwrap();
        assert_eq!(output, "{\n  \"level\": \"INFO\"\n}\nplain text\n");
    }
}
