use log::LevelFilter;
use std::io;
use std::path::PathBuf;

/// Where diagnostics go and how much of them. The binary decides once at
/// startup; nothing else reads ambient configuration.
pub struct LogOptions {
    pub level: LevelFilter,
    /// Append-only log file. `None` logs to stderr only.
    pub file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: LevelFilter::Debug,
            file: default_log_path(),
        }
    }
}

/// The log file lives next to the executable: `<binary>.log`.
fn default_log_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.with_extension("log"))
}

/// Wire the `log` facade to stderr plus the append-only file. stdout carries
/// protocol frames and must stay untouched. Any failure here degrades to
/// stderr-only logging; it never aborts the host.
pub fn init(options: LogOptions) {
    let base = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} - {} - [{}:{}] - {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                message
            ))
        })
        .level(options.level)
        .chain(io::stderr());

    let dispatch = match options.file.as_ref().map(fern::log_file) {
        Some(Ok(file)) => base.chain(file),
        Some(Err(e)) => {
            eprintln!("warning: could not open log file, logging to stderr only: {e}");
            base
        }
        None => base,
    };

    if let Err(e) = dispatch.apply() {
        eprintln!("warning: failed to initialize logging: {e}");
    }
}
