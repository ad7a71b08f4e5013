use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// What a successful download yields: the media title and the absolute
/// path the file was written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    pub title: String,
    pub filename: PathBuf,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to launch yt-dlp: {0}")]
    Spawn(io::Error),
    #[error("{0}")]
    Extraction(String),
    #[error("yt-dlp finished without reporting an output file")]
    MissingOutput,
}

/// The seam between the dispatcher and whatever performs the download.
pub trait Downloader {
    fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadedMedia, DownloadError>;
}

/// Downloads by running the `yt-dlp` executable: best available format,
/// `%(title)s.%(ext)s` inside the output directory, cookies from the Chrome
/// profile (most Twitter videos need a logged-in session), and a 30 second
/// socket timeout so a dead connection cannot hold a request open forever.
#[derive(Debug, Clone)]
pub struct YtDlp {
    pub program: PathBuf,
    /// Browser profile to lift session cookies from; `None` downloads
    /// anonymously.
    pub cookies_from_browser: Option<String>,
    pub socket_timeout_secs: u32,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            cookies_from_browser: Some("chrome".to_string()),
            socket_timeout_secs: 30,
        }
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Downloader for YtDlp {
    fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadedMedia, DownloadError> {
        let template = output_dir.join("%(title)s.%(ext)s");

        let mut cmd = Command::new(&self.program);
        cmd.arg("--format")
            .arg("best")
            .arg("--output")
            .arg(&template)
            .arg("--socket-timeout")
            .arg(self.socket_timeout_secs.to_string())
            .arg("--no-progress")
            .arg("--no-warnings")
            // --print alone implies a dry run; --no-simulate keeps the
            // download while still printing the requested fields.
            .arg("--no-simulate")
            .arg("--print")
            .arg("title")
            .arg("--print")
            .arg("after_move:filepath");
        if let Some(browser) = &self.cookies_from_browser {
            cmd.arg("--cookies-from-browser").arg(browser);
        }
        cmd.arg("--").arg(url);

        log::debug!("running {:?}", cmd);
        let output = cmd.output().map_err(DownloadError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = extraction_failure(&stderr)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status));
            return Err(DownloadError::Extraction(message));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_print_output(&stdout).ok_or(DownloadError::MissingOutput)
    }
}

/// The last `ERROR:` line is yt-dlp's own description of what went wrong;
/// fall back to the last non-empty stderr line. `None` when stderr carried
/// nothing usable.
fn extraction_failure(stderr: &str) -> Option<String> {
    let mut last_error = None;
    let mut last_line = None;
    for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("ERROR:") {
            last_error = Some(line);
        }
        last_line = Some(line);
    }
    last_error
        .or(last_line)
        .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
}

/// `--print title --print after_move:filepath` yields two stdout lines per
/// downloaded item: the title, then the absolute file path.
fn parse_print_output(stdout: &str) -> Option<DownloadedMedia> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let title = lines.next()?.to_string();
    let filename = PathBuf::from(lines.next()?);
    Some(DownloadedMedia { title, filename })
}
