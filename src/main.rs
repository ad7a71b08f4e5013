use std::fs;
use std::io;
use std::path::PathBuf;

use x_downloader_host::dispatch;
use x_downloader_host::download::YtDlp;
use x_downloader_host::logging::{self, LogOptions};

/// Videos land in `~/Downloads/x_downloads`.
fn download_dir() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join("Downloads").join("x_downloads"))
}

fn main() {
    logging::init(LogOptions::default());

    let Some(output_dir) = download_dir() else {
        log::error!("could not resolve a home directory for the download folder");
        std::process::exit(1);
    };
    if let Err(e) = fs::create_dir_all(&output_dir) {
        log::error!("failed to create {}: {e}", output_dir.display());
        std::process::exit(1);
    }

    log::info!("native host started, downloads go to {}", output_dir.display());

    let downloader = YtDlp::new();
    let stdin = io::stdin();
    let stdout = io::stdout();
    dispatch::run(&mut stdin.lock(), &mut stdout.lock(), &downloader, &output_dir);

    log::info!("native host shutting down");
}
