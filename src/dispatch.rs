use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

use crate::download::{DownloadedMedia, Downloader};
use crate::host::{self, NmError, MAX_FROM_BROWSER};
use crate::url::normalize_media_url;

/// A request from the extension. Anything in the object besides `url` is
/// ignored; `url` itself is allowed to be absent.
#[derive(Debug, Deserialize)]
pub struct Request {
    pub url: Option<String>,
}

/// The reply: exactly one per inbound message, success or not.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(media: DownloadedMedia) -> Self {
        Self {
            success: true,
            title: Some(media.title),
            filename: Some(media.filename.to_string_lossy().into_owned()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            title: None,
            filename: None,
            error: Some(error.into()),
        }
    }
}

/// Run the dispatch loop until the input stream closes.
///
/// Every complete inbound frame is answered with exactly one response,
/// including frames that fail to decode or parse. A failure while writing a
/// response is logged and suppressed. The loop only stops on a clean
/// end-of-stream or when the stream itself becomes unreadable.
pub fn run<R, W, D>(input: &mut R, output: &mut W, downloader: &D, output_dir: &Path)
where
    R: Read,
    W: Write,
    D: Downloader,
{
    loop {
        match host::decode_message_opt(input, MAX_FROM_BROWSER) {
            Ok(Some(raw)) => {
                log::debug!("received raw message: {raw}");
                let response = handle_message(&raw, downloader, output_dir);
                if let Err(e) = host::send_json(output, &response) {
                    log::error!("failed to write response: {e}");
                }
            }
            Ok(None) => {
                log::info!("input stream closed, stopping");
                break;
            }
            Err(e) => {
                log::error!("error reading message: {e}");
                let response = Response::failure(e.to_string());
                if let Err(write_err) = host::send_json(output, &response) {
                    log::error!("failed to write failure response: {write_err}");
                }
                // A bad payload inside a complete frame leaves the stream
                // in sync; a truncated or oversized frame does not.
                if matches!(e, NmError::Utf8(_)) {
                    continue;
                }
                break;
            }
        }
    }
}

fn handle_message<D: Downloader>(raw: &str, downloader: &D, output_dir: &Path) -> Response {
    let request: Request = match serde_json::from_str(raw) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("unparseable request: {e}");
            return Response::failure(format!("invalid request: {e}"));
        }
    };

    let Some(url) = request.url else {
        log::warn!("request carried no url");
        return Response::failure("No URL provided");
    };

    let normalized = normalize_media_url(&url);
    if normalized != url {
        log::info!("normalized {url} -> {normalized}");
    }

    match downloader.download(&normalized, output_dir) {
        Ok(media) => {
            log::info!("download complete: {}", media.title);
            Response::ok(media)
        }
        Err(e) => {
            log::error!("download failed: {e}");
            Response::failure(e.to_string())
        }
    }
}
