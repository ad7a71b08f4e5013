//! # x-downloader-host
//!
//! A **browser Native Messaging host** that saves Twitter/X videos. The
//! companion extension sends `{ "url": "…" }`, the host hands the URL to
//! `yt-dlp`, and exactly one JSON reply comes back per request:
//!
//! ```json
//! { "success": true,  "title": "…", "filename": "/abs/path.mp4" }
//! { "success": false, "error": "…" }
//! ```
//!
//! ---
//!
//! ## What is Native Messaging?
//!
//! Native Messaging is the mechanism by which a browser extension talks to a
//! local native process (this host) using standard I/O pipes.
//!
//! The wire protocol is:
//!
//! 1. The sender writes a **4-byte length prefix** (`u32`) in **native endianness**.
//! 2. Then writes **that many bytes** of UTF-8 JSON.
//!
//! The host reads from **stdin** and writes replies to **stdout**.
//!
//! ### Most important gotchas
//!
//! - **Disconnect is normal:** when the extension disconnects (or the browser
//!   exits), the browser closes the host's stdin. The loop treats a clean
//!   end-of-stream as shutdown, not as an error.
//! - **Message limits:**
//!   - Host → browser: **1 MiB** ([`host::MAX_TO_BROWSER`]).
//!   - Browser → host: **64 MiB** ([`host::MAX_FROM_BROWSER`]) to match
//!     Chrome's documented limit.
//! - **Never log to stdout:** stdout is reserved for framed protocol
//!   messages. Diagnostics go to stderr and the log file next to the binary
//!   (see [`logging`]).
//! - **One request, one reply:** even a frame that fails to decode is
//!   answered with a `success: false` response so the extension never hangs
//!   waiting.
//!
//! ---
//!
//! ## Crate layout
//!
//! - [`host`] — framing: encode/decode + stdio send helpers.
//! - [`dispatch`] — request/response types and the processing loop.
//! - [`download`] — the [`download::Downloader`] seam and the `yt-dlp`
//!   subprocess implementation.
//! - [`url`] — Twitter/X URL normalization applied before every download.
//! - [`logging`] — append-only diagnostic log, timestamp + severity +
//!   source location per line.
//!
//! ---
//!
//! ## Pure framing (runnable example)
//!
//! Framing is testable without stdin/stdout by using an in-memory buffer:
//!
//! ```rust
//! use x_downloader_host::host::{encode_message, decode_message, MAX_FROM_BROWSER};
//! use serde_json::json;
//! use std::io::Cursor;
//!
//! let msg = json!({"url": "https://twitter.com/user/status/123"});
//! let frame = encode_message(&msg).unwrap();
//!
//! let mut cur = Cursor::new(frame);
//! let raw = decode_message(&mut cur, MAX_FROM_BROWSER).unwrap();
//! let back: serde_json::Value = serde_json::from_str(&raw).unwrap();
//! assert_eq!(back, msg);
//! ```
//!
//! The dispatch loop itself is generic over `Read`/`Write` and the
//! [`download::Downloader`] trait for the same reason: a whole session can
//! be driven end-to-end against byte buffers and a scripted delegate.

pub mod dispatch;
pub mod download;
pub mod host;
pub mod logging;
pub mod url;

#[doc(inline)]
pub use dispatch::{Request, Response};
#[doc(inline)]
pub use download::{DownloadedMedia, Downloader, YtDlp};
#[doc(inline)]
pub use host::{decode_message, decode_message_opt, encode_message, send_json, NmError};
#[doc(inline)]
pub use url::normalize_media_url;
