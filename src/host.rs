use serde::Serialize;
use std::io::{self, Read, Write};
use thiserror::Error;

pub const MAX_TO_BROWSER: usize = 1_048_576; // 1 MB (host -> browser)
pub const MAX_FROM_BROWSER: usize = 64 * 1_048_576; // 64 MB (browser -> host)

/// Errors produced by the framing layer.
///
/// [`NmError::Disconnected`] means the peer closed the stream in the middle
/// of a frame (a truncated length prefix or a short payload). A clean close
/// is not an error: [`decode_message_opt`] reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum NmError {
    #[error("stream closed mid-frame")]
    Disconnected,
    #[error("incoming message of {len} bytes exceeds the {cap} byte cap")]
    TooLarge { len: usize, cap: usize },
    #[error("outgoing message of {len} bytes exceeds the 1MB browser limit")]
    Oversize { len: usize },
    #[error("message payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Read the 4-byte length prefix. `Ok(None)` when the stream is already at
/// end-of-file (clean close); `Disconnected` when it ends after 1-3 bytes.
fn read_u32_len_opt<R: Read>(r: &mut R) -> Result<Option<u32>, NmError> {
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        match r.read(&mut len_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(NmError::Disconnected),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(NmError::Io(e)),
        }
    }
    Ok(Some(u32::from_ne_bytes(len_buf)))
}

/// Encode any serde-serializable value into the native-messaging frame:
/// 4-byte native-endian length + JSON bytes.
pub fn encode_message<T: Serialize>(msg: &T) -> Result<Vec<u8>, NmError> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_TO_BROWSER {
        return Err(NmError::Oversize { len: json.len() });
    }
    let mut out = Vec::with_capacity(4 + json.len());
    out.extend_from_slice(&(json.len() as u32).to_ne_bytes());
    out.extend_from_slice(&json);
    Ok(out)
}

/// Decode a single framed message from a reader, treating end-of-stream as a
/// normal close: `Ok(None)` when the reader is already exhausted at the point
/// the length prefix is expected. This is the loop-facing read.
pub fn decode_message_opt<R: Read>(
    reader: &mut R,
    max_size: usize,
) -> Result<Option<String>, NmError> {
    let len = match read_u32_len_opt(&mut *reader)? {
        Some(len) => len as usize,
        None => return Ok(None),
    };
    let cap = max_size.min(MAX_FROM_BROWSER);
    if len > cap {
        return Err(NmError::TooLarge { len, cap });
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => NmError::Disconnected,
        _ => NmError::Io(e),
    })?;
    Ok(Some(String::from_utf8(buf)?))
}

/// Decode a single framed message from a reader (useful in tests and
/// one-shot callers). End-of-stream is `Disconnected` here.
pub fn decode_message<R: Read>(reader: &mut R, max_size: usize) -> Result<String, NmError> {
    decode_message_opt(reader, max_size)?.ok_or(NmError::Disconnected)
}

/// Serialize `msg`, frame it, write it, and flush immediately. The browser
/// reads each message as a discrete frame; an unflushed reply stalls the
/// extension until the process exits.
pub fn send_json<W: Write, T: Serialize>(writer: &mut W, msg: &T) -> Result<(), NmError> {
    let frame = encode_message(msg)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}
