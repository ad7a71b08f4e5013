use serde_json::json;
use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use x_downloader_host::dispatch::{self, Response};
use x_downloader_host::download::{DownloadError, DownloadedMedia, Downloader};
use x_downloader_host::host::{decode_message_opt, encode_message, MAX_FROM_BROWSER};

/// Scripted delegate: answers each call from a queue and records what it
/// was asked to download and where.
struct ScriptedDownloader {
    calls: RefCell<Vec<(String, PathBuf)>>,
    results: RefCell<Vec<Result<DownloadedMedia, DownloadError>>>,
}

impl ScriptedDownloader {
    fn new(results: Vec<Result<DownloadedMedia, DownloadError>>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            results: RefCell::new(results),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(url, _)| url.clone()).collect()
    }

    fn dirs(&self) -> Vec<PathBuf> {
        self.calls.borrow().iter().map(|(_, dir)| dir.clone()).collect()
    }
}

impl Downloader for ScriptedDownloader {
    fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadedMedia, DownloadError> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), output_dir.to_path_buf()));
        self.results.borrow_mut().remove(0)
    }
}

fn media(title: &str, filename: &str) -> DownloadedMedia {
    DownloadedMedia {
        title: title.to_string(),
        filename: PathBuf::from(filename),
    }
}

fn frames(messages: &[serde_json::Value]) -> Vec<u8> {
    messages
        .iter()
        .flat_map(|m| encode_message(m).unwrap())
        .collect()
}

/// Drive a whole session against in-memory pipes and decode every reply.
fn run_session(input: Vec<u8>, downloader: &ScriptedDownloader) -> Vec<Response> {
    let mut input = Cursor::new(input);
    let mut output = Vec::new();
    dispatch::run(&mut input, &mut output, downloader, Path::new("/downloads"));

    let mut cur = Cursor::new(output);
    let mut responses = Vec::new();
    while let Some(raw) = decode_message_opt(&mut cur, MAX_FROM_BROWSER).expect("well-framed reply")
    {
        responses.push(serde_json::from_str(&raw).expect("reply is a Response"));
    }
    responses
}

#[test]
fn missing_url_is_refused_without_calling_the_delegate() {
    let downloader = ScriptedDownloader::new(vec![]);
    let responses = run_session(frames(&[json!({})]), &downloader);

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0], Response::failure("No URL provided"));
    assert!(downloader.calls().is_empty());
}

#[test]
fn successful_download_reports_title_and_filename() {
    let downloader =
        ScriptedDownloader::new(vec![Ok(media("Some clip", "/downloads/Some clip.mp4"))]);
    let responses = run_session(
        frames(&[json!({ "url": "https://twitter.com/user/status/123" })]),
        &downloader,
    );

    assert_eq!(responses.len(), 1);
    assert!(responses[0].success);
    assert_eq!(responses[0].title.as_deref(), Some("Some clip"));
    assert_eq!(
        responses[0].filename.as_deref(),
        Some("/downloads/Some clip.mp4")
    );
    assert!(responses[0].error.is_none());
}

#[test]
fn delegate_receives_the_normalized_url() {
    let downloader = ScriptedDownloader::new(vec![Ok(media("clip", "/downloads/clip.mp4"))]);
    run_session(
        frames(&[json!({ "url": "https://x.com/user/status/123?foo=bar" })]),
        &downloader,
    );

    assert_eq!(
        downloader.calls(),
        vec!["https://twitter.com/user/status/123".to_string()]
    );
}

#[test]
fn delegate_failure_is_reported_and_the_next_request_still_served() {
    let downloader = ScriptedDownloader::new(vec![
        Err(DownloadError::Extraction(
            "[twitter] 123: No video could be found in this tweet".to_string(),
        )),
        Ok(media("second", "/downloads/second.mp4")),
    ]);
    let responses = run_session(
        frames(&[
            json!({ "url": "https://twitter.com/user/status/123" }),
            json!({ "url": "https://twitter.com/user/status/456" }),
        ]),
        &downloader,
    );

    assert_eq!(responses.len(), 2);
    assert!(!responses[0].success);
    let error = responses[0].error.as_deref().unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("No video could be found"));
    assert!(responses[1].success);
    assert_eq!(downloader.calls().len(), 2);
}

#[test]
fn delegate_receives_the_configured_output_directory() {
    let td = tempfile::tempdir().unwrap();
    let downloader = ScriptedDownloader::new(vec![Ok(media("clip", "/downloads/clip.mp4"))]);
    let mut input = Cursor::new(frames(&[
        json!({ "url": "https://twitter.com/user/status/123" }),
    ]));
    let mut output = Vec::new();
    dispatch::run(&mut input, &mut output, &downloader, td.path());

    assert_eq!(downloader.dirs(), vec![td.path().to_path_buf()]);
}

#[test]
fn end_of_stream_writes_nothing() {
    let downloader = ScriptedDownloader::new(vec![]);
    let responses = run_session(Vec::new(), &downloader);

    assert!(responses.is_empty());
    assert!(downloader.calls().is_empty());
}

#[test]
fn empty_frame_is_answered_as_failure_and_the_loop_continues() {
    let downloader = ScriptedDownloader::new(vec![]);
    // A zero-length frame (empty payload, not valid JSON), then a request.
    let mut input = 0u32.to_ne_bytes().to_vec();
    input.extend(frames(&[json!({})]));
    let responses = run_session(input, &downloader);

    assert_eq!(responses.len(), 2);
    assert!(!responses[0].success);
    assert!(responses[0].error.is_some());
    assert_eq!(responses[1], Response::failure("No URL provided"));
}

#[test]
fn non_object_json_is_refused_without_calling_the_delegate() {
    let downloader = ScriptedDownloader::new(vec![]);
    let responses = run_session(frames(&[json!([1, 2, 3]), json!(null)]), &downloader);

    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| !r.success));
    assert!(responses.iter().all(|r| r.error.is_some()));
    assert!(downloader.calls().is_empty());
}

#[test]
fn invalid_utf8_payload_is_answered_and_the_loop_continues() {
    let downloader = ScriptedDownloader::new(vec![]);
    let body = [0xff, 0xfe, 0xfd];
    let mut input = (body.len() as u32).to_ne_bytes().to_vec();
    input.extend_from_slice(&body);
    input.extend(frames(&[json!({})]));
    let responses = run_session(input, &downloader);

    assert_eq!(responses.len(), 2);
    assert!(!responses[0].success);
    assert_eq!(responses[1], Response::failure("No URL provided"));
}

#[test]
fn truncated_prefix_gets_a_best_effort_failure_then_the_loop_stops() {
    let downloader = ScriptedDownloader::new(vec![]);
    let responses = run_session(vec![0x01, 0x02], &downloader);

    assert_eq!(responses.len(), 1);
    assert!(!responses[0].success);
    assert!(downloader.calls().is_empty());
}
