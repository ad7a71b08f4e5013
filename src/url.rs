/// Rewrite a Twitter/X URL into the form the extractor handles best:
/// the `x.com` host becomes `twitter.com`, any query string is dropped,
/// and a missing scheme becomes `https://`.
///
/// Pure string surgery, total: there is no input this can fail on.
pub fn normalize_media_url(url: &str) -> String {
    let without_query = match url.find('?') {
        Some(idx) => &url[..idx],
        None => url,
    };

    let rewritten = match without_query.split_once("://") {
        Some((scheme, rest)) => {
            let (host, path) = match rest.split_once('/') {
                Some((host, path)) => (host, Some(path)),
                None => (rest, None),
            };
            // Only a parsed host is rewritten; a scheme-less "x.com/..." has
            // no host component and is left alone.
            if host == "x.com" {
                match path {
                    Some(path) => format!("{scheme}://twitter.com/{path}"),
                    None => format!("{scheme}://twitter.com"),
                }
            } else {
                without_query.to_string()
            }
        }
        None => without_query.to_string(),
    };

    // A leading "http" counts as schemed, even for a bare host such as
    // "httpfoo.com"; the extension only ever hands over status URLs.
    if rewritten.starts_with("http") {
        rewritten
    } else {
        format!("https://{rewritten}")
    }
}
