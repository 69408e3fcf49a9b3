//! Link building for record hrefs.

use url::Url;

/// Appends path segments to `base`, percent-encoding each one so that a
/// `/`, `?` or `#` inside a segment cannot change the link's structure.
pub fn build_link(base: &str, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Adds or removes the trailing slash of a URL's path.
///
/// With `add_slash`, a slash is appended only when the last path segment
/// has no file extension, so `.../Page/1.xml` never becomes `.../Page/1.xml/`.
/// Without it, a trailing slash is stripped unless the path is the root.
/// Query string and fragment are left alone.
pub fn normalise_trailing_slash(url: &mut Url, add_slash: bool) {
    let path = url.path();
    let normalised = if add_slash {
        let last_segment = path.rsplit('/').next().unwrap_or("");
        if path.ends_with('/') || last_segment.contains('.') {
            return;
        }
        format!("{}/", path)
    } else {
        let stripped = path.trim_end_matches('/');
        if stripped.len() == path.len() {
            return;
        }
        if stripped.is_empty() {
            "/".to_string()
        } else {
            stripped.to_string()
        }
    };
    url.set_path(&normalised);
}
