//! Display names for imported URLs.

use percent_encoding::percent_decode_str;
use ::url::Url;

/// Derive the display name of an imported document from its URL: the last
/// non-empty path segment, percent-decoded, ignoring query and fragment.
/// Relative inputs are resolved against `file:///`.
///
/// Falls back to the host (or the raw input) when the path is empty, so the
/// returned name is never empty for a non-empty URL.
pub fn display_name(url: &str) -> String {
    let trimmed = url.trim();
    let base = Url::parse("file:///").ok();
    let Ok(parsed) = Url::options().base_url(base.as_ref()).parse(trimmed) else {
        return trimmed.to_string();
    };

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned());

    segment
        .or_else(|| {
            parsed
                .host_str()
                .filter(|host| !host.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| trimmed.to_string())
}
