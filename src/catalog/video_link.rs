//! Video link normalization.
//!
//! Rewrites the two recognized YouTube URL shapes to the embeddable form and
//! passes everything else through untouched. Inputs that contain a trigger
//! substring but no identifier degrade to a best-effort extraction; callers
//! drop empty links, not this function.

const EMBED_PREFIX: &str = "https://www.youtube.com/embed/";

/// Rewrite `watch?v=` and `youtu.be/` URLs to the embed form.
///
/// The identifier is whatever follows the trigger substring, cut at the
/// first `&` (watch URLs) or `?` (short URLs). No scheme validation is
/// performed.
pub fn normalize_video_link(url: &str) -> String {
    if let Some((_, tail)) = url.split_once("watch?v=") {
        let video_id = tail.split('&').next().unwrap_or("");
        return format!("{EMBED_PREFIX}{video_id}");
    }
    if let Some((_, tail)) = url.split_once("youtu.be/") {
        let video_id = tail.split('?').next().unwrap_or("");
        return format!("{EMBED_PREFIX}{video_id}");
    }
    url.to_owned()
}

/// Normalize a draft's video links and drop the entries that come out empty.
pub(crate) fn sanitize_video_links(links: Vec<String>) -> Vec<String> {
    links
        .into_iter()
        .map(|link| normalize_video_link(&link))
        .filter(|link| !link.is_empty())
        .collect()
}
