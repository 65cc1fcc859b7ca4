use regex::Regex;
use tracing::debug;

use crate::types::MergedPost;

/// Structural sentinels the translation system prompt keys its introductory
/// phrasing on. They must be preserved byte-for-byte.
pub const SHARED_CONTENT_MARKER: &str = "[SHARED_CONTENT]";
pub const LINK_PREVIEW_MARKER: &str = "[LINK_PREVIEW]";

/// Minimum characters left after URL stripping for text to be worth a
/// translation call.
const MIN_TRANSLATABLE_CHARS: usize = 10;

/// True when the text carries more than bare links.
pub fn has_translatable_content(text: &str) -> bool {
    let re = Regex::new(r"https?://\S+").expect("valid regex");
    let stripped = re.replace_all(text, "");
    stripped.trim().chars().count() >= MIN_TRANSLATABLE_CHARS
}

/// Build the composite translation input for a merged post.
///
/// ReTruths get a bracketed attribution header, then the shared-content
/// marker and the shared text; plain posts emit their content verbatim;
/// link-preview card content is appended under its own marker. Returns
/// `None` when there is nothing worth translating, in which case the
/// translation collaborator must not be called at all.
pub fn compose(post: &MergedPost) -> Option<String> {
    let content = post.content.trim();
    let mut parts: Vec<String> = Vec::new();

    if post.is_retruth {
        let header = if post.retruth_header.is_empty() {
            "ReTruthed"
        } else {
            post.retruth_header.as_str()
        };
        parts.push(format!("[{header}]"));
        if !content.is_empty() {
            parts.push(SHARED_CONTENT_MARKER.to_string());
            parts.push(content.to_string());
        }
    } else if !content.is_empty() {
        parts.push(content.to_string());
    }

    if let Some(card) = post.card_content.as_deref().filter(|c| !c.trim().is_empty()) {
        parts.push(format!("\n{LINK_PREVIEW_MARKER}"));
        parts.push(card.trim().to_string());
    }

    if parts.is_empty() {
        return None;
    }

    let composed = parts.join("\n");
    if !has_translatable_content(&composed) {
        debug!(post_id = %post.id, "Skipping translation: content is only URLs/links");
        return None;
    }

    Some(composed)
}
