use crate::types::{FeedPost, MergedPost, PostDetail};

/// Reconcile the feed snapshot with the detail record into one canonical
/// post. Pure: no I/O, no failure mode; missing detail data defaults away.
///
/// Precedence rules:
/// - `content`: detail text wins only when non-empty and strictly longer,
///   so a partially failed deep scrape can never shorten the post.
/// - `media_urls`: whichever source has media is authoritative wholesale;
///   the lists are never unioned (duplicate and mismatched-resolution media).
/// - everything else is pass-through from the source that produced it.
pub fn merge(base: FeedPost, detail: PostDetail) -> MergedPost {
    let content = if !detail.full_text.is_empty()
        && detail.full_text.chars().count() > base.content.chars().count()
    {
        detail.full_text
    } else {
        base.content
    };

    let media_urls = if !detail.media_urls.is_empty() {
        detail.media_urls
    } else {
        base.media_urls
    };

    MergedPost {
        id: base.id,
        url: base.url,
        content,
        timestamp_text: base.timestamp_text,
        media_urls,
        video_url: detail.video_url,
        is_retruth: detail.is_retruth,
        retruth_header: detail.retruth_header,
        card_content: detail.card_content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(content: &str, media: &[&str]) -> FeedPost {
        FeedPost {
            id: "123".to_string(),
            url: "https://truthsocial.com/@realDonaldTrump/posts/123".to_string(),
            content: content.to_string(),
            timestamp_text: "January 5, 2026 @ 3:41 PM ET".to_string(),
            media_urls: media.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn longer_detail_text_and_detail_media_win() {
        let detail = PostDetail {
            full_text: "hi there".to_string(),
            media_urls: vec!["m1".to_string()],
            ..Default::default()
        };
        let merged = merge(base("hi", &[]), detail);
        assert_eq!(merged.content, "hi there");
        assert_eq!(merged.media_urls, vec!["m1"]);
    }

    #[test]
    fn shorter_detail_text_and_empty_detail_media_are_rejected() {
        let detail = PostDetail {
            full_text: "hi".to_string(),
            ..Default::default()
        };
        let merged = merge(base("hello world", &["m0"]), detail);
        assert_eq!(merged.content, "hello world");
        assert_eq!(merged.media_urls, vec!["m0"]);
    }

    #[test]
    fn equal_length_detail_text_keeps_the_base() {
        let detail = PostDetail {
            full_text: "ab".to_string(),
            ..Default::default()
        };
        assert_eq!(merge(base("cd", &[]), detail).content, "cd");
    }

    #[test]
    fn failed_enrichment_passes_base_through_unchanged() {
        let merged = merge(base("original", &["m0"]), PostDetail::default());
        assert_eq!(merged.content, "original");
        assert_eq!(merged.media_urls, vec!["m0"]);
        assert!(!merged.is_retruth);
        assert!(merged.retruth_header.is_empty());
        assert!(merged.video_url.is_none());
        assert!(merged.card_content.is_none());
        assert_eq!(merged.id, "123");
    }

    #[test]
    fn retruth_video_and_card_copy_through_verbatim() {
        let detail = PostDetail {
            is_retruth: true,
            retruth_header: "ReTruthed from @Foo".to_string(),
            video_url: Some("https://cdn.example/v.mp4".to_string()),
            card_content: Some("Title\nDesc".to_string()),
            ..Default::default()
        };
        let merged = merge(base("text body here", &[]), detail);
        assert!(merged.is_retruth);
        assert_eq!(merged.retruth_header, "ReTruthed from @Foo");
        assert_eq!(merged.video_url.as_deref(), Some("https://cdn.example/v.mp4"));
        assert_eq!(merged.card_content.as_deref(), Some("Title\nDesc"));
    }
}
