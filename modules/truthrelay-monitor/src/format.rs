use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::types::MergedPost;

const EMBED_TITLE: &str = "🇺🇸 Új Truth Social bejegyzés - Donald Trump";
const EMBED_COLOR: u32 = 0x1DA1F2;

/// Body budget before the "continue at source" marker is appended.
const BODY_LIMIT: usize = 1800;
const BODY_TRUNCATION_SUFFIX: &str = "... [tovább az eredeti linken]";

/// Discord's embed description limit.
const DESCRIPTION_LIMIT: usize = 4096;

/// Zero-width space used as a visual spacer field.
const SPACER: &str = "\u{200b}";

/// Sourced timestamp pattern on the feed, e.g. "January 5, 2026 @ 3:41 PM ET".
const TIMESTAMP_PATTERN: &str = r"([A-Za-z]+ \d{1,2}, \d{4} @ \d{1,2}:\d{2} [AP]M ET)";

// --- Payload types (Discord webhook wire shape) ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl EmbedField {
    fn spacer() -> Self {
        Self {
            name: SPACER.to_string(),
            value: SPACER.to_string(),
            inline: false,
        }
    }
}

/// Map a merged post plus translation outcome into the notification payload.
/// Prefers the translated body; falls back to the original text, with the
/// reshare attribution prepended only on that fallback path (the translation
/// prompt already folds the attribution into translated output).
pub fn format(post: &MergedPost, translated: Option<&str>, original_text: &str) -> NotificationPayload {
    let translated = translated.map(str::trim).filter(|t| !t.is_empty());

    let mut original = original_text.to_string();
    if original.chars().count() > BODY_LIMIT {
        original = original.chars().take(BODY_LIMIT).collect::<String>() + BODY_TRUNCATION_SUFFIX;
    }

    let mut description_parts: Vec<String> = Vec::new();

    if post.is_retruth && translated.is_none() {
        let header = if post.retruth_header.is_empty() {
            "ReTruth"
        } else {
            post.retruth_header.as_str()
        };
        description_parts.push(format!("**{header}**"));
        description_parts.push("---".to_string());
    }

    if let Some(t) = translated {
        description_parts.push(t.to_string());
    } else if !original.is_empty() {
        description_parts.push(original);
    }

    let description = if description_parts.is_empty() {
        None
    } else {
        let mut full = description_parts.join("\n");
        if full.chars().count() > DESCRIPTION_LIMIT {
            full = full.chars().take(DESCRIPTION_LIMIT - 3).collect::<String>() + "...";
        }
        Some(full)
    };

    let image = post.media_urls.first().map(|url| EmbedImage { url: url.clone() });

    let mut fields = vec![EmbedField::spacer()];
    if let Some(video_url) = &post.video_url {
        fields.push(EmbedField {
            name: "🎬 Videó".to_string(),
            value: format!("[Lejátszás/Megtekintés]({video_url})"),
            inline: false,
        });
    }
    if !post.url.is_empty() {
        fields.push(EmbedField {
            name: "🔗 Eredeti bejegyzés".to_string(),
            value: format!("[Link a Truth Social-hoz]({})", post.url),
            inline: false,
        });
    }
    fields.push(EmbedField::spacer());

    let footer = EmbedFooter {
        text: footer_text(&post.timestamp_text, Utc::now()),
    };

    NotificationPayload {
        embeds: vec![Embed {
            title: EMBED_TITLE.to_string(),
            description,
            color: EMBED_COLOR,
            image,
            fields,
            footer,
        }],
    }
}

/// Footer line: prefer the timestamp sourced from the feed; fall back to the
/// current Budapest time marked as generated.
pub(crate) fn footer_text(timestamp_text: &str, now: DateTime<Utc>) -> String {
    let re = Regex::new(TIMESTAMP_PATTERN).expect("valid regex");
    if let Some(caps) = re.captures(timestamp_text) {
        format!("🤖 Generated by TotM AI\nposted on Truth: {}", &caps[1])
    } else {
        let local = now.with_timezone(&chrono_tz::Europe::Budapest);
        format!(
            "🤖 Generated by TotM AI\nposted on Truth: {} (Gen)",
            local.format("%Y.%m.%d. %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post() -> MergedPost {
        MergedPost {
            id: "123".to_string(),
            url: "https://truthsocial.com/@realDonaldTrump/posts/123".to_string(),
            content: "Original body text".to_string(),
            timestamp_text: "Posted January 5, 2026 @ 3:41 PM ET on Truth".to_string(),
            media_urls: vec!["https://cdn.example/a.jpg".to_string(), "https://cdn.example/b.jpg".to_string()],
            video_url: None,
            is_retruth: false,
            retruth_header: String::new(),
            card_content: None,
        }
    }

    fn embed(payload: &NotificationPayload) -> &Embed {
        &payload.embeds[0]
    }

    #[test]
    fn translated_body_is_preferred_over_original() {
        let payload = format(&post(), Some("Magyar szöveg"), "Original body text");
        assert_eq!(embed(&payload).description.as_deref(), Some("Magyar szöveg"));
    }

    #[test]
    fn missing_translation_falls_back_to_original() {
        let payload = format(&post(), None, "Original body text");
        assert_eq!(embed(&payload).description.as_deref(), Some("Original body text"));
    }

    #[test]
    fn reshare_without_translation_gets_a_labeled_header_line() {
        let mut p = post();
        p.is_retruth = true;
        p.retruth_header = "ReTruthed from @Foo".to_string();
        let payload = format(&p, None, "Shared body");
        let description = embed(&payload).description.clone().unwrap();
        assert!(description.starts_with("**ReTruthed from @Foo**\n---\n"));
        assert!(description.ends_with("Shared body"));
    }

    #[test]
    fn reshare_with_translation_omits_the_header_line() {
        let mut p = post();
        p.is_retruth = true;
        p.retruth_header = "ReTruthed from @Foo".to_string();
        let payload = format(&p, Some("Fordítás"), "Shared body");
        assert_eq!(embed(&payload).description.as_deref(), Some("Fordítás"));
    }

    #[test]
    fn long_original_is_truncated_with_continue_marker() {
        let long = "x".repeat(2000);
        let payload = format(&post(), None, &long);
        let description = embed(&payload).description.clone().unwrap();
        assert!(description.ends_with(BODY_TRUNCATION_SUFFIX));
        assert_eq!(
            description.chars().count(),
            BODY_LIMIT + BODY_TRUNCATION_SUFFIX.chars().count()
        );
    }

    #[test]
    fn only_the_first_media_url_becomes_the_embed_image() {
        let payload = format(&post(), None, "body");
        assert_eq!(
            embed(&payload).image.as_ref().map(|i| i.url.as_str()),
            Some("https://cdn.example/a.jpg")
        );
    }

    #[test]
    fn video_gets_its_own_labeled_link_field() {
        let mut p = post();
        p.video_url = Some("https://cdn.example/v.mp4".to_string());
        let payload = format(&p, None, "body");
        let field = embed(&payload)
            .fields
            .iter()
            .find(|f| f.name == "🎬 Videó")
            .unwrap();
        assert!(field.value.contains("https://cdn.example/v.mp4"));
    }

    #[test]
    fn source_link_field_is_always_present() {
        let payload = format(&post(), None, "body");
        let field = embed(&payload)
            .fields
            .iter()
            .find(|f| f.name == "🔗 Eredeti bejegyzés")
            .unwrap();
        assert!(field.value.contains("/posts/123"));
    }

    #[test]
    fn footer_prefers_the_sourced_feed_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 1, 6, 12, 0, 0).unwrap();
        let text = footer_text("Posted January 5, 2026 @ 3:41 PM ET on Truth", now);
        assert!(text.ends_with("posted on Truth: January 5, 2026 @ 3:41 PM ET"));
    }

    #[test]
    fn footer_falls_back_to_generated_budapest_time() {
        // 2026-06-15 12:00 UTC is 14:00 in Budapest (CEST).
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
        let text = footer_text("no timestamp here", now);
        assert!(text.ends_with("2026.06.15. 14:00 (Gen)"));
    }

    #[test]
    fn payload_serializes_to_discord_webhook_shape() {
        let payload = format(&post(), Some("Magyar"), "Original");
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["embeds"][0]["title"].is_string());
        assert_eq!(json["embeds"][0]["color"], 0x1DA1F2);
        assert!(json["embeds"][0]["fields"].as_array().unwrap().len() >= 3);
    }
}
