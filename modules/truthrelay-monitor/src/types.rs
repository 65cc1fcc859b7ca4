/// Stage-1 result: one post as seen on the aggregator feed.
/// Ephemeral, lives for a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    /// Numeric-string post id. Business key and sort key.
    pub id: String,
    /// Canonical Truth Social link, used for Stage-2 enrichment.
    pub url: String,
    pub content: String,
    /// Source-formatted timestamp text, unparsed until delivery formatting.
    pub timestamp_text: String,
    pub media_urls: Vec<String>,
}

/// Stage-2 result from the origin platform. A zero-value record means
/// "no enrichment available" and is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDetail {
    pub is_retruth: bool,
    /// Attribution header, e.g. "ReTruthed from @Foo". Empty unless a ReTruth.
    pub retruth_header: String,
    pub full_text: String,
    pub media_urls: Vec<String>,
    pub video_url: Option<String>,
    /// Title + description of an embedded external-link preview.
    pub card_content: Option<String>,
}

/// Canonical unit of work: feed fields with detail fields applied under the
/// merge policy. Consumed by prompt composition and delivery formatting,
/// then discarded; only `id` survives into the state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedPost {
    pub id: String,
    pub url: String,
    pub content: String,
    pub timestamp_text: String,
    pub media_urls: Vec<String>,
    pub video_url: Option<String>,
    pub is_retruth: bool,
    pub retruth_header: String,
    pub card_content: Option<String>,
}

/// Numeric sort key for feed post ids. Ids are 18+ digit snowflakes, so
/// u128 leaves ample headroom.
pub fn numeric_id(id: &str) -> Option<u128> {
    id.parse().ok()
}
