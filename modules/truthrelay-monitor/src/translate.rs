use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use claude_client::{ChatRequest, ClaudeClient, WireMessage};
use regex::Regex;
use tracing::{info, warn};

/// Fixed system instructions for the translation model. The bracketed input
/// markers referenced here are produced by prompt composition and must match
/// byte-for-byte.
pub const TRANSLATION_SYSTEM_PROMPT: &str = r#"Te egy professzionális fordító vagy, aki gyönyörű, természetes magyarsággal dolgozik.

Feladatod: Fordítsd le ezt a közösségi média bejegyzést angolról magyarra!

FORDÍTÁSI ELVEK:
- Használj természetes, gördülékeny magyar nyelvezetet.
- Tartsd meg az eredeti hangnemet.
- **Speciális Bemeneti Címkék Kezelése:**
    - "[ReTruthed from @XYZ]": Kezdd így: "Donald Trump megosztotta @XYZ bejegyzését:"
    - "[SHARED_CONTENT]": Ez a megosztott bejegyzés szövege. Fordítsd le és illeszd be a fenti bevezető után.
    - "[LINK_PREVIEW]": Ez egy külső link/cikk/X-poszt tartalma. Kezdd így: "Donald Trump megosztott egy X/TRUTH bejegyzést, ami a következőt tartalmazza:", majd fordítsd le a tartalmat.
- NE fordítsd le: URL-eket, hashtag-eket (#), említéseket (@)
- VÁLASZ: Csak a kész, formázott magyar szöveget add vissza."#;

const TRANSLATION_MAX_TOKENS: u32 = 1024;
const TRANSLATION_TEMPERATURE: f32 = 0.3;

/// Translation collaborator. Failures never propagate past the pipeline
/// boundary: callers fall back to the original text.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

pub struct ClaudeTranslator {
    client: ClaudeClient,
    model: String,
}

impl ClaudeTranslator {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: ClaudeClient::new(api_key),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Translator for ClaudeTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        let request = ChatRequest::new(&self.model)
            .system(TRANSLATION_SYSTEM_PROMPT)
            .max_tokens(TRANSLATION_MAX_TOKENS)
            .temperature(TRANSLATION_TEMPERATURE)
            .message(WireMessage::user(text));

        let response = self.client.chat(&request).await?;
        let translated = response.text().unwrap_or_default().trim().to_string();

        // The model is instructed to carry URLs through untouched; a mismatch
        // usually means a hallucinated or dropped link.
        if extract_urls(text) != extract_urls(&translated) {
            warn!("URL mismatch between original and translated text");
        }

        info!(
            input_chars = text.chars().count(),
            output_chars = translated.chars().count(),
            "Translated post"
        );
        Ok(translated)
    }
}

fn extract_urls(text: &str) -> HashSet<String> {
    let re = Regex::new(r"https?://\S+").expect("valid regex");
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}
