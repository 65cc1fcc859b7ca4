use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::detail::DetailFetcher;
use crate::feed::FeedFetcher;
use crate::format;
use crate::merge::merge;
use crate::notify::{deliver_with_retry, DeliveryStatus, NotifySink};
use crate::prompt;
use crate::state::StateStore;
use crate::translate::Translator;
use crate::types::{numeric_id, FeedPost};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    /// Pause after each delivery so the sink's rate limits are respected.
    pub pacing_delay: Duration,
    /// Voluntary restart threshold; 0 disables. Bounds resource accumulation
    /// over very long uptimes when an external supervisor restarts us.
    pub max_cycles: u32,
    /// Ignore persisted state on startup and replay a bounded backlog.
    pub force_reprocess: bool,
    /// Backlog size replayed in force-reprocess mode.
    pub replay_count: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            pacing_delay: Duration::from_secs(5),
            max_cycles: 30,
            force_reprocess: false,
            replay_count: 5,
        }
    }
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Deliberate periodic self-restart; the process should exit nonzero so
    /// the container supervisor brings up a fresh environment.
    PeriodicRestart,
    Shutdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub fetched: usize,
    pub new_posts: usize,
    pub processed: usize,
    pub delivered: usize,
}

/// The poll loop: detects new posts, runs each through enrichment, merge,
/// translation and delivery, and advances the processed-id watermark one
/// post at a time so a crash mid-batch loses at most the in-flight post.
pub struct Monitor {
    fetcher: Arc<dyn FeedFetcher>,
    enricher: Arc<dyn DetailFetcher>,
    translator: Arc<dyn Translator>,
    sink: Arc<dyn NotifySink>,
    state: StateStore,
    config: MonitorConfig,
    last_id: Option<String>,
}

impl Monitor {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        enricher: Arc<dyn DetailFetcher>,
        translator: Arc<dyn Translator>,
        sink: Arc<dyn NotifySink>,
        state: StateStore,
        config: MonitorConfig,
    ) -> Self {
        let last_id = if config.force_reprocess {
            warn!("FORCE_REPROCESS is set, ignoring saved state");
            None
        } else {
            let id = state.load();
            info!(last_id = id.as_deref().unwrap_or("<none>"), "Loaded last processed id");
            id
        };

        Self {
            fetcher,
            enricher,
            translator,
            sink,
            state,
            config,
            last_id,
        }
    }

    /// Run poll cycles until shutdown or the periodic-restart threshold.
    pub async fn run(&mut self) -> Result<ExitReason> {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            "Starting monitoring loop"
        );

        let mut cycles = 0u32;
        loop {
            let stats = self.run_cycle().await;
            info!(
                fetched = stats.fetched,
                new_posts = stats.new_posts,
                processed = stats.processed,
                delivered = stats.delivered,
                "Cycle complete"
            );

            cycles += 1;
            if self.config.max_cycles > 0 && cycles >= self.config.max_cycles {
                info!(cycles, "Periodic restart threshold reached, exiting for a fresh environment");
                return Ok(ExitReason::PeriodicRestart);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    return Ok(ExitReason::Shutdown);
                }
            }
        }
    }

    /// One poll iteration. All per-post failures degrade or are logged here;
    /// a cycle itself never fails.
    pub async fn run_cycle(&mut self) -> CycleStats {
        let mut stats = CycleStats::default();

        let posts = self.fetcher.fetch().await;
        stats.fetched = posts.len();
        if posts.is_empty() {
            info!("Empty feed snapshot, nothing to do this cycle");
            return stats;
        }

        let new_posts = select_new_posts(
            &posts,
            self.last_id.as_deref(),
            self.config.force_reprocess,
            self.config.replay_count,
        );
        stats.new_posts = new_posts.len();
        if new_posts.is_empty() {
            info!("No new posts since last check");
            return stats;
        }

        info!(count = new_posts.len(), "Processing new posts");

        for post in new_posts {
            let id = post.id.clone();
            info!(post_id = %id, "Processing post");

            match self.process_post(post).await {
                Ok(DeliveryStatus::Delivered) => stats.delivered += 1,
                Ok(DeliveryStatus::RateLimited { .. }) => {
                    warn!(post_id = %id, "Gave up on delivery after repeated rate limits");
                }
                Ok(DeliveryStatus::Failed { status }) => {
                    warn!(post_id = %id, status, "Delivery failed, not retrying");
                }
                Err(e) => {
                    warn!(post_id = %id, error = %e, "Post processing failed");
                }
            }

            // The watermark advances no matter how delivery went, so a
            // permanently failing post cannot wedge the loop.
            self.advance(&id);
            stats.processed += 1;

            tokio::time::sleep(self.config.pacing_delay).await;
        }

        stats
    }

    async fn process_post(&self, post: FeedPost) -> Result<DeliveryStatus> {
        let detail = self.enricher.enrich(&post.url).await;
        let merged = merge(post, detail);
        let original_text = merged.content.trim().to_string();

        let translated = match prompt::compose(&merged) {
            Some(input) => match self.translator.translate(&input).await {
                Ok(t) if !t.trim().is_empty() => Some(t),
                Ok(_) => None,
                Err(e) => {
                    warn!(post_id = %merged.id, error = %e, "Translation failed, falling back to original text");
                    None
                }
            },
            None => None,
        };

        let payload = format::format(&merged, translated.as_deref(), &original_text);
        deliver_with_retry(self.sink.as_ref(), &payload).await
    }

    fn advance(&mut self, id: &str) {
        self.last_id = Some(id.to_string());
        if let Err(e) = self.state.save(id) {
            warn!(post_id = %id, error = %e, "Could not persist state; in-memory watermark still advances");
        }
    }
}

/// Compute the new-post subset for one cycle, in ascending id order.
///
/// - No prior state, normal mode: only the newest post, to establish a
///   baseline without flooding notifications for backlog.
/// - No prior state, force-reprocess: the newest `replay_count` posts.
/// - Prior state: every post whose id is strictly greater, compared
///   numerically when both ids parse and lexicographically otherwise.
pub fn select_new_posts(
    posts: &[FeedPost],
    last_id: Option<&str>,
    force_reprocess: bool,
    replay_count: usize,
) -> Vec<FeedPost> {
    let mut posts: Vec<FeedPost> = posts.to_vec();
    posts.sort_by(|a, b| id_order(&a.id, &b.id));

    match last_id {
        None if force_reprocess => {
            let skip = posts.len().saturating_sub(replay_count);
            posts.split_off(skip)
        }
        None => posts.last().cloned().into_iter().collect(),
        Some(last) => posts
            .into_iter()
            .filter(|p| id_newer(&p.id, last))
            .collect(),
    }
}

fn id_order(a: &str, b: &str) -> Ordering {
    match (numeric_id(a), numeric_id(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn id_newer(candidate: &str, last: &str) -> bool {
    id_order(candidate, last) == Ordering::Greater
}
