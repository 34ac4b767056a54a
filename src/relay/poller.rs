use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::DateTime;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::processor::PostProcessor;
use crate::relay::gate::{evaluate, DeliveryDecision};
use crate::retry::RetryPolicy;
use crate::telegram::{deliver_photos, deliver_text, MessageSink};
use crate::vk::{OwnerDirectory, Post, WallSource};
use crate::watermark::Watermark;

/// Counts for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub delivered: usize,
    /// Posts whose text could not be sent within the retry budget.
    pub failed: usize,
    pub skipped: usize,
}

/// Moves posts from a wall to a channel.
pub struct Relay {
    config: Config,
    source: Arc<dyn WallSource>,
    sink: Arc<dyn MessageSink>,
    processor: PostProcessor,
    /// `owner_post` id of the last pinned post handled by the pinned check.
    pinned_sent: Option<String>,
}

impl Relay {
    #[must_use]
    pub fn new(
        config: Config,
        source: Arc<dyn WallSource>,
        sink: Arc<dyn MessageSink>,
        owners: Arc<dyn OwnerDirectory>,
    ) -> Self {
        let processor = PostProcessor::from_config(&config, owners);
        Self {
            config,
            source,
            sink,
            processor,
            pinned_sent: None,
        }
    }

    /// Poll forever, sleeping `poll_interval` between cycles.
    pub async fn run(&mut self, mut watermark: Watermark) {
        loop {
            match self.poll_once(&mut watermark).await {
                Ok(report) if report.delivered + report.failed > 0 => {
                    info!(
                        delivered = report.delivered,
                        failed = report.failed,
                        skipped = report.skipped,
                        "Processed new posts"
                    );
                }
                Ok(report) => debug!(fetched = report.fetched, "No new posts"),
                Err(e) => error!("Poll error: {e:#}"),
            }

            info!(seconds = self.config.poll_interval.as_secs(), "Sleeping until next poll");
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Fetch the wall once and deliver every eligible post, oldest first.
    ///
    /// The watermark is advanced and persisted after each processed post,
    /// including posts whose text was given up on after the retry budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall cannot be fetched.
    pub async fn poll_once(&mut self, watermark: &mut Watermark) -> Result<CycleReport> {
        let posts = self
            .source
            .fetch_posts(self.config.count)
            .await
            .context("Failed to fetch wall posts")?;

        let mut report = CycleReport {
            fetched: posts.len(),
            ..CycleReport::default()
        };

        // A pinned post heads the feed regardless of its date.
        if let Some(pinned) = posts.first().filter(|p| p.is_pinned) {
            let pinned_id = pinned.full_id();
            if self.pinned_sent.as_deref() != Some(pinned_id.as_str())
                && self.check(pinned, watermark) == DeliveryDecision::Deliver
            {
                info!(post_id = pinned.id, "Delivering pinned post");
                let sent = self.deliver(pinned).await;
                self.pinned_sent = Some(pinned_id);
                report.record(sent);
                tokio::time::sleep(self.config.post_cooldown).await;
            }
        }

        info!(posts = posts.len(), "Checking wall");

        for post in posts.iter().rev() {
            debug!(post_id = post.id, date = %format_date(post.date), "Checking post");

            let decision = self.check(post, watermark);
            if decision != DeliveryDecision::Deliver {
                debug!(post_id = post.id, reason = decision.as_str(), "Post skipped");
                report.skipped += 1;
                continue;
            }

            if self.pinned_sent.as_deref() == Some(post.full_id().as_str()) {
                self.advance(watermark, post).await;
                continue;
            }

            let sent = self.deliver(post).await;
            report.record(sent);
            self.advance(watermark, post).await;

            debug!(
                seconds = self.config.post_cooldown.as_secs(),
                "Cooling down before next post"
            );
            tokio::time::sleep(self.config.post_cooldown).await;
        }

        Ok(report)
    }

    /// Deliver specific posts regardless of the watermark, leaving it untouched.
    ///
    /// Returns the number of posts whose text went out.
    ///
    /// # Errors
    ///
    /// Returns an error if the posts cannot be fetched.
    pub async fn resend_posts(&self, ids: &[String]) -> Result<usize> {
        let posts = self
            .source
            .fetch_posts_by_ids(ids)
            .await
            .context("Failed to fetch posts for resend")?;

        let mut sent = 0;
        for post in &posts {
            info!(post = %post.full_id(), "Resending post");
            if self.deliver(post).await {
                sent += 1;
            }
            tokio::time::sleep(self.config.post_cooldown).await;
        }
        Ok(sent)
    }

    fn check(&self, post: &Post, watermark: &Watermark) -> DeliveryDecision {
        let decision = evaluate(post, watermark, self.config.reposts);
        match decision {
            DeliveryDecision::SkipAlreadySent => {
                debug!(post_id = post.id, "Post already delivered");
            }
            DeliveryDecision::SkipRepostDisabled => {
                info!(post_id = post.id, "Skipping repost, reposts are disabled");
            }
            DeliveryDecision::Deliver => {}
        }
        decision
    }

    /// Send a post's text and photos. Returns whether the text went out.
    ///
    /// Photos are attempted even when the text was given up on.
    async fn deliver(&self, post: &Post) -> bool {
        info!(post_id = post.id, "Sending post");
        let message = self.processor.process(post).await;

        let text_policy = RetryPolicy::new(self.config.text_retry_attempts, self.config.text_backoff);
        let text_sent = match deliver_text(
            self.sink.as_ref(),
            &message.text,
            self.config.preview_link,
            text_policy,
        )
        .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(
                    post = %post.full_id(),
                    attempts = self.config.text_retry_attempts,
                    error = %e,
                    "Giving up on post text"
                );
                false
            }
        };

        let photo_policy = RetryPolicy::new(
            self.config.image_retry_attempts,
            self.config.image_retry_delay,
        );
        deliver_photos(self.sink.as_ref(), &message.images, photo_policy).await;
        text_sent
    }

    async fn advance(&self, watermark: &mut Watermark, post: &Post) {
        if let Err(e) = watermark.advance(post).await {
            error!("Failed to persist watermark: {e:#}");
        }
    }
}

impl CycleReport {
    fn record(&mut self, text_sent: bool) {
        if text_sent {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// `dd.mm.YYYY` rendering of a Unix timestamp for logs.
fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map_or_else(|| timestamp.to_string(), |d| d.format("%d.%m.%Y").to_string())
}
