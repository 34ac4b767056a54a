//! Chunked text and batched photo delivery on top of a [`MessageSink`].

use tracing::{debug, error, info, warn};

use crate::constants::MEDIA_GROUP_LIMIT;
use crate::retry::RetryPolicy;
use crate::telegram::client::{MessageSink, TelegramError};
use crate::text::{clean_text, split_text};

/// Outcome of sending a post's photos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhotoReport {
    pub sent: usize,
    pub failed: usize,
}

/// Clean, split and send `text`. Returns the number of messages sent.
///
/// Each chunk is retried per `policy`; a chunk that still fails aborts the
/// remaining chunks.
///
/// # Errors
///
/// Returns the last error of the first chunk that could not be sent.
pub async fn deliver_text(
    sink: &dyn MessageSink,
    text: &str,
    preview_link: bool,
    policy: RetryPolicy,
) -> Result<usize, TelegramError> {
    let text = clean_text(text);
    if text.trim().is_empty() {
        info!("No text to send");
        return Ok(0);
    }

    let mut sent = 0;
    for chunk in split_text(&text) {
        // A breaker at the very start of the window leaves an empty chunk.
        if chunk.trim().is_empty() {
            continue;
        }
        let chunk = chunk.as_str();
        policy
            .run(|attempt| async move {
                let result = sink.send_text(chunk, !preview_link).await;
                if let Err(e) = &result {
                    warn!(attempt, chars = chunk.chars().count(), error = %e, "Failed to send text");
                }
                result
            })
            .await?;
        sent += 1;
    }

    debug!(messages = sent, "Text sent");
    Ok(sent)
}

/// Send photos in albums of at most ten, retrying each album per `policy`.
///
/// Albums that still fail after the last attempt are dropped and counted.
pub async fn deliver_photos(
    sink: &dyn MessageSink,
    urls: &[String],
    policy: RetryPolicy,
) -> PhotoReport {
    let mut report = PhotoReport::default();
    if urls.is_empty() {
        debug!("No photos to send");
        return report;
    }

    for batch in urls.chunks(MEDIA_GROUP_LIMIT) {
        let result = policy
            .run(|attempt| async move {
                let result = sink.send_photos(batch).await;
                if let Err(e) = &result {
                    warn!(attempt, photos = batch.len(), error = %e, "Failed to send photos");
                }
                result
            })
            .await;

        match result {
            Ok(()) => report.sent += batch.len(),
            Err(_) => report.failed += batch.len(),
        }
    }

    if report.failed > 0 {
        error!(failed = report.failed, total = urls.len(), "Giving up on photos");
    } else {
        info!(photos = report.sent, "Photos sent");
    }
    report
}
