use crate::vk::Post;
use crate::watermark::Watermark;

/// What to do with a fetched post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryDecision {
    /// At or below the watermark.
    SkipAlreadySent,
    /// A repost while repost delivery is off.
    SkipRepostDisabled,
    Deliver,
}

impl DeliveryDecision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipAlreadySent => "already_sent",
            Self::SkipRepostDisabled => "repost_disabled",
            Self::Deliver => "deliver",
        }
    }
}

/// Decide whether `post` should be forwarded.
#[must_use]
pub fn evaluate(post: &Post, watermark: &Watermark, allow_reposts: bool) -> DeliveryDecision {
    if watermark.covers(post) {
        DeliveryDecision::SkipAlreadySent
    } else if !allow_reposts && post.is_repost() {
        DeliveryDecision::SkipRepostDisabled
    } else {
        DeliveryDecision::Deliver
    }
}
