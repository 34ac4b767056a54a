use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::processor::attachments::{classify, Classified, Scope};
use crate::processor::attribution::{coauthor_block, repost_block};
use crate::vk::{OwnerDirectory, Post};

/// A post rendered for the destination channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedMessage {
    /// Message text, still carrying VK mention markup until cleaned for sending.
    pub text: String,
    /// Photo URLs, post-level first, then repost-level.
    pub images: Vec<String>,
}

/// Turns wall posts into [`NormalizedMessage`]s.
#[derive(Clone)]
pub struct PostProcessor {
    domain: String,
    include_link: bool,
    owners: Arc<dyn OwnerDirectory>,
}

impl PostProcessor {
    #[must_use]
    pub fn new(domain: impl Into<String>, include_link: bool, owners: Arc<dyn OwnerDirectory>) -> Self {
        Self {
            domain: domain.into(),
            include_link,
            owners,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config, owners: Arc<dyn OwnerDirectory>) -> Self {
        Self::new(config.domain.clone(), config.include_link, owners)
    }

    /// Public URL of `post` on the source wall.
    #[must_use]
    pub fn post_url(&self, post: &Post) -> String {
        format!(
            "https://vk.ru/{}?w=wall{}_{}",
            self.domain, post.owner_id, post.id
        )
    }

    /// Build the message text and photo list for one post.
    ///
    /// Co-authored posts render as a credited block in place of their own
    /// text; otherwise a repost renders its original under the post's text.
    pub async fn process(&self, post: &Post) -> NormalizedMessage {
        let mut text = post.text.clone();
        let mut copy_text = String::new();
        let mut collected = Classified::default();

        if let Some(attachments) = &post.attachments {
            collected.merge(classify(attachments, true, Scope::Post));
        }

        let post_url = self.post_url(post);

        if let Some(block) = coauthor_block(post, self.owners.as_ref()).await {
            text.clear();
            copy_text = block;
        } else if let Some(block) = repost_block(post, self.owners.as_ref()).await {
            copy_text = block;
            if let Some(attachments) = post.repost().and_then(|r| r.attachments.as_ref()) {
                collected.merge(classify(attachments, self.include_link, Scope::Repost));
            }
        }

        if self.include_link {
            collected.links.push(format!("\n ВК: {post_url} \n"));
        }

        let mut parts = Vec::with_capacity(collected.links.len() + 2);
        parts.push(text);
        parts.push(copy_text);
        parts.extend(collected.links);

        info!(post_url = %post_url, "Processed post");

        NormalizedMessage {
            text: parts.join("\n"),
            images: collected.images,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::constants::VIDEO_PLACEHOLDER;

    struct Names;

    #[async_trait]
    impl OwnerDirectory for Names {
        async fn owner_name(&self, owner_id: i64) -> String {
            format!("owner{owner_id}")
        }
    }

    fn processor(include_link: bool) -> PostProcessor {
        PostProcessor::new("grp", include_link, Arc::new(Names))
    }

    fn post(value: serde_json::Value) -> Post {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_plain_post_with_photo() {
        let post = post(json!({
            "id": 5, "owner_id": -42, "date": 2000, "text": "hi",
            "attachments": [{"type": "photo", "photo": {"sizes": [{"type": "x", "url": "u1"}]}}]
        }));

        let message = processor(true).process(&post).await;

        assert_eq!(message.text, "hi\n\n\n ВК: https://vk.ru/grp?w=wall-42_5 \n");
        assert_eq!(message.images, vec!["u1".to_string()]);
    }

    #[tokio::test]
    async fn test_without_link() {
        let post = post(json!({"id": 5, "owner_id": -42, "text": "hi"}));
        let message = processor(false).process(&post).await;
        assert_eq!(message.text, "hi\n");
    }

    #[tokio::test]
    async fn test_repost_appends_attributed_text_and_attachments() {
        let post = post(json!({
            "id": 9, "owner_id": -42, "text": "look",
            "attachments": [{"type": "photo", "photo": {"sizes": [{"type": "x", "url": "top"}]}}],
            "copy_history": [{
                "id": 1, "owner_id": 77, "text": "original",
                "attachments": [
                    {"type": "photo", "photo": {"sizes": [{"type": "x", "url": "inner"}]}},
                    {"type": "link", "link": {"url": "https://example.com"}}
                ]
            }]
        }));

        let message = processor(false).process(&post).await;

        // Repost-level links are hidden when links are disabled.
        assert_eq!(message.text, "look\n\n 💬 owner77:\noriginal");
        assert_eq!(message.images, vec!["top".to_string(), "inner".to_string()]);
    }

    #[tokio::test]
    async fn test_repost_links_included_when_enabled() {
        let post = post(json!({
            "id": 9, "owner_id": -42, "text": "",
            "copy_history": [{
                "id": 1, "owner_id": -3, "text": "original",
                "attachments": [{"type": "link", "link": {"url": "https://example.com"}}]
            }]
        }));

        let message = processor(true).process(&post).await;

        assert_eq!(
            message.text,
            "\n\n 💬 owner-3:\noriginal\nhttps://example.com\n\n ВК: https://vk.ru/grp?w=wall-42_9 \n"
        );
    }

    #[tokio::test]
    async fn test_coauthored_post_replaces_text() {
        let post = post(json!({
            "id": 2, "owner_id": -42, "text": "together",
            "coowners": {"list": [{"owner_id": 1}, {"owner_id": -2}]},
            "copy_history": [{"id": 1, "owner_id": 5, "text": "ignored",
                "attachments": [{"type": "photo", "photo": {"sizes": [{"type": "x", "url": "skip"}]}}]}]
        }));

        let message = processor(false).process(&post).await;

        assert_eq!(message.text, "\n\n 💬 owner1 & owner-2:\ntogether");
        assert!(message.images.is_empty());
    }

    #[tokio::test]
    async fn test_video_placeholder_precedes_player() {
        let post = post(json!({
            "id": 3, "owner_id": -42, "text": "clip",
            "attachments": [
                {"type": "photo", "photo": {"sizes": [{"type": "x", "url": "u1"}]}},
                {"type": "video", "video": {"player": "https://player"}}
            ]
        }));

        let message = processor(false).process(&post).await;

        assert_eq!(
            message.text,
            format!("clip\n\n{VIDEO_PLACEHOLDER}\nhttps://player")
        );
        assert_eq!(message.images.len(), 1);
    }

    #[test]
    fn test_post_url() {
        let post = Post {
            id: 5,
            owner_id: -42,
            ..Post::default()
        };
        assert_eq!(processor(true).post_url(&post), "https://vk.ru/grp?w=wall-42_5");
    }
}
