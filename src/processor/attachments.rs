use crate::constants::VIDEO_PLACEHOLDER;
use crate::vk::Attachment;

/// Where an attachment list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The post's own attachments; generic URLs are always kept.
    Post,
    /// Attachments of a reposted post; links follow the `include_link` setting.
    Repost,
}

/// Photos and link lines pulled out of one attachment list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    /// Largest-size photo URLs, in attachment order.
    pub images: Vec<String>,
    /// Lines to render under the text.
    pub links: Vec<String>,
}

impl Classified {
    /// Append another list's results after this one's.
    pub fn merge(&mut self, other: Self) {
        self.images.extend(other.images);
        self.links.extend(other.links);
    }
}

/// Split `attachments` into photos and link lines.
///
/// Only the first video counts: it puts the watch-video placeholder at the top
/// of this list's links and adds its player URL when present.
#[must_use]
pub fn classify(attachments: &[Attachment], include_links: bool, scope: Scope) -> Classified {
    let mut out = Classified::default();
    let mut seen_video = false;
    let keep_generic = scope == Scope::Post || include_links;

    for attachment in attachments {
        match attachment {
            Attachment::Photo(photo) => {
                if let Some(url) = photo.best_url() {
                    out.images.push(url.to_string());
                }
            }
            Attachment::Video(video) => {
                if seen_video {
                    continue;
                }
                seen_video = true;
                out.links.insert(0, VIDEO_PLACEHOLDER.to_string());
                if let Some(player) = &video.player {
                    out.links.push(player.clone());
                }
            }
            Attachment::Link(link) => {
                if keep_generic {
                    out.links.push(link.url.clone());
                }
            }
            Attachment::Other { .. } => {
                if let Some(url) = attachment.url().filter(|_| keep_generic) {
                    out.links.push(url.to_string());
                }
            }
        }
    }

    out
}
