use crate::constants::ATTRIBUTION_MARKER;
use crate::vk::{OwnerDirectory, Post};

/// Attribution block for a reposted post: `"\n 💬 Name:\ntext"`.
#[must_use]
pub fn attributed(name: &str, text: &str) -> String {
    format!("\n {ATTRIBUTION_MARKER} {name}:\n{text}")
}

/// Attribution for the first entry of a repost chain, if the post is a repost.
///
/// Deeper entries of the chain are not surfaced.
pub async fn repost_block(post: &Post, owners: &dyn OwnerDirectory) -> Option<String> {
    let original = post.repost()?;
    let name = owners.owner_name(original.owner_id).await;
    Some(attributed(&name, &original.text))
}

/// Co-authorship block crediting every co-owner, if the post has any.
///
/// The block carries the post's own text, which the caller then blanks.
pub async fn coauthor_block(post: &Post, owners: &dyn OwnerDirectory) -> Option<String> {
    let coowners = post.coowners.as_ref()?;
    let mut names = Vec::with_capacity(coowners.list.len());
    for coowner in &coowners.list {
        names.push(owners.owner_name(coowner.owner_id).await);
    }
    Some(attributed(&names.join(" & "), &post.text))
}
