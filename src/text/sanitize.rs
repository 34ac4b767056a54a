use std::sync::LazyLock;

use regex::Regex;

/// `[id123|Name]` and `[club123|Name]` mention tokens.
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?:id|club)\d+\|([^\[\]]*)\]").expect("Invalid mention regex"));

/// Strip VK inline mention markup, keeping only the display text.
///
/// `"[id1|Ivan] and [club2|Club]"` becomes `"Ivan and Club"`. Tokens missing
/// the `|` separator or the closing bracket are left as they are. Nested
/// tokens unwrap from the inside out, so the result never contains a token.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let mut cleaned = MENTION.replace_all(text, "$1").into_owned();
    while MENTION.is_match(&cleaned) {
        cleaned = MENTION.replace_all(&cleaned, "$1").into_owned();
    }
    cleaned
}
