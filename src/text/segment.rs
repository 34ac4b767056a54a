use crate::constants::MAX_MESSAGE_LENGTH;

/// Characters a message may be split on, consumed at the split point.
const BREAKERS: [char; 2] = [':', '\n'];

/// How two consecutive chunks were separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPoint {
    /// Split on a breaker character, which is not part of either chunk.
    Boundary(char),
    /// No breaker in the window; cut at exactly the limit.
    HardCut,
}

/// Split `text` into chunks of at most 4096 characters.
#[must_use]
pub fn split_text(text: &str) -> Vec<String> {
    split_with_limit(text, MAX_MESSAGE_LENGTH)
        .into_iter()
        .map(|(chunk, _)| chunk.to_string())
        .collect()
}

/// The separator consumed between each pair of chunks returned by [`split_text`].
///
/// Re-inserting `Boundary(c)` (or nothing for `HardCut`) between consecutive
/// chunks reproduces the original text.
#[must_use]
pub fn split_points(text: &str) -> Vec<SplitPoint> {
    split_with_limit(text, MAX_MESSAGE_LENGTH)
        .into_iter()
        .filter_map(|(_, point)| point)
        .collect()
}

/// Each chunk is paired with the split point that follows it (`None` for the last).
fn split_with_limit(text: &str, limit: usize) -> Vec<(&str, Option<SplitPoint>)> {
    let mut chunks = Vec::new();
    let mut rest = text;

    // Byte offset of the first character past the limit, if the text is too long.
    while let Some((cut, _)) = rest.char_indices().nth(limit) {
        let window = &rest[..cut];
        match window.rfind(BREAKERS) {
            Some(at) => {
                // Breakers are ASCII, one byte wide.
                let breaker = char::from(rest.as_bytes()[at]);
                chunks.push((&rest[..at], Some(SplitPoint::Boundary(breaker))));
                rest = &rest[at + 1..];
            }
            None => {
                chunks.push((window, Some(SplitPoint::HardCut)));
                rest = &rest[cut..];
            }
        }
    }

    chunks.push((rest, None));
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(chunks: &[String], points: &[SplitPoint]) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            out.push_str(chunk);
            if let Some(SplitPoint::Boundary(c)) = points.get(i) {
                out.push(*c);
            }
        }
        out
    }

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(split_text(""), vec![String::new()]);
        assert_eq!(split_text("hello"), vec!["hello".to_string()]);

        let exact = "a".repeat(MAX_MESSAGE_LENGTH);
        assert_eq!(split_text(&exact), vec![exact.clone()]);
        assert!(split_points(&exact).is_empty());
    }

    #[test]
    fn test_split_on_newline() {
        let first = "a".repeat(3000);
        let second = "b".repeat(3000);
        let text = format!("{first}\n{second}");

        let chunks = split_text(&text);
        assert_eq!(chunks, vec![first, second]);
        assert_eq!(split_points(&text), vec![SplitPoint::Boundary('\n')]);
    }

    #[test]
    fn test_prefers_rightmost_boundary_of_any_kind() {
        // Newline early, colon later: the colon is closer to the limit.
        let text = format!("{}\n{}:{}", "a".repeat(100), "b".repeat(3000), "c".repeat(2000));
        let chunks = split_text(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], format!("{}\n{}", "a".repeat(100), "b".repeat(3000)));
        assert_eq!(chunks[1], "c".repeat(2000));
        assert_eq!(split_points(&text), vec![SplitPoint::Boundary(':')]);
    }

    #[test]
    fn test_boundary_beyond_limit_is_ignored() {
        let text = format!("{}\n{}\n{}", "a".repeat(10), "b".repeat(5000), "c".repeat(10));
        let chunks = split_text(&text);
        assert_eq!(chunks[0], "a".repeat(10));
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_MESSAGE_LENGTH));
    }

    #[test]
    fn test_hard_cut_without_boundary() {
        let text = "x".repeat(MAX_MESSAGE_LENGTH * 2 + 5);
        let chunks = split_text(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), MAX_MESSAGE_LENGTH);
        assert_eq!(chunks[1].len(), MAX_MESSAGE_LENGTH);
        assert_eq!(chunks[2].len(), 5);
        assert_eq!(split_points(&text), vec![SplitPoint::HardCut, SplitPoint::HardCut]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 3000 two-byte characters fit even though they take 6000 bytes.
        let text = "я".repeat(3000);
        assert_eq!(split_text(&text), vec![text.clone()]);

        let long = format!("{}\n{}", "я".repeat(4000), "ю".repeat(200));
        let chunks = split_text(&long);
        assert_eq!(chunks, vec!["я".repeat(4000), "ю".repeat(200)]);
    }

    #[test]
    fn test_reconstruction_law() {
        let mut text = String::new();
        for i in 0..2000 {
            text.push_str(&format!("line {i}: some words"));
            text.push(if i % 7 == 0 { ':' } else { '\n' });
        }
        text.push_str(&"z".repeat(9000));

        let chunks = split_text(&text);
        let points = split_points(&text);
        assert_eq!(points.len(), chunks.len() - 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_MESSAGE_LENGTH));
        assert_eq!(reconstruct(&chunks, &points), text);
    }

    #[test]
    fn test_small_limit_behaves_like_full_size() {
        let parts = split_with_limit("ab:cd\nef", 4);
        let chunks: Vec<&str> = parts.iter().map(|(c, _)| *c).collect();
        assert_eq!(chunks, vec!["ab", "cd", "ef"]);
    }
}
