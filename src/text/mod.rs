//! Text cleanup and size-limited splitting for outgoing messages.

mod sanitize;
mod segment;

pub use sanitize::clean_text;
pub use segment::{split_points, split_text, SplitPoint};
