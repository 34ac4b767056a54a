//! Rendering of wall posts into channel messages.

pub mod attachments;
pub mod attribution;
mod normalizer;

pub use attachments::{classify, Classified, Scope};
pub use normalizer::{NormalizedMessage, PostProcessor};
