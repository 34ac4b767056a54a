//! VK to Telegram relay library.
//!
//! Polls a VK wall for new posts, renders each post (text, photos, reposts,
//! co-authors) into Telegram messages and delivers them to a channel,
//! tracking progress with a persisted watermark.

pub mod config;
pub mod constants;
pub mod processor;
pub mod relay;
pub mod retry;
pub mod telegram;
pub mod text;
pub mod vk;
pub mod watermark;
