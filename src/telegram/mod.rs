//! Telegram Bot API client and delivery helpers.

mod client;
mod delivery;

pub use client::{MessageSink, TelegramClient, TelegramError};
pub use delivery::{deliver_photos, deliver_text, PhotoReport};
