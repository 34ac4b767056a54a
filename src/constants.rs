//! Shared constants used across the application.

/// User agent sent with every outgoing API request.
pub const USER_AGENT: &str = concat!("vk-telegram-relay/", env!("CARGO_PKG_VERSION"));

/// VK API version pinned for all method calls.
pub const VK_API_VERSION: &str = "5.199";

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Maximum number of photos in one Telegram media group.
pub const MEDIA_GROUP_LIMIT: usize = 10;

/// Line shown in place of an embedded video.
pub const VIDEO_PLACEHOLDER: &str = "# Для просмотра видео, пожалуйста, перейдите по ссылке ниже ";

/// Display name used when an owner cannot be resolved.
pub const UNKNOWN_OWNER: &str = "Unknown";

/// Glyph that introduces a repost or co-authorship attribution line.
pub const ATTRIBUTION_MARKER: char = '\u{1F4AC}';
