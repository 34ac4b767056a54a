//! VK wall API client and wire types.

mod client;
pub mod models;

pub use client::{OwnerDirectory, VkClient, VkError, WallSource};
pub use models::{Attachment, Coowner, Coowners, Link, Photo, PhotoSize, Post, Video};
