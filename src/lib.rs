//! promptdeck
//!
//! 个人 prompt 库客户端：prompt 存储在托管的 Supabase 项目中，
//! 可设为私有或分享到公开列表。

pub mod backends;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logger;
pub mod markdown;
pub mod models;
pub mod proxy;
pub mod services;
pub mod validation;

pub use backends::{AuthBackend, RemoteStore, SupabaseClient};
#[cfg(any(test, feature = "test-support"))]
pub use backends::MemoryStore;
pub use config::Config;
pub use errors::AppError;
pub use markdown::{render_card_preview, render_document};
pub use models::{Prompt, SortOrder};
pub use services::{AuthService, ExploreFeed, PromptStore, PromptStoreSnapshot};
