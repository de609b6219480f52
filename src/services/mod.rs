//! 业务服务层
//!
//! 控制器持有会话内状态，通过 backends 层与远端通信。

pub mod auth_service;
pub mod clipboard;
pub mod explore_service;
pub mod prompt_service;
pub mod session_store;

pub use auth_service::AuthService;
pub use clipboard::copy_to_clipboard;
pub use explore_service::ExploreFeed;
pub use prompt_service::{EditorState, PromptStore, PromptStoreSnapshot};
pub use session_store::{SessionError, SessionStore};
