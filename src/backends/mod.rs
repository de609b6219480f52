//! 后端调用层
//!
//! 负责与远端数据服务通信，只做 HTTP 请求/响应，不包含界面状态。
//!
//! # 架构设计
//!
//! ```text
//! backends/
//! ├── traits.rs          # RemoteStore / AuthBackend trait 定义
//! ├── supabase.rs        # PostgREST + GoTrue 实现
//! └── memory.rs          # 进程内实现（测试用，`test-support` feature）
//! ```
//!
//! # 使用示例
//!
//! ```ignore
//! use promptdeck_lib::backends::{RemoteStore, SupabaseClient};
//!
//! let client = SupabaseClient::from_config(&config)?;
//! let prompts = client.select_prompts(&PromptQuery::all()).await?;
//! ```

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod supabase;
pub mod traits;

// 重新导出核心类型
#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryStore, StoreOperation};
pub use supabase::SupabaseClient;
pub use traits::{AuthBackend, BackendError, BackendErrorKind, BackendResult, RemoteStore};
