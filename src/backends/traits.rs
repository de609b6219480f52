//! 远端存储 Trait 定义
//!
//! 定义行存储与认证服务的调用接口。
//! 后端层只负责请求/响应，不做输入校验，也不维护任何缓存。

use crate::models::{
    AuthSession, AuthUser, NewPrompt, Prompt, PromptChanges, PromptQuery, SignUpOutcome,
};
use async_trait::async_trait;

/// 后端调用结果
pub type BackendResult<T> = Result<T, BackendError>;

/// 后端错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// 错误类型
    pub kind: BackendErrorKind,
    /// 错误消息
    pub message: String,
    /// HTTP 状态码（如果有）
    pub status_code: Option<u16>,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = self.status_code {
            write!(f, "{} ({}): {}", self.kind, code, self.message)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for BackendError {}

/// 后端错误类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// 认证错误
    AuthenticationError,
    /// 网络错误
    NetworkError,
    /// 请求超时
    Timeout,
    /// 服务端错误
    ServerError,
    /// 请求格式错误
    BadRequest,
    /// 资源不存在
    NotFound,
    /// 其他错误
    Other,
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationError => write!(f, "AuthenticationError"),
            Self::NetworkError => write!(f, "NetworkError"),
            Self::Timeout => write!(f, "Timeout"),
            Self::ServerError => write!(f, "ServerError"),
            Self::BadRequest => write!(f, "BadRequest"),
            Self::NotFound => write!(f, "NotFound"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl BackendError {
    /// 创建新的后端错误
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    /// 带 HTTP 状态码创建错误
    pub fn with_status(kind: BackendErrorKind, message: impl Into<String>, status: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: Some(status),
        }
    }

    /// 从 HTTP 状态码推断错误类型
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => BackendErrorKind::AuthenticationError,
            400 | 409 | 422 => BackendErrorKind::BadRequest,
            404 => BackendErrorKind::NotFound,
            408 => BackendErrorKind::Timeout,
            500..=599 => BackendErrorKind::ServerError,
            _ => BackendErrorKind::Other,
        };
        Self::with_status(kind, message, status)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            BackendErrorKind::Timeout
        } else if err.is_decode() {
            BackendErrorKind::Other
        } else {
            BackendErrorKind::NetworkError
        };
        match err.status() {
            Some(status) => Self::with_status(kind, err.to_string(), status.as_u16()),
            None => Self::new(kind, err.to_string()),
        }
    }
}

/// 行存储 Trait
///
/// 对应远端的 `prompts` / `profiles` 两张表。
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// 按创建时间排序查询 prompts
    async fn select_prompts(&self, query: &PromptQuery) -> BackendResult<Vec<Prompt>>;

    /// 插入一条 prompt
    async fn insert_prompt(&self, prompt: &NewPrompt) -> BackendResult<()>;

    /// 按 id 更新 title / content / is_public
    async fn update_prompt(&self, id: &str, changes: &PromptChanges) -> BackendResult<()>;

    /// 按 id 删除
    async fn delete_prompt(&self, id: &str) -> BackendResult<()>;

    /// 删除用户资料行
    async fn delete_profile(&self, user_id: &str) -> BackendResult<()>;

    /// 获取存储名称（用于日志）
    fn name(&self) -> &str;
}

/// 认证服务 Trait
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession>;

    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;

    /// 校验 access token 并返回当前用户
    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser>;

    async fn update_password(&self, access_token: &str, new_password: &str) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::new(BackendErrorKind::NetworkError, "connection refused");
        assert_eq!(format!("{}", err), "NetworkError: connection refused");

        let err = BackendError::with_status(BackendErrorKind::ServerError, "internal error", 500);
        assert_eq!(format!("{}", err), "ServerError (500): internal error");
    }

    #[test]
    fn test_backend_error_from_status() {
        let err = BackendError::from_status(401, "JWT expired");
        assert_eq!(err.kind, BackendErrorKind::AuthenticationError);
        assert_eq!(err.status_code, Some(401));

        assert_eq!(
            BackendError::from_status(409, "duplicate key").kind,
            BackendErrorKind::BadRequest
        );
        assert_eq!(
            BackendError::from_status(404, "relation does not exist").kind,
            BackendErrorKind::NotFound
        );
        assert_eq!(
            BackendError::from_status(503, "service unavailable").kind,
            BackendErrorKind::ServerError
        );
        assert_eq!(BackendError::from_status(302, "moved").kind, BackendErrorKind::Other);
    }
}
