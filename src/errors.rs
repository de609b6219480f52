//! 应用错误类型
//!
//! 所有面向调用方的错误都收敛到 [`AppError`]：
//! 校验错误在发起网络请求之前抛出，远端错误在控制器边界被捕获并转换。

use crate::backends::{BackendError, BackendErrorKind};
use thiserror::Error;

/// 应用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// 输入校验失败（可选地标记出错的字段）
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    /// 认证失败或缺少会话
    #[error("{message}")]
    Auth { message: String },

    /// 远端服务调用失败
    #[error("{message}")]
    Network { message: String },

    /// 无法归类的错误
    #[error("{message}")]
    Unclassified { message: String },
}

impl AppError {
    /// Field-tagged validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Validation error that is not tied to a form field.
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        AppError::Auth {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        AppError::Network {
            message: message.into(),
        }
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        AppError::Unclassified {
            message: message.into(),
        }
    }

    /// Wraps a backend failure with an operation-specific prefix,
    /// e.g. `Failed to delete prompt: <remote message>`.
    pub fn from_backend(context: &str, err: BackendError) -> Self {
        let message = format!("{context}: {}", err.message);
        match err.kind {
            BackendErrorKind::AuthenticationError => AppError::Auth { message },
            _ => AppError::Network { message },
        }
    }

    /// 获取对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::Auth { .. } => 401,
            AppError::Network { .. } => 502,
            AppError::Unclassified { .. } => 500,
        }
    }

    /// 获取错误类型字符串
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Auth { .. } => "authentication_error",
            AppError::Network { .. } => "network_error",
            AppError::Unclassified { .. } => "unclassified_error",
        }
    }

    /// The form field a validation error belongs to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            AppError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::Auth { message }
            | AppError::Network { message }
            | AppError::Unclassified { message } => message,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation { .. })
    }

    /// 转换为 JSON 错误响应
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "error": {
                "message": self.message(),
                "type": self.error_type(),
                "code": self.status_code()
            }
        });
        if let Some(field) = self.field() {
            body["error"]["field"] = serde_json::Value::String(field.to_string());
        }
        body
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err.kind {
            BackendErrorKind::AuthenticationError => AppError::Auth {
                message: err.message,
            },
            _ => AppError::Network {
                message: err.message,
            },
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Unclassified {
            message: err.to_string(),
        }
    }
}

/// Fallback message for errors that carry no text of their own.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Human-readable message for display in an error slot.
pub fn error_message(err: &AppError) -> String {
    let message = err.message().trim();
    if message.is_empty() {
        UNEXPECTED_ERROR.to_string()
    } else {
        message.to_string()
    }
}
