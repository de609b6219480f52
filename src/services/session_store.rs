//! 会话持久化
//!
//! 登录会话以 JSON 保存在数据目录下的 `session.json`。
//! 这里只保存认证状态，prompt 数据从不落盘。

use crate::config::Config;
use crate::models::AuthSession;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("会话文件读写失败 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("会话文件格式错误: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir().join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no session has been saved.
    pub fn load(&self) -> Result<Option<AuthSession>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, session: &AuthSession) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;
        }
        let content = serde_json::to_string_pretty(session)?;

        // 会话文件包含 token，只允许当前用户读写
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        // mode 只对新建文件生效，已有文件需要单独收紧权限
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|source| self.io_error(source))?;
        }

        file.write_all(content.as_bytes())
            .map_err(|source| self.io_error(source))?;

        tracing::debug!("[Session] 会话已保存: {:?}", self.path);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
