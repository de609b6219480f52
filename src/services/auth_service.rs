//! 认证服务
//!
//! 注册、登录、登出、修改密码与删除账号。
//! 除注册和登录外，所有操作都需要已有会话。

use crate::backends::{AuthBackend, BackendErrorKind, RemoteStore};
use crate::errors::AppError;
use crate::models::{AuthSession, AuthUser, SignUpOutcome};
use crate::services::session_store::SessionStore;
use crate::validation::{validate_email, validate_password, MIN_PASSWORD_CHARS};
use std::sync::Arc;

pub const NOT_SIGNED_IN: &str = "Not signed in";
pub const PASSWORD_UPDATED: &str = "Password updated successfully";

pub struct AuthService<A: AuthBackend + ?Sized> {
    auth: Arc<A>,
    sessions: Option<SessionStore>,
    session: Option<AuthSession>,
}

impl<A: AuthBackend + ?Sized> AuthService<A> {
    pub fn new(auth: Arc<A>) -> Self {
        Self {
            auth,
            sessions: None,
            session: None,
        }
    }

    /// Persists sessions through `store` and restores a saved one.
    /// An expired saved session is discarded.
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        match store.load() {
            Ok(Some(session)) if session.is_expired() => {
                tracing::info!("[Auth] 保存的会话已过期，需要重新登录");
                if let Err(e) = store.clear() {
                    tracing::warn!("[Auth] 清除过期会话失败: {}", e);
                }
            }
            Ok(session) => self.session = session,
            Err(e) => tracing::warn!("[Auth] 读取会话失败: {}", e),
        }
        self.sessions = Some(store);
        self
    }

    pub fn current_session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Token for row requests made on behalf of the signed-in user.
    pub fn access_token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.access_token.clone())
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// The active session, or an `Auth` error.
    pub fn require_session(&self) -> Result<&AuthSession, AppError> {
        self.session
            .as_ref()
            .ok_or_else(|| AppError::auth(NOT_SIGNED_IN))
    }

    fn remember(&mut self, session: AuthSession) {
        if let Some(store) = &self.sessions {
            if let Err(e) = store.save(&session) {
                tracing::warn!("[Auth] 保存会话失败: {}", e);
            }
        }
        self.session = Some(session);
    }

    fn forget(&mut self) {
        if let Some(store) = &self.sessions {
            if let Err(e) = store.clear() {
                tracing::warn!("[Auth] 清除会话失败: {}", e);
            }
        }
        self.session = None;
    }

    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SignUpOutcome, AppError> {
        let email = email.trim();
        validate_email(email)?;
        validate_password(password)?;
        if confirm_password.is_empty() {
            return Err(AppError::validation(
                "confirm_password",
                "Please confirm your password",
            ));
        }
        if password != confirm_password {
            return Err(AppError::validation(
                "confirm_password",
                "Passwords do not match",
            ));
        }

        let outcome = self.auth.sign_up(email, password).await.map_err(|e| {
            tracing::error!("[Auth] 注册失败: {}", e);
            AppError::from(e)
        })?;

        match &outcome {
            SignUpOutcome::SignedIn(session) => {
                tracing::info!("[Auth] 注册成功: {}", session.user.id);
                self.remember(session.clone());
            }
            SignUpOutcome::ConfirmationRequired(user) => {
                tracing::info!("[Auth] 注册成功，等待邮箱确认: {}", user.id);
            }
        }
        Ok(outcome)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&AuthSession, AppError> {
        let email = email.trim();
        validate_email(email)?;
        if password.is_empty() {
            return Err(AppError::validation("password", "Password is required"));
        }

        let session = self.auth.sign_in(email, password).await.map_err(|e| {
            tracing::warn!("[Auth] 登录失败: {}", e);
            match e.kind {
                BackendErrorKind::NetworkError
                | BackendErrorKind::Timeout
                | BackendErrorKind::ServerError => AppError::from(e),
                _ => AppError::auth(e.message),
            }
        })?;
        self.remember(session);
        self.require_session()
    }

    /// Ends the session remotely and locally. The local session is dropped
    /// even when the remote call fails.
    pub async fn sign_out(&mut self) -> Result<(), AppError> {
        let session = self.require_session()?.clone();
        let result = self.auth.sign_out(&session.access_token).await;
        self.forget();
        result.map_err(|e| {
            tracing::warn!("[Auth] 远端登出失败: {}", e);
            AppError::from(e)
        })
    }

    /// Refreshes the cached user from the auth service.
    pub async fn fetch_user(&mut self) -> Result<AuthUser, AppError> {
        let token = self.require_session()?.access_token.clone();
        let user = self.auth.get_user(&token).await?;
        if let Some(session) = self.session.as_mut() {
            session.user = user.clone();
        }
        Ok(user)
    }

    /// Returns the confirmation message on success.
    pub async fn change_password(
        &self,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<&'static str, AppError> {
        let session = self.require_session()?;
        if new_password.trim().chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::validation(
                "password",
                "Password must be at least 6 characters long",
            ));
        }
        if new_password != confirm_password {
            return Err(AppError::validation(
                "confirm_password",
                "Passwords do not match",
            ));
        }

        self.auth
            .update_password(&session.access_token, new_password)
            .await?;
        tracing::info!("[Auth] 密码已更新: {}", session.user.id);
        Ok(PASSWORD_UPDATED)
    }

    /// Deletes the profile row through `remote`, then signs out.
    pub async fn delete_account<R>(&mut self, remote: &R) -> Result<(), AppError>
    where
        R: RemoteStore + ?Sized,
    {
        let user_id = self.require_session()?.user.id.clone();
        remote
            .delete_profile(&user_id)
            .await
            .map_err(|e| AppError::from_backend("Failed to delete account", e))?;
        tracing::info!("[Auth] 账号资料已删除: {}", user_id);
        self.sign_out().await
    }
}
