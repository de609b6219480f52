//! 内存后端
//!
//! 进程内实现的 [`RemoteStore`] + [`AuthBackend`]，用于测试：
//! 支持按操作注入失败，并记录每种操作的调用次数。

use super::traits::{AuthBackend, BackendError, BackendErrorKind, BackendResult, RemoteStore};
use crate::models::{
    AuthSession, AuthUser, NewPrompt, Prompt, PromptChanges, PromptQuery, SignUpOutcome,
    SortOrder,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// 可注入失败的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Select,
    Insert,
    Update,
    Delete,
    DeleteProfile,
    SignUp,
    SignIn,
    SignOut,
    GetUser,
    UpdatePassword,
}

#[derive(Debug, Default)]
struct MemoryState {
    prompts: Vec<Prompt>,
    profiles: HashSet<String>,
    /// email -> (user, password)
    users: HashMap<String, (AuthUser, String)>,
    /// access token -> user id
    sessions: HashMap<String, String>,
    failing: HashSet<StoreOperation>,
    calls: HashMap<StoreOperation, usize>,
    last_created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    email_confirmation: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign-ups return no session, as with email confirmation enabled.
    pub fn with_email_confirmation(mut self) -> Self {
        self.email_confirmation = true;
        self
    }

    /// Seeds rows as if they already existed remotely.
    pub fn with_prompts(self, prompts: Vec<Prompt>) -> Self {
        self.lock().prompts = prompts;
        self
    }

    /// Registers a user with a profile row.
    pub fn with_user(self, id: &str, email: &str, password: &str) -> Self {
        {
            let mut state = self.lock();
            let user = AuthUser {
                id: id.to_string(),
                email: Some(email.to_string()),
            };
            state
                .users
                .insert(email.to_string(), (user, password.to_string()));
            state.profiles.insert(id.to_string());
        }
        self
    }

    /// 让指定操作在解除前一直失败
    pub fn set_failing(&self, operation: StoreOperation, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing.insert(operation);
        } else {
            state.failing.remove(&operation);
        }
    }

    pub fn call_count(&self, operation: StoreOperation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> Vec<Prompt> {
        self.lock().prompts.clone()
    }

    pub fn has_profile(&self, user_id: &str) -> bool {
        self.lock().profiles.contains(user_id)
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.lock().users.get(email).map(|(_, pw)| pw.clone())
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // 测试里 panic 后锁被污染也继续使用内部数据
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records the call and fails it when injected.
    fn begin(&self, operation: StoreOperation) -> BackendResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        *state.calls.entry(operation).or_insert(0) += 1;
        if state.failing.contains(&operation) {
            return Err(BackendError::with_status(
                BackendErrorKind::ServerError,
                format!("injected {operation:?} failure"),
                503,
            ));
        }
        Ok(state)
    }
}

impl MemoryState {
    /// Strictly increasing timestamps so ordering is deterministic.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_created_at {
            Some(last) if now <= last => last + chrono::Duration::milliseconds(1),
            _ => now,
        };
        self.last_created_at = Some(next);
        next
    }

    fn user_for_token(&self, access_token: &str) -> BackendResult<AuthUser> {
        let user_id = self.sessions.get(access_token).ok_or_else(|| {
            BackendError::from_status(401, "invalid JWT: unable to parse or verify signature")
        })?;
        self.users
            .values()
            .find(|(user, _)| &user.id == user_id)
            .map(|(user, _)| user.clone())
            .ok_or_else(|| BackendError::from_status(404, "User not found"))
    }

    fn issue_session(&mut self, user: AuthUser) -> AuthSession {
        let access_token = format!("token-{}", uuid::Uuid::new_v4());
        self.sessions.insert(access_token.clone(), user.id.clone());
        AuthSession {
            access_token,
            refresh_token: Some(format!("refresh-{}", uuid::Uuid::new_v4())),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
            user,
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select_prompts(&self, query: &PromptQuery) -> BackendResult<Vec<Prompt>> {
        let state = self.begin(StoreOperation::Select)?;
        let mut prompts: Vec<Prompt> = state
            .prompts
            .iter()
            .filter(|p| !query.public_only || p.is_public)
            .cloned()
            .collect();
        match query.order {
            SortOrder::Newest => prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => prompts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        Ok(prompts)
    }

    async fn insert_prompt(&self, prompt: &NewPrompt) -> BackendResult<()> {
        let mut state = self.begin(StoreOperation::Insert)?;
        let created_at = state.next_created_at();
        state.prompts.push(Prompt {
            id: uuid::Uuid::new_v4().to_string(),
            title: prompt.title.clone(),
            content: prompt.content.clone(),
            user_id: prompt.user_id.clone(),
            is_public: prompt.is_public,
            created_at,
            author_name: None,
        });
        Ok(())
    }

    async fn update_prompt(&self, id: &str, changes: &PromptChanges) -> BackendResult<()> {
        let mut state = self.begin(StoreOperation::Update)?;
        // 与 PostgREST 一致：过滤条件未命中时不报错
        if let Some(prompt) = state.prompts.iter_mut().find(|p| p.id == id) {
            prompt.title = changes.title.clone();
            prompt.content = changes.content.clone();
            prompt.is_public = changes.is_public;
        }
        Ok(())
    }

    async fn delete_prompt(&self, id: &str) -> BackendResult<()> {
        let mut state = self.begin(StoreOperation::Delete)?;
        state.prompts.retain(|p| p.id != id);
        Ok(())
    }

    async fn delete_profile(&self, user_id: &str) -> BackendResult<()> {
        let mut state = self.begin(StoreOperation::DeleteProfile)?;
        state.profiles.remove(user_id);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl AuthBackend for MemoryStore {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome> {
        let mut state = self.begin(StoreOperation::SignUp)?;
        if state.users.contains_key(email) {
            return Err(BackendError::from_status(422, "User already registered"));
        }
        let user = AuthUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        state
            .users
            .insert(email.to_string(), (user.clone(), password.to_string()));
        state.profiles.insert(user.id.clone());

        if self.email_confirmation {
            Ok(SignUpOutcome::ConfirmationRequired(user))
        } else {
            Ok(SignUpOutcome::SignedIn(state.issue_session(user)))
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let mut state = self.begin(StoreOperation::SignIn)?;
        let user = match state.users.get(email) {
            Some((user, stored)) if stored == password => user.clone(),
            _ => return Err(BackendError::from_status(400, "Invalid login credentials")),
        };
        Ok(state.issue_session(user))
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let mut state = self.begin(StoreOperation::SignOut)?;
        state.sessions.remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser> {
        let state = self.begin(StoreOperation::GetUser)?;
        state.user_for_token(access_token)
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> BackendResult<()> {
        let mut state = self.begin(StoreOperation::UpdatePassword)?;
        let user = state.user_for_token(access_token)?;
        if let Some(email) = user.email {
            if let Some(entry) = state.users.get_mut(&email) {
                entry.1 = new_password.to_string();
            }
        }
        Ok(())
    }
}
