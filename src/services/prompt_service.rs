//! Prompt 存储控制器
//!
//! 持有当前用户 prompt 的会话内副本，提供增删改查与搜索。
//! 状态每次变化都会通过 watch 通道发布一份快照。

use crate::backends::RemoteStore;
use crate::errors::{error_message, AppError};
use crate::models::{NewPrompt, Prompt, PromptChanges, PromptQuery};
use crate::validation::sanitize_prompt_fields;
use std::sync::Arc;
use tokio::sync::watch;

/// Add/edit surface state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub add_open: bool,
    pub edit_open: bool,
    pub selected: Option<Prompt>,
}

/// Everything a front end renders from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptStoreSnapshot {
    pub prompts: Vec<Prompt>,
    pub filtered: Vec<Prompt>,
    pub search_query: String,
    pub loading: bool,
    pub error: Option<String>,
    pub editor: EditorState,
}

impl Default for PromptStoreSnapshot {
    fn default() -> Self {
        Self {
            prompts: Vec::new(),
            filtered: Vec::new(),
            search_query: String::new(),
            // 首次拉取完成前处于加载状态
            loading: true,
            error: None,
            editor: EditorState::default(),
        }
    }
}

/// Prompts whose title or content contains `query`, ignoring case.
/// A blank query keeps every prompt in its original order.
pub fn filter_prompts(prompts: &[Prompt], query: &str) -> Vec<Prompt> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return prompts.to_vec();
    }
    prompts
        .iter()
        .filter(|p| p.matches(&needle))
        .cloned()
        .collect()
}

pub struct PromptStore<S: RemoteStore + ?Sized> {
    remote: Arc<S>,
    state: PromptStoreSnapshot,
    tx: watch::Sender<PromptStoreSnapshot>,
}

impl<S: RemoteStore + ?Sized> PromptStore<S> {
    pub fn new(remote: Arc<S>) -> Self {
        let state = PromptStoreSnapshot::default();
        let (tx, _rx) = watch::channel(state.clone());
        Self { remote, state, tx }
    }

    /// Receiver that sees every published state, including the optimistic
    /// window of a delete.
    pub fn subscribe(&self) -> watch::Receiver<PromptStoreSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> &PromptStoreSnapshot {
        &self.state
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.state.prompts
    }

    pub fn filtered(&self) -> &[Prompt] {
        &self.state.filtered
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn editor(&self) -> &EditorState {
        &self.state.editor
    }

    pub fn find(&self, id: &str) -> Option<&Prompt> {
        self.state.prompts.iter().find(|p| p.id == id)
    }

    fn publish(&mut self) {
        self.state.filtered = filter_prompts(&self.state.prompts, &self.state.search_query);
        self.tx.send_replace(self.state.clone());
    }

    /// Stores the failure in the error slot and hands it back.
    fn fail(&mut self, err: AppError) -> AppError {
        self.state.error = Some(error_message(&err));
        self.publish();
        err
    }

    fn begin(&mut self) {
        self.state.error = None;
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
        self.publish();
    }

    /// Reloads every prompt visible to the session, newest first.
    ///
    /// On failure the previous cache is kept.
    pub async fn fetch_all(&mut self) -> Result<(), AppError> {
        self.begin();
        self.state.loading = true;
        self.publish();

        let result = self.remote.select_prompts(&PromptQuery::all()).await;
        self.state.loading = false;

        match result {
            Ok(prompts) => {
                tracing::debug!("[Prompt] 拉取到 {} 条 prompt", prompts.len());
                self.state.prompts = prompts;
                self.publish();
                Ok(())
            }
            Err(e) => {
                tracing::error!("[Prompt] 拉取 prompt 失败: {}", e);
                Err(self.fail(AppError::from_backend("Failed to fetch prompts", e)))
            }
        }
    }

    pub async fn refetch(&mut self) -> Result<(), AppError> {
        self.fetch_all().await
    }

    /// Validates and inserts a prompt, then reloads the full set.
    pub async fn add(
        &mut self,
        title: &str,
        content: &str,
        user_id: &str,
        is_public: bool,
    ) -> Result<(), AppError> {
        self.begin();
        let (title, content) = match sanitize_prompt_fields(title, content) {
            Ok(fields) => fields,
            Err(e) => return Err(self.fail(e)),
        };
        if user_id.trim().is_empty() {
            return Err(self.fail(AppError::invalid("User ID is required")));
        }

        let prompt = NewPrompt {
            title,
            content,
            user_id: user_id.to_string(),
            is_public,
        };
        if let Err(e) = self.remote.insert_prompt(&prompt).await {
            tracing::error!("[Prompt] 新增 prompt 失败: {}", e);
            return Err(self.fail(AppError::from_backend("Failed to add prompt", e)));
        }
        tracing::info!("[Prompt] 已新增 prompt: {}", prompt.title);

        self.state.editor.add_open = false;
        self.refetch_after_write().await;
        Ok(())
    }

    /// Validates and updates an existing prompt, then reloads the full set.
    pub async fn update(
        &mut self,
        id: &str,
        title: &str,
        content: &str,
        is_public: bool,
    ) -> Result<(), AppError> {
        self.begin();
        let (title, content) = match sanitize_prompt_fields(title, content) {
            Ok(fields) => fields,
            Err(e) => return Err(self.fail(e)),
        };
        if id.trim().is_empty() {
            return Err(self.fail(AppError::invalid("Prompt ID is required")));
        }

        let changes = PromptChanges {
            title,
            content,
            is_public,
        };
        if let Err(e) = self.remote.update_prompt(id, &changes).await {
            tracing::error!("[Prompt] 更新 prompt {} 失败: {}", id, e);
            return Err(self.fail(AppError::from_backend("Failed to update prompt", e)));
        }
        tracing::info!("[Prompt] 已更新 prompt: {}", id);

        self.state.editor.edit_open = false;
        self.state.editor.selected = None;
        self.refetch_after_write().await;
        Ok(())
    }

    /// Removes the prompt locally right away, then remotely.
    /// A remote failure restores the cache as it was before the call.
    pub async fn delete(&mut self, id: &str) -> Result<(), AppError> {
        self.begin();
        if id.trim().is_empty() {
            return Err(self.fail(AppError::invalid("Prompt ID is required")));
        }

        let previous = self.state.prompts.clone();
        self.state.prompts.retain(|p| p.id != id);
        self.publish();

        if let Err(e) = self.remote.delete_prompt(id).await {
            tracing::warn!("[Prompt] 删除 prompt {} 失败，回滚本地状态: {}", id, e);
            self.state.prompts = previous;
            return Err(self.fail(AppError::from_backend("Failed to delete prompt", e)));
        }

        if self
            .state
            .editor
            .selected
            .as_ref()
            .is_some_and(|p| p.id == id)
        {
            self.state.editor.selected = None;
            self.state.editor.edit_open = false;
        }
        tracing::info!("[Prompt] 已删除 prompt: {}", id);
        self.publish();
        Ok(())
    }

    /// Recomputes the filtered view; no network call.
    pub fn set_search_query(&mut self, query: &str) {
        self.state.search_query = query.to_string();
        self.publish();
    }

    pub fn open_add(&mut self) {
        self.state.editor.add_open = true;
        self.publish();
    }

    /// Opens the edit surface for a cached prompt. Returns `false` when
    /// the id is not in the cache.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(prompt) = self.find(id).cloned() else {
            return false;
        };
        self.state.editor.selected = Some(prompt);
        self.state.editor.edit_open = true;
        self.publish();
        true
    }

    pub fn close_editor(&mut self) {
        self.state.editor = EditorState::default();
        self.publish();
    }

    /// The write already succeeded; a failed reload stays in the error slot.
    async fn refetch_after_write(&mut self) {
        if let Err(e) = self.fetch_all().await {
            tracing::warn!("[Prompt] 写入后刷新失败: {}", e);
        }
    }
}
