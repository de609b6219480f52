//! 公开 prompt 浏览
//!
//! 只读取 `is_public = true` 的记录，按创建时间排序，并生成作者显示名。

use crate::backends::RemoteStore;
use crate::errors::{error_message, AppError};
use crate::models::{Prompt, PromptQuery, SortOrder};
use std::sync::Arc;

pub const NO_RESULTS: &str = "No results found.";
pub const NO_PUBLIC_PROMPTS: &str = "No public prompts yet.";
/// Shown when a record carries no author name.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// `User ` followed by the first 8 characters of the owner id.
pub fn author_name(user_id: &str) -> String {
    let short: String = user_id.chars().take(8).collect();
    format!("User {short}")
}

pub struct ExploreFeed<S: RemoteStore + ?Sized> {
    remote: Arc<S>,
    prompts: Vec<Prompt>,
    filtered: Vec<Prompt>,
    search_query: String,
    order: SortOrder,
    loading: bool,
    error: Option<String>,
}

impl<S: RemoteStore + ?Sized> ExploreFeed<S> {
    pub fn new(remote: Arc<S>) -> Self {
        Self {
            remote,
            prompts: Vec::new(),
            filtered: Vec::new(),
            search_query: String::new(),
            order: SortOrder::default(),
            loading: true,
            error: None,
        }
    }

    /// Loads public prompts in `order`. On failure the previous set is kept.
    pub async fn load(&mut self, order: SortOrder) -> Result<(), AppError> {
        self.order = order;
        self.loading = true;

        let result = self.remote.select_prompts(&PromptQuery::public(order)).await;
        self.loading = false;

        match result {
            Ok(prompts) => {
                self.error = None;
                self.prompts = prompts
                    .into_iter()
                    .map(|mut p| {
                        p.author_name = Some(author_name(&p.user_id));
                        p
                    })
                    .collect();
                tracing::debug!(
                    "[Explore] 加载 {} 条公开 prompt ({})",
                    self.prompts.len(),
                    order
                );
                self.refilter();
                Ok(())
            }
            Err(e) => {
                tracing::error!("[Explore] 加载公开 prompt 失败: {}", e);
                let err = AppError::from(e);
                self.error = Some(error_message(&err));
                Err(err)
            }
        }
    }

    /// Matches title, content or author name, ignoring case.
    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
        self.refilter();
    }

    fn refilter(&mut self) {
        let needle = self.search_query.trim().to_lowercase();
        self.filtered = if needle.is_empty() {
            self.prompts.clone()
        } else {
            self.prompts
                .iter()
                .filter(|p| {
                    p.matches(&needle)
                        || p.author_name
                            .as_deref()
                            .is_some_and(|a| a.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect()
        };
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn filtered(&self) -> &[Prompt] {
        &self.filtered
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Text for an empty result list.
    pub fn empty_message(&self) -> &'static str {
        if self.search_query.is_empty() {
            NO_PUBLIC_PROMPTS
        } else {
            NO_RESULTS
        }
    }
}
