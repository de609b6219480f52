//! Supabase 后端
//!
//! - 行存储：PostgREST，`{base}/rest/v1/{table}`
//! - 认证：GoTrue，`{base}/auth/v1/...`
//!
//! 每个请求都带 `apikey` 头；`Authorization` 优先使用会话 token，
//! 没有会话时退回匿名 key。

use super::traits::{AuthBackend, BackendError, BackendErrorKind, BackendResult, RemoteStore};
use crate::config::{Config, ConfigError};
use crate::logger::sanitize_log_message;
use crate::models::{
    AuthSession, AuthUser, NewPrompt, Prompt, PromptChanges, PromptQuery, SignUpOutcome,
};
use crate::proxy::HttpClientFactory;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

const PROMPTS_TABLE: &str = "prompts";
const PROFILES_TABLE: &str = "profiles";

/// GoTrue token 响应
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token
                .expires_in
                .map(|secs| chrono::Utc::now() + chrono::Duration::seconds(secs)),
            user: token.user,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
    client: Client,
}

impl SupabaseClient {
    pub fn new(base_url: Url, anon_key: impl Into<String>, client: Client) -> Self {
        let mut base_url = base_url;
        // Url::join 会替换最后一段路径，这里保证以 / 结尾
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            anon_key: anon_key.into(),
            access_token: None,
            client,
        }
    }

    /// 从配置创建客户端
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base_url = config.supabase_base_url()?;
        let client = HttpClientFactory::from_config(&config.http)
            .create_client()
            .map_err(|e| ConfigError::Http(e.to_string()))?;
        Ok(Self::new(base_url, config.supabase.anon_key.trim(), client))
    }

    /// Row requests are sent on behalf of this session.
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> BackendResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::new(BackendErrorKind::BadRequest, e.to_string()))
    }

    fn table_url(&self, table: &str) -> BackendResult<Url> {
        self.endpoint(&format!("rest/v1/{table}"))
    }

    fn auth_url(&self, path: &str) -> BackendResult<Url> {
        self.endpoint(&format!("auth/v1/{path}"))
    }

    /// 附加 apikey 与 Authorization 头
    fn authorize(&self, request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer
            .or(self.access_token.as_deref())
            .unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> BackendResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("[Supabase] {} 请求失败: {}", operation, e);
            BackendError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            "[Supabase] {} 失败: {} - {}",
            operation,
            status.as_u16(),
            sanitize_log_message(&body)
        );
        Err(BackendError::from_status(
            status.as_u16(),
            extract_error_message(&body, status.canonical_reason()),
        ))
    }

    async fn filter_delete(&self, table: &str, column: &str, value: &str) -> BackendResult<()> {
        let url = self.table_url(table)?;
        let request = self
            .client
            .delete(url)
            .query(&[(column, format!("eq.{value}"))]);
        self.send(self.authorize(request, None), "delete").await?;
        Ok(())
    }
}

/// Pulls a readable message out of a PostgREST / GoTrue error body.
pub fn extract_error_message(body: &str, fallback: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.chars().take(200).collect();
    }
    fallback.unwrap_or("Request failed").to_string()
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    async fn select_prompts(&self, query: &PromptQuery) -> BackendResult<Vec<Prompt>> {
        let url = self.table_url(PROMPTS_TABLE)?;
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", query.order.order_param().to_string()),
        ];
        if query.public_only {
            params.push(("is_public", "eq.true".to_string()));
        }

        let request = self.client.get(url).query(&params);
        let response = self.send(self.authorize(request, None), "select").await?;
        let prompts: Vec<Prompt> = response.json().await?;
        tracing::debug!("[Supabase] 查询到 {} 条 prompt", prompts.len());
        Ok(prompts)
    }

    async fn insert_prompt(&self, prompt: &NewPrompt) -> BackendResult<()> {
        let url = self.table_url(PROMPTS_TABLE)?;
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=minimal")
            .json(&[prompt]);
        self.send(self.authorize(request, None), "insert").await?;
        Ok(())
    }

    async fn update_prompt(&self, id: &str, changes: &PromptChanges) -> BackendResult<()> {
        let url = self.table_url(PROMPTS_TABLE)?;
        let request = self
            .client
            .patch(url)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(changes);
        self.send(self.authorize(request, None), "update").await?;
        Ok(())
    }

    async fn delete_prompt(&self, id: &str) -> BackendResult<()> {
        self.filter_delete(PROMPTS_TABLE, "id", id).await
    }

    async fn delete_profile(&self, user_id: &str) -> BackendResult<()> {
        self.filter_delete(PROFILES_TABLE, "id", user_id).await
    }

    fn name(&self) -> &str {
        "supabase"
    }
}

#[async_trait]
impl AuthBackend for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome> {
        let url = self.auth_url("signup")?;
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "email": email, "password": password }));
        let response = self.send(self.authorize(request, None), "signup").await?;
        let value: serde_json::Value = response.json().await?;

        // 开启邮箱确认时不返回会话，只返回用户
        if value.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(value).map_err(decode_error)?;
            Ok(SignUpOutcome::SignedIn(token.into()))
        } else {
            let user_value = value.get("user").cloned().unwrap_or(value);
            let user: AuthUser = serde_json::from_value(user_value).map_err(decode_error)?;
            Ok(SignUpOutcome::ConfirmationRequired(user))
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let url = self.auth_url("token")?;
        let request = self
            .client
            .post(url)
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }));
        let response = self.send(self.authorize(request, None), "sign in").await?;
        let token: TokenResponse = response.json().await?;
        tracing::info!("[Supabase] 登录成功: {}", token.user.id);
        Ok(token.into())
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let url = self.auth_url("logout")?;
        let request = self.client.post(url);
        self.send(self.authorize(request, Some(access_token)), "sign out")
            .await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser> {
        let url = self.auth_url("user")?;
        let request = self.client.get(url);
        let response = self
            .send(self.authorize(request, Some(access_token)), "get user")
            .await?;
        Ok(response.json().await?)
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> BackendResult<()> {
        let url = self.auth_url("user")?;
        let request = self
            .client
            .put(url)
            .json(&serde_json::json!({ "password": new_password }));
        self.send(
            self.authorize(request, Some(access_token)),
            "update password",
        )
        .await?;
        Ok(())
    }
}

fn decode_error(err: serde_json::Error) -> BackendError {
    BackendError::new(
        BackendErrorKind::Other,
        format!("Unexpected auth response: {err}"),
    )
}
