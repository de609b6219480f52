//! Prompt 命令
//!
//! 列表、查看、新增、编辑、删除与复制。

use crate::backends::RemoteStore;
use crate::markdown::{render_card_preview, render_document, truncate_for_card, CARD_PLACEHOLDER};
use crate::models::Prompt;
use crate::services::{copy_to_clipboard, PromptStore};
use crate::validation::sanitize_input;
use anyhow::{anyhow, Result};
use std::io::Write;

pub const NO_PROMPTS: &str = "No prompts yet. Create one with `promptdeck add`.";
pub const NO_MATCHES: &str = "No prompts match your search.";

/// One list entry: id and title, date and visibility, then the preview.
pub fn format_card(prompt: &Prompt, html: bool) -> String {
    let visibility = if prompt.is_public { "public" } else { "private" };
    let preview = if html {
        render_card_preview(&prompt.content)
    } else {
        plain_preview(&prompt.content)
    };
    format!(
        "{}  {}\n    {} · {}\n    {}\n",
        prompt.id,
        prompt.title,
        prompt.display_date(),
        visibility,
        preview
    )
}

fn plain_preview(content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        return CARD_PLACEHOLDER.to_string();
    }
    sanitize_input(&truncate_for_card(content))
}

pub async fn list<S, W>(
    store: &mut PromptStore<S>,
    search: Option<&str>,
    html: bool,
    out: &mut W,
) -> Result<()>
where
    S: RemoteStore + ?Sized,
    W: Write,
{
    store.fetch_all().await?;
    if let Some(query) = search {
        store.set_search_query(query);
    }

    if store.filtered().is_empty() {
        let message = if store.prompts().is_empty() {
            NO_PROMPTS
        } else {
            NO_MATCHES
        };
        writeln!(out, "{message}")?;
        return Ok(());
    }
    for prompt in store.filtered() {
        writeln!(out, "{}", format_card(prompt, html))?;
    }
    Ok(())
}

fn cached<'a, S>(store: &'a PromptStore<S>, id: &str) -> Result<&'a Prompt>
where
    S: RemoteStore + ?Sized,
{
    store
        .find(id)
        .ok_or_else(|| anyhow!("Prompt not found: {id}"))
}

/// Prints the title and the full-document HTML rendering.
pub async fn show<S, W>(store: &mut PromptStore<S>, id: &str, out: &mut W) -> Result<()>
where
    S: RemoteStore + ?Sized,
    W: Write,
{
    store.fetch_all().await?;
    let prompt = cached(store, id)?;
    writeln!(out, "<h1>{}</h1>", prompt.title)?;
    writeln!(out, "{}", render_document(&prompt.content))?;
    Ok(())
}

pub async fn add<S, W>(
    store: &mut PromptStore<S>,
    user_id: &str,
    title: &str,
    content: &str,
    public: bool,
    out: &mut W,
) -> Result<()>
where
    S: RemoteStore + ?Sized,
    W: Write,
{
    store.open_add();
    if let Err(e) = store.add(title, content, user_id, public).await {
        store.close_editor();
        return Err(e.into());
    }
    writeln!(out, "Prompt added.")?;
    Ok(())
}

pub async fn edit<S, W>(
    store: &mut PromptStore<S>,
    id: &str,
    title: &str,
    content: &str,
    public: bool,
    out: &mut W,
) -> Result<()>
where
    S: RemoteStore + ?Sized,
    W: Write,
{
    store.fetch_all().await?;
    if !store.open_edit(id) {
        return Err(anyhow!("Prompt not found: {id}"));
    }
    if let Err(e) = store.update(id, title, content, public).await {
        store.close_editor();
        return Err(e.into());
    }
    writeln!(out, "Prompt updated.")?;
    Ok(())
}

/// Deletes after confirmation. `confirm` is only asked when `yes` is not set.
pub async fn delete<S, W, C>(
    store: &mut PromptStore<S>,
    id: &str,
    yes: bool,
    confirm: C,
    out: &mut W,
) -> Result<()>
where
    S: RemoteStore + ?Sized,
    W: Write,
    C: FnOnce(&str) -> Result<bool>,
{
    store.fetch_all().await?;
    let title = cached(store, id)?.title.clone();

    if !yes && !confirm(&format!("Delete \"{title}\"? This cannot be undone."))? {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }
    store.delete(id).await?;
    writeln!(out, "Prompt deleted.")?;
    Ok(())
}

pub async fn copy<S, W>(store: &mut PromptStore<S>, id: &str, out: &mut W) -> Result<()>
where
    S: RemoteStore + ?Sized,
    W: Write,
{
    store.fetch_all().await?;
    let content = cached(store, id)?.content.clone();
    copy_content(&content, copy_to_clipboard, out)
}

pub(crate) fn copy_content<W, F>(content: &str, copier: F, out: &mut W) -> Result<()>
where
    W: Write,
    F: FnOnce(&str) -> bool,
{
    if copier(content) {
        writeln!(out, "Copied!")?;
    } else {
        writeln!(out, "Could not access the clipboard.")?;
    }
    Ok(())
}
