//! 公开 prompt 浏览命令

use crate::backends::RemoteStore;
use crate::markdown::render_card_preview;
use crate::models::{Prompt, SortOrder};
use crate::services::explore_service::ANONYMOUS_AUTHOR;
use crate::services::ExploreFeed;
use anyhow::Result;
use std::io::Write;

fn format_entry(prompt: &Prompt) -> String {
    format!(
        "{}  {}\n    by {} · {}\n    {}\n",
        prompt.id,
        prompt.title,
        prompt.author_name.as_deref().unwrap_or(ANONYMOUS_AUTHOR),
        prompt.display_date(),
        render_card_preview(&prompt.content)
    )
}

pub async fn explore<S, W>(
    feed: &mut ExploreFeed<S>,
    order: SortOrder,
    search: Option<&str>,
    out: &mut W,
) -> Result<()>
where
    S: RemoteStore + ?Sized,
    W: Write,
{
    if let Err(e) = feed.load(order).await {
        return Err(anyhow::Error::new(e).context("Error fetching prompts"));
    }
    if let Some(query) = search {
        feed.set_search_query(query);
    }

    if feed.filtered().is_empty() {
        writeln!(out, "{}", feed.empty_message())?;
        return Ok(());
    }
    for prompt in feed.filtered() {
        writeln!(out, "{}", format_entry(prompt))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{MemoryStore, StoreOperation};
    use crate::services::explore_service::{NO_PUBLIC_PROMPTS, NO_RESULTS};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn public(id: &str, title: &str, day: u32) -> Prompt {
        Prompt {
            id: id.to_string(),
            title: title.to_string(),
            content: "Shared *prompt*".to_string(),
            user_id: "abcdefgh-1234".to_string(),
            is_public: true,
            created_at: Utc.with_ymd_and_hms(2024, 7, day, 8, 0, 0).unwrap(),
            author_name: None,
        }
    }

    #[tokio::test]
    async fn test_explore_lists_with_author() {
        let remote = Arc::new(
            MemoryStore::new().with_prompts(vec![public("a", "Old", 1), public("b", "New", 2)]),
        );
        let mut feed = ExploreFeed::new(remote);

        let mut out = Vec::new();
        explore(&mut feed, SortOrder::Oldest, None, &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("by User abcdefgh"));
        assert!(text.find("Old").unwrap() < text.find("New").unwrap());
        assert!(text.contains("<em"));
    }

    #[tokio::test]
    async fn test_explore_empty_messages() {
        let remote = Arc::new(MemoryStore::new());
        let mut feed = ExploreFeed::new(remote.clone());

        let mut out = Vec::new();
        explore(&mut feed, SortOrder::Newest, None, &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), NO_PUBLIC_PROMPTS);

        let mut out = Vec::new();
        explore(&mut feed, SortOrder::Newest, Some("x"), &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), NO_RESULTS);
    }

    #[tokio::test]
    async fn test_explore_failure() {
        let remote = Arc::new(MemoryStore::new());
        remote.set_failing(StoreOperation::Select, true);
        let mut feed = ExploreFeed::new(remote);

        let err = explore(&mut feed, SortOrder::Newest, None, &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error fetching prompts");
        assert!(format!("{err:#}").contains("injected"));
    }
}
