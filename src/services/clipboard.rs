//! 剪贴板
//!
//! 复制失败只记录日志，不向调用方抛错。

/// Copies `text` to the system clipboard. Returns whether it worked.
pub fn copy_to_clipboard(text: &str) -> bool {
    copy_with(text, |text| {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text)
    })
}

fn copy_with<F>(text: &str, write: F) -> bool
where
    F: FnOnce(&str) -> Result<(), arboard::Error>,
{
    match write(text) {
        Ok(()) => {
            tracing::info!("[Clipboard] 已复制 {} 个字符", text.chars().count());
            true
        }
        Err(e) => {
            tracing::warn!("[Clipboard] 复制到剪贴板失败: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_reports_success() {
        let mut copied = String::new();
        assert!(copy_with("hello", |t| {
            copied = t.to_string();
            Ok(())
        }));
        assert_eq!(copied, "hello");
    }

    #[test]
    fn test_copy_failure_is_swallowed() {
        assert!(!copy_with("hello", |_| Err(arboard::Error::ContentNotAvailable)));
    }
}
