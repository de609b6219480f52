//! 输入清洗与字段校验
//!
//! 所有长度按 Unicode 字符计算。

use crate::errors::AppError;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 10_000;
pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MAX_PASSWORD_CHARS: usize = 128;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Trims the input and collapses every whitespace run to a single space.
pub fn sanitize_input(input: &str) -> String {
    WHITESPACE_RUN.replace_all(input.trim(), " ").into_owned()
}

pub fn validate_prompt_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title", "Title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::validation(
            "title",
            "Title must be less than 200 characters",
        ));
    }
    Ok(())
}

pub fn validate_prompt_content(content: &str) -> Result<(), AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::validation("content", "Content is required"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::validation(
            "content",
            "Content must be less than 10,000 characters",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() {
        return Err(AppError::validation("email", "Email is required"));
    }
    if !EMAIL.is_match(email) {
        return Err(AppError::validation(
            "email",
            "Please enter a valid email address",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::validation("password", "Password is required"));
    }
    let len = password.chars().count();
    if len < MIN_PASSWORD_CHARS {
        return Err(AppError::validation(
            "password",
            "Password must be at least 6 characters long",
        ));
    }
    if len > MAX_PASSWORD_CHARS {
        return Err(AppError::validation(
            "password",
            "Password must be less than 128 characters",
        ));
    }
    Ok(())
}

/// Sanitizes a title/content pair and validates both.
///
/// Title is checked first, so an invalid title is reported even when the
/// content is invalid too.
pub fn sanitize_prompt_fields(title: &str, content: &str) -> Result<(String, String), AppError> {
    let title = sanitize_input(title);
    let content = sanitize_input(content);
    validate_prompt_title(&title)?;
    validate_prompt_content(&content)?;
    Ok((title, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_input("  hello \n\t world  "), "hello world");
        assert_eq!(sanitize_input("   "), "");
        assert_eq!(sanitize_input("a  b   c"), "a b c");
    }

    #[test]
    fn test_title_required() {
        let err = validate_prompt_title("   ").unwrap_err();
        assert_eq!(err.field(), Some("title"));
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_title_length_boundary() {
        assert!(validate_prompt_title(&"t".repeat(200)).is_ok());
        let err = validate_prompt_title(&"t".repeat(201)).unwrap_err();
        assert_eq!(err.field(), Some("title"));
    }

    #[test]
    fn test_title_length_counts_chars_not_bytes() {
        // 200 个多字节字符仍然合法
        assert!(validate_prompt_title(&"提".repeat(200)).is_ok());
    }

    #[test]
    fn test_content_length_boundary() {
        assert!(validate_prompt_content(&"c".repeat(10_000)).is_ok());
        let err = validate_prompt_content(&"c".repeat(10_001)).unwrap_err();
        assert_eq!(err.field(), Some("content"));
        assert_eq!(err.to_string(), "Content must be less than 10,000 characters");
    }

    #[test]
    fn test_title_error_wins_over_content_error() {
        let err = sanitize_prompt_fields(&"t".repeat(201), "").unwrap_err();
        assert_eq!(err.field(), Some("title"));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert_eq!(
            validate_email("").unwrap_err().to_string(),
            "Email is required"
        );
        assert_eq!(validate_email("user@example").unwrap_err().field(), Some("email"));
        assert!(validate_email("user @example.com").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
        assert_eq!(validate_password("").unwrap_err().field(), Some("password"));
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(input in "\\PC*") {
            let once = sanitize_input(&input);
            prop_assert_eq!(sanitize_input(&once), once);
        }

        #[test]
        fn prop_long_title_always_fails_on_title(
            extra in 1usize..50,
            content in "[a-z ]{0,20}",
        ) {
            let title = "x".repeat(MAX_TITLE_CHARS + extra);
            let err = sanitize_prompt_fields(&title, &content).unwrap_err();
            prop_assert_eq!(err.field(), Some("title"));
        }

        #[test]
        fn prop_long_content_always_fails_on_content(extra in 1usize..50) {
            let content = "y".repeat(MAX_CONTENT_CHARS + extra);
            let err = sanitize_prompt_fields("ok title", &content).unwrap_err();
            prop_assert_eq!(err.field(), Some("content"));
        }
    }
}
