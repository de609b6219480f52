pub mod prompt_model;
pub mod session_model;

pub use prompt_model::{NewPrompt, Prompt, PromptChanges, PromptQuery, SortOrder};
pub use session_model::{AuthSession, AuthUser, SignUpOutcome};
