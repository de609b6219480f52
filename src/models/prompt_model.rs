use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A row of the `prompts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(deserialize_with = "deserialize_opaque_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_opaque_id")]
    pub user_id: String,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    /// Display name derived client-side for the public feed; never stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

impl Prompt {
    /// Case-insensitive substring match on title or content.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// Date shown on cards, e.g. `2024-05-01`.
    pub fn display_date(&self) -> String {
        self.created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d")
            .to_string()
    }
}

/// Insert payload. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrompt {
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub is_public: bool,
}

/// Update payload; identity, owner and timestamp are immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptChanges {
    pub title: String,
    pub content: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }

    /// PostgREST `order` parameter value for `created_at`.
    pub fn order_param(&self) -> &'static str {
        match self {
            SortOrder::Newest => "created_at.desc",
            SortOrder::Oldest => "created_at.asc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            _ => Err(format!("Invalid sort order: {s}")),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters of a prompt select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromptQuery {
    pub public_only: bool,
    pub order: SortOrder,
}

impl PromptQuery {
    /// Everything visible to the signed-in user, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn public(order: SortOrder) -> Self {
        Self {
            public_only: true,
            order,
        }
    }
}

/// Accepts both string (uuid) and integer (bigint) primary keys.
fn deserialize_opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OpaqueId {
        Text(String),
        Number(i64),
    }

    Ok(match OpaqueId::deserialize(deserializer)? {
        OpaqueId::Text(s) => s,
        OpaqueId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_from_postgrest_row() {
        let row = r#"{
            "id": "5f0c7d2e-1111-4a4a-9b9b-222233334444",
            "title": "Greeting",
            "content": "Say hello",
            "user_id": "user-1",
            "is_public": true,
            "created_at": "2024-05-01T12:30:00.123456+00:00"
        }"#;
        let prompt: Prompt = serde_json::from_str(row).unwrap();
        assert_eq!(prompt.title, "Greeting");
        assert!(prompt.is_public);
        assert_eq!(prompt.author_name, None);
        assert_eq!(prompt.created_at.timestamp(), 1714566600);
    }

    #[test]
    fn test_prompt_numeric_id_and_missing_visibility() {
        let row = r#"{
            "id": 42,
            "title": "t",
            "content": "c",
            "user_id": "u",
            "created_at": "2024-05-01T12:30:00Z"
        }"#;
        let prompt: Prompt = serde_json::from_str(row).unwrap();
        assert_eq!(prompt.id, "42");
        assert!(!prompt.is_public);
    }

    #[test]
    fn test_author_name_not_serialized_when_absent() {
        let prompt = Prompt {
            id: "1".into(),
            title: "t".into(),
            content: "c".into(),
            user_id: "u".into(),
            is_public: false,
            created_at: Utc::now(),
            author_name: None,
        };
        let json = serde_json::to_value(&prompt).unwrap();
        assert!(json.get("author_name").is_none());
    }

    #[test]
    fn test_prompt_matches_is_case_insensitive() {
        let prompt = Prompt {
            id: "1".into(),
            title: "Hello World".into(),
            content: "Body TEXT".into(),
            user_id: "u".into(),
            is_public: false,
            created_at: Utc::now(),
            author_name: None,
        };
        assert!(prompt.matches("hello"));
        assert!(prompt.matches("body text"));
        assert!(!prompt.matches("missing"));
    }

    #[test]
    fn test_sort_order_parse_and_param() {
        assert_eq!("Oldest".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Newest.order_param(), "created_at.desc");
        assert_eq!(PromptQuery::all().order, SortOrder::Newest);
        assert!(PromptQuery::public(SortOrder::Oldest).public_only);
    }
}
